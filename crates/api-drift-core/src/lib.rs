//! api-drift-core - Python 公共 API 漂移分析核心库
//!
//! 基于 Tree-sitter 提取 Python 包在两个 Git 版本中的公共签名，
//! 计算新增、删除和修改的 API，并渲染为 JSON 或 Markdown 报告。

pub mod analyzer;
pub mod differ;
pub mod error;
pub mod extractor;
pub mod formatter;
pub mod git;
pub mod model;
pub mod parser;
pub mod snapshot;

// 重新导出主要的公共 API
pub use analyzer::{AnalysisConfig, ChangeAnalyzer, should_analyze};
pub use differ::{
    ChangeCategory, ChangeDetails, ChangeRecord, ChangeType, diff_classes, diff_exports,
    diff_functions, diff_modules,
};
pub use error::{ApiDriftError, Result};
pub use extractor::SignatureExtractor;
pub use formatter::{FormatterConfig, ReportFormat, ReportRenderer};
pub use git::{GitRevisionSource, RevisionSource, decode_source};
pub use model::{ClassInfo, FunctionSignature, ModuleInfo};
pub use parser::PythonParser;
pub use snapshot::{ModuleNaming, SnapshotBuilder};
