//! 模块快照构建模块
//!
//! 针对单个（文件，版本）运行签名提取器，并解析文件对应的逻辑模块名

use crate::error::Result;
use crate::extractor::SignatureExtractor;
use crate::model::ModuleInfo;
use tracing::debug;

/// 包入口文件名
pub const ENTRY_POINT_FILE: &str = "__init__.py";

/// Python 源文件扩展名
pub const SOURCE_EXTENSION: &str = ".py";

/// 文件路径到逻辑模块名的映射规则
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleNaming {
    /// 顶层包名，例如 `joblib`
    pub package: String,
    /// 包源码在仓库中的根目录，例如 `joblib` 或 `src/joblib`
    pub source_root: String,
}

impl ModuleNaming {
    pub fn new(package: impl Into<String>, source_root: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            source_root: source_root.into(),
        }
    }

    /// 将仓库相对路径解析为点分隔的模块名
    ///
    /// `joblib/parallel.py` 解析为 `joblib.parallel`，`joblib/__init__.py` 解析为 `joblib`，
    /// 子包入口 `joblib/externals/__init__.py` 解析为 `joblib.externals`。
    pub fn module_name(&self, path: &str) -> String {
        let root = self.source_root.trim_end_matches('/');
        let relative = path
            .strip_prefix(root)
            .and_then(|rest| rest.strip_prefix('/'))
            .unwrap_or(path);
        let relative = relative.strip_suffix(SOURCE_EXTENSION).unwrap_or(relative);

        let mut segments: Vec<&str> = relative.split('/').filter(|s| !s.is_empty()).collect();
        if segments.last() == Some(&entry_point_stem()) {
            segments.pop();
        }

        if segments.is_empty() {
            self.package.clone()
        } else {
            format!("{}.{}", self.package, segments.join("."))
        }
    }
}

fn entry_point_stem() -> &'static str {
    ENTRY_POINT_FILE
        .strip_suffix(SOURCE_EXTENSION)
        .unwrap_or(ENTRY_POINT_FILE)
}

/// 模块快照构建器
pub struct SnapshotBuilder {
    extractor: SignatureExtractor,
    naming: ModuleNaming,
}

impl SnapshotBuilder {
    /// 创建新的快照构建器
    pub fn new(naming: ModuleNaming) -> Result<Self> {
        Ok(Self {
            extractor: SignatureExtractor::new()?,
            naming,
        })
    }

    /// 获取模块命名规则
    pub fn naming(&self) -> &ModuleNaming {
        &self.naming
    }

    /// 为某个版本的文件构建快照
    ///
    /// 文件在该版本不存在（`source` 为 `None`）或无法解析时返回 `None`。
    pub fn build(&mut self, path: &str, source: Option<&str>) -> Option<ModuleInfo> {
        let source = source?;
        let mut module = self.extractor.extract(source)?;
        module.name = self.naming.module_name(path);

        debug!(
            "Built snapshot for {} ({} functions, {} classes, {} exports)",
            module.name,
            module.functions.len(),
            module.classes.len(),
            module.exports.len()
        );

        Some(module)
    }
}
