//! 变更集分析模块
//!
//! 枚举两个版本中的所有源文件，应用过滤规则，逐个文件构建快照并计算差异，
//! 最终汇总为一个按文件路径排序的扁平变更列表。

use crate::differ::{ChangeRecord, diff_modules};
use crate::error::{ApiDriftError, Result};
use crate::git::RevisionSource;
use crate::snapshot::{ENTRY_POINT_FILE, ModuleNaming, SnapshotBuilder};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info};

/// 测试目录的路径片段
const TESTS_SEGMENT: &str = "/tests/";

/// 分析配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// 顶层包名
    pub package: String,
    /// 包源码在仓库中的根目录
    pub source_root: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            package: "joblib".to_string(),
            source_root: "joblib".to_string(),
        }
    }
}

impl AnalysisConfig {
    /// 使用包名作为源码根目录创建配置
    pub fn for_package(package: impl Into<String>) -> Self {
        let package = package.into();
        Self {
            source_root: package.clone(),
            package,
        }
    }

    /// 验证配置的有效性
    pub fn validate(&self) -> Result<()> {
        if self.package.is_empty() {
            return Err(ApiDriftError::ConfigError(
                "Package name cannot be empty".to_string(),
            ));
        }

        let valid_package = self.package.split('.').all(|segment| {
            let mut chars = segment.chars();
            chars
                .next()
                .is_some_and(|first| first == '_' || first.is_alphabetic())
                && chars.all(|c| c == '_' || c.is_alphanumeric())
        });
        if !valid_package {
            return Err(ApiDriftError::ConfigError(format!(
                "Invalid package name: {}",
                self.package
            )));
        }

        if self.source_root.trim_matches('/').is_empty() {
            return Err(ApiDriftError::ConfigError(
                "Source root cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    fn naming(&self) -> ModuleNaming {
        ModuleNaming::new(self.package.clone(), self.source_root.clone())
    }
}

/// 文件是否参与分析
///
/// 测试目录下的文件和下划线开头的内部模块被跳过，包入口文件始终保留。
pub fn should_analyze(path: &str) -> bool {
    if path.contains(TESTS_SEGMENT) {
        return false;
    }

    let file_name = path.rsplit('/').next().unwrap_or(path);
    !file_name.starts_with('_') || file_name == ENTRY_POINT_FILE
}

/// 变更集分析器
pub struct ChangeAnalyzer<S: RevisionSource> {
    source: S,
    builder: SnapshotBuilder,
    config: AnalysisConfig,
}

impl<S: RevisionSource> ChangeAnalyzer<S> {
    /// 创建新的变更集分析器
    pub fn new(source: S, config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        let builder = SnapshotBuilder::new(config.naming())?;

        Ok(Self {
            source,
            builder,
            config,
        })
    }

    /// 列出两个版本中需要分析的文件，已过滤并排序
    pub fn candidate_files(&self, old_revision: &str, new_revision: &str) -> Vec<String> {
        let root = self.config.source_root.trim_end_matches('/');
        let files: BTreeSet<String> = self
            .source
            .list_files(old_revision, root)
            .into_iter()
            .chain(self.source.list_files(new_revision, root))
            .filter(|path| should_analyze(path))
            .collect();

        files.into_iter().collect()
    }

    /// 分析单个文件在两个版本之间的变更
    pub fn analyze_file(
        &mut self,
        old_revision: &str,
        new_revision: &str,
        path: &str,
    ) -> Vec<ChangeRecord> {
        let old_source = self.source.file_at(old_revision, path);
        let new_source = self.source.file_at(new_revision, path);

        let module_name = self.builder.naming().module_name(path);
        let old = self.builder.build(path, old_source.as_deref());
        let new = self.builder.build(path, new_source.as_deref());

        let changes = diff_modules(&module_name, old.as_ref(), new.as_ref());
        debug!("{}: {} changes", module_name, changes.len());
        changes
    }

    /// 分析两个版本之间的所有变更
    pub fn analyze(&mut self, old_revision: &str, new_revision: &str) -> Vec<ChangeRecord> {
        let files = self.candidate_files(old_revision, new_revision);
        info!(
            "Comparing {} files between {} and {}",
            files.len(),
            old_revision,
            new_revision
        );

        let mut changes = Vec::new();
        for path in &files {
            changes.extend(self.analyze_file(old_revision, new_revision, path));
        }

        info!("Detected {} API changes", changes.len());
        changes
    }
}
