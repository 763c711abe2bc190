//! 输出格式化模块
//!
//! 将变更列表渲染为 JSON 数组或按类型分组的 Markdown 报告

use crate::differ::{ChangeCategory, ChangeDetails, ChangeRecord, ChangeType};
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// 报告输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    /// JSON 数组，每条记录一个对象
    Json,
    /// 按类型分组的 Markdown 文本
    Text,
}

/// 输出格式化器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatterConfig {
    /// 输出格式
    pub format: ReportFormat,
    /// 报告标题中的包名
    pub package: String,
    /// 是否为仅返回类型变化的记录输出变化详情
    pub show_return_changes: bool,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            format: ReportFormat::Text,
            package: "joblib".to_string(),
            show_return_changes: false,
        }
    }
}

/// 报告渲染器
pub struct ReportRenderer {
    config: FormatterConfig,
}

impl ReportRenderer {
    /// 创建新的报告渲染器
    pub fn new(config: FormatterConfig) -> Self {
        Self { config }
    }

    /// 使用默认配置创建渲染器
    pub fn with_default_config() -> Self {
        Self::new(FormatterConfig::default())
    }

    /// 渲染变更列表
    pub fn render(&self, changes: &[ChangeRecord]) -> Result<String> {
        match self.config.format {
            ReportFormat::Json => self.render_json(changes),
            ReportFormat::Text => Ok(self.render_text(changes)),
        }
    }

    /// 渲染为 JSON 数组，保持记录顺序
    pub fn render_json(&self, changes: &[ChangeRecord]) -> Result<String> {
        Ok(serde_json::to_string_pretty(changes)?)
    }

    /// 渲染为 Markdown 报告
    pub fn render_text(&self, changes: &[ChangeRecord]) -> String {
        let mut lines = vec![
            format!("# {} API Changes Report", capitalize(&self.config.package)),
            String::new(),
        ];

        let of_type = |change_type: ChangeType| -> Vec<&ChangeRecord> {
            changes
                .iter()
                .filter(|c| c.change_type == change_type)
                .collect()
        };

        let added = of_type(ChangeType::Added);
        if !added.is_empty() {
            lines.extend(["## Added".to_string(), String::new()]);
            lines.extend(added.into_iter().map(format_added));
            lines.push(String::new());
        }

        let removed = of_type(ChangeType::Removed);
        if !removed.is_empty() {
            lines.extend(["## Removed".to_string(), String::new()]);
            lines.extend(removed.into_iter().map(format_entry));
            lines.push(String::new());
        }

        let modified = of_type(ChangeType::Modified);
        if !modified.is_empty() {
            lines.extend(["## Modified".to_string(), String::new()]);
            for change in modified {
                lines.extend(self.format_modified(change));
            }
            lines.push(String::new());
        }

        if changes.is_empty() {
            lines.push("No public API changes detected.".to_string());
        }

        lines.join("\n")
    }

    fn format_modified(&self, change: &ChangeRecord) -> Vec<String> {
        let mut lines = vec![format_entry(change)];
        match &change.details {
            ChangeDetails::SignatureChanged {
                old_signature,
                new_signature,
                ..
            } => {
                lines.push(format!("  - Old: `{old_signature}`"));
                lines.push(format!("  - New: `{new_signature}`"));
            }
            ChangeDetails::ReturnChanged {
                old_return,
                new_return,
            } if self.config.show_return_changes => {
                lines.push(format!(
                    "  - Return changed: `{}` → `{}`",
                    display_annotation(old_return),
                    display_annotation(new_return)
                ));
            }
            _ => {}
        }
        lines
    }
}

/// `- \`module\`: category \`name\``
fn format_entry(change: &ChangeRecord) -> String {
    format!(
        "- `{}`: {} `{}`",
        change.module_name,
        change.category.as_str(),
        change.entity_name
    )
}

fn format_added(change: &ChangeRecord) -> String {
    match (&change.category, &change.details) {
        (ChangeCategory::Module, _) => format!("- **New module**: `{}`", change.entity_name),
        (ChangeCategory::Function, ChangeDetails::AddedFunction { signature, .. }) => {
            format!(
                "- `{}`: function `{}`",
                change.module_name,
                qualified_signature(&change.entity_name, signature)
            )
        }
        _ => format_entry(change),
    }
}

/// 方法的签名带上所属类名，例如 `Memory.reduce_size(self)`
fn qualified_signature(entity_name: &str, signature: &str) -> String {
    match entity_name.rsplit_once('.') {
        Some((owner, _)) => format!("{owner}.{signature}"),
        None => signature.to_string(),
    }
}

fn display_annotation(annotation: &Option<String>) -> &str {
    annotation.as_deref().unwrap_or("None")
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
