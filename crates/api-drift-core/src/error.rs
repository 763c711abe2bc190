use thiserror::Error;

/// api-drift 工具的错误类型定义
///
/// 文件在某个版本不存在、源码无法解析都不是错误，它们以 `None` 的形式向上传递。
/// 这里只描述会终止整个分析流程的情况。
#[derive(Error, Debug)]
pub enum ApiDriftError {
    #[error("Git repository error: {0}")]
    GitError(String),

    #[error("Python source parsing error: {0}")]
    ParseError(String),

    #[error("File I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Tree-sitter parsing failed: {0}")]
    TreeSitterError(String),

    #[error("Report serialization failed: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// 项目通用的 Result 类型别名
pub type Result<T> = std::result::Result<T, ApiDriftError>;
