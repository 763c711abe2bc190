//! 命令行接口模块
//!
//! 提供命令行参数解析和参数校验

use api_drift_core::{AnalysisConfig, ApiDriftError, FormatterConfig, ReportFormat, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// api-drift - Python 公共 API 漂移分析工具
///
/// 比较 Python 包在两个 Git 版本之间的公共 API，输出新增、删除和修改的函数、类与导出。
#[derive(Parser, Debug)]
#[command(name = "api-drift")]
#[command(author = "api-drift contributors")]
#[command(version = "0.1.0")]
#[command(about = "Report public API changes of a Python package between two Git revisions")]
#[command(
    long_about = "api-drift reads every public module of a Python package at two Git revisions, extracts function and class signatures, exports and re-exports, and reports what was added, removed or modified."
)]
pub struct Cli {
    /// 旧版本
    #[arg(
        long = "old-version",
        value_name = "REV",
        help = "Old revision (tag, branch or commit) to compare from"
    )]
    pub old_version: String,

    /// 新版本
    #[arg(
        long = "new-version",
        value_name = "REV",
        help = "New revision (tag, branch or commit) to compare to"
    )]
    pub new_version: String,

    /// 仓库路径
    #[arg(
        short = 'r',
        long = "repo",
        alias = "joblib-path",
        env = "API_DRIFT_REPO",
        value_name = "PATH",
        help = "Path to the Git repository of the package"
    )]
    pub repo_path: PathBuf,

    /// 输出格式
    #[arg(
        long = "output",
        value_enum,
        default_value_t = OutputFormatArg::Text,
        help = "Output format of the report"
    )]
    pub output: OutputFormatArg,

    /// 输出到文件
    #[arg(
        short = 'o',
        long = "output-file",
        value_name = "FILE",
        help = "Write the report to a file instead of stdout"
    )]
    pub output_file: Option<PathBuf>,

    /// 顶层包名
    #[arg(
        long = "package",
        default_value = "joblib",
        value_name = "NAME",
        help = "Top-level package name used for module names"
    )]
    pub package: String,

    /// 包源码根目录
    #[arg(
        long = "source-root",
        value_name = "DIR",
        help = "Directory of the package sources inside the repository [default: the package name]"
    )]
    pub source_root: Option<String>,

    /// 显示返回类型变化
    #[arg(
        long = "show-return-changes",
        help = "Show old and new return annotations for return-only modifications in text reports"
    )]
    pub show_return_changes: bool,

    /// 详细输出
    #[arg(short = 'v', long = "verbose", help = "Enable verbose logging output")]
    pub verbose: bool,
}

/// 输出格式命令行参数
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormatArg {
    /// JSON 数组
    #[value(name = "json")]
    Json,
    /// Markdown 报告
    #[value(name = "text")]
    Text,
}

impl From<OutputFormatArg> for ReportFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => ReportFormat::Json,
            OutputFormatArg::Text => ReportFormat::Text,
        }
    }
}

/// 应用程序配置信息
#[derive(Debug, Clone)]
pub struct Config {
    /// 仓库路径
    pub repo_path: PathBuf,
    /// 旧版本
    pub old_version: String,
    /// 新版本
    pub new_version: String,
    /// 分析配置
    pub analysis: AnalysisConfig,
    /// 报告配置
    pub formatter: FormatterConfig,
    /// 输出文件路径
    pub output_file: Option<PathBuf>,
    /// 是否启用详细输出
    pub verbose: bool,
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        let source_root = cli.source_root.unwrap_or_else(|| cli.package.clone());

        Config {
            repo_path: cli.repo_path,
            old_version: cli.old_version,
            new_version: cli.new_version,
            formatter: FormatterConfig {
                format: cli.output.into(),
                package: cli.package.clone(),
                show_return_changes: cli.show_return_changes,
            },
            analysis: AnalysisConfig {
                package: cli.package,
                source_root,
            },
            output_file: cli.output_file,
            verbose: cli.verbose,
        }
    }
}

impl Cli {
    /// 解析命令行参数
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// 验证参数的有效性
    pub fn validate(&self) -> Result<()> {
        if !self.repo_path.exists() {
            return Err(ApiDriftError::ConfigError(format!(
                "Repository path does not exist: {}",
                self.repo_path.display()
            )));
        }

        for (flag, revision) in [
            ("--old-version", &self.old_version),
            ("--new-version", &self.new_version),
        ] {
            if revision.trim().is_empty() {
                return Err(ApiDriftError::ConfigError(format!(
                    "{flag} cannot be empty"
                )));
            }
        }

        // 只有当父目录不是空路径时才检查和创建
        if let Some(parent) = self.output_file.as_ref().and_then(|file| file.parent()) {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    ApiDriftError::IoError(std::io::Error::new(
                        e.kind(),
                        format!(
                            "Failed to create output directory {}: {}",
                            parent.display(),
                            e
                        ),
                    ))
                })?;
            }
        }

        Ok(())
    }
}
