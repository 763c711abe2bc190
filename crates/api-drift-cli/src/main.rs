//! api-drift - Python 公共 API 漂移分析工具
//!
//! 读取 Python 包在两个 Git 版本中的源码，报告公共 API 的新增、删除和修改。

mod cli;

use api_drift_core::{ChangeAnalyzer, GitRevisionSource, ReportRenderer, Result};
use cli::{Cli, Config};
use std::io::IsTerminal;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

fn main() {
    // 解析命令行参数
    let cli = Cli::parse_args();

    // 初始化日志记录
    init_tracing(cli.verbose);

    // 验证参数
    if let Err(e) = cli.validate() {
        error!("Invalid arguments: {}", e);
        std::process::exit(1);
    }

    let config: Config = cli.into();
    if config.verbose {
        info!(
            "Starting api-drift analysis of {} ({} -> {})",
            config.analysis.package, config.old_version, config.new_version
        );
    }
    debug!(
        "Configuration: repo_path={}, package={}, source_root={}, format={:?}",
        config.repo_path.display(),
        config.analysis.package,
        config.analysis.source_root,
        config.formatter.format
    );

    // 运行主要逻辑
    if let Err(e) = run(config) {
        error!("Application error: {}", e);
        std::process::exit(1);
    }
}

/// 日志写入标准错误，`RUST_LOG` 优先于 `--verbose`
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();
}

/// 主要应用逻辑
fn run(config: Config) -> Result<()> {
    eprintln!(
        "Analyzing changes from {} to {}...",
        config.old_version, config.new_version
    );

    // 1. 打开仓库
    let source = GitRevisionSource::open(&config.repo_path)?;

    // 2. 逐文件分析两个版本之间的变更
    let mut analyzer = ChangeAnalyzer::new(source, config.analysis)?;
    let changes = analyzer.analyze(&config.old_version, &config.new_version);

    // 3. 渲染报告
    let report = ReportRenderer::new(config.formatter).render(&changes)?;

    // 4. 输出
    match &config.output_file {
        Some(path) => {
            std::fs::write(path, &report)?;
            info!("Report size: {} bytes", report.len());
            eprintln!("Output written to {}", path.display());
        }
        None => println!("{report}"),
    }

    eprintln!("\nTotal changes: {}", changes.len());
    Ok(())
}
