pub mod cli;
pub mod errors;
pub mod loader;
pub mod panels;

use cli::CliOptions;
use dxfview_config::AppConfig;
use dxfview_engine::session::LoadStatus;
use errors::FrontendError;
use tracing::info;

/// 以命令行模式运行查看器。
pub fn run_cli(options: &CliOptions, config: &AppConfig) -> Result<(), FrontendError> {
    info!(files = options.files.len(), "启动 CLI 前端");
    let reports = cli::run(options, config)?;
    let failed = reports
        .iter()
        .filter(|report| report.status == LoadStatus::ParseFailed)
        .count();
    if failed > 0 {
        info!(failed, "部分文件解析失败");
    }
    Ok(())
}
