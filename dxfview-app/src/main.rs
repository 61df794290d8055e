use std::path::PathBuf;

use dxfview_config::{AppConfig, ConfigError};
use dxfview_frontend::cli::{self, CliOptions};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

fn main() {
    let mut args = std::env::args().skip(1);
    let mut config_override: Option<PathBuf> = None;
    let mut options = CliOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let Some(path) = args.next() else {
                    eprintln!("`--config` 需要提供配置文件路径");
                    std::process::exit(1);
                };
                config_override = Some(PathBuf::from(path));
            }
            "--resize" => {
                let Some(size) = args.next().as_deref().and_then(cli::parse_size) else {
                    eprintln!("`--resize` 需要 <宽>x<高> 形式的尺寸，例如 1024x768");
                    std::process::exit(1);
                };
                options.resize = Some(size);
            }
            "--recenter" => options.recenter = true,
            other if other.starts_with("--") => {
                eprintln!("未知参数：{other}");
                std::process::exit(1);
            }
            path => options.files.push(PathBuf::from(path)),
        }
    }

    let explicit_config = config_override.is_some();
    let (config, config_error) = load_configuration(config_override);
    init_logging(&config);
    if let Some(err) = config_error {
        report_config_error(&err, explicit_config);
    }
    info!(files = options.files.len(), "启动 DXF 查看器");

    if let Err(err) = dxfview_frontend::run_cli(&options, &config) {
        error!(error = %err, "CLI 前端运行失败");
        std::process::exit(1);
    }
}

/// 读取配置；失败时回退到默认值，并把错误交还给调用方，待日志初始化后再输出。
fn load_configuration(override_path: Option<PathBuf>) -> (AppConfig, Option<ConfigError>) {
    let loaded = match override_path {
        Some(path) => AppConfig::from_file(path),
        None => AppConfig::discover(),
    };
    match loaded {
        Ok(cfg) => (cfg, None),
        Err(err) => (AppConfig::default(), Some(err)),
    }
}

fn report_config_error(err: &ConfigError, explicit: bool) {
    let message = if explicit {
        "加载指定配置失败，使用默认配置"
    } else {
        "加载默认配置失败，使用内建默认值"
    };
    match err {
        ConfigError::Io { path, .. } | ConfigError::Parse { path, .. } => {
            warn!(path = %path.display(), error = %err, "{message}");
        }
        ConfigError::Context { .. } => {
            warn!(error = %err, "{message}");
        }
    }
}

fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_new(config.logging.level.clone()).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(filter);
    if subscriber.try_init().is_err() {
        // 已初始化，忽略
    }
}
