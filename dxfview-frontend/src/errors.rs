use dxfview_engine::errors::EngineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FrontendError {
    #[error("视口配置无效: {0}")]
    Viewport(#[from] EngineError),
    #[error("命令 `{command}` 执行失败: {message}")]
    Command { command: String, message: String },
}
