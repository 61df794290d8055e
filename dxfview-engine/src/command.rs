use std::collections::HashMap;

use crate::errors::EngineError;
use crate::session::ViewerSession;
use crate::view::Viewport;

#[derive(Debug, Clone)]
pub struct CommandRequest {
    pub name: String,
    pub args: Vec<String>,
}

impl CommandRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args<I, S>(name: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CommandResponse {
    pub success: bool,
    pub message: Option<String>,
}

impl CommandResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

pub trait CommandHandler: Send + Sync {
    fn name(&self) -> &'static str;
    fn execute(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse;
}

pub struct CommandContext<'a> {
    pub session: &'a mut ViewerSession,
}

pub struct CommandBus {
    handlers: HashMap<&'static str, Box<dyn CommandHandler>>,
}

impl CommandBus {
    pub fn new() -> Self {
        let mut bus = Self {
            handlers: HashMap::new(),
        };
        bus.register(RecenterCommand);
        bus.register(ResizeCommand);
        bus
    }

    pub fn register<H: CommandHandler + 'static>(&mut self, handler: H) {
        self.handlers.insert(handler.name(), Box::new(handler));
    }

    pub fn dispatch(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        if let Some(handler) = self.handlers.get(request.name.as_str()) {
            handler.execute(request, context)
        } else {
            CommandResponse::err(format!("未知命令: {}", request.name))
        }
    }

    pub fn available_commands(&self) -> impl Iterator<Item = &&'static str> {
        self.handlers.keys()
    }
}

impl Default for CommandBus {
    fn default() -> Self {
        Self::new()
    }
}

struct RecenterCommand;

impl CommandHandler for RecenterCommand {
    fn name(&self) -> &'static str {
        "recenter"
    }

    fn execute(
        &self,
        _request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        context.session.recenter();
        if context.session.bounds().is_some() {
            CommandResponse::ok("视图已适配当前图纸范围")
        } else {
            CommandResponse::ok("视图已适配默认范围")
        }
    }
}

/// `resize <width> <height>`
struct ResizeCommand;

impl ResizeCommand {
    fn parse_viewport(args: &[String]) -> Result<Viewport, EngineError> {
        let [width, height] = args else {
            return Err(EngineError::InvalidArgument(format!(
                "resize 需要 2 个参数，实际为 {}",
                args.len()
            )));
        };
        let parse = |raw: &str| {
            raw.trim()
                .parse::<f64>()
                .map_err(|_| EngineError::InvalidArgument(format!("无法解析尺寸 \"{raw}\"")))
        };
        Viewport::new(parse(width.as_str())?, parse(height.as_str())?)
    }
}

impl CommandHandler for ResizeCommand {
    fn name(&self) -> &'static str {
        "resize"
    }

    fn execute(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        match Self::parse_viewport(&request.args) {
            Ok(viewport) => {
                context.session.resize(viewport);
                CommandResponse::ok(format!(
                    "视口已调整为 {}x{}",
                    viewport.width(),
                    viewport.height()
                ))
            }
            Err(err) => CommandResponse::err(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::{DEFAULT_HALF_EXTENT, ViewFrame};

    fn session() -> ViewerSession {
        ViewerSession::new(Viewport::new(400.0, 400.0).unwrap())
    }

    #[test]
    fn recenter_and_resize_commands_work() {
        let mut session = session();
        let bus = CommandBus::new();
        let mut context = CommandContext {
            session: &mut session,
        };

        let response = bus.dispatch(&CommandRequest::new("recenter"), &mut context);
        assert!(response.success);
        let frame = *context.session.frame();
        assert!((frame.top - DEFAULT_HALF_EXTENT * 1.2).abs() < 1e-9);

        let resize = CommandRequest::with_args("resize", ["800", "400"]);
        let response = bus.dispatch(&resize, &mut context);
        assert!(response.success);
        let resized = *context.session.frame();
        assert_eq!(resized.top, frame.top);
        assert!((resized.right - frame.top * 2.0).abs() < 1e-9);
    }

    #[test]
    fn resize_rejects_bad_arguments() {
        let mut session = session();
        let bus = CommandBus::new();
        let mut context = CommandContext {
            session: &mut session,
        };

        for args in [vec!["800"], vec!["800", "abc"], vec!["0", "100"]] {
            let request = CommandRequest::with_args("resize", args);
            let response = bus.dispatch(&request, &mut context);
            assert!(!response.success);
        }
        assert_eq!(*context.session.frame(), ViewFrame::unfitted());
    }

    #[test]
    fn unknown_command_is_reported() {
        let mut session = session();
        let bus = CommandBus::new();
        let mut context = CommandContext {
            session: &mut session,
        };
        let response = bus.dispatch(&CommandRequest::new("explode"), &mut context);
        assert!(!response.success);

        let mut names: Vec<&str> = bus.available_commands().copied().collect();
        names.sort_unstable();
        assert_eq!(names, vec!["recenter", "resize"]);
    }
}
