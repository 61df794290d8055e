use std::path::PathBuf;

use dxfview_config::AppConfig;
use dxfview_engine::command::{CommandBus, CommandContext, CommandRequest};
use dxfview_engine::render::{FrameHandle, FrameScheduler, RenderLoop, Renderer};
use dxfview_engine::scene::SceneManager;
use dxfview_engine::session::{LoadStatus, ViewerSession};
use dxfview_engine::view::{Camera, Viewport};
use dxfview_io::DxfFacade;
use tracing::{debug, info, warn};

use crate::errors::FrontendError;
use crate::loader;
use crate::panels;

/// 命令行模式的运行参数。
#[derive(Debug, Clone, Default)]
pub struct CliOptions {
    pub files: Vec<PathBuf>,
    pub resize: Option<(f64, f64)>,
    pub recenter: bool,
}

/// 解析 `<width>x<height>` 形式的视口尺寸。
pub fn parse_size(raw: &str) -> Option<(f64, f64)> {
    let (width, height) = raw.split_once(['x', 'X'])?;
    let width = width.trim().parse::<f64>().ok()?;
    let height = height.trim().parse::<f64>().ok()?;
    Some((width, height))
}

/// 进程内的帧调度器：按调用顺序发放递增句柄。
#[derive(Debug, Default)]
pub struct StepScheduler {
    issued: u64,
    cancelled: Vec<FrameHandle>,
}

impl StepScheduler {
    pub fn cancelled(&self) -> &[FrameHandle] {
        &self.cancelled
    }
}

impl FrameScheduler for StepScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        self.issued += 1;
        FrameHandle(self.issued)
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.cancelled.push(handle);
    }
}

/// 不输出像素的渲染器，只统计最近一帧绘制的线段数。
#[derive(Debug, Default)]
pub struct SummaryRenderer {
    frames: u64,
    last_segments: usize,
}

impl SummaryRenderer {
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn last_segments(&self) -> usize {
        self.last_segments
    }
}

impl Renderer for SummaryRenderer {
    fn render(&mut self, scene: &SceneManager, camera: &Camera) {
        self.frames += 1;
        self.last_segments = scene.shapes().iter().map(|shape| shape.segment_count()).sum();
        let frame = camera.frame();
        debug!(
            frame = self.frames,
            segments = self.last_segments,
            width = frame.width(),
            height = frame.height(),
            "绘制一帧"
        );
    }
}

/// 单个文件的处理结果。
#[derive(Debug, Clone)]
pub struct FileReport {
    pub name: String,
    pub status: LoadStatus,
    pub shapes: usize,
    pub segments: usize,
    pub panels: String,
}

/// 依次加载每个文件，按需调整视口、重新居中，驱动若干帧并打印面板。
pub fn run(options: &CliOptions, config: &AppConfig) -> Result<Vec<FileReport>, FrontendError> {
    let viewport = Viewport::new(config.viewer.viewport_width, config.viewer.viewport_height)?;
    let mut session = ViewerSession::new(viewport);
    let command_bus = CommandBus::new();
    let facade = DxfFacade::new();
    let mut render_loop = RenderLoop::new(StepScheduler::default());
    let mut renderer = SummaryRenderer::default();

    if options.files.is_empty() {
        println!("{}", panels::render_panels(&session));
        return Ok(Vec::new());
    }

    render_loop.start();
    let mut reports = Vec::with_capacity(options.files.len());
    for path in &options.files {
        let status = loader::load_file(&mut session, &facade, path);
        if status == LoadStatus::ParseFailed {
            warn!(path = %path.display(), "文件未能载入");
        }

        if let Some((width, height)) = options.resize {
            let request =
                CommandRequest::with_args("resize", [width.to_string(), height.to_string()]);
            dispatch(&command_bus, &request, &mut session)?;
        }
        if options.recenter {
            dispatch(&command_bus, &CommandRequest::new("recenter"), &mut session)?;
        }

        for _ in 0..config.frontend.render_frames {
            let Some(handle) = render_loop.pending() else {
                break;
            };
            render_loop.tick(handle, &session, &mut renderer);
        }

        let report = FileReport {
            name: loader::display_name(path),
            status,
            shapes: session.scene().shapes().len(),
            segments: renderer.last_segments(),
            panels: panels::render_panels(&session),
        };
        println!("{}", report.panels);
        reports.push(report);
    }
    render_loop.stop();

    info!(
        files = reports.len(),
        frames = render_loop.frames_rendered(),
        "CLI 运行结束"
    );
    Ok(reports)
}

fn dispatch(
    bus: &CommandBus,
    request: &CommandRequest,
    session: &mut ViewerSession,
) -> Result<(), FrontendError> {
    let mut context = CommandContext { session };
    let response = bus.dispatch(request, &mut context);
    let message = response.message.unwrap_or_default();
    if response.success {
        debug!(command = %request.name, %message, "命令执行成功");
        Ok(())
    } else {
        Err(FrontendError::Command {
            command: request.name.clone(),
            message,
        })
    }
}
