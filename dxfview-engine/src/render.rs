use tracing::{debug, trace};

use crate::scene::SceneManager;
use crate::session::ViewerSession;
use crate::view::Camera;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// 宿主提供的逐帧调度原语（例如显示刷新回调）。
pub trait FrameScheduler {
    /// 预约下一帧，返回用于注销的句柄。
    fn request_frame(&mut self) -> FrameHandle;
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// 只读地绘制当前场景。
pub trait Renderer {
    fn render(&mut self, scene: &SceneManager, camera: &Camera);
}

/// 协作式渲染循环：每次帧回调绘制一帧并预约下一帧，停止时注销待执行的帧。
#[derive(Debug)]
pub struct RenderLoop<S> {
    scheduler: S,
    pending: Option<FrameHandle>,
    frames_rendered: u64,
}

impl<S: FrameScheduler> RenderLoop<S> {
    pub fn new(scheduler: S) -> Self {
        Self {
            scheduler,
            pending: None,
            frames_rendered: 0,
        }
    }

    pub fn start(&mut self) {
        if self.pending.is_none() {
            self.pending = Some(self.scheduler.request_frame());
        }
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.pending.is_some()
    }

    #[inline]
    pub fn pending(&self) -> Option<FrameHandle> {
        self.pending
    }

    #[inline]
    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    #[inline]
    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// 帧回调入口。句柄与待执行帧不符（已停止或过期）时不绘制，返回 `false`。
    pub fn tick<R: Renderer>(
        &mut self,
        handle: FrameHandle,
        session: &ViewerSession,
        renderer: &mut R,
    ) -> bool {
        if self.pending != Some(handle) {
            trace!(frame = handle.0, "忽略过期的帧回调");
            return false;
        }
        renderer.render(session.scene(), session.camera());
        self.frames_rendered += 1;
        self.pending = Some(self.scheduler.request_frame());
        true
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel_frame(handle);
            debug!(
                frame = handle.0,
                rendered = self.frames_rendered,
                "渲染循环已停止"
            );
        }
    }
}
