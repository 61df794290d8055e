use dxfview_core::geometry::{BoundingVolume, Point3};
use serde::Serialize;

use crate::errors::EngineError;

/// 内容四周保留 20% 边距。
pub const FIT_MARGIN: f64 = 1.2;
/// 视高下限，保证单点或零尺寸图纸也有合理视野。
pub const MIN_VIEW_HEIGHT: f64 = 100.0;
/// 相机沿视线方向距注视点的距离。
pub const CAMERA_DEPTH: f64 = 1000.0;
/// 尚未适配过内容时 `resize` 使用的视高。
pub const FALLBACK_VIEW_SIZE: f64 = 200.0;
/// 无包围盒时重新居中所用默认范围的半边长。
pub const DEFAULT_HALF_EXTENT: f64 = 100.0;

/// 正交投影范围与相机位置。
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewFrame {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
    pub center: Point3,
    pub depth: f64,
}

impl ViewFrame {
    /// 启动时尚未适配任何内容的投影，四边均为 0。
    pub fn unfitted() -> Self {
        Self {
            left: 0.0,
            right: 0.0,
            top: 0.0,
            bottom: 0.0,
            center: Point3::origin(),
            depth: CAMERA_DEPTH,
        }
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.top - self.bottom
    }

    /// 相机位于注视点正上方 `depth` 处。
    pub fn eye(&self) -> Point3 {
        Point3::new(self.center.x(), self.center.y(), self.center.z() + self.depth)
    }
}

impl Default for ViewFrame {
    fn default() -> Self {
        Self::unfitted()
    }
}

/// 视口像素尺寸。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    width: f64,
    height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Result<Self, EngineError> {
        let valid = |value: f64| value.is_finite() && value > 0.0;
        if !valid(width) || !valid(height) {
            return Err(EngineError::InvalidViewport { width, height });
        }
        Ok(Self { width, height })
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.height
    }

    #[inline]
    pub fn aspect(&self) -> f64 {
        self.width / self.height
    }
}

/// 使包围盒完整落入视口的正交投影。相同输入得到逐位相同的结果。
pub fn fit(volume: &BoundingVolume, aspect: f64) -> ViewFrame {
    let size = volume.size();
    let center = volume.center();
    let view_height = (size.y() * FIT_MARGIN)
        .max((size.x() * FIT_MARGIN) / aspect)
        .max(MIN_VIEW_HEIGHT);
    let half_height = view_height / 2.0;
    ViewFrame {
        left: -half_height * aspect,
        right: half_height * aspect,
        top: half_height,
        bottom: -half_height,
        center,
        depth: CAMERA_DEPTH,
    }
}

/// 视口比例变化时只重算左右边界，不重新适配内容。
pub fn resize(frame: &ViewFrame, aspect: f64) -> ViewFrame {
    let view_size = match frame.height() {
        size if size == 0.0 => FALLBACK_VIEW_SIZE,
        size => size,
    };
    let half_height = view_size / 2.0;
    ViewFrame {
        left: -half_height * aspect,
        right: half_height * aspect,
        ..*frame
    }
}

/// 正交相机，当前投影即为其全部状态。
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Camera {
    frame: ViewFrame,
}

impl Camera {
    #[inline]
    pub fn frame(&self) -> &ViewFrame {
        &self.frame
    }

    #[inline]
    pub fn apply(&mut self, frame: ViewFrame) {
        self.frame = frame;
    }

    #[inline]
    pub fn position(&self) -> Point3 {
        self.frame.eye()
    }

    #[inline]
    pub fn target(&self) -> Point3 {
        self.frame.center
    }
}
