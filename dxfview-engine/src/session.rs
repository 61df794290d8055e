use std::fmt;

use dxfview_core::document::Document;
use dxfview_core::geometry::BoundingVolume;
use tracing::{error, info, warn};

use crate::bounds;
use crate::build::build_shapes;
use crate::scene::SceneManager;
use crate::summary::DocumentMeta;
use crate::view::{self, Camera, DEFAULT_HALF_EXTENT, ViewFrame, Viewport};

/// 面向用户的加载状态。`Display` 输出即界面上展示的文字。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Idle,
    Loading { name: String },
    Loaded,
    NoDrawableEntities,
    ParseFailed,
}

impl fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadStatus::Idle => f.write_str("Drop a DXF file or choose one to start."),
            LoadStatus::Loading { name } => write!(f, "Loading {name}..."),
            LoadStatus::Loaded => f.write_str("DXF loaded successfully"),
            LoadStatus::NoDrawableEntities => {
                f.write_str("No drawable entities found in this DXF.")
            }
            LoadStatus::ParseFailed => {
                f.write_str("Unable to parse DXF. Ensure the file is valid.")
            }
        }
    }
}

/// 一次加载的凭据。完成顺序决定最终状态，凭据只用于识别交叠的加载。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    id: u64,
    name: String,
}

impl LoadTicket {
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// 查看器会话：独占场景、相机与当前文档的派生状态，
/// 加载、缩放视口、重新居中都通过 `&mut self` 进行。
#[derive(Debug)]
pub struct ViewerSession {
    scene: SceneManager,
    camera: Camera,
    viewport: Viewport,
    bounds: Option<BoundingVolume>,
    meta: Option<DocumentMeta>,
    status: LoadStatus,
    issued_tickets: u64,
}

impl ViewerSession {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            scene: SceneManager::new(),
            camera: Camera::default(),
            viewport,
            bounds: None,
            meta: None,
            status: LoadStatus::Idle,
            issued_tickets: 0,
        }
    }

    #[inline]
    pub fn scene(&self) -> &SceneManager {
        &self.scene
    }

    #[inline]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    #[inline]
    pub fn frame(&self) -> &ViewFrame {
        self.camera.frame()
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[inline]
    pub fn bounds(&self) -> Option<&BoundingVolume> {
        self.bounds.as_ref()
    }

    #[inline]
    pub fn meta(&self) -> Option<&DocumentMeta> {
        self.meta.as_ref()
    }

    #[inline]
    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    /// 开始一次加载，只更新状态文字。
    pub fn begin_load(&mut self, name: impl Into<String>) -> LoadTicket {
        self.issued_tickets += 1;
        let ticket = LoadTicket {
            id: self.issued_tickets,
            name: name.into(),
        };
        self.status = LoadStatus::Loading {
            name: ticket.name.clone(),
        };
        info!(ticket = ticket.id, name = %ticket.name, "开始加载文档");
        ticket
    }

    /// 应用加载结果。解析失败只改变状态文字，其余状态保持不变。
    /// 交叠的加载按完成顺序生效，较早的凭据晚完成时只记录警告。
    pub fn finish_load<E>(
        &mut self,
        ticket: LoadTicket,
        outcome: Result<Document, E>,
    ) -> &LoadStatus
    where
        E: fmt::Display,
    {
        if ticket.id < self.issued_tickets {
            warn!(
                ticket = ticket.id,
                latest = self.issued_tickets,
                name = %ticket.name,
                "较早发起的加载在新加载之后完成，结果仍会覆盖当前状态"
            );
        }

        match outcome {
            Ok(document) => self.apply_document(ticket.name, &document),
            Err(err) => {
                error!(name = %ticket.name, error = %err, "DXF 解析失败");
                self.status = LoadStatus::ParseFailed;
            }
        }
        &self.status
    }

    fn apply_document(&mut self, name: String, document: &Document) {
        let shapes = build_shapes(document);
        let bounds = bounds::accumulate(&shapes);
        let meta = DocumentMeta::from_document(name, document);
        let shape_count = self.scene.load(shapes);

        info!(
            name = %meta.name,
            entities = meta.total_entities,
            shapes = shape_count,
            "文档已载入场景"
        );

        self.meta = Some(meta);
        self.bounds = bounds;
        match bounds {
            Some(volume) => {
                self.camera.apply(view::fit(&volume, self.viewport.aspect()));
                self.status = LoadStatus::Loaded;
            }
            None => {
                self.status = LoadStatus::NoDrawableEntities;
            }
        }
    }

    /// 视口变化：只按新比例调整左右边界。
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        let frame = view::resize(self.camera.frame(), viewport.aspect());
        self.camera.apply(frame);
    }

    /// 重新适配当前包围盒；没有包围盒时适配以原点为中心的默认范围。
    pub fn recenter(&mut self) {
        let volume = self
            .bounds
            .unwrap_or_else(|| BoundingVolume::centered_square(DEFAULT_HALF_EXTENT));
        self.camera.apply(view::fit(&volume, self.viewport.aspect()));
    }
}

#[cfg(test)]
mod tests {
    use dxfview_core::geometry::Point3;

    use super::*;

    fn session() -> ViewerSession {
        ViewerSession::new(Viewport::new(800.0, 600.0).unwrap())
    }

    fn line_document() -> Document {
        let mut document = Document::new();
        document.add_line(Point3::origin(), Point3::new(10.0, 0.0, 0.0), "0");
        document
    }

    #[test]
    fn status_strings_match_ui_text() {
        assert_eq!(
            LoadStatus::Idle.to_string(),
            "Drop a DXF file or choose one to start."
        );
        assert_eq!(
            LoadStatus::Loading {
                name: "a.dxf".to_string()
            }
            .to_string(),
            "Loading a.dxf..."
        );
        assert_eq!(LoadStatus::Loaded.to_string(), "DXF loaded successfully");
        assert_eq!(
            LoadStatus::NoDrawableEntities.to_string(),
            "No drawable entities found in this DXF."
        );
        assert_eq!(
            LoadStatus::ParseFailed.to_string(),
            "Unable to parse DXF. Ensure the file is valid."
        );
    }

    #[test]
    fn successful_load_fits_camera() {
        let mut session = session();
        assert_eq!(session.status(), &LoadStatus::Idle);

        let ticket = session.begin_load("line.dxf");
        assert_eq!(session.status().to_string(), "Loading line.dxf...");

        let status = session.finish_load::<String>(ticket, Ok(line_document()));
        assert_eq!(status, &LoadStatus::Loaded);
        assert_eq!(session.scene().shapes().len(), 1);

        let bounds = session.bounds().expect("bounds after load");
        assert_eq!(bounds.size().x(), 10.0);
        assert_eq!(session.frame().center, Point3::new(5.0, 0.0, 0.0));
        assert_eq!(session.frame().height(), 100.0);
    }

    #[test]
    fn parse_failure_keeps_previous_state() {
        let mut session = session();
        let ticket = session.begin_load("line.dxf");
        session.finish_load::<String>(ticket, Ok(line_document()));
        let meta_before = session.meta().cloned();
        let frame_before = *session.frame();

        let ticket = session.begin_load("broken.dxf");
        let status = session.finish_load(ticket, Err("bad group code"));
        assert_eq!(status, &LoadStatus::ParseFailed);
        assert_eq!(session.meta().cloned(), meta_before);
        assert_eq!(*session.frame(), frame_before);
        assert_eq!(session.scene().shapes().len(), 1);
    }

    #[test]
    fn empty_result_clears_scene_without_refit() {
        let mut session = session();
        let ticket = session.begin_load("line.dxf");
        session.finish_load::<String>(ticket, Ok(line_document()));
        let frame_before = *session.frame();

        let mut only_text = Document::new();
        only_text.add_other("TEXT", "0");
        let ticket = session.begin_load("text.dxf");
        let status = session.finish_load::<String>(ticket, Ok(only_text));
        assert_eq!(status, &LoadStatus::NoDrawableEntities);

        let group = session.scene().transient().expect("empty group installed");
        assert!(group.is_empty());
        assert!(session.bounds().is_none());
        assert_eq!(session.meta().unwrap().total_entities, 1);
        assert_eq!(*session.frame(), frame_before);
    }

    #[test]
    fn last_completion_wins_for_overlapping_loads() {
        let mut session = session();
        let first = session.begin_load("first.dxf");
        let second = session.begin_load("second.dxf");
        assert!(second.id() > first.id());

        session.finish_load::<String>(second, Ok(line_document()));
        session.finish_load::<String>(first, Ok(Document::new()));

        assert_eq!(session.meta().unwrap().name, "first.dxf");
        assert_eq!(session.status(), &LoadStatus::NoDrawableEntities);
    }

    #[test]
    fn resize_keeps_vertical_extent() {
        let mut session = session();
        let ticket = session.begin_load("line.dxf");
        session.finish_load::<String>(ticket, Ok(line_document()));
        let before = *session.frame();

        session.resize(Viewport::new(1000.0, 250.0).unwrap());
        let after = *session.frame();
        assert_eq!(after.top, before.top);
        assert_eq!(after.bottom, before.bottom);
        assert_eq!(after.center, before.center);
        assert_eq!(after.right, before.top * 4.0);
    }

    #[test]
    fn recenter_without_bounds_uses_default_square() {
        let mut session = ViewerSession::new(Viewport::new(500.0, 500.0).unwrap());
        session.recenter();
        let frame = session.frame();
        // 200 * 1.2 = 240
        assert!((frame.height() - 240.0).abs() < 1e-9);
        assert_eq!(frame.center, Point3::origin());
    }

    #[test]
    fn recenter_refits_current_bounds() {
        let mut session = session();
        let ticket = session.begin_load("line.dxf");
        session.finish_load::<String>(ticket, Ok(line_document()));
        let fitted = *session.frame();

        session.resize(Viewport::new(300.0, 900.0).unwrap());
        session.resize(Viewport::new(800.0, 600.0).unwrap());
        session.recenter();
        assert_eq!(*session.frame(), fitted);
    }
}
