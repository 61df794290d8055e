use std::fmt;

use dxfview_core::geometry::BoundingVolume;
use dxfview_engine::session::ViewerSession;
use dxfview_engine::summary::{DocumentMeta, EntitySummary};

pub const UNKNOWN_VERSION: &str = "Unknown";
pub const NOT_AVAILABLE: &str = "Not available";
pub const NO_DRAWABLE_ENTITIES: &str = "No drawable entities";

/// 千位分组，例如 `1234567` -> `1,234,567`。
pub fn group_thousands(value: usize) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

pub fn extents_label(bounds: Option<&BoundingVolume>) -> String {
    match bounds {
        Some(volume) => {
            let size = volume.size();
            format!("{:.2} x {:.2} (model units)", size.x(), size.y())
        }
        None => NOT_AVAILABLE.to_string(),
    }
}

/// 图纸信息面板。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataPanel {
    pub name: String,
    pub version: String,
    pub created_at: Option<String>,
    pub total_entities: String,
    pub extents: String,
}

impl MetadataPanel {
    pub fn new(meta: &DocumentMeta, bounds: Option<&BoundingVolume>) -> Self {
        Self {
            name: meta.name.clone(),
            version: meta
                .version
                .clone()
                .unwrap_or_else(|| UNKNOWN_VERSION.to_string()),
            created_at: meta.created_at.clone(),
            total_entities: group_thousands(meta.total_entities),
            extents: extents_label(bounds),
        }
    }

    /// 会话尚未成功加载过文档时返回 `None`。
    pub fn from_session(session: &ViewerSession) -> Option<Self> {
        session
            .meta()
            .map(|meta| Self::new(meta, session.bounds()))
    }
}

impl fmt::Display for MetadataPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Name: {}", self.name)?;
        writeln!(f, "Version: {}", self.version)?;
        if let Some(created_at) = &self.created_at {
            writeln!(f, "Created: {created_at}")?;
        }
        writeln!(f, "Entities: {}", self.total_entities)?;
        write!(f, "Extents: {}", self.extents)
    }
}

/// 实体分类统计面板，每行一个类型。
pub fn breakdown_lines(summaries: &[EntitySummary]) -> Vec<String> {
    if summaries.is_empty() {
        return vec![NO_DRAWABLE_ENTITIES.to_string()];
    }
    summaries
        .iter()
        .map(|summary| format!("{}: {}", summary.kind, group_thousands(summary.count)))
        .collect()
}

/// 将状态栏、信息面板与统计面板拼成一段文本。
pub fn render_panels(session: &ViewerSession) -> String {
    let mut output = format!("Status: {}\n", session.status());
    match MetadataPanel::from_session(session) {
        Some(panel) => {
            output.push_str("[Drawing]\n");
            output.push_str(&panel.to_string());
            output.push('\n');
        }
        None => return output,
    }

    output.push_str("[Entities]\n");
    let summaries = session
        .meta()
        .map(|meta| meta.summaries.as_slice())
        .unwrap_or_default();
    for line in breakdown_lines(summaries) {
        output.push_str("  ");
        output.push_str(&line);
        output.push('\n');
    }
    output
}

#[cfg(test)]
mod tests {
    use dxfview_core::document::Document;
    use dxfview_core::geometry::Point3;
    use dxfview_engine::view::Viewport;

    use super::*;

    #[test]
    fn thousands_are_grouped() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1_000), "1,000");
        assert_eq!(group_thousands(1_234), "1,234");
        assert_eq!(group_thousands(12_345_678), "12,345,678");
    }

    #[test]
    fn extents_use_two_decimals() {
        let volume = BoundingVolume::new(Point3::origin(), Point3::new(10.0, 2.5, 0.0));
        assert_eq!(extents_label(Some(&volume)), "10.00 x 2.50 (model units)");
        assert_eq!(extents_label(None), "Not available");
    }

    #[test]
    fn metadata_panel_falls_back_to_unknown_version() {
        let mut document = Document::new();
        document.add_line(Point3::origin(), Point3::planar(3.0, 4.0), "0");
        let meta = DocumentMeta::from_document("part.dxf", &document);
        let panel = MetadataPanel::new(&meta, None);

        assert_eq!(panel.version, "Unknown");
        assert_eq!(panel.extents, "Not available");
        let text = panel.to_string();
        assert!(text.contains("Name: part.dxf"));
        assert!(!text.contains("Created:"));
    }

    #[test]
    fn metadata_panel_shows_created_at_when_present() {
        let mut document = Document::new();
        document.header_mut().version = Some("AC1015".to_string());
        document.header_mut().created_at = Some("2459000.5".to_string());
        let meta = DocumentMeta::from_document("dated.dxf", &document);

        let text = MetadataPanel::new(&meta, None).to_string();
        assert!(text.contains("Version: AC1015"));
        assert!(text.contains("Created: 2459000.5"));
    }

    #[test]
    fn empty_breakdown_shows_notice() {
        assert_eq!(breakdown_lines(&[]), vec!["No drawable entities".to_string()]);
        let lines = breakdown_lines(&[EntitySummary {
            kind: "LINE".to_string(),
            count: 1_500,
        }]);
        assert_eq!(lines, vec!["LINE: 1,500".to_string()]);
    }

    #[test]
    fn idle_session_renders_only_status() {
        let session = ViewerSession::new(Viewport::new(10.0, 10.0).unwrap());
        assert_eq!(
            render_panels(&session),
            "Status: Drop a DXF file or choose one to start.\n"
        );
    }
}
