pub mod geometry {
    use glam::DVec3;
    use serde::{Deserialize, Serialize};

    /// 三维点，内部以 `glam::DVec3` 表示。DXF 中缺省的 Z 坐标按 0 处理。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Point3(pub DVec3);

    impl Point3 {
        #[inline]
        pub fn new(x: f64, y: f64, z: f64) -> Self {
            Self(DVec3::new(x, y, z))
        }

        /// 平面点，Z 取 0。
        #[inline]
        pub fn planar(x: f64, y: f64) -> Self {
            Self(DVec3::new(x, y, 0.0))
        }

        #[inline]
        pub fn origin() -> Self {
            Self(DVec3::ZERO)
        }

        #[inline]
        pub fn from_vec(vec: DVec3) -> Self {
            Self(vec)
        }

        #[inline]
        pub fn x(self) -> f64 {
            self.0.x
        }

        #[inline]
        pub fn y(self) -> f64 {
            self.0.y
        }

        #[inline]
        pub fn z(self) -> f64 {
            self.0.z
        }

        #[inline]
        pub fn as_vec3(self) -> DVec3 {
            self.0
        }
    }

    impl From<DVec3> for Point3 {
        fn from(value: DVec3) -> Self {
            Self(value)
        }
    }

    /// 三维向量，用于表示范围尺寸与平移量。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Vector3(pub DVec3);

    impl Vector3 {
        #[inline]
        pub fn new(x: f64, y: f64, z: f64) -> Self {
            Self(DVec3::new(x, y, z))
        }

        #[inline]
        pub fn from_points(start: Point3, end: Point3) -> Self {
            Self(end.0 - start.0)
        }

        #[inline]
        pub fn x(self) -> f64 {
            self.0.x
        }

        #[inline]
        pub fn y(self) -> f64 {
            self.0.y
        }

        #[inline]
        pub fn z(self) -> f64 {
            self.0.z
        }

        #[inline]
        pub fn as_vec3(self) -> DVec3 {
            self.0
        }
    }

    impl From<DVec3> for Vector3 {
        fn from(value: DVec3) -> Self {
            Self(value)
        }
    }

    /// 轴对齐包围盒。空盒以 `+∞/-∞` 表示，是扩展运算的单位元。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct BoundingVolume {
        min: Point3,
        max: Point3,
    }

    impl BoundingVolume {
        #[inline]
        pub fn new(min: Point3, max: Point3) -> Self {
            Self { min, max }
        }

        #[inline]
        pub fn empty() -> Self {
            Self {
                min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
                max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
            }
        }

        /// 以原点为中心、XY 半边长为 `half_extent` 的平面方形范围。
        pub fn centered_square(half_extent: f64) -> Self {
            Self {
                min: Point3::planar(-half_extent, -half_extent),
                max: Point3::planar(half_extent, half_extent),
            }
        }

        #[inline]
        pub fn is_empty(&self) -> bool {
            self.min.x() > self.max.x()
                || self.min.y() > self.max.y()
                || self.min.z() > self.max.z()
        }

        #[inline]
        pub fn min(&self) -> Point3 {
            self.min
        }

        #[inline]
        pub fn max(&self) -> Point3 {
            self.max
        }

        pub fn include_point(&mut self, point: Point3) {
            if self.is_empty() {
                self.min = point;
                self.max = point;
                return;
            }
            self.min = Point3::from_vec(self.min.as_vec3().min(point.as_vec3()));
            self.max = Point3::from_vec(self.max.as_vec3().max(point.as_vec3()));
        }

        pub fn include_volume(&mut self, other: &BoundingVolume) {
            if other.is_empty() {
                return;
            }
            self.include_point(other.min);
            self.include_point(other.max);
        }

        #[inline]
        pub fn center(&self) -> Point3 {
            debug_assert!(!self.is_empty());
            Point3::from_vec((self.min.as_vec3() + self.max.as_vec3()) * 0.5)
        }

        /// 各轴跨度；空盒返回零向量。
        #[inline]
        pub fn size(&self) -> Vector3 {
            if self.is_empty() {
                return Vector3::new(0.0, 0.0, 0.0);
            }
            Vector3::from_points(self.min, self.max)
        }
    }

    impl Default for BoundingVolume {
        fn default() -> Self {
            Self::empty()
        }
    }
}

pub mod document {
    use serde::{Deserialize, Serialize};

    use crate::geometry::Point3;

    pub const DEFAULT_LAYER: &str = "0";

    /// 图纸头部信息。DXF 中两者均为自由格式字符串，缺失时为 `None`。
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct DocumentHeader {
        /// `$ACADVER`，例如 `AC1015`。
        pub version: Option<String>,
        /// `$TDCREATE`，保持原始文本。
        pub created_at: Option<String>,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub enum Entity {
        Line(Line),
        LwPolyline(Polyline),
        Polyline(Polyline),
        Circle(Circle),
        Arc(Arc),
        /// 无法绘制的实体，只参与统计。
        Other(OtherEntity),
    }

    impl Entity {
        /// DXF 实体类型名。`Other` 返回原始类型名（可能为空）。
        pub fn kind_name(&self) -> &str {
            match self {
                Entity::Line(_) => "LINE",
                Entity::LwPolyline(_) => "LWPOLYLINE",
                Entity::Polyline(_) => "POLYLINE",
                Entity::Circle(_) => "CIRCLE",
                Entity::Arc(_) => "ARC",
                Entity::Other(other) => &other.kind,
            }
        }

        #[inline]
        pub fn layer_name(&self) -> &str {
            match self {
                Entity::Line(line) => &line.layer,
                Entity::LwPolyline(polyline) | Entity::Polyline(polyline) => &polyline.layer,
                Entity::Circle(circle) => &circle.layer,
                Entity::Arc(arc) => &arc.layer,
                Entity::Other(other) => &other.layer,
            }
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Line {
        pub start: Point3,
        pub end: Point3,
        pub layer: String,
    }

    /// LWPOLYLINE 与 POLYLINE 共用的顶点序列。
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Polyline {
        pub vertices: Vec<Point3>,
        pub is_closed: bool,
        pub layer: String,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Circle {
        pub center: Point3,
        pub radius: f64,
        pub layer: String,
    }

    /// 圆弧实体，角度以度为单位保存（与 DXF 组码 50/51 一致）。
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Arc {
        pub center: Point3,
        pub radius: f64,
        pub start_angle: f64,
        pub end_angle: f64,
        pub layer: String,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct OtherEntity {
        pub kind: String,
        pub layer: String,
    }

    /// 解析后的图纸：头部信息加按文件顺序排列的实体列表。
    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    pub struct Document {
        header: DocumentHeader,
        entities: Vec<Entity>,
    }

    impl Document {
        pub fn new() -> Self {
            Self::default()
        }

        #[inline]
        pub fn header(&self) -> &DocumentHeader {
            &self.header
        }

        #[inline]
        pub fn header_mut(&mut self) -> &mut DocumentHeader {
            &mut self.header
        }

        pub fn add_entity(&mut self, entity: Entity) {
            self.entities.push(entity);
        }

        pub fn add_line(&mut self, start: Point3, end: Point3, layer: impl Into<String>) {
            self.add_entity(Entity::Line(Line {
                start,
                end,
                layer: layer.into(),
            }));
        }

        pub fn add_circle(&mut self, center: Point3, radius: f64, layer: impl Into<String>) {
            self.add_entity(Entity::Circle(Circle {
                center,
                radius,
                layer: layer.into(),
            }));
        }

        /// 添加圆弧，角度单位为度。
        pub fn add_arc(
            &mut self,
            center: Point3,
            radius: f64,
            start_angle: f64,
            end_angle: f64,
            layer: impl Into<String>,
        ) {
            self.add_entity(Entity::Arc(Arc {
                center,
                radius,
                start_angle,
                end_angle,
                layer: layer.into(),
            }));
        }

        pub fn add_lwpolyline<I>(&mut self, vertices: I, is_closed: bool, layer: impl Into<String>)
        where
            I: IntoIterator<Item = Point3>,
        {
            self.add_entity(Entity::LwPolyline(Polyline {
                vertices: vertices.into_iter().collect(),
                is_closed,
                layer: layer.into(),
            }));
        }

        pub fn add_polyline<I>(&mut self, vertices: I, is_closed: bool, layer: impl Into<String>)
        where
            I: IntoIterator<Item = Point3>,
        {
            self.add_entity(Entity::Polyline(Polyline {
                vertices: vertices.into_iter().collect(),
                is_closed,
                layer: layer.into(),
            }));
        }

        pub fn add_other(&mut self, kind: impl Into<String>, layer: impl Into<String>) {
            self.add_entity(Entity::Other(OtherEntity {
                kind: kind.into(),
                layer: layer.into(),
            }));
        }

        pub fn entities(&self) -> impl Iterator<Item = &Entity> {
            self.entities.iter()
        }

        #[inline]
        pub fn entity_count(&self) -> usize {
            self.entities.len()
        }
    }
}

pub mod shape {
    use serde::{Deserialize, Serialize};

    use crate::geometry::Point3;

    /// 渲染样式，由源实体类型决定，仅用于视觉区分。
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub enum ShapeStyle {
        Line,
        LwPolyline,
        Polyline,
        Circle,
        Arc,
    }

    impl ShapeStyle {
        /// 24 位 RGB 颜色。
        pub fn color(self) -> u32 {
            match self {
                ShapeStyle::Line => 0x4F_C3_F7,
                ShapeStyle::LwPolyline => 0x81_C7_84,
                ShapeStyle::Polyline => 0xFF_B7_4D,
                ShapeStyle::Circle => 0xBA_68_C8,
                ShapeStyle::Arc => 0xE5_73_73,
            }
        }

        pub fn label(self) -> &'static str {
            match self {
                ShapeStyle::Line => "LINE",
                ShapeStyle::LwPolyline => "LWPOLYLINE",
                ShapeStyle::Polyline => "POLYLINE",
                ShapeStyle::Circle => "CIRCLE",
                ShapeStyle::Arc => "ARC",
            }
        }
    }

    /// 折线形式的可渲染图形：按顺序连接的点列。
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Shape {
        pub points: Vec<Point3>,
        pub style: ShapeStyle,
    }

    impl Shape {
        #[inline]
        pub fn new(points: Vec<Point3>, style: ShapeStyle) -> Self {
            Self { points, style }
        }

        #[inline]
        pub fn is_degenerate(&self) -> bool {
            self.points.is_empty()
        }

        /// 首尾点相同即视为闭合。
        pub fn is_closed(&self) -> bool {
            match (self.points.first(), self.points.last()) {
                (Some(first), Some(last)) => self.points.len() > 1 && first == last,
                _ => false,
            }
        }

        /// 折线包含的线段数量。
        #[inline]
        pub fn segment_count(&self) -> usize {
            self.points.len().saturating_sub(1)
        }
    }
}
