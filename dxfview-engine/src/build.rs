use std::f64::consts::TAU;

use dxfview_core::document::{Arc, Circle, Document, Entity, Line, Polyline};
use dxfview_core::geometry::Point3;
use dxfview_core::shape::{Shape, ShapeStyle};

/// 圆按固定 64 段多边形近似。
pub const CIRCLE_SEGMENT_COUNT: usize = 64;
/// 圆弧固定 32 段，与弧长无关，输出 33 个点。
pub const ARC_SEGMENT_COUNT: usize = 32;

/// 将单个实体转换为折线图形；不可绘制的实体返回 `None`。
pub fn build_shape(entity: &Entity) -> Option<Shape> {
    match entity {
        Entity::Line(line) => Some(line_shape(line)),
        Entity::LwPolyline(polyline) => Some(polyline_shape(polyline, ShapeStyle::LwPolyline)),
        Entity::Polyline(polyline) => Some(polyline_shape(polyline, ShapeStyle::Polyline)),
        Entity::Circle(circle) => Some(circle_shape(circle)),
        Entity::Arc(arc) => Some(arc_shape(arc)),
        Entity::Other(_) => None,
    }
}

/// 按实体顺序构建文档中所有可绘制图形。
pub fn build_shapes(document: &Document) -> Vec<Shape> {
    document.entities().filter_map(build_shape).collect()
}

fn line_shape(line: &Line) -> Shape {
    Shape::new(vec![line.start, line.end], ShapeStyle::Line)
}

fn polyline_shape(polyline: &Polyline, style: ShapeStyle) -> Shape {
    let mut points = polyline.vertices.clone();
    if polyline.is_closed {
        if let Some(first) = points.first().copied() {
            points.push(first);
        }
    }
    Shape::new(points, style)
}

/// 只保留外轮廓：64 个顶点加首点闭合。
fn circle_shape(circle: &Circle) -> Shape {
    let mut points = Vec::with_capacity(CIRCLE_SEGMENT_COUNT + 1);
    for i in 0..CIRCLE_SEGMENT_COUNT {
        let angle = TAU * (i as f64) / (CIRCLE_SEGMENT_COUNT as f64);
        points.push(point_on_circle(circle.center, circle.radius, angle));
    }
    points.push(points[0]);
    Shape::new(points, ShapeStyle::Circle)
}

/// DXF 圆弧总是自起始角逆时针画到终止角，包含两端点。起止角相同时为整圆。
fn arc_shape(arc: &Arc) -> Shape {
    let (start, end) =
        counter_clockwise_range(arc.start_angle.to_radians(), arc.end_angle.to_radians());
    let span = end - start;
    let mut points = Vec::with_capacity(ARC_SEGMENT_COUNT + 1);
    for i in 0..=ARC_SEGMENT_COUNT {
        let angle = if i == ARC_SEGMENT_COUNT {
            end
        } else {
            start + span * (i as f64 / ARC_SEGMENT_COUNT as f64)
        };
        points.push(point_on_circle(arc.center, arc.radius, angle));
    }
    Shape::new(points, ShapeStyle::Arc)
}

/// 归一到 `[0, TAU)` 后保证 `end > start`。
fn counter_clockwise_range(start: f64, end: f64) -> (f64, f64) {
    let start = normalize_angle(start);
    let mut end = normalize_angle(end);
    if (end - start).abs() < 1e-9 {
        end = start + TAU;
    } else if end < start {
        end += TAU;
    }
    (start, end)
}

fn normalize_angle(angle: f64) -> f64 {
    let result = angle % TAU;
    if result < 0.0 { result + TAU } else { result }
}

fn point_on_circle(center: Point3, radius: f64, angle: f64) -> Point3 {
    let (sin, cos) = angle.sin_cos();
    Point3::new(
        center.x() + radius * cos,
        center.y() + radius * sin,
        center.z(),
    )
}

#[cfg(test)]
mod tests {
    use dxfview_core::document::{Document, Entity, OtherEntity};
    use dxfview_core::geometry::Vector3;

    use super::*;

    fn first_entity(document: &Document) -> &Entity {
        document.entities().next().expect("document should hold an entity")
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn line_produces_two_point_open_shape() {
        let mut document = Document::new();
        document.add_line(Point3::origin(), Point3::new(10.0, 0.0, 0.0), "0");

        let shape = build_shape(first_entity(&document)).expect("line is drawable");
        assert_eq!(shape.points, vec![Point3::origin(), Point3::new(10.0, 0.0, 0.0)]);
        assert_eq!(shape.style, ShapeStyle::Line);
        assert!(!shape.is_closed());
    }

    #[test]
    fn closed_polyline_repeats_first_vertex() {
        let mut document = Document::new();
        let vertices = [
            Point3::planar(0.0, 0.0),
            Point3::planar(4.0, 0.0),
            Point3::planar(4.0, 3.0),
        ];
        document.add_lwpolyline(vertices, true, "0");
        document.add_polyline(vertices, false, "0");

        let shapes = build_shapes(&document);
        assert_eq!(shapes.len(), 2);

        let closed = &shapes[0];
        assert_eq!(closed.style, ShapeStyle::LwPolyline);
        assert_eq!(closed.points.len(), 4);
        assert_eq!(closed.points.first(), closed.points.last());

        let open = &shapes[1];
        assert_eq!(open.style, ShapeStyle::Polyline);
        assert_eq!(open.points.len(), 3);
        assert_ne!(open.points.first(), open.points.last());
    }

    #[test]
    fn polyline_without_vertices_is_degenerate_but_present() {
        let mut document = Document::new();
        document.add_lwpolyline(Vec::new(), true, "0");

        let shape = build_shape(first_entity(&document)).expect("polyline yields a shape");
        assert!(shape.is_degenerate());
    }

    #[test]
    fn circle_is_closed_outline_with_64_segments() {
        let mut document = Document::new();
        document.add_circle(Point3::new(1.0, 2.0, 3.0), 5.0, "0");

        let shape = build_shape(first_entity(&document)).unwrap();
        assert_eq!(shape.style, ShapeStyle::Circle);
        assert_eq!(shape.points.len(), CIRCLE_SEGMENT_COUNT + 1);
        assert_eq!(shape.segment_count(), CIRCLE_SEGMENT_COUNT);
        assert!(shape.is_closed());
        for point in &shape.points {
            let dx = point.x() - 1.0;
            let dy = point.y() - 2.0;
            assert!(approx((dx * dx + dy * dy).sqrt(), 5.0));
            assert_eq!(point.z(), 3.0);
        }
    }

    #[test]
    fn arc_always_has_33_points_spanning_the_angles() {
        let cases = [(0.0, 90.0), (10.0, 10.5), (0.0, 350.0), (-45.0, 45.0)];
        for (start, end) in cases {
            let mut document = Document::new();
            document.add_arc(Point3::origin(), 2.0, start, end, "0");

            let shape = build_shape(first_entity(&document)).unwrap();
            assert_eq!(shape.points.len(), ARC_SEGMENT_COUNT + 1);
            assert_eq!(shape.points.len(), 33);

            let first = shape.points[0];
            let last = shape.points[ARC_SEGMENT_COUNT];
            let start_rad = f64::to_radians(start);
            let end_rad = f64::to_radians(end);
            assert!(approx(first.x(), 2.0 * start_rad.cos()));
            assert!(approx(first.y(), 2.0 * start_rad.sin()));
            assert!(approx(last.x(), 2.0 * end_rad.cos()));
            assert!(approx(last.y(), 2.0 * end_rad.sin()));
        }
    }

    fn angle_of(point: Point3) -> f64 {
        let angle = point.y().atan2(point.x());
        if angle < 0.0 { angle + TAU } else { angle }
    }

    #[test]
    fn arc_crossing_zero_runs_counter_clockwise() {
        let mut document = Document::new();
        document.add_arc(Point3::origin(), 1.0, 300.0, 30.0, "0");

        let shape = build_shape(first_entity(&document)).unwrap();
        assert_eq!(shape.points.len(), 33);
        let mid = shape.points[ARC_SEGMENT_COUNT / 2];
        assert!(approx(angle_of(mid), f64::to_radians(345.0)));
        assert!(mid.x() > 0.9);

        // 90° 的弧只覆盖右侧
        assert!(shape.points.iter().all(|point| point.x() > 0.49));
        let last = shape.points[ARC_SEGMENT_COUNT];
        assert!(approx(last.x(), f64::to_radians(30.0).cos()));
        assert!(approx(last.y(), f64::to_radians(30.0).sin()));
    }

    #[test]
    fn reversed_angles_take_the_counter_clockwise_side() {
        let mut document = Document::new();
        document.add_arc(Point3::origin(), 2.0, 270.0, 90.0, "0");

        let shape = build_shape(first_entity(&document)).unwrap();
        let mid = shape.points[ARC_SEGMENT_COUNT / 2];
        assert!(approx(mid.x(), 2.0));
        assert!(approx(mid.y(), 0.0));
        assert!(shape.points.iter().all(|point| point.x() > -1e-9));
    }

    #[test]
    fn equal_angles_sample_a_full_turn() {
        let mut document = Document::new();
        document.add_arc(Point3::origin(), 1.0, 45.0, 45.0, "0");

        let shape = build_shape(first_entity(&document)).unwrap();
        assert_eq!(shape.points.len(), 33);
        let mid = shape.points[ARC_SEGMENT_COUNT / 2];
        assert!(approx(angle_of(mid), f64::to_radians(225.0)));
        let (first, last) = (shape.points[0], shape.points[ARC_SEGMENT_COUNT]);
        assert!(approx(first.x(), last.x()) && approx(first.y(), last.y()));

        let step = TAU / ARC_SEGMENT_COUNT as f64;
        for pair in shape.points.windows(2) {
            let chord = Vector3::from_points(pair[0], pair[1]).as_vec3().length();
            assert!(approx(chord, 2.0 * (step / 2.0).sin()));
        }
    }

    #[test]
    fn arc_steps_are_equal() {
        let mut document = Document::new();
        document.add_arc(Point3::origin(), 1.0, 0.0, 64.0, "0");

        let shape = build_shape(first_entity(&document)).unwrap();
        let step = f64::to_radians(2.0);
        for (i, point) in shape.points.iter().enumerate() {
            let angle = step * i as f64;
            assert!(approx(point.x(), angle.cos()));
            assert!(approx(point.y(), angle.sin()));
        }
    }

    #[test]
    fn other_kinds_are_not_drawable() {
        let entity = Entity::Other(OtherEntity {
            kind: "TEXT".to_string(),
            layer: "0".to_string(),
        });
        assert!(build_shape(&entity).is_none());

        let unnamed = Entity::Other(OtherEntity {
            kind: String::new(),
            layer: "0".to_string(),
        });
        assert!(build_shape(&unnamed).is_none());
    }

    #[test]
    fn build_shapes_skips_other_and_keeps_order() {
        let mut document = Document::new();
        document.add_circle(Point3::origin(), 1.0, "0");
        document.add_other("HATCH", "0");
        document.add_line(Point3::origin(), Point3::planar(1.0, 1.0), "0");

        let styles: Vec<ShapeStyle> = build_shapes(&document)
            .iter()
            .map(|shape| shape.style)
            .collect();
        assert_eq!(styles, vec![ShapeStyle::Circle, ShapeStyle::Line]);
    }
}
