use dxfview_core::geometry::BoundingVolume;
use dxfview_core::shape::Shape;

/// 用图形的全部点扩展包围盒。零点图形不改变结果。
pub fn expand(mut volume: BoundingVolume, shape: &Shape) -> BoundingVolume {
    for point in &shape.points {
        volume.include_point(*point);
    }
    volume
}

/// 按顺序折叠所有图形；全部退化时返回 `None`。
pub fn accumulate<'a, I>(shapes: I) -> Option<BoundingVolume>
where
    I: IntoIterator<Item = &'a Shape>,
{
    let volume = shapes.into_iter().fold(BoundingVolume::empty(), expand);
    if volume.is_empty() { None } else { Some(volume) }
}
