use super::Sketch;
use crate::error::{Result, SketchError};
use crate::math::Point2;

/// Builds a sketch with one free point `p{i}` per vertex and one line `l{i}`
/// from `p{i}` to `p{i+1}` (wrapping), ready for constraints to be added.
#[must_use]
pub fn polygon_sketch(vertices: &[Point2]) -> Sketch {
    let n = vertices.len();
    let mut sketch = Sketch::new();
    for (i, v) in vertices.iter().enumerate() {
        sketch.add_point(&format!("p{i}"), v.x, v.y, false);
    }
    for i in 0..n {
        sketch.add_line(&format!("l{i}"), &format!("p{i}"), &format!("p{}", (i + 1) % n));
    }
    sketch
}

/// Reads back the positions of points `p0..p{count-1}`.
///
/// # Errors
///
/// Returns `SketchError::MissingPoint` for the first absent point.
pub fn read_polygon(sketch: &Sketch, count: usize) -> Result<Vec<Point2>> {
    (0..count)
        .map(|i| {
            let id = format!("p{i}");
            sketch
                .point(&id)
                .map(super::PointPrimitive::position)
                .ok_or_else(|| SketchError::MissingPoint(id).into())
        })
        .collect()
}
