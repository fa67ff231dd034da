use crate::error::{Result, TopologyError};
use crate::math::polygon_2d::{find_self_intersection, signed_area_2d};
use crate::math::{Point2, TOLERANCE};

/// Checks that a polygon can be committed as a room boundary.
///
/// # Errors
///
/// Returns a [`TopologyError`] if the polygon has fewer than 3 vertices, a
/// zero-length edge, zero area, or two intersecting non-adjacent edges.
pub fn validate_polygon(points: &[Point2]) -> Result<()> {
    let n = points.len();
    if n < 3 {
        return Err(TopologyError::TooFewVertices(n).into());
    }
    for i in 0..n {
        if nalgebra::distance(&points[i], &points[(i + 1) % n]) < TOLERANCE {
            return Err(TopologyError::ZeroLengthEdge(i).into());
        }
    }
    if signed_area_2d(points).abs() < TOLERANCE {
        return Err(TopologyError::ZeroArea.into());
    }
    if let Some((i, j)) = find_self_intersection(points) {
        return Err(TopologyError::SelfIntersecting(i, j).into());
    }
    Ok(())
}
