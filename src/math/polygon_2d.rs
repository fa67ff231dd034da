use super::intersect_2d::segment_segment_intersect_2d;
use super::{Point2, Vector2};

/// Computes the signed area of a polygon (shoelace formula).
///
/// Positive for counter-clockwise, negative for clockwise.
#[must_use]
pub fn signed_area_2d(points: &[Point2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    sum * 0.5
}

/// Returns `true` if the polygon winds counter-clockwise.
#[must_use]
pub fn is_ccw(points: &[Point2]) -> bool {
    signed_area_2d(points) > 0.0
}

/// Returns the polygon in counter-clockwise order, reversing it if needed.
#[must_use]
pub fn ensure_ccw(points: &[Point2]) -> Vec<Point2> {
    let mut out = points.to_vec();
    if signed_area_2d(points) < 0.0 {
        out.reverse();
    }
    out
}

/// Returns the right-pointing normal of a direction vector.
///
/// For a counter-clockwise polygon this is the outward normal of an edge.
#[must_use]
pub fn right_normal(dir: &Vector2) -> Vector2 {
    Vector2::new(dir.y, -dir.x)
}

/// Finds the first pair of non-adjacent edges that intersect.
///
/// Edge `i` runs from vertex `i` to vertex `i + 1` (wrapping). Adjacent edges
/// share a vertex and are never reported.
#[must_use]
pub fn find_self_intersection(points: &[Point2]) -> Option<(usize, usize)> {
    let n = points.len();
    if n < 4 {
        return None;
    }
    for i in 0..n {
        let a0 = &points[i];
        let a1 = &points[(i + 1) % n];
        for j in (i + 2)..n {
            // Edge n-1 is adjacent to edge 0.
            if i == 0 && j == n - 1 {
                continue;
            }
            let b0 = &points[j];
            let b1 = &points[(j + 1) % n];
            if segment_segment_intersect_2d(a0, a1, b0, b1).is_some() {
                return Some((i, j));
            }
        }
    }
    None
}
