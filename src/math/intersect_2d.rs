use super::{Point2, Vector2, TOLERANCE};

/// Parametric 2D line-line intersection.
///
/// Given lines `p1 + t * d1` and `p2 + u * d2`, returns `(t, u)` if not parallel.
#[must_use]
pub fn line_line_intersect_2d(
    p1: &Point2,
    d1: &Vector2,
    p2: &Point2,
    d2: &Vector2,
) -> Option<(f64, f64)> {
    let cross = d1.perp(d2);
    if cross.abs() < TOLERANCE {
        return None;
    }
    let delta = *p2 - *p1;
    let t = delta.perp(d2) / cross;
    let u = delta.perp(d1) / cross;
    Some((t, u))
}

/// Intersection point of two infinite lines, or `None` if they are parallel.
#[must_use]
pub fn line_line_point_2d(
    p1: &Point2,
    d1: &Vector2,
    p2: &Point2,
    d2: &Vector2,
) -> Option<Point2> {
    line_line_intersect_2d(p1, d1, p2, d2).map(|(t, _)| point_at(p1, d1, t))
}

/// Bounded segment-segment intersection in 2D.
///
/// Returns `(intersection_point, t, u)` where `t` and `u` are in `[0, 1]`.
#[must_use]
pub fn segment_segment_intersect_2d(
    a0: &Point2,
    a1: &Point2,
    b0: &Point2,
    b1: &Point2,
) -> Option<(Point2, f64, f64)> {
    let da = *a1 - *a0;
    let db = *b1 - *b0;
    let (t, u) = line_line_intersect_2d(a0, &da, b0, &db)?;

    // Use a small epsilon to include endpoints.
    let eps = TOLERANCE;
    if t >= -eps && t <= 1.0 + eps && u >= -eps && u <= 1.0 + eps {
        let t_clamped = t.clamp(0.0, 1.0);
        Some((point_at(a0, &da, t_clamped), t_clamped, u.clamp(0.0, 1.0)))
    } else {
        None
    }
}

/// Linear interpolation: `origin + dir * t`.
#[must_use]
pub fn point_at(origin: &Point2, dir: &Vector2, t: f64) -> Point2 {
    *origin + *dir * t
}
