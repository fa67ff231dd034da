use super::{Point2, TOLERANCE};

/// Returns the closest point to `p` on the segment `a`→`b` together with its
/// segment parameter `t` in `[0, 1]`.
#[must_use]
pub fn closest_point_on_segment(p: &Point2, a: &Point2, b: &Point2) -> (Point2, f64) {
    let d = *b - *a;
    let len_sq = d.norm_squared();

    if len_sq < TOLERANCE * TOLERANCE {
        // Degenerate segment (zero length).
        return (*a, 0.0);
    }

    // Project point onto the infinite line, clamp to [0, 1].
    let t = ((*p - *a).dot(&d) / len_sq).clamp(0.0, 1.0);
    (*a + d * t, t)
}

/// Returns the minimum distance from `p` to the segment `a`→`b`.
#[must_use]
pub fn point_to_segment_dist(p: &Point2, a: &Point2, b: &Point2) -> f64 {
    let (closest, _) = closest_point_on_segment(p, a, b);
    nalgebra::distance(p, &closest)
}

/// Minimum distance between segments `a0`→`a1` and `b0`→`b1`, taken as the
/// minimum of the four endpoint-to-segment distances.
///
/// Crossing segments are not reported as distance zero; callers that need
/// that use [`super::intersect_2d::segment_segment_intersect_2d`] first.
#[must_use]
pub fn segment_to_segment_dist(a0: &Point2, a1: &Point2, b0: &Point2, b1: &Point2) -> f64 {
    point_to_segment_dist(a0, b0, b1)
        .min(point_to_segment_dist(a1, b0, b1))
        .min(point_to_segment_dist(b0, a0, a1))
        .min(point_to_segment_dist(b1, a0, a1))
}

/// Returns `true` if `p` lies on the segment `a`→`b` within `tolerance`.
#[must_use]
pub fn point_on_segment(p: &Point2, a: &Point2, b: &Point2, tolerance: f64) -> bool {
    point_to_segment_dist(p, a, b) <= tolerance
}

/// Orthogonal projection of `p` onto the infinite line through `a` and `b`.
///
/// Returns `None` when `a` and `b` coincide.
#[must_use]
pub fn project_onto_line(p: &Point2, a: &Point2, b: &Point2) -> Option<Point2> {
    let d = *b - *a;
    let len_sq = d.norm_squared();
    if len_sq < TOLERANCE * TOLERANCE {
        return None;
    }
    let t = (*p - *a).dot(&d) / len_sq;
    Some(*a + d * t)
}

/// Returns `true` if the segments match in either direction: each endpoint of
/// one lies within `tolerance` of an endpoint of the other.
#[must_use]
pub fn segments_match(a0: &Point2, a1: &Point2, b0: &Point2, b1: &Point2, tolerance: f64) -> bool {
    let same = nalgebra::distance(a0, b0) <= tolerance && nalgebra::distance(a1, b1) <= tolerance;
    let flipped =
        nalgebra::distance(a0, b1) <= tolerance && nalgebra::distance(a1, b0) <= tolerance;
    same || flipped
}
