use crate::math::intersect_2d::line_line_point_2d;
use crate::math::polygon_2d::{ensure_ccw, right_normal};
use crate::math::{Point2, Vector2, TOLERANCE};

/// Offsets a simple polygon by a uniform distance with mitred corners.
///
/// Each edge is moved along its outward normal; every output vertex is the
/// intersection of the two offset lines adjacent to the corresponding input
/// vertex. Positive distances grow the polygon, negative distances shrink it.
///
/// The input is normalized to counter-clockwise winding first and the output
/// is counter-clockwise with the same vertex count.
#[derive(Debug)]
pub struct PolygonOffset2D {
    vertices: Vec<Point2>,
    distance: f64,
}

/// Offset line of one polygon edge.
#[derive(Debug, Clone, Copy)]
struct OffsetLine {
    base: Point2,
    dir: Vector2,
    normal: Vector2,
}

impl PolygonOffset2D {
    /// Creates a new polygon offset operation.
    #[must_use]
    pub fn new(vertices: Vec<Point2>, distance: f64) -> Self {
        Self { vertices, distance }
    }

    /// Executes the offset.
    ///
    /// A zero distance or fewer than 3 vertices returns the input unchanged.
    /// Degenerate corners never fail: parallel neighbor lines or zero-length
    /// edges fall back to moving the original vertex along its normal.
    #[must_use]
    pub fn execute(&self) -> Vec<Point2> {
        let n = self.vertices.len();
        if self.distance.abs() < TOLERANCE || n < 3 {
            return self.vertices.clone();
        }

        let ring = ensure_ccw(&self.vertices);

        // Offset line for each edge i (ring[i] → ring[i + 1]).
        let lines: Vec<Option<OffsetLine>> = (0..n)
            .map(|i| offset_line(&ring[i], &ring[(i + 1) % n], self.distance))
            .collect();

        (0..n)
            .map(|i| {
                let prev = lines[(i + n - 1) % n];
                let cur = lines[i];
                corner(&ring[i], prev, cur, self.distance)
            })
            .collect()
    }
}

/// Offsets a polygon outward by `distance`. See [`PolygonOffset2D`].
#[must_use]
pub fn offset_polygon(vertices: &[Point2], distance: f64) -> Vec<Point2> {
    PolygonOffset2D::new(vertices.to_vec(), distance).execute()
}

fn offset_line(a: &Point2, b: &Point2, distance: f64) -> Option<OffsetLine> {
    let d = *b - *a;
    let len = d.norm();
    if len < TOLERANCE {
        return None;
    }
    let dir = d / len;
    let normal = right_normal(&dir);
    Some(OffsetLine {
        base: *a + normal * distance,
        dir,
        normal,
    })
}

/// Resolves the offset position of `vertex` from its two adjacent offset lines.
fn corner(
    vertex: &Point2,
    prev: Option<OffsetLine>,
    cur: Option<OffsetLine>,
    distance: f64,
) -> Point2 {
    match (prev, cur) {
        (Some(p), Some(c)) => line_line_point_2d(&p.base, &p.dir, &c.base, &c.dir)
            .unwrap_or_else(|| *vertex + vertex_normal(&p.normal, &c.normal) * distance),
        (Some(only), None) | (None, Some(only)) => *vertex + only.normal * distance,
        (None, None) => *vertex,
    }
}

/// Unit bisector of two edge normals; falls back to `b` when they cancel.
fn vertex_normal(a: &Vector2, b: &Vector2) -> Vector2 {
    let sum = a + b;
    let len = sum.norm();
    if len < TOLERANCE {
        *b
    } else {
        sum / len
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::distance_2d::project_onto_line;
    use crate::math::polygon_2d::{is_ccw, signed_area_2d};
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    fn square() -> Vec<Point2> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 10.0),
            Point2::new(0.0, 10.0),
        ]
    }

    /// Perpendicular distance from `p` to the infinite line through `a`, `b`.
    fn line_dist(p: &Point2, a: &Point2, b: &Point2) -> f64 {
        nalgebra::distance(p, &project_onto_line(p, a, b).unwrap())
    }

    #[test]
    fn square_outward_offset() {
        let out = offset_polygon(&square(), 1.0);
        assert_eq!(out.len(), 4);
        assert_abs_diff_eq!(out[0].x, -1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(out[0].y, -1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(out[2].x, 11.0, epsilon = 1e-9);
        assert_abs_diff_eq!(out[2].y, 11.0, epsilon = 1e-9);
        assert_abs_diff_eq!(signed_area_2d(&out), 144.0, epsilon = 1e-9);
    }

    #[test]
    fn square_inward_offset() {
        let out = offset_polygon(&square(), -1.0);
        assert_abs_diff_eq!(signed_area_2d(&out), 64.0, epsilon = 1e-9);
    }

    #[test]
    fn zero_distance_is_identity() {
        assert_eq!(offset_polygon(&square(), 0.0), square());
    }

    #[test]
    fn too_few_vertices_is_identity() {
        let seg = vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)];
        assert_eq!(offset_polygon(&seg, 5.0), seg);
    }

    #[test]
    fn clockwise_input_is_normalized() {
        let mut cw = square();
        cw.reverse();
        let out = offset_polygon(&cw, 1.0);
        assert!(is_ccw(&out));
        assert_abs_diff_eq!(signed_area_2d(&out), 144.0, epsilon = 1e-9);
    }

    #[test]
    fn collinear_vertex_falls_back_to_normal() {
        // (5, 0) sits between two parallel edges.
        let pts = vec![
            Point2::new(0.0, 0.0),
            Point2::new(5.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 10.0),
            Point2::new(0.0, 10.0),
        ];
        let out = offset_polygon(&pts, 2.0);
        assert_eq!(out.len(), 5);
        assert_abs_diff_eq!(out[1].x, 5.0, epsilon = 1e-9);
        assert_abs_diff_eq!(out[1].y, -2.0, epsilon = 1e-9);
    }

    #[test]
    fn duplicate_vertex_does_not_fail() {
        let pts = vec![
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 10.0),
            Point2::new(0.0, 10.0),
        ];
        let out = offset_polygon(&pts, 1.0);
        assert_eq!(out.len(), 5);
        assert!(out.iter().all(|p| p.x.is_finite() && p.y.is_finite()));
    }

    #[test]
    fn edges_lie_at_offset_distance() {
        let hexagon: Vec<Point2> = (0..6)
            .map(|k| {
                let a = f64::from(k) * std::f64::consts::PI / 3.0;
                Point2::new(50.0 * a.cos(), 30.0 * a.sin())
            })
            .collect();
        let d = 7.5;
        let out = offset_polygon(&hexagon, d);
        let n = hexagon.len();
        for i in 0..n {
            let (a, b) = (&hexagon[i], &hexagon[(i + 1) % n]);
            assert_abs_diff_eq!(line_dist(&out[i], a, b), d, epsilon = 1e-9);
            assert_abs_diff_eq!(line_dist(&out[(i + 1) % n], a, b), d, epsilon = 1e-9);
        }
    }

    proptest! {
        #[test]
        fn offset_round_trip_convex(
            w in 10.0..500.0_f64,
            h in 10.0..500.0_f64,
            skew in -5.0..5.0_f64,
            d in 0.5..20.0_f64,
        ) {
            // Convex quadrilateral (trapezoid-like).
            let poly = vec![
                Point2::new(0.0, 0.0),
                Point2::new(w, 0.0),
                Point2::new(w + skew, h),
                Point2::new(skew * 0.5, h),
            ];
            let back = offset_polygon(&offset_polygon(&poly, d), -d);
            for (p, q) in poly.iter().zip(back.iter()) {
                prop_assert!((p - q).norm() < 1e-6, "{p:?} vs {q:?}");
            }
        }
    }
}
