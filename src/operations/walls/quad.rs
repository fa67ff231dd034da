use crate::geometry::CENTERLINE_OFFSET;
use crate::math::intersect_2d::line_line_point_2d;
use crate::math::polygon_2d::right_normal;
use crate::math::{Point2, Vector2, TOLERANCE};
use crate::operations::offset::offset_polygon;

/// Corner geometry of every wall of one centerline polygon.
///
/// `outward[i]` is how far the outer face of wall `i` sits from the
/// centerline. Returns `[inner_start, inner_end, outer_end, outer_start]`
/// per edge.
pub(super) fn wall_corners(centerline: &[Point2], outward: &[f64]) -> Vec<[Point2; 4]> {
    let n = centerline.len();
    let inner = offset_polygon(centerline, -CENTERLINE_OFFSET);

    let lines: Vec<Option<(Point2, Vector2, Vector2)>> = (0..n)
        .map(|i| {
            let a = centerline[i];
            let d = centerline[(i + 1) % n] - a;
            let len = d.norm();
            if len < TOLERANCE {
                return None;
            }
            let dir = d / len;
            let normal = right_normal(&dir);
            Some((a + normal * outward[i], dir, normal))
        })
        .collect();

    (0..n)
        .map(|i| {
            let next = (i + 1) % n;
            let prev = (i + n - 1) % n;
            let outer_start = outer_corner(&centerline[i], lines[i], lines[prev], outward[i]);
            let outer_end = outer_corner(&centerline[next], lines[i], lines[next], outward[i]);
            [inner[i], inner[next], outer_end, outer_start]
        })
        .collect()
}

/// Mitres the outer face of a wall against its neighbor's outer face at the
/// shared centerline vertex `vertex`.
fn outer_corner(
    vertex: &Point2,
    own: Option<(Point2, Vector2, Vector2)>,
    other: Option<(Point2, Vector2, Vector2)>,
    distance: f64,
) -> Point2 {
    match (own, other) {
        (Some((base, dir, normal)), Some((other_base, other_dir, _))) => {
            line_line_point_2d(&base, &dir, &other_base, &other_dir)
                .unwrap_or_else(|| *vertex + normal * distance)
        }
        (Some((_, _, normal)), None) => *vertex + normal * distance,
        _ => *vertex,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn centerline_square(side: f64) -> Vec<Point2> {
        let c = CENTERLINE_OFFSET;
        vec![
            Point2::new(-c, -c),
            Point2::new(side + c, -c),
            Point2::new(side + c, side + c),
            Point2::new(-c, side + c),
        ]
    }

    #[test]
    fn uniform_walls_mitre_at_corners() {
        let corners = wall_corners(&centerline_square(100.0), &[22.5; 4]);
        let q = corners[0];
        assert_abs_diff_eq!(q[0], Point2::new(0.0, 0.0), epsilon = 1e-9);
        assert_abs_diff_eq!(q[1], Point2::new(100.0, 0.0), epsilon = 1e-9);
        assert_abs_diff_eq!(q[2], Point2::new(130.0, -30.0), epsilon = 1e-9);
        assert_abs_diff_eq!(q[3], Point2::new(-30.0, -30.0), epsilon = 1e-9);
    }

    #[test]
    fn thinner_neighbor_changes_mitre() {
        let corners = wall_corners(&centerline_square(100.0), &[22.5, 7.5, 22.5, 22.5]);
        assert_abs_diff_eq!(corners[0][2], Point2::new(115.0, -30.0), epsilon = 1e-9);
        assert_abs_diff_eq!(corners[1][3], Point2::new(115.0, -30.0), epsilon = 1e-9);
    }

    #[test]
    fn collinear_neighbor_falls_back_to_normal() {
        let c = vec![
            Point2::new(0.0, 0.0),
            Point2::new(50.0, 0.0),
            Point2::new(100.0, 0.0),
            Point2::new(100.0, 100.0),
            Point2::new(0.0, 100.0),
        ];
        let corners = wall_corners(&c, &[10.0, 20.0, 10.0, 10.0, 10.0]);
        assert_abs_diff_eq!(corners[0][2], Point2::new(50.0, -10.0), epsilon = 1e-9);
        assert_abs_diff_eq!(corners[1][3], Point2::new(50.0, -20.0), epsilon = 1e-9);
    }
}
