use tracing::debug;

use crate::geometry::{Room, WallSide};
use crate::math::distance_2d::point_on_segment;
use crate::math::Point2;

use super::walls::classify_edges;

/// Result of joining two rooms at their T-junctions.
///
/// Polygons are the rooms' floor polygons in their own local frames after
/// injection. `injected_*` lists `(index, position)` of every inserted vertex,
/// in insertion order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JoinOutcome {
    pub modified: bool,
    pub polygon_a: Vec<Point2>,
    pub polygon_b: Vec<Point2>,
    pub injected_a: Vec<(usize, Point2)>,
    pub injected_b: Vec<(usize, Point2)>,
}

/// Injects the vertices of each room that lie on an edge of the other.
///
/// A vertex of `a` within `tolerance` of an edge of `b` is inserted into `b`
/// right after that edge's start vertex, unless `b` already has a vertex
/// within `tolerance` of it; then the same is done from `b` into `a`. Matching
/// happens in world coordinates and the result is stored in each room's local
/// frame. Running it again on the output injects nothing.
#[must_use]
pub fn join_rooms(a: &Room, b: &Room, tolerance: f64) -> JoinOutcome {
    let (polygon_b, injected_b) = inject(a, b, tolerance);
    let (polygon_a, injected_a) = inject(b, a, tolerance);
    let modified = !injected_a.is_empty() || !injected_b.is_empty();
    debug!(
        into_a = injected_a.len(),
        into_b = injected_b.len(),
        "joined rooms"
    );
    JoinOutcome {
        modified,
        polygon_a,
        polygon_b,
        injected_a,
        injected_b,
    }
}

/// Whether any world-space centerline edge of `a` matches one of `b` in either
/// direction. Symmetric in `a` and `b`.
#[must_use]
pub fn are_rooms_adjacent(a: &Room, b: &Room, tolerance: f64) -> bool {
    classify_edges(a, &[b], tolerance)
        .iter()
        .any(|side| *side == WallSide::Interior)
}

/// Inserts vertices of `source` lying on edges of `target` into a copy of
/// `target`'s floor polygon.
///
/// Both distance tests run on world coordinates so `tolerance` keeps its
/// meaning under a scaled transform; only the inserted point is mapped back
/// into `target`'s local frame.
fn inject(source: &Room, target: &Room, tolerance: f64) -> (Vec<Point2>, Vec<(usize, Point2)>) {
    let mut world_polygon = target.world_floor_polygon();
    let mut polygon = target.floor_polygon().to_vec();
    let mut injected = Vec::new();

    for world in source.world_floor_polygon() {
        if world_polygon
            .iter()
            .any(|v| nalgebra::distance(v, &world) <= tolerance)
        {
            continue;
        }
        let n = world_polygon.len();
        let hit = (0..n).find(|&j| {
            point_on_segment(&world, &world_polygon[j], &world_polygon[(j + 1) % n], tolerance)
        });
        if let Some(j) = hit {
            let p = target.transform().to_local(&world);
            world_polygon.insert(j + 1, world);
            polygon.insert(j + 1, p);
            injected.push((j + 1, p));
            debug!(index = j + 1, x = p.x, y = p.y, "injected T-junction vertex");
        }
    }
    (polygon, injected)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::{Transform2, WallThicknessTable, MATCH_TOLERANCE};
    use crate::math::Vector2;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    fn room(points: &[(f64, f64)], at: Vector2) -> Room {
        Room::new(
            points.iter().map(|&(x, y)| Point2::new(x, y)).collect(),
            Transform2::from_translation(at),
            &WallThicknessTable::default(),
        )
        .unwrap()
    }

    /// B spans (0,0)-(200,50); A sits on top of B's upper edge with a
    /// corner at (100,50).
    fn t_junction() -> (Room, Room) {
        let b = room(
            &[(0.0, 0.0), (200.0, 0.0), (200.0, 50.0), (0.0, 50.0)],
            Vector2::zeros(),
        );
        let a = room(
            &[(0.0, 0.0), (200.0, 0.0), (200.0, 100.0), (0.0, 100.0)],
            Vector2::new(100.0, 50.0),
        );
        (a, b)
    }

    #[test]
    fn injects_vertex_after_edge_start() {
        let (a, b) = t_junction();
        let out = join_rooms(&a, &b, MATCH_TOLERANCE);
        assert!(out.modified);
        // B's top edge runs (200,50) -> (0,50), starting at index 2.
        assert_eq!(out.polygon_b.len(), 5);
        assert_eq!(out.injected_b.len(), 1);
        assert_eq!(out.injected_b[0].0, 3);
        assert_abs_diff_eq!(out.polygon_b[3], Point2::new(100.0, 50.0), epsilon = 1e-9);
        // B's (200,50) corner lies on A's bottom edge.
        assert_eq!(out.polygon_a.len(), 5);
        assert_abs_diff_eq!(out.polygon_a[1], Point2::new(100.0, 0.0), epsilon = 1e-9);
    }

    /// B is a 20x5 local rectangle at scale 10, so it spans (0,0)-(200,50)
    /// in world space.
    fn scaled_b() -> Room {
        Room::new(
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(20.0, 0.0),
                Point2::new(20.0, 5.0),
                Point2::new(0.0, 5.0),
            ],
            Transform2::new(Vector2::zeros(), 0.0, 10.0).unwrap(),
            &WallThicknessTable::default(),
        )
        .unwrap()
    }

    #[test]
    fn tolerance_is_measured_in_world_units() {
        let b = scaled_b();
        // A's corner sits 4 world units above B's top edge.
        let a = room(
            &[(0.0, 0.0), (200.0, 0.0), (200.0, 100.0), (0.0, 100.0)],
            Vector2::new(100.0, 54.0),
        );
        let out = join_rooms(&a, &b, MATCH_TOLERANCE);
        assert!(out.injected_b.is_empty());
        assert_eq!(out.polygon_b, b.floor_polygon());
    }

    #[test]
    fn scaled_target_stores_local_vertex() {
        let b = scaled_b();
        let a = room(
            &[(0.0, 0.0), (200.0, 0.0), (200.0, 100.0), (0.0, 100.0)],
            Vector2::new(100.0, 50.0),
        );
        let out = join_rooms(&a, &b, MATCH_TOLERANCE);
        assert_eq!(out.injected_b.len(), 1);
        assert_eq!(out.injected_b[0].0, 3);
        assert_abs_diff_eq!(out.injected_b[0].1, Point2::new(10.0, 5.0), epsilon = 1e-9);
        assert_abs_diff_eq!(out.polygon_b[3], Point2::new(10.0, 5.0), epsilon = 1e-9);
    }

    #[test]
    fn join_is_idempotent() {
        let (mut a, mut b) = t_junction();
        let first = join_rooms(&a, &b, MATCH_TOLERANCE);
        a.set_floor_polygon(first.polygon_a).unwrap();
        b.set_floor_polygon(first.polygon_b).unwrap();
        let second = join_rooms(&a, &b, MATCH_TOLERANCE);
        assert!(!second.modified);
        assert_eq!(second.polygon_a, a.floor_polygon());
        assert_eq!(second.polygon_b, b.floor_polygon());
    }

    #[test]
    fn distant_rooms_untouched() {
        let (a, _) = t_junction();
        let far = room(
            &[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)],
            Vector2::new(-1000.0, 0.0),
        );
        assert!(!join_rooms(&a, &far, MATCH_TOLERANCE).modified);
    }

    #[test]
    fn adjacency_uses_centerlines() {
        let a = room(&[(0.0, 0.0), (400.0, 0.0), (400.0, 300.0), (0.0, 300.0)], Vector2::zeros());
        let b = room(
            &[(0.0, 0.0), (300.0, 0.0), (300.0, 300.0), (0.0, 300.0)],
            Vector2::new(415.0, 0.0),
        );
        assert!(are_rooms_adjacent(&a, &b, MATCH_TOLERANCE));
        let c = room(
            &[(0.0, 0.0), (300.0, 0.0), (300.0, 300.0), (0.0, 300.0)],
            Vector2::new(430.0, 0.0),
        );
        assert!(!are_rooms_adjacent(&a, &c, MATCH_TOLERANCE));
    }

    proptest! {
        #[test]
        fn adjacency_is_symmetric(
            w1 in 50.0f64..400.0,
            h1 in 50.0f64..400.0,
            w2 in 50.0f64..400.0,
            dx in -20.0f64..20.0,
            snap in proptest::bool::ANY,
        ) {
            let a = room(&[(0.0, 0.0), (w1, 0.0), (w1, h1), (0.0, h1)], Vector2::zeros());
            let offset = if snap { w1 + 15.0 } else { w1 + 15.0 + dx };
            let b = room(
                &[(0.0, 0.0), (w2, 0.0), (w2, h1), (0.0, h1)],
                Vector2::new(offset, 0.0),
            );
            prop_assert_eq!(
                are_rooms_adjacent(&a, &b, MATCH_TOLERANCE),
                are_rooms_adjacent(&b, &a, MATCH_TOLERANCE)
            );
            if snap {
                prop_assert!(are_rooms_adjacent(&a, &b, MATCH_TOLERANCE));
            }
        }
    }
}
