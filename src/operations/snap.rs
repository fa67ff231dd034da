use std::f64::consts::PI;

use tracing::debug;

use crate::geometry::Segment2;
use crate::math::distance_2d::project_onto_line;
use crate::math::{rotate_about, wrap_angle, Point2, Vector2};

/// Score bonus that ranks any opposite edge pair above every non-opposite one.
const OPPOSITE_BONUS: f64 = 1e6;

/// Distances and angles below which a snap engages.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SnapThresholds {
    /// Maximum edge-to-edge distance for an edge snap.
    pub segment: f64,
    /// Maximum vertex-to-vertex distance for a vertex snap.
    pub vertex: f64,
    /// Maximum deviation from anti-parallel (radians) for two edges to face
    /// each other.
    pub angle_tolerance: f64,
}

impl Default for SnapThresholds {
    fn default() -> Self {
        Self {
            segment: 50.0,
            vertex: 60.0,
            angle_tolerance: 10f64.to_radians(),
        }
    }
}

impl SnapThresholds {
    #[must_use]
    pub fn with_segment(mut self, segment: f64) -> Self {
        self.segment = segment;
        self
    }

    #[must_use]
    pub fn with_vertex(mut self, vertex: f64) -> Self {
        self.vertex = vertex;
        self
    }

    #[must_use]
    pub fn with_angle_tolerance(mut self, angle_tolerance: f64) -> Self {
        self.angle_tolerance = angle_tolerance;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum SnapMode {
    /// Rotated to face an edge, then a vertex pair made coincident.
    EdgeVertex,
    /// Rotated to face an edge, then moved onto its line.
    EdgeOnly,
    /// Translated so that two vertices coincide.
    VertexOnly,
    None,
}

/// Advisory docking transform for a moving room.
///
/// Applied to a moving vertex `p` together with the tentative offset:
/// `R(rotation) * (p + offset - pivot) + pivot + translation`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SnapResult {
    pub rotation: f64,
    pub translation: Vector2,
    pub pivot: Point2,
    pub snapped: bool,
    pub mode: SnapMode,
    /// Edge index in the moving polygon of the winning pair, for edge modes.
    pub moving_edge: Option<usize>,
    /// `(room, edge)` indices into the stationary polygons, for edge modes.
    pub stationary_edge: Option<(usize, usize)>,
}

impl SnapResult {
    fn none() -> Self {
        Self {
            rotation: 0.0,
            translation: Vector2::zeros(),
            pivot: Point2::origin(),
            snapped: false,
            mode: SnapMode::None,
            moving_edge: None,
            stationary_edge: None,
        }
    }

    /// Maps a moving vertex (before `offset`) to its snapped position.
    #[must_use]
    pub fn apply(&self, p: &Point2, offset: &Vector2) -> Point2 {
        rotate_about(&(*p + *offset), &self.pivot, self.rotation) + self.translation
    }

    /// Maps a whole moving polygon. See [`SnapResult::apply`].
    #[must_use]
    pub fn apply_polygon(&self, polygon: &[Point2], offset: &Vector2) -> Vec<Point2> {
        polygon.iter().map(|p| self.apply(p, offset)).collect()
    }
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    moving: usize,
    room: usize,
    edge: usize,
    distance: f64,
    opposite: bool,
    score: f64,
}

/// Computes how to dock a moving room against stationary rooms.
///
/// All polygons are world-space vertex rings; `offset` is the tentative
/// displacement of the moving room. The best edge pair is the closest
/// opposite pair if any exists, else the closest pair. If that pair is
/// opposite and within [`SnapThresholds::segment`], the moving room is
/// rotated about the midpoint of its edge until the two edges are exactly
/// anti-parallel, then translated either to make the closest vertex pair of
/// the two edges coincide ([`SnapMode::EdgeVertex`]) or, when no pair is
/// within [`SnapThresholds::vertex`], to put the edge on the stationary
/// edge's line ([`SnapMode::EdgeOnly`]). Failing that, the globally closest
/// vertex pair is joined by translation alone ([`SnapMode::VertexOnly`]).
#[must_use]
pub fn compute_snap(
    moving: &[Point2],
    offset: &Vector2,
    stationary: &[Vec<Point2>],
    thresholds: &SnapThresholds,
) -> SnapResult {
    let moved: Vec<Point2> = moving.iter().map(|p| *p + *offset).collect();
    let moving_edges = Segment2::polygon_edges(&moved);
    let stationary_edges: Vec<Vec<Segment2>> = stationary
        .iter()
        .map(|poly| Segment2::polygon_edges(poly))
        .collect();

    let mut best: Option<Candidate> = None;
    let mut closest_vertices: Option<(Point2, Point2, f64)> = None;

    for (mi, ms) in moving_edges.iter().enumerate() {
        for (room, edges) in stationary_edges.iter().enumerate() {
            for (edge, ss) in edges.iter().enumerate() {
                let distance = ms.distance_to_segment(ss);
                let opposite = is_opposite(ms, ss, thresholds.angle_tolerance);
                let score = if opposite { OPPOSITE_BONUS - distance } else { -distance };
                if best.map_or(true, |b| score > b.score) {
                    best = Some(Candidate {
                        moving: mi,
                        room,
                        edge,
                        distance,
                        opposite,
                        score,
                    });
                }

                let (mv, sv, d) = closest_endpoints(ms, ss);
                if closest_vertices.map_or(true, |(_, _, cd)| d < cd) {
                    closest_vertices = Some((mv, sv, d));
                }
            }
        }
    }

    let result = match best {
        Some(c) if c.opposite && c.distance < thresholds.segment => {
            let ms = &moving_edges[c.moving];
            let ss = &stationary_edges[c.room][c.edge];
            edge_snap(ms, ss, thresholds, c)
        }
        _ => match closest_vertices {
            Some((mv, sv, d)) if d < thresholds.vertex => SnapResult {
                translation: sv - mv,
                snapped: true,
                mode: SnapMode::VertexOnly,
                ..SnapResult::none()
            },
            _ => SnapResult::none(),
        },
    };

    debug!(
        mode = ?result.mode,
        rotation = result.rotation,
        dx = result.translation.x,
        dy = result.translation.y,
        "computed snap"
    );
    result
}

fn edge_snap(
    ms: &Segment2,
    ss: &Segment2,
    thresholds: &SnapThresholds,
    c: Candidate,
) -> SnapResult {
    let rotation = alignment_rotation(ms, ss);
    let pivot = ms.midpoint();
    let rotated = Segment2::new(
        rotate_about(&ms.start, &pivot, rotation),
        rotate_about(&ms.end, &pivot, rotation),
    );

    let (mv, sv, d) = closest_endpoints(&rotated, ss);
    let (mode, translation) = if d < thresholds.vertex {
        (SnapMode::EdgeVertex, sv - mv)
    } else {
        let target = project_onto_line(&pivot, &ss.start, &ss.end).unwrap_or(pivot);
        (SnapMode::EdgeOnly, target - pivot)
    };

    SnapResult {
        rotation,
        translation,
        pivot,
        snapped: true,
        mode,
        moving_edge: Some(c.moving),
        stationary_edge: Some((c.room, c.edge)),
    }
}

/// Whether two edges run in opposite directions within `tolerance`.
fn is_opposite(a: &Segment2, b: &Segment2, tolerance: f64) -> bool {
    wrap_angle(a.angle() - b.angle() - PI).abs() <= tolerance
}

/// The smaller of the two rotations that make `moving` parallel or
/// anti-parallel to `stationary`.
fn alignment_rotation(moving: &Segment2, stationary: &Segment2) -> f64 {
    let parallel = wrap_angle(stationary.angle() - moving.angle());
    let anti = wrap_angle(stationary.angle() + PI - moving.angle());
    if anti.abs() <= parallel.abs() {
        anti
    } else {
        parallel
    }
}

/// Closest pair among the four endpoint pairs of two segments.
fn closest_endpoints(a: &Segment2, b: &Segment2) -> (Point2, Point2, f64) {
    [(a.start, b.start), (a.start, b.end), (a.end, b.start), (a.end, b.end)]
        .into_iter()
        .map(|(p, q)| (p, q, nalgebra::distance(&p, &q)))
        .fold((a.start, b.start, f64::INFINITY), |acc, cur| {
            if cur.2 < acc.2 {
                cur
            } else {
                acc
            }
        })
}

/// Snap state of an interactive drag: thresholds plus the last result, kept
/// for display.
#[derive(Debug, Clone, Default)]
pub struct SnapSession {
    thresholds: SnapThresholds,
    last: Option<SnapResult>,
}

impl SnapSession {
    #[must_use]
    pub fn new(thresholds: SnapThresholds) -> Self {
        Self {
            thresholds,
            last: None,
        }
    }

    #[must_use]
    pub fn thresholds(&self) -> &SnapThresholds {
        &self.thresholds
    }

    /// Recomputes the snap for the current drag position and remembers it.
    pub fn update(
        &mut self,
        moving: &[Point2],
        offset: &Vector2,
        stationary: &[Vec<Point2>],
    ) -> SnapResult {
        let result = compute_snap(moving, offset, stationary, &self.thresholds);
        self.last = Some(result);
        result
    }

    #[must_use]
    pub fn last(&self) -> Option<&SnapResult> {
        self.last.as_ref()
    }

    /// Forgets the last result, e.g. when the drag ends.
    pub fn clear(&mut self) -> Option<SnapResult> {
        self.last.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn rect(x0: f64, y0: f64, w: f64, h: f64) -> Vec<Point2> {
        vec![
            Point2::new(x0, y0),
            Point2::new(x0 + w, y0),
            Point2::new(x0 + w, y0 + h),
            Point2::new(x0, y0 + h),
        ]
    }

    /// 500x300 room centered at `center`, rotated by `angle` about its center.
    fn rotated_room(center: Point2, angle: f64) -> Vec<Point2> {
        rect(-250.0, -150.0, 500.0, 300.0)
            .iter()
            .map(|p| rotate_about(p, &Point2::origin(), angle) + center.coords)
            .collect()
    }

    fn min_vertex_distance(a: &[Point2], b: &[Point2]) -> f64 {
        a.iter()
            .flat_map(|p| b.iter().map(move |q| nalgebra::distance(p, q)))
            .fold(f64::INFINITY, f64::min)
    }

    #[test]
    fn near_room_docks_edge_and_vertex() {
        let stationary = rect(0.0, 0.0, 500.0, 300.0);
        let moving = rotated_room(Point2::new(790.0, 150.0), 3f64.to_radians());
        let offset = Vector2::zeros();
        let snap = compute_snap(&moving, &offset, &[stationary.clone()], &SnapThresholds::default());

        assert!(snap.snapped);
        assert_eq!(snap.mode, SnapMode::EdgeVertex);
        assert_eq!(snap.moving_edge, Some(3));
        assert_eq!(snap.stationary_edge, Some((0, 1)));
        assert_abs_diff_eq!(snap.rotation, -3f64.to_radians(), epsilon = 1e-9);

        let docked = snap.apply_polygon(&moving, &offset);
        // Left edge of the moving room now runs straight down x = const.
        assert_abs_diff_eq!(docked[3].x, docked[0].x, epsilon = 1e-9);
        assert!(docked[3].y > docked[0].y);
        assert_abs_diff_eq!(docked[0].x, 500.0, epsilon = 1e-9);
        assert!(min_vertex_distance(&docked, &stationary) < 1e-9);
    }

    #[test]
    fn offset_is_part_of_the_drag() {
        let stationary = rect(0.0, 0.0, 500.0, 300.0);
        let moving = rotated_room(Point2::new(1790.0, 150.0), 3f64.to_radians());
        let offset = Vector2::new(-1000.0, 0.0);
        let snap = compute_snap(&moving, &offset, &[stationary.clone()], &SnapThresholds::default());
        assert_eq!(snap.mode, SnapMode::EdgeVertex);
        let docked = snap.apply_polygon(&moving, &offset);
        assert!(min_vertex_distance(&docked, &stationary) < 1e-9);
    }

    #[test]
    fn edge_only_when_vertices_are_far() {
        let stationary = rect(0.0, 0.0, 500.0, 300.0);
        let moving = rotated_room(Point2::new(790.0, 150.0), 3f64.to_radians());
        let thresholds = SnapThresholds::default().with_vertex(5.0);
        let snap = compute_snap(&moving, &Vector2::zeros(), &[stationary], &thresholds);

        assert_eq!(snap.mode, SnapMode::EdgeOnly);
        let docked = snap.apply_polygon(&moving, &Vector2::zeros());
        assert_abs_diff_eq!(docked[3].x, 500.0, epsilon = 1e-9);
        assert_abs_diff_eq!(docked[0].x, 500.0, epsilon = 1e-9);
    }

    #[test]
    fn vertex_only_without_edge_candidate() {
        let stationary = rect(0.0, 0.0, 100.0, 100.0);
        let moving = rect(130.0, 130.0, 100.0, 100.0);
        let thresholds = SnapThresholds::default().with_segment(10.0);
        let snap = compute_snap(&moving, &Vector2::zeros(), &[stationary], &thresholds);

        assert_eq!(snap.mode, SnapMode::VertexOnly);
        assert_abs_diff_eq!(snap.rotation, 0.0);
        assert_abs_diff_eq!(snap.translation, Vector2::new(-30.0, -30.0), epsilon = 1e-12);
        assert_eq!(snap.moving_edge, None);
    }

    #[test]
    fn far_room_does_not_snap() {
        let stationary = rect(0.0, 0.0, 100.0, 100.0);
        let moving = rect(1000.0, 1000.0, 100.0, 100.0);
        let snap = compute_snap(&moving, &Vector2::zeros(), &[stationary], &SnapThresholds::default());
        assert!(!snap.snapped);
        assert_eq!(snap.mode, SnapMode::None);
        let p = Point2::new(3.0, 4.0);
        assert_eq!(snap.apply(&p, &Vector2::new(1.0, 1.0)), Point2::new(4.0, 5.0));
    }

    #[test]
    fn no_stationary_rooms() {
        let snap = compute_snap(&rect(0.0, 0.0, 10.0, 10.0), &Vector2::zeros(), &[], &SnapThresholds::default());
        assert_eq!(snap.mode, SnapMode::None);
    }

    #[test]
    fn rotation_picks_smaller_candidate() {
        let s = Segment2::new(Point2::new(0.0, 0.0), Point2::new(0.0, 10.0));
        let m = Segment2::new(Point2::new(5.0, 10.0), Point2::new(5.5, 0.0));
        let r = alignment_rotation(&m, &s);
        assert!(r.abs() < 0.1);
        let rotated = Segment2::new(
            rotate_about(&m.start, &m.midpoint(), r),
            rotate_about(&m.end, &m.midpoint(), r),
        );
        assert!(is_opposite(&rotated, &s, 1e-12));
    }

    #[test]
    fn session_keeps_last_result() {
        let mut session = SnapSession::new(SnapThresholds::default());
        assert!(session.last().is_none());
        let stationary = vec![rect(0.0, 0.0, 500.0, 300.0)];
        let moving = rotated_room(Point2::new(790.0, 150.0), 3f64.to_radians());
        let result = session.update(&moving, &Vector2::zeros(), &stationary);
        assert_eq!(session.last(), Some(&result));
        assert_eq!(session.clear().map(|r| r.mode), Some(SnapMode::EdgeVertex));
        assert!(session.last().is_none());
    }
}
