mod classify;
mod quad;

pub use classify::classify_edges;

use tracing::{debug, warn};

use crate::geometry::{
    Aperture, PlacedAperture, Room, Segment2, WallQuad, WallSide, WallThicknessTable, WallType,
    CENTERLINE_OFFSET, MATCH_TOLERANCE,
};
use crate::math::{Vector2, TOLERANCE};

/// An aperture that does not fit on its wall. It is left out of the built
/// wall; the rest of the room still builds.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ApertureIssue {
    pub edge: usize,
    /// Position of the aperture in the edge's aperture list.
    pub index: usize,
    pub aperture: Aperture,
    pub start: f64,
    pub end: f64,
    pub wall_length: f64,
}

/// Output of a wall build: one quad per floor edge plus rejected apertures.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WallBuild {
    pub walls: Vec<WallQuad>,
    pub issues: Vec<ApertureIssue>,
}

/// Builds the wall quads of a room from its centerline polygon.
///
/// Each centerline edge is classified as interior when a neighbor room has a
/// matching centerline edge, and exterior otherwise. The wall type is the
/// edge's override if set, else `InteriorDivision` or `Exterior`. The inner
/// face sits [`CENTERLINE_OFFSET`] inside the centerline and the outer face
/// `thickness - CENTERLINE_OFFSET` outside it; corners are mitred against the
/// neighboring walls of the same room.
///
/// Quads are in the room's local frame. Nothing is patched: every call
/// produces the full set.
#[derive(Debug)]
pub struct BuildWalls<'a> {
    room: &'a Room,
    thickness: &'a WallThicknessTable,
    neighbors: &'a [&'a Room],
    tolerance: f64,
}

impl<'a> BuildWalls<'a> {
    #[must_use]
    pub fn new(
        room: &'a Room,
        thickness: &'a WallThicknessTable,
        neighbors: &'a [&'a Room],
    ) -> Self {
        Self {
            room,
            thickness,
            neighbors,
            tolerance: MATCH_TOLERANCE,
        }
    }

    /// Overrides the edge matching tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    #[must_use]
    pub fn execute(&self) -> WallBuild {
        let centerline = self.room.centerline_polygon();
        let specs = self.room.edge_specs();
        let n = centerline.len();
        let sides = classify_edges(self.room, self.neighbors, self.tolerance);

        let types: Vec<WallType> = (0..n)
            .map(|i| {
                specs[i].wall_type.unwrap_or(match sides[i] {
                    WallSide::Interior => WallType::InteriorDivision,
                    WallSide::Exterior => WallType::Exterior,
                })
            })
            .collect();
        let thicknesses: Vec<f64> = types.iter().map(|t| self.thickness.thickness(*t)).collect();
        let outward: Vec<f64> = thicknesses.iter().map(|t| t - CENTERLINE_OFFSET).collect();
        let corners = quad::wall_corners(centerline, &outward);

        let mut build = WallBuild::default();
        for i in 0..n {
            let edge = Segment2::new(centerline[i], centerline[(i + 1) % n]);
            let start = edge.start;
            let length = edge.length();
            let dir = edge.direction().unwrap_or_else(Vector2::zeros);

            let mut apertures = Vec::new();
            for (index, aperture) in specs[i].apertures.iter().enumerate() {
                let (a, b) = aperture.span_along(length);
                let fits = a >= -TOLERANCE && a <= b && b <= length + TOLERANCE;
                if fits {
                    apertures.push(PlacedAperture {
                        aperture: *aperture,
                        start: a,
                        end: b,
                        points: [start + dir * a, start + dir * b],
                    });
                } else {
                    warn!(edge = i, index, start = a, end = b, length, "aperture does not fit its wall");
                    build.issues.push(ApertureIssue {
                        edge: i,
                        index,
                        aperture: *aperture,
                        start: a,
                        end: b,
                        wall_length: length,
                    });
                }
            }

            build.walls.push(WallQuad {
                edge: i,
                corners: corners[i],
                side: sides[i],
                wall_type: types[i],
                thickness: thicknesses[i],
                apertures,
            });
        }

        debug!(
            walls = build.walls.len(),
            interior = sides.iter().filter(|s| **s == WallSide::Interior).count(),
            issues = build.issues.len(),
            "built room walls"
        );
        build
    }
}

/// Builds a room's walls with the default matching tolerance. See
/// [`BuildWalls`].
#[must_use]
pub fn build_walls(room: &Room, thickness: &WallThicknessTable, neighbors: &[&Room]) -> WallBuild {
    BuildWalls::new(room, thickness, neighbors).execute()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::{AnchorVertex, EdgeSpec, Transform2};
    use crate::math::{Point2, Vector2};
    use approx::assert_abs_diff_eq;

    fn rect_at(w: f64, h: f64, x: f64) -> Room {
        Room::rectangle(
            w,
            h,
            Transform2::from_translation(Vector2::new(x, 0.0)),
            &WallThicknessTable::default(),
        )
        .unwrap()
    }

    /// Two rooms whose centerlines share the line x = 407.5.
    fn pair() -> (Room, Room) {
        (rect_at(400.0, 300.0, 0.0), rect_at(300.0, 300.0, 415.0))
    }

    #[test]
    fn shared_edge_is_interior_on_both_rooms() {
        let (a, b) = pair();
        let table = WallThicknessTable::default();
        let wa = build_walls(&a, &table, &[&b]);
        let wb = build_walls(&b, &table, &[&a]);

        let sides_a: Vec<_> = wa.walls.iter().map(|w| w.side).collect();
        let sides_b: Vec<_> = wb.walls.iter().map(|w| w.side).collect();
        use WallSide::{Exterior as E, Interior as I};
        assert_eq!(sides_a, vec![E, I, E, E]);
        assert_eq!(sides_b, vec![E, E, E, I]);
        assert_eq!(wa.walls[1].wall_type, WallType::InteriorDivision);
        assert_abs_diff_eq!(wa.walls[1].thickness, 15.0);
        assert_eq!(wa.walls[0].wall_type, WallType::Exterior);
    }

    #[test]
    fn quads_follow_thickness() {
        let (a, b) = pair();
        let walls = build_walls(&a, &WallThicknessTable::default(), &[&b]).walls;
        let bottom = &walls[0];
        assert_abs_diff_eq!(bottom.inner_start(), Point2::new(0.0, 0.0), epsilon = 1e-9);
        assert_abs_diff_eq!(bottom.inner_end(), Point2::new(400.0, 0.0), epsilon = 1e-9);
        assert_abs_diff_eq!(bottom.outer_end(), Point2::new(415.0, -30.0), epsilon = 1e-9);
        assert_abs_diff_eq!(bottom.outer_start(), Point2::new(-30.0, -30.0), epsilon = 1e-9);

        let shared = &walls[1];
        assert_abs_diff_eq!(shared.outer_start().x, 415.0, epsilon = 1e-9);
        assert_abs_diff_eq!(shared.outer_end(), Point2::new(415.0, 330.0), epsilon = 1e-9);
    }

    #[test]
    fn edge_override_wins() {
        let (mut a, b) = pair();
        a.set_edge_spec(
            1,
            EdgeSpec {
                wall_type: Some(WallType::Adiabatic),
                apertures: Vec::new(),
            },
        )
        .unwrap();
        let walls = build_walls(&a, &WallThicknessTable::default(), &[&b]).walls;
        assert_eq!(walls[1].side, WallSide::Interior);
        assert_eq!(walls[1].wall_type, WallType::Adiabatic);
        assert_abs_diff_eq!(walls[1].thickness, 20.0);
    }

    #[test]
    fn apertures_are_placed_or_flagged() {
        let mut a = rect_at(400.0, 300.0, 0.0);
        // Centerline bottom edge is 415 long.
        a.set_edge_spec(
            0,
            EdgeSpec {
                wall_type: None,
                apertures: vec![
                    Aperture::door(90.0, 20.0, AnchorVertex::Start),
                    Aperture::window(120.0, 10.0, AnchorVertex::End),
                    Aperture::window(100.0, 400.0, AnchorVertex::Start),
                ],
            },
        )
        .unwrap();
        a.set_edge_spec(
            2,
            EdgeSpec {
                wall_type: None,
                apertures: vec![Aperture::door(-5.0, 10.0, AnchorVertex::Start)],
            },
        )
        .unwrap();

        let build = build_walls(&a, &WallThicknessTable::default(), &[]);
        assert_eq!(build.walls.len(), 4);

        let placed = &build.walls[0].apertures;
        assert_eq!(placed.len(), 2);
        assert_abs_diff_eq!(placed[0].start, 20.0);
        assert_abs_diff_eq!(placed[0].points[0], Point2::new(12.5, -7.5), epsilon = 1e-9);
        assert_abs_diff_eq!(placed[1].end, 405.0, epsilon = 1e-9);
        assert_abs_diff_eq!(placed[1].start, 285.0, epsilon = 1e-9);

        assert_eq!(build.issues.len(), 2);
        assert_eq!((build.issues[0].edge, build.issues[0].index), (0, 2));
        assert_abs_diff_eq!(build.issues[0].wall_length, 415.0, epsilon = 1e-9);
        assert_eq!(build.issues[1].edge, 2);
        assert!(build.walls[2].apertures.is_empty());
    }
}
