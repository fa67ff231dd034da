use crate::geometry::{Room, Segment2, WallSide};

/// Classifies each centerline edge of `room` against the centerline edges of
/// `neighbors`, in world coordinates.
///
/// An edge is [`WallSide::Interior`] if any neighbor edge matches it in either
/// direction within `tolerance`. A neighbor identical to `room` is skipped.
#[must_use]
pub fn classify_edges(room: &Room, neighbors: &[&Room], tolerance: f64) -> Vec<WallSide> {
    let own = Segment2::polygon_edges(&room.world_centerline_polygon());
    let others: Vec<Segment2> = neighbors
        .iter()
        .filter(|n| !std::ptr::eq(**n, room))
        .flat_map(|n| Segment2::polygon_edges(&n.world_centerline_polygon()))
        .collect();

    own.iter()
        .map(|edge| {
            if others.iter().any(|o| edge.matches(o, tolerance)) {
                WallSide::Interior
            } else {
                WallSide::Exterior
            }
        })
        .collect()
}
