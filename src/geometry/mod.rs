pub mod room;
pub mod segment;
pub mod transform;
pub mod wall;

pub use room::Room;
pub use segment::Segment2;
pub use transform::Transform2;
pub use wall::{
    AnchorVertex, Aperture, ApertureKind, EdgeSpec, PlacedAperture, WallQuad, WallSide,
    WallThicknessTable, WallType, CENTERLINE_OFFSET, MATCH_TOLERANCE,
    STANDARD_INTERIOR_THICKNESS,
};
