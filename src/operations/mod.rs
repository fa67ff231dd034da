pub mod join;
pub mod offset;
pub mod snap;
pub mod validate;
pub mod walls;

pub use join::{are_rooms_adjacent, join_rooms, JoinOutcome};
pub use offset::{offset_polygon, PolygonOffset2D};
pub use snap::{compute_snap, SnapMode, SnapResult, SnapSession, SnapThresholds};
pub use validate::validate_polygon;
pub use walls::{build_walls, classify_edges, ApertureIssue, BuildWalls, WallBuild};
