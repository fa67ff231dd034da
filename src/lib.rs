pub mod error;
pub mod geometry;
pub mod math;
pub mod operations;
pub mod plan;
pub mod sketch;

pub use error::{Result, RoomformError};
pub use plan::{FloorPlan, RoomId};
