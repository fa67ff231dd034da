mod polygon_offset;

pub use polygon_offset::{offset_polygon, PolygonOffset2D};
