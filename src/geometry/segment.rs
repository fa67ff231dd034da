use crate::math::distance_2d::{segment_to_segment_dist, segments_match};
use crate::math::{Point2, Vector2, TOLERANCE};

/// A bounded line segment between two points.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Segment2 {
    pub start: Point2,
    pub end: Point2,
}

impl Segment2 {
    /// Creates a segment from its endpoints.
    #[must_use]
    pub fn new(start: Point2, end: Point2) -> Self {
        Self { start, end }
    }

    /// Returns the segments of a closed polygon, edge `i` running from vertex
    /// `i` to vertex `i + 1`.
    #[must_use]
    pub fn polygon_edges(points: &[Point2]) -> Vec<Self> {
        let n = points.len();
        (0..n)
            .map(|i| Self::new(points[i], points[(i + 1) % n]))
            .collect()
    }

    /// Vector from start to end.
    #[must_use]
    pub fn vector(&self) -> Vector2 {
        self.end - self.start
    }

    /// Length of the segment.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.vector().norm()
    }

    /// Unit direction, or `None` for a zero-length segment.
    #[must_use]
    pub fn direction(&self) -> Option<Vector2> {
        let v = self.vector();
        let len = v.norm();
        (len > TOLERANCE).then(|| v / len)
    }

    /// Direction angle in radians, measured counter-clockwise from +X.
    #[must_use]
    pub fn angle(&self) -> f64 {
        let v = self.vector();
        v.y.atan2(v.x)
    }

    /// Midpoint of the segment.
    #[must_use]
    pub fn midpoint(&self) -> Point2 {
        nalgebra::center(&self.start, &self.end)
    }

    /// Minimum of the four endpoint-to-segment distances.
    #[must_use]
    pub fn distance_to_segment(&self, other: &Self) -> f64 {
        segment_to_segment_dist(&self.start, &self.end, &other.start, &other.end)
    }

    /// Direction-agnostic endpoint match within `tolerance`.
    #[must_use]
    pub fn matches(&self, other: &Self, tolerance: f64) -> bool {
        segments_match(&self.start, &self.end, &other.start, &other.end, tolerance)
    }
}
