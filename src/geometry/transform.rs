use nalgebra::Rotation2;

use crate::error::{GeometryError, Result};
use crate::math::{Point2, Vector2, TOLERANCE};

/// Placement of a room in the plan: uniform scale, then rotation, then
/// translation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transform2 {
    position: Vector2,
    rotation: f64,
    scale: f64,
}

impl Default for Transform2 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform2 {
    /// Creates a transform.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::ParameterOutOfRange` if `scale` is zero or not
    /// finite, since such a transform has no inverse.
    pub fn new(position: Vector2, rotation: f64, scale: f64) -> Result<Self> {
        if !scale.is_finite() || scale.abs() < TOLERANCE {
            return Err(GeometryError::ParameterOutOfRange {
                parameter: "scale",
                value: scale,
                min: TOLERANCE,
                max: f64::MAX,
            }
            .into());
        }
        Ok(Self {
            position,
            rotation,
            scale,
        })
    }

    /// The identity transform.
    #[must_use]
    pub fn identity() -> Self {
        Self {
            position: Vector2::zeros(),
            rotation: 0.0,
            scale: 1.0,
        }
    }

    /// A pure translation.
    #[must_use]
    pub fn from_translation(position: Vector2) -> Self {
        Self {
            position,
            ..Self::identity()
        }
    }

    #[must_use]
    pub fn position(&self) -> &Vector2 {
        &self.position
    }

    #[must_use]
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Maps a room-local point into the world frame.
    #[must_use]
    pub fn to_world(&self, p: &Point2) -> Point2 {
        let rot = Rotation2::new(self.rotation);
        Point2::from(rot * (p.coords * self.scale) + self.position)
    }

    /// Maps a world point into the room-local frame.
    #[must_use]
    pub fn to_local(&self, p: &Point2) -> Point2 {
        let rot = Rotation2::new(-self.rotation);
        Point2::from(rot * (p.coords - self.position) / self.scale)
    }

    /// Returns this transform moved by `delta` in the world frame.
    #[must_use]
    pub fn translated(&self, delta: &Vector2) -> Self {
        Self {
            position: self.position + *delta,
            ..*self
        }
    }

    /// Returns this transform after a world-frame rotation by `angle` about
    /// `pivot`.
    #[must_use]
    pub fn rotated_about(&self, pivot: &Point2, angle: f64) -> Self {
        let rot = Rotation2::new(angle);
        let origin = Point2::from(self.position);
        let moved = *pivot + rot * (origin - *pivot);
        Self {
            position: moved.coords,
            rotation: crate::math::wrap_angle(self.rotation + angle),
            scale: self.scale,
        }
    }

    /// Maps every vertex of a local polygon into the world frame.
    #[must_use]
    pub fn polygon_to_world(&self, points: &[Point2]) -> Vec<Point2> {
        points.iter().map(|p| self.to_world(p)).collect()
    }
}
