pub mod distance_2d;
pub mod intersect_2d;
pub mod polygon_2d;

/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Wraps an angle into `(-π, π]`.
#[must_use]
pub fn wrap_angle(angle: f64) -> f64 {
    use std::f64::consts::{PI, TAU};
    let mut a = angle % TAU;
    if a <= -PI {
        a += TAU;
    } else if a > PI {
        a -= TAU;
    }
    a
}

/// Rotates `p` about `pivot` by `angle` radians (counter-clockwise).
#[must_use]
pub fn rotate_about(p: &Point2, pivot: &Point2, angle: f64) -> Point2 {
    let rot = nalgebra::Rotation2::new(angle);
    *pivot + rot * (*p - *pivot)
}
