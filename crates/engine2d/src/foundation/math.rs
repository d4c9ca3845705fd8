//! Math utilities and types
//!
//! Provides the 2D vector type used throughout the engine. Screen space is
//! Y-down: X grows to the right and Y grows downwards.

pub use nalgebra::Vector2;

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// Zero vector
pub fn zero() -> Vec2 {
    Vec2::zeros()
}

/// Vector with both components set to one
pub fn one() -> Vec2 {
    Vec2::new(1.0, 1.0)
}

/// Vector with both components set to `value`
pub fn splat(value: f32) -> Vec2 {
    Vec2::new(value, value)
}

/// Rotate a point around the origin by `radians`.
///
/// Positive angles turn clockwise on a Y-down screen.
pub fn rotate_point(point: Vec2, radians: f32) -> Vec2 {
    let (sin, cos) = radians.sin_cos();
    Vec2::new(
        point.x * cos - point.y * sin,
        point.x * sin + point.y * cos,
    )
}
