//! Physics module for collision detection
//!
//! Provides 2D shape primitives, the collider component and the collision
//! engine that reports contacts between collider nodes.

pub mod collider;
pub mod collision_system;
pub mod shapes;

pub use collider::{Collider, CollisionCallback, CollisionEvent};
pub use collision_system::{CollisionEngine, CollisionPair};
pub use shapes::{Circle, Rectangle, Shape, ShapeKind};
