//! Camera component
//!
//! A camera is a node with a transform and a view size. Its world-space
//! rectangle decides what gets drawn; everything drawn is positioned relative
//! to the camera's global position.

use crate::core::config::GraphicsConfig;
use crate::foundation::math::Vec2;
use crate::physics::shapes::Rectangle;
use crate::scene::node::NodeId;
use crate::scene::tree::SceneTree;
use serde::{Deserialize, Serialize};

/// View size of a camera node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Unscaled view size in world units
    pub size: Vec2,
}

impl Camera {
    /// Camera with an explicit view size
    pub fn new(size: Vec2) -> Self {
        Self { size }
    }

    /// Camera covering the configured output surface
    pub fn from_config(config: &GraphicsConfig) -> Self {
        Self::new(Vec2::new(config.width as f32, config.height as f32))
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::from_config(&GraphicsConfig::default())
    }
}

impl SceneTree {
    /// World-space view rectangle of a camera node
    pub fn camera_rectangle(&self, id: NodeId) -> Option<Rectangle> {
        let camera = self.get(id)?.camera?;
        Some(Rectangle::new(
            self.global_position(id),
            self.global_scale(id).component_mul(&camera.size),
        ))
    }

    /// Convert a world position into the camera's frame
    pub fn relative_position(&self, camera: NodeId, world: Vec2) -> Vec2 {
        world - self.global_position(camera)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::node::Node;
    use crate::scene::transform::Transform2D;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_camera_matches_graphics_config() {
        let camera = Camera::default();
        assert_relative_eq!(camera.size, Vec2::new(1920.0, 1080.0));

        let small = GraphicsConfig { width: 320, height: 240 };
        assert_relative_eq!(Camera::from_config(&small).size, Vec2::new(320.0, 240.0));
    }

    #[test]
    fn test_camera_rectangle_is_scaled() {
        let mut tree = SceneTree::new();
        let camera = tree.spawn(
            Node::new()
                .with_transform(Transform2D::at(Vec2::new(-50.0, 10.0)).with_scale(Vec2::new(2.0, 0.5)))
                .with_camera(Camera::new(Vec2::new(100.0, 100.0))),
        );

        let rect = tree.camera_rectangle(camera).unwrap();
        assert_relative_eq!(rect.position, Vec2::new(-50.0, 10.0));
        assert_relative_eq!(rect.size, Vec2::new(200.0, 50.0));
    }

    #[test]
    fn test_relative_position_subtracts_camera() {
        let mut tree = SceneTree::new();
        let camera = tree.spawn(
            Node::new()
                .with_transform(Transform2D::at(Vec2::new(30.0, 40.0)))
                .with_camera(Camera::default()),
        );

        assert_relative_eq!(tree.relative_position(camera, Vec2::new(35.0, 38.0)), Vec2::new(5.0, -2.0));
    }

    #[test]
    fn test_non_camera_has_no_rectangle() {
        let mut tree = SceneTree::new();
        let node = tree.spawn(Node::new().with_transform(Transform2D::default()));
        assert!(tree.camera_rectangle(node).is_none());
    }
}
