//! 2D transform component and global transform composition
//!
//! Only local values are stored. Global values are recomputed on every read
//! by walking the ancestor chain, so moving a parent is visible to its whole
//! subtree immediately.

use crate::foundation::math::{self, Vec2};
use crate::physics::shapes::Shape;
use crate::scene::node::NodeId;
use crate::scene::tree::SceneTree;
use serde::{Deserialize, Serialize};

/// Local position, rotation and scale of a node
///
/// `rotation` is a vector for symmetry with the other fields; `rotation.x` is
/// the in-plane angle (radians) used when drawing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform2D {
    /// Local position
    pub position: Vec2,
    /// Local rotation in radians
    pub rotation: Vec2,
    /// Local scale
    pub scale: Vec2,
}

impl Transform2D {
    /// Identity transform at `position`
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Builder pattern: set the rotation angle
    pub fn with_rotation(mut self, radians: f32) -> Self {
        self.rotation = Vec2::new(radians, 0.0);
        self
    }

    /// Builder pattern: set the scale
    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.scale = scale;
        self
    }

    /// Translate by `distance`
    pub fn move_by(&mut self, distance: Vec2) {
        self.position += distance;
    }

    /// Rotate the drawing angle by `radians`
    pub fn rotate_by(&mut self, radians: f32) {
        self.rotation.x += radians;
    }

    /// Multiply the scale component-wise by `factor`
    pub fn scale_by(&mut self, factor: Vec2) {
        self.scale.component_mul_assign(&factor);
    }
}

impl Default for Transform2D {
    fn default() -> Self {
        Self {
            position: math::zero(),
            rotation: math::zero(),
            scale: math::one(),
        }
    }
}

impl SceneTree {
    /// Fold `f` over the transforms of `id` and all its ancestors
    fn fold_transforms<T>(&self, id: NodeId, init: T, mut f: impl FnMut(T, &Transform2D) -> T) -> T {
        let mut acc = init;
        let mut current = Some(id);
        while let Some(node_id) = current {
            let Some(node) = self.get(node_id) else {
                break;
            };
            if let Some(transform) = node.transform.as_ref() {
                acc = f(acc, transform);
            }
            current = node.parent();
        }
        acc
    }

    /// World-space position: the sum of every transform on the ancestor chain
    pub fn global_position(&self, id: NodeId) -> Vec2 {
        self.fold_transforms(id, math::zero(), |acc, t| acc + t.position)
    }

    /// World-space rotation: the sum of every rotation on the ancestor chain
    pub fn global_rotation(&self, id: NodeId) -> Vec2 {
        self.fold_transforms(id, math::zero(), |acc, t| acc + t.rotation)
    }

    /// World-space scale: the component-wise product of every scale on the ancestor chain
    pub fn global_scale(&self, id: NodeId) -> Vec2 {
        self.fold_transforms(id, math::one(), |acc, t| acc.component_mul(&t.scale))
    }

    /// The node's shape placed in world space, if it carries one
    pub fn world_shape(&self, id: NodeId) -> Option<Shape> {
        let kind = self.get(id)?.shape?;
        Some(kind.to_world(self.global_position(id), self.global_scale(id)))
    }
}
