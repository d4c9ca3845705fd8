//! Collider component
//!
//! A collider node does not carry geometry of its own: it tests the shape of
//! its parent node. Attach it as a child of the shape it should watch.

use crate::scene::node::NodeId;
use crate::scene::tree::SceneTree;

/// Contact notification passed to a collider callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionEvent {
    /// Collider receiving the event
    pub node: NodeId,
    /// Collider it touched
    pub other: NodeId,
}

/// Callback run when a collider touches another
pub type CollisionCallback = Box<dyn FnMut(&mut SceneTree, CollisionEvent)>;

/// Marks a node as taking part in collision detection
#[derive(Default)]
pub struct Collider {
    pub(crate) on_collision: Option<CollisionCallback>,
}

impl Collider {
    /// Collider without a callback; it still counts as a contact for others
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pattern: run `callback` on every contact
    pub fn on_collision(mut self, callback: impl FnMut(&mut SceneTree, CollisionEvent) + 'static) -> Self {
        self.on_collision = Some(Box::new(callback));
        self
    }

    /// Whether a callback is set
    pub fn has_callback(&self) -> bool {
        self.on_collision.is_some()
    }
}

impl std::fmt::Debug for Collider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collider")
            .field("has_callback", &self.has_callback())
            .finish()
    }
}
