//! Behaviour scripts attached to nodes

use crate::foundation::math::Vec2;
use crate::scene::node::NodeId;
use crate::scene::tree::SceneTree;
use std::cell::Cell;
use std::rc::Rc;

/// Behaviour attached to a node
///
/// Every hook receives the tree and the id of the node the script is attached
/// to. Scripts on one node fire in attachment order, before the node's
/// children are visited.
pub trait Script {
    /// Called when the node is set up
    fn on_setup(&mut self, _tree: &mut SceneTree, _node: NodeId) {}

    /// Called once per frame with the elapsed milliseconds
    fn on_update(&mut self, _tree: &mut SceneTree, _node: NodeId, _dt: f64) {}

    /// Called when the node is torn down
    fn on_teardown(&mut self, _tree: &mut SceneTree, _node: NodeId) {}
}

/// Moves its node at a constant velocity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocityScript {
    /// Velocity in pixels per millisecond
    pub velocity: Vec2,
}

impl VelocityScript {
    /// Create a script moving at `velocity` pixels per millisecond
    pub fn new(velocity: Vec2) -> Self {
        Self { velocity }
    }
}

impl Script for VelocityScript {
    fn on_update(&mut self, tree: &mut SceneTree, node: NodeId, dt: f64) {
        if let Some(transform) = tree.transform_mut(node) {
            transform.move_by(self.velocity * dt as f32);
        }
    }
}

/// Shared view of the rate measured by an [`FpsCounterScript`]
#[derive(Debug, Clone, Default)]
pub struct FpsReading(Rc<Cell<u32>>);

impl FpsReading {
    /// Frames per second measured on the last update
    pub fn get(&self) -> u32 {
        self.0.get()
    }
}

/// Measures the frame rate from the elapsed time of each update
#[derive(Debug, Default)]
pub struct FpsCounterScript {
    reading: FpsReading,
}

impl FpsCounterScript {
    /// Create a counter reading zero until its first update
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a counter publishing to an existing reading
    pub fn with_reading(reading: FpsReading) -> Self {
        Self { reading }
    }

    /// Handle that keeps reporting the rate after the script is attached
    pub fn reading(&self) -> FpsReading {
        self.reading.clone()
    }
}

impl Script for FpsCounterScript {
    fn on_setup(&mut self, tree: &mut SceneTree, node: NodeId) {
        let name = tree.get(node).map_or("", |n| n.name());
        log::debug!("FPS counter attached to {name:?}");
    }

    fn on_update(&mut self, _tree: &mut SceneTree, _node: NodeId, dt: f64) {
        // A zero-length frame keeps the previous reading
        if dt > 0.0 {
            self.reading.0.set((1000.0 / dt).floor() as u32);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::node::Node;
    use crate::scene::transform::Transform2D;
    use approx::assert_relative_eq;

    #[test]
    fn test_velocity_script_moves_node() {
        let mut tree = SceneTree::new();
        let node = tree.spawn(
            Node::new()
                .with_transform(Transform2D::default())
                .with_script(VelocityScript::new(Vec2::new(0.5, -0.25))),
        );

        tree.update(node, 10.0);
        tree.update(node, 10.0);

        let position = tree.get(node).unwrap().transform.as_ref().unwrap().position;
        assert_relative_eq!(position.x, 10.0);
        assert_relative_eq!(position.y, -5.0);
    }

    #[test]
    fn test_velocity_script_ignores_nodes_without_transform() {
        let mut tree = SceneTree::new();
        let node = tree.spawn(Node::new().with_script(VelocityScript::new(Vec2::new(1.0, 1.0))));

        tree.update(node, 16.0);
        assert!(!tree.get(node).unwrap().has_transform());
    }

    #[test]
    fn test_fps_counter_reports_last_frame_rate() {
        let counter = FpsCounterScript::new();
        let reading = counter.reading();
        let mut tree = SceneTree::new();
        let node = tree.spawn(Node::named("fps").with_script(counter));
        assert_eq!(reading.get(), 0);

        tree.update(node, 16.0);
        assert_eq!(reading.get(), 62);

        tree.update(node, 40.0);
        assert_eq!(reading.get(), 25);

        tree.update(node, 0.0);
        assert_eq!(reading.get(), 25);
    }

    #[test]
    fn test_fps_counters_can_share_a_reading() {
        let reading = FpsReading::default();
        let mut tree = SceneTree::new();
        let node = tree.spawn(Node::new().with_script(FpsCounterScript::with_reading(reading.clone())));

        tree.update(node, 20.0);
        assert_eq!(reading.get(), 50);
    }
}
