//! Scene Manager - owns the active scene root
//!
//! Switching scenes tears the previous root down (deregistering it from every
//! system), removes it from the arena and then sets the new root up.

use crate::scene::node::NodeId;
use crate::scene::tree::{NodeRegistry, SceneError, SceneTree};

/// Tracks which subtree is the running scene
#[derive(Debug, Default, Clone)]
pub struct SceneManager {
    active: Option<NodeId>,
}

impl SceneManager {
    /// Create a manager with no active scene
    pub fn new() -> Self {
        Self::default()
    }

    /// Root of the active scene
    pub fn active_scene(&self) -> Option<NodeId> {
        self.active
    }

    /// Replace the active scene with `root`
    ///
    /// The previous scene is torn down and despawned before `root` is set up.
    pub fn set_active_scene(
        &mut self,
        tree: &mut SceneTree,
        registry: &mut dyn NodeRegistry,
        root: NodeId,
    ) -> Result<(), SceneError> {
        if !tree.contains(root) {
            return Err(SceneError::UnknownNode(root));
        }
        if self.active != Some(root) {
            self.teardown_active_scene(tree, registry)?;
        }

        log::info!("Activating scene '{}'", tree.get(root).map_or("", |n| n.name()));
        tree.setup(root, registry)?;
        self.active = Some(root);
        Ok(())
    }

    /// Update the active scene, if any
    pub fn update_active_scene(&self, tree: &mut SceneTree, dt: f64) {
        if let Some(root) = self.active {
            tree.update(root, dt);
        }
    }

    /// Tear down and despawn the active scene, leaving none active
    pub fn teardown_active_scene(
        &mut self,
        tree: &mut SceneTree,
        registry: &mut dyn NodeRegistry,
    ) -> Result<(), SceneError> {
        let Some(root) = self.active.take() else {
            return Ok(());
        };
        if !tree.contains(root) {
            log::warn!("Active scene root {root:?} was despawned externally");
            return Ok(());
        }

        log::debug!("Tearing down scene '{}'", tree.get(root).map_or("", |n| n.name()));
        tree.teardown(root, registry)?;
        if tree.contains(root) {
            tree.despawn(root)?;
        }
        Ok(())
    }
}
