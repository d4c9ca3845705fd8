//! Detached scene descriptions and the loader interface
//!
//! Loaders build scenes off-arena as a [`NodeBlueprint`] tree. The engine
//! turns a finished blueprint into live nodes with
//! [`SceneTree::instantiate`](crate::scene::SceneTree::instantiate).

use crate::scene::node::Node;
use futures::future::LocalBoxFuture;
use thiserror::Error;

/// Scene loading errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// No scene with this name exists
    #[error("Scene not found: {0}")]
    NotFound(String),

    /// The scene exists but could not be built
    #[error("Failed to load scene '{scene}': {reason}")]
    Failed {
        /// Scene name
        scene: String,
        /// What went wrong
        reason: String,
    },
}

/// A node and its descendants, not yet part of any tree
#[derive(Debug, Default)]
pub struct NodeBlueprint {
    /// The subtree root
    pub node: Node,
    /// Child subtrees in insertion order
    pub children: Vec<NodeBlueprint>,
}

impl NodeBlueprint {
    /// Blueprint of a single node
    pub fn new(node: Node) -> Self {
        Self {
            node,
            children: Vec::new(),
        }
    }

    /// Builder pattern: append a child subtree
    pub fn with_child(mut self, child: NodeBlueprint) -> Self {
        self.children.push(child);
        self
    }

    /// Append a child subtree
    pub fn add_child(&mut self, child: NodeBlueprint) {
        self.children.push(child);
    }

    /// Total number of nodes in the blueprint
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(NodeBlueprint::node_count).sum::<usize>()
    }
}

/// Produces scenes by name
pub trait SceneLoader {
    /// Start loading `name`; the future is polled by the engine's task tracker
    fn load_scene(&self, name: &str) -> LocalBoxFuture<'static, Result<NodeBlueprint, LoadError>>;
}
