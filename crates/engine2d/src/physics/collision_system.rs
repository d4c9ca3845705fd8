//! Core collision detection system
//!
//! Two phases per tick:
//! - broad phase: every unordered pair of registered colliders, deduplicated
//!   through a canonical [`CollisionPair`] key. This is O(n²) in the number of
//!   colliders, which is the scaling limit of the engine.
//! - narrow phase: the world shapes of the two colliders' *parents* are tested
//!   with [`Shape::overlaps`](crate::physics::shapes::Shape::overlaps).
//!
//! Detection only: contacts are reported through collider callbacks and no
//! response is applied.

use crate::physics::collider::CollisionEvent;
use crate::scene::node::NodeId;
use crate::scene::tree::{NodeRegistry, SceneTree};
use std::collections::HashSet;

/// Unordered pair of colliders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CollisionPair {
    /// Smaller id
    pub node_a: NodeId,
    /// Larger id
    pub node_b: NodeId,
}

impl CollisionPair {
    /// Create a new collision pair (always stores the smaller id first)
    pub fn new(node_a: NodeId, node_b: NodeId) -> Self {
        if node_a < node_b {
            Self { node_a, node_b }
        } else {
            Self {
                node_a: node_b,
                node_b: node_a,
            }
        }
    }

    /// Whether `id` is one of the pair
    pub fn contains(&self, id: NodeId) -> bool {
        self.node_a == id || self.node_b == id
    }
}

/// Registry of collider nodes and the per-tick detection pass
#[derive(Debug, Default, Clone)]
pub struct CollisionEngine {
    nodes: Vec<NodeId>,
}

impl CollisionEngine {
    /// Create an empty collision engine
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a collider node; returns false if it was already registered
    pub fn register_node(&mut self, id: NodeId) -> bool {
        if self.nodes.contains(&id) {
            return false;
        }
        self.nodes.push(id);
        true
    }

    /// Deregister a collider node; returns false if it was not registered
    pub fn deregister_node(&mut self, id: NodeId) -> bool {
        let before = self.nodes.len();
        self.nodes.retain(|&n| n != id);
        self.nodes.len() != before
    }

    /// Whether `id` is registered
    pub fn is_registered(&self, id: NodeId) -> bool {
        self.nodes.contains(&id)
    }

    /// Registered colliders in registration order
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Forget every registered collider
    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    /// Drop registrations of nodes that were despawned without teardown
    pub fn prune(&mut self, tree: &SceneTree) {
        self.nodes.retain(|&id| tree.contains(id));
    }

    /// Broad phase: every unordered pair of registered colliders, once
    pub fn candidate_pairs(&self) -> Vec<CollisionPair> {
        let mut seen = HashSet::new();
        let mut pairs = Vec::new();

        for &a in &self.nodes {
            for &b in &self.nodes {
                if a == b {
                    continue;
                }
                let pair = CollisionPair::new(a, b);
                if seen.insert(pair) {
                    pairs.push(pair);
                }
            }
        }

        pairs
    }

    /// Narrow phase over the candidate pairs; returns the overlapping ones
    pub fn detect(&self, tree: &SceneTree) -> Vec<CollisionPair> {
        self.candidate_pairs()
            .into_iter()
            .filter(|pair| Self::parents_overlap(tree, pair))
            .collect()
    }

    fn parents_overlap(tree: &SceneTree, pair: &CollisionPair) -> bool {
        let shape_of = |id: NodeId| tree.parent(id).and_then(|parent| tree.world_shape(parent));
        match (shape_of(pair.node_a), shape_of(pair.node_b)) {
            (Some(a), Some(b)) => a.overlaps(&b),
            _ => false,
        }
    }

    /// Detect contacts and notify both colliders of each
    ///
    /// Pairs are tested one at a time, right before their callbacks run, so a
    /// callback that moves or despawns a body affects the pairs after it.
    /// Returns the overlapping pairs.
    pub fn update(&mut self, tree: &mut SceneTree) -> Vec<CollisionPair> {
        let mut hits = Vec::new();

        for pair in self.candidate_pairs() {
            if !Self::parents_overlap(tree, &pair) {
                continue;
            }
            Self::notify(tree, pair.node_a, pair.node_b);
            Self::notify(tree, pair.node_b, pair.node_a);
            hits.push(pair);
        }

        hits
    }

    fn notify(tree: &mut SceneTree, node: NodeId, other: NodeId) {
        if !tree.contains(other) {
            return;
        }
        let Some(mut callback) = tree
            .get_mut(node)
            .and_then(|n| n.collider.as_mut())
            .and_then(|c| c.on_collision.take())
        else {
            return;
        };

        callback(tree, CollisionEvent { node, other });

        if let Some(collider) = tree.get_mut(node).and_then(|n| n.collider.as_mut()) {
            if collider.on_collision.is_none() {
                collider.on_collision = Some(callback);
            }
        }
    }
}

impl NodeRegistry for CollisionEngine {
    fn register(&mut self, tree: &SceneTree, id: NodeId) {
        if tree.get(id).is_some_and(|n| n.is_collider()) {
            self.register_node(id);
        }
    }

    fn deregister(&mut self, _tree: &SceneTree, id: NodeId) {
        self.deregister_node(id);
    }
}
