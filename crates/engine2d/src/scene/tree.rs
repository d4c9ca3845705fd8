//! Scene tree arena
//!
//! All nodes live in one [`SlotMap`]; parent and child links are [`NodeId`]
//! handles. The tree runs the node lifecycle: scripts on a node fire first, in
//! attachment order, then its children are visited in insertion order.
//!
//! Child lists are snapshotted before recursing and scripts are taken out of
//! their node while they run, so a script may freely spawn, reparent or
//! despawn nodes (including its own) from inside a hook.

use crate::scene::blueprint::NodeBlueprint;
use crate::scene::node::{Node, NodeId, ScriptId};
use crate::scene::script::Script;
use crate::scene::transform::Transform2D;
use slotmap::SlotMap;
use thiserror::Error;

/// Scene graph errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// The handle does not refer to a live node
    #[error("Unknown node: {0:?}")]
    UnknownNode(NodeId),

    /// The script is not attached to the node
    #[error("Script {script:?} is not attached to node {node:?}")]
    UnknownScript {
        /// Node searched
        node: NodeId,
        /// Script handle that was not found
        script: ScriptId,
    },
}

/// Systems that track nodes across their lifetime
///
/// `register` runs at the end of a node's setup (after its subtree);
/// `deregister` runs at the end of its teardown.
pub trait NodeRegistry {
    /// A node finished setting up
    fn register(&mut self, tree: &SceneTree, id: NodeId);

    /// A node finished tearing down
    fn deregister(&mut self, tree: &SceneTree, id: NodeId);
}

/// Registry that ignores every node
#[derive(Debug, Default, Clone, Copy)]
pub struct NoRegistry;

impl NodeRegistry for NoRegistry {
    fn register(&mut self, _tree: &SceneTree, _id: NodeId) {}
    fn deregister(&mut self, _tree: &SceneTree, _id: NodeId) {}
}

/// Lifecycle work queued by scripts for the owner of the registries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LifecycleRequest {
    Setup(NodeId),
    Teardown(NodeId),
}

/// Arena owning every scene node
#[derive(Debug, Default)]
pub struct SceneTree {
    nodes: SlotMap<NodeId, Node>,
    requests: Vec<LifecycleRequest>,
    /// Scripts currently taken out of their node, innermost hook last
    running: Vec<(NodeId, Vec<ScriptId>)>,
    /// Running scripts detached from inside a hook
    detached: Vec<(NodeId, ScriptId)>,
}

impl SceneTree {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a detached node
    pub fn spawn(&mut self, node: Node) -> NodeId {
        let mut node = node;
        node.parent = None;
        node.children.clear();
        self.nodes.insert(node)
    }

    /// Whether `id` refers to a live node
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree holds no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Borrow a node
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Mutably borrow a node
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    /// Borrow a node's transform
    pub fn transform(&self, id: NodeId) -> Option<&Transform2D> {
        self.nodes.get(id)?.transform.as_ref()
    }

    /// Mutably borrow a node's transform
    pub fn transform_mut(&mut self, id: NodeId) -> Option<&mut Transform2D> {
        self.nodes.get_mut(id)?.transform.as_mut()
    }

    /// Parent of `id`
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id)?.parent
    }

    /// Children of `id` in insertion order
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id).map_or(&[], |node| node.children.as_slice())
    }

    /// Make `child` a child of `parent`
    ///
    /// A child that already has a parent is detached from it first. Adding the
    /// same child twice keeps a single entry.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        if !self.contains(parent) {
            return Err(SceneError::UnknownNode(parent));
        }
        let previous = self
            .nodes
            .get(child)
            .ok_or(SceneError::UnknownNode(child))?
            .parent;
        debug_assert!(
            parent != child && !self.is_ancestor(child, parent),
            "add_child would create a cycle"
        );

        if let Some(previous) = previous.filter(|&p| p != parent) {
            if let Some(old) = self.nodes.get_mut(previous) {
                old.children.retain(|&c| c != child);
            }
        }

        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.nodes.get_mut(parent) {
            if !node.children.contains(&child) {
                node.children.push(child);
            }
        }
        Ok(())
    }

    /// Detach `child` from `parent`; the child stays alive as a root
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        let node = self
            .nodes
            .get_mut(parent)
            .ok_or(SceneError::UnknownNode(parent))?;
        node.children.retain(|&c| c != child);

        let child_node = self
            .nodes
            .get_mut(child)
            .ok_or(SceneError::UnknownNode(child))?;
        if child_node.parent == Some(parent) {
            child_node.parent = None;
        }
        Ok(())
    }

    /// Remove `id` and its whole subtree from the arena
    pub fn despawn(&mut self, id: NodeId) -> Result<(), SceneError> {
        let parent = self.nodes.get(id).ok_or(SceneError::UnknownNode(id))?.parent;
        if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(p)) {
            parent.children.retain(|&c| c != id);
        }

        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(current) {
                stack.extend(node.children);
            }
        }
        Ok(())
    }

    /// Attach a script; it fires after the node's existing scripts
    pub fn attach_script(
        &mut self,
        id: NodeId,
        script: impl Script + 'static,
    ) -> Result<ScriptId, SceneError> {
        let node = self.nodes.get_mut(id).ok_or(SceneError::UnknownNode(id))?;
        Ok(node.push_script(Box::new(script)))
    }

    /// Detach a previously attached script
    ///
    /// A script of a node whose hooks are running (including the caller
    /// itself) is skipped for the rest of the pass and dropped when it ends.
    pub fn detach_script(&mut self, id: NodeId, script: ScriptId) -> Result<(), SceneError> {
        let node = self.nodes.get_mut(id).ok_or(SceneError::UnknownNode(id))?;
        let before = node.scripts.len();
        node.scripts.retain(|(sid, _)| *sid != script);
        if node.scripts.len() != before {
            return Ok(());
        }

        let running = self
            .running
            .iter()
            .any(|(node, scripts)| *node == id && scripts.contains(&script));
        if running && !self.detached.contains(&(id, script)) {
            self.detached.push((id, script));
            return Ok(());
        }
        Err(SceneError::UnknownScript { node: id, script })
    }

    /// Build a subtree from a blueprint and return its root
    pub fn instantiate(&mut self, blueprint: NodeBlueprint) -> NodeId {
        let NodeBlueprint { node, children } = blueprint;
        let root = self.spawn(node);
        for child in children {
            let child = self.instantiate(child);
            if let Some(node) = self.nodes.get_mut(child) {
                node.parent = Some(root);
            }
            if let Some(node) = self.nodes.get_mut(root) {
                node.children.push(child);
            }
        }
        root
    }

    /// Run setup on `id` and its subtree
    pub fn setup(&mut self, id: NodeId, registry: &mut dyn NodeRegistry) -> Result<(), SceneError> {
        if !self.contains(id) {
            return Err(SceneError::UnknownNode(id));
        }
        self.setup_node(id, registry);
        Ok(())
    }

    /// Run one update of `id` and its subtree with `dt` milliseconds
    pub fn update(&mut self, id: NodeId, dt: f64) {
        self.run_scripts(id, |script, tree, node| script.on_update(tree, node, dt));
        for child in self.child_snapshot(id) {
            self.update(child, dt);
        }
    }

    /// Run teardown on `id` and its subtree
    pub fn teardown(&mut self, id: NodeId, registry: &mut dyn NodeRegistry) -> Result<(), SceneError> {
        if !self.contains(id) {
            return Err(SceneError::UnknownNode(id));
        }
        self.teardown_node(id, registry);
        Ok(())
    }

    /// Queue `id` for setup at the next [`flush_requests`](Self::flush_requests)
    ///
    /// Scripts only see the tree, so this is how they bring new nodes to life
    /// with the engine's systems.
    pub fn request_setup(&mut self, id: NodeId) {
        self.requests.push(LifecycleRequest::Setup(id));
    }

    /// Queue `id` for teardown and despawn at the next flush
    pub fn request_teardown(&mut self, id: NodeId) {
        self.requests.push(LifecycleRequest::Teardown(id));
    }

    /// Number of queued lifecycle requests
    pub fn pending_requests(&self) -> usize {
        self.requests.len()
    }

    /// Run queued setups and teardowns against `registry`
    ///
    /// Requests queued while flushing are handled in the same call. Requests
    /// for nodes that no longer exist are dropped. Returns how many ran.
    pub fn flush_requests(&mut self, registry: &mut dyn NodeRegistry) -> usize {
        let mut handled = 0;
        while !self.requests.is_empty() {
            for request in std::mem::take(&mut self.requests) {
                match request {
                    LifecycleRequest::Setup(id) if self.contains(id) => {
                        self.setup_node(id, registry);
                        handled += 1;
                    }
                    LifecycleRequest::Teardown(id) if self.contains(id) => {
                        self.teardown_node(id, registry);
                        if self.contains(id) {
                            if let Err(err) = self.despawn(id) {
                                log::warn!("Failed to despawn {id:?} after teardown: {err}");
                            }
                        }
                        handled += 1;
                    }
                    _ => {}
                }
            }
        }
        handled
    }

    fn setup_node(&mut self, id: NodeId, registry: &mut dyn NodeRegistry) {
        self.run_scripts(id, |script, tree, node| script.on_setup(tree, node));
        for child in self.child_snapshot(id) {
            self.setup_node(child, registry);
        }
        if self.contains(id) {
            registry.register(self, id);
        }
    }

    fn teardown_node(&mut self, id: NodeId, registry: &mut dyn NodeRegistry) {
        self.run_scripts(id, |script, tree, node| script.on_teardown(tree, node));
        for child in self.child_snapshot(id) {
            self.teardown_node(child, registry);
        }
        if self.contains(id) {
            registry.deregister(self, id);
        }
    }

    fn child_snapshot(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id).to_vec()
    }

    fn run_scripts(&mut self, id: NodeId, mut hook: impl FnMut(&mut dyn Script, &mut SceneTree, NodeId)) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        if node.scripts.is_empty() {
            return;
        }

        let mut scripts = std::mem::take(&mut node.scripts);
        self.running.push((id, scripts.iter().map(|(sid, _)| *sid).collect()));
        for (sid, script) in scripts.iter_mut() {
            if !self.detached.contains(&(id, *sid)) {
                hook(script.as_mut(), self, id);
            }
        }
        self.running.pop();

        scripts.retain(|(sid, _)| !self.detached.contains(&(id, *sid)));
        if !self.running.iter().any(|(node, _)| *node == id) {
            self.detached.retain(|(node, _)| *node != id);
        }

        // Scripts attached while running go after the ones that ran
        if let Some(node) = self.nodes.get_mut(id) {
            scripts.append(&mut node.scripts);
            node.scripts = scripts;
        }
    }

    fn is_ancestor(&self, candidate: NodeId, id: NodeId) -> bool {
        let mut current = self.parent(id);
        while let Some(node) = current {
            if node == candidate {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Call `callback` on every ancestor of `id`, nearest first, ending at the root
    pub fn traverse_to_root(&self, id: NodeId, mut callback: impl FnMut(NodeId, &Node)) {
        let mut current = self.parent(id);
        while let Some(ancestor) = current {
            let Some(node) = self.nodes.get(ancestor) else {
                break;
            };
            callback(ancestor, node);
            current = node.parent;
        }
    }

    /// Call `callback` on every descendant of `id` in pre-order
    pub fn traverse_to_leaves(&self, id: NodeId, mut callback: impl FnMut(NodeId, &Node)) {
        self.visit_descendants(id, &mut callback);
    }

    fn visit_descendants(&self, id: NodeId, callback: &mut dyn FnMut(NodeId, &Node)) {
        for &child in self.children(id) {
            if let Some(node) = self.nodes.get(child) {
                callback(child, node);
                self.visit_descendants(child, callback);
            }
        }
    }
}
