//! Scene nodes
//!
//! There is a single node type. What a node *is* (a positioned thing, a
//! drawable, a collider, a camera) comes from the optional components it
//! carries, queried through the `has_*` predicates.

use crate::physics::collider::Collider;
use crate::physics::shapes::ShapeKind;
use crate::render::camera::Camera;
use crate::render::renderable::Renderable;
use crate::scene::script::Script;
use crate::scene::transform::Transform2D;

slotmap::new_key_type! {
    /// Handle of a node inside a [`SceneTree`](crate::scene::SceneTree)
    pub struct NodeId;
}

/// Handle of a script attached to a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScriptId(pub(crate) u64);

/// A scene graph node with optional capability components
#[derive(Default)]
pub struct Node {
    name: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) scripts: Vec<(ScriptId, Box<dyn Script>)>,
    pub(crate) next_script: u64,

    /// Local position/rotation/scale
    pub transform: Option<Transform2D>,
    /// Geometry carried by the node, used for drawing and by child colliders
    pub shape: Option<ShapeKind>,
    /// Drawing state
    pub renderable: Option<Renderable>,
    /// Collision participation; tests the *parent's* shape
    pub collider: Option<Collider>,
    /// View rectangle used for culling
    pub camera: Option<Camera>,
}

impl Node {
    /// Create an empty node
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty node with a display name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Builder pattern: attach a transform
    pub fn with_transform(mut self, transform: Transform2D) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Builder pattern: attach a shape
    pub fn with_shape(mut self, shape: ShapeKind) -> Self {
        self.shape = Some(shape);
        self
    }

    /// Builder pattern: attach drawing state
    pub fn with_renderable(mut self, renderable: Renderable) -> Self {
        self.renderable = Some(renderable);
        self
    }

    /// Builder pattern: attach a collider
    pub fn with_collider(mut self, collider: Collider) -> Self {
        self.collider = Some(collider);
        self
    }

    /// Builder pattern: attach a camera
    pub fn with_camera(mut self, camera: Camera) -> Self {
        self.camera = Some(camera);
        self
    }

    /// Builder pattern: attach a script
    pub fn with_script(mut self, script: impl Script + 'static) -> Self {
        self.push_script(Box::new(script));
        self
    }

    pub(crate) fn push_script(&mut self, script: Box<dyn Script>) -> ScriptId {
        self.next_script += 1;
        let id = ScriptId(self.next_script);
        self.scripts.push((id, script));
        id
    }

    /// Display name (may be empty)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent handle, `None` for roots
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Direct children in insertion order
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Number of direct children
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Number of attached scripts
    pub fn script_count(&self) -> usize {
        self.scripts.len()
    }

    /// Whether the node carries a transform
    pub fn has_transform(&self) -> bool {
        self.transform.is_some()
    }

    /// Whether the node carries a shape
    pub fn has_shape(&self) -> bool {
        self.shape.is_some()
    }

    /// Whether the node is drawable
    pub fn is_renderable(&self) -> bool {
        self.renderable.is_some()
    }

    /// Whether the node takes part in collision detection
    pub fn is_collider(&self) -> bool {
        self.collider.is_some()
    }

    /// Whether the node is a camera
    pub fn is_camera(&self) -> bool {
        self.camera.is_some()
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("scripts", &self.scripts.len())
            .field("transform", &self.transform)
            .field("shape", &self.shape)
            .field("renderable", &self.renderable)
            .field("collider", &self.collider)
            .field("camera", &self.camera)
            .finish()
    }
}
