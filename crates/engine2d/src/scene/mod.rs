//! Scene graph
//!
//! Nodes live in a [`SceneTree`] arena and form a hierarchy through
//! [`NodeId`] handles. Every node runs the same lifecycle:
//!
//! ```text
//! setup    → scripts.on_setup    → children → register with systems
//! update   → scripts.on_update   → children
//! teardown → scripts.on_teardown → children → deregister from systems
//! ```
//!
//! Capabilities (transform, shape, drawing, collision, camera) are optional
//! components on the node rather than subclasses.

pub mod blueprint;
pub mod node;
pub mod scene_manager;
pub mod script;
pub mod transform;
pub mod tree;

pub use blueprint::{LoadError, NodeBlueprint, SceneLoader};
pub use node::{Node, NodeId, ScriptId};
pub use scene_manager::SceneManager;
pub use script::{FpsCounterScript, FpsReading, Script, VelocityScript};
pub use transform::Transform2D;
pub use tree::{NoRegistry, NodeRegistry, SceneError, SceneTree};
