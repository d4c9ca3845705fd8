//! # engine2d
//!
//! Runtime core of a 2D real-time engine.
//!
//! ## Features
//!
//! - **Scene Tree**: arena-backed node hierarchy with setup/update/teardown
//!   lifecycle and attachable scripts
//! - **Transforms**: local position/rotation/scale composed up the tree
//! - **Rendering**: camera culling, layered compositing, pluggable targets
//! - **Collision**: pairwise broad phase and shape-dispatched narrow phase
//! - **Frame Loop**: fixed-rate scheduler and async task tracking
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use engine2d::prelude::*;
//! use futures::future::{self, FutureExt, LocalBoxFuture};
//!
//! struct Splash;
//!
//! impl SceneLoader for Splash {
//!     fn load_scene(&self, _name: &str) -> LocalBoxFuture<'static, Result<NodeBlueprint, LoadError>> {
//!         let camera = Node::named("camera")
//!             .with_transform(Transform2D::default())
//!             .with_camera(Camera::default());
//!         future::ready(Ok(NodeBlueprint::new(Node::named("Splash")).with_child(NodeBlueprint::new(camera))))
//!             .boxed_local()
//!     }
//! }
//!
//! fn main() -> Result<(), EngineError> {
//!     let mut engine = Engine::new(
//!         EngineConfig::default(),
//!         Box::new(SystemClock::new()),
//!         Box::new(CountingRequester::new()),
//!     )?;
//!     engine.set_render_target(ImageTarget::new());
//!     engine.setup(&Splash);
//!     engine.start();
//!     loop {
//!         engine.tick();
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

// Core engine modules
pub mod config;
pub mod core;
pub mod foundation;
pub mod physics;
pub mod render;
pub mod scene;

mod engine;

pub use engine::{Engine, EngineError, World};

#[cfg(test)]
mod tests;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError},
        core::{DevConfig, EngineConfig, GameConfig, GraphicsConfig, TaskEvent, TaskId, TaskTracker},
        foundation::{
            math::Vec2,
            time::{Clock, CountingRequester, FrameRequester, ManualClock, SystemClock},
        },
        physics::{Collider, CollisionEvent, Shape, ShapeKind},
        render::{Camera, ImageTarget, RenderError, RenderTarget, Renderable, Sprite, SpriteSource},
        scene::{
            LoadError, Node, NodeBlueprint, NodeId, NodeRegistry, SceneLoader, SceneTree, Script, Transform2D,
            FpsCounterScript, VelocityScript,
        },
        Engine, EngineError, World,
    };
}
