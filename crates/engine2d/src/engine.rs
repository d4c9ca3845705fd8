//! Core engine implementation
//!
//! [`Engine`] owns everything a running game needs: the [`World`] (scene tree
//! plus the systems nodes register with), the task tracker used for scene
//! loads and the frame scheduler. The platform drives it by calling
//! [`Engine::tick`] from its animation callback.
//!
//! Each due frame runs:
//!
//! ```text
//! poll tasks → readiness gate → scene update → lifecycle requests
//!            → collision → graphics update → graphics draw
//! ```
//!
//! An error inside the frame body is logged and stops the loop.

use crate::core::config::{ConfigError, EngineConfig};
use crate::core::frame_scheduler::FrameScheduler;
use crate::core::tasks::{TaskEvent, TaskId, TaskTracker};
use crate::foundation::logging;
use crate::foundation::time::{Clock, FrameRequester};
use crate::physics::collision_system::CollisionEngine;
use crate::render::graphics::{Graphics, RenderError};
use crate::render::target::RenderTarget;
use crate::scene::blueprint::{LoadError, SceneLoader};
use crate::scene::node::NodeId;
use crate::scene::scene_manager::SceneManager;
use crate::scene::tree::{NodeRegistry, SceneError, SceneTree};
use image::RgbaImage;
use std::collections::HashMap;
use thiserror::Error;

/// Engine-level errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Rendering failed
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// Scene graph misuse
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    /// Scene loading failed
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    /// A tracked task failed
    #[error("{id} failed: {error}")]
    TaskFailed {
        /// Task that failed
        id: TaskId,
        /// Rendered error
        error: String,
    },
}

/// The engine's node registries, borrowed together
struct Systems<'a> {
    physics: &'a mut CollisionEngine,
    graphics: &'a mut Graphics,
}

impl NodeRegistry for Systems<'_> {
    fn register(&mut self, tree: &SceneTree, id: NodeId) {
        self.physics.register(tree, id);
        self.graphics.register(tree, id);
    }

    fn deregister(&mut self, tree: &SceneTree, id: NodeId) {
        self.physics.deregister(tree, id);
        self.graphics.deregister(tree, id);
    }
}

/// Scene tree and the systems its nodes register with
#[derive(Debug)]
pub struct World {
    /// Node arena
    pub tree: SceneTree,
    /// Collision detection
    pub physics: CollisionEngine,
    /// Rendering
    pub graphics: Graphics,
    /// Active scene tracking
    pub scenes: SceneManager,
    /// Sprite sheets available to renderables
    pub sprites: HashMap<String, RgbaImage>,
}

impl World {
    /// Create an empty world for `config`
    pub fn new(config: &EngineConfig) -> Self {
        let mut graphics = Graphics::new(&config.graphics);
        graphics.set_debug_mode(config.dev.debug_mode);
        Self {
            tree: SceneTree::new(),
            physics: CollisionEngine::new(),
            graphics,
            scenes: SceneManager::new(),
            sprites: HashMap::new(),
        }
    }

    /// Replace the active scene with `root`
    pub fn set_active_scene(&mut self, root: NodeId) -> Result<(), SceneError> {
        let mut systems = Systems {
            physics: &mut self.physics,
            graphics: &mut self.graphics,
        };
        self.scenes.set_active_scene(&mut self.tree, &mut systems, root)
    }

    /// Tear down the active scene, if any
    pub fn teardown_active_scene(&mut self) -> Result<(), SceneError> {
        let mut systems = Systems {
            physics: &mut self.physics,
            graphics: &mut self.graphics,
        };
        self.scenes.teardown_active_scene(&mut self.tree, &mut systems)
    }

    /// Set up a node that was spawned outside a scene load
    pub fn setup_node(&mut self, id: NodeId) -> Result<(), SceneError> {
        let mut systems = Systems {
            physics: &mut self.physics,
            graphics: &mut self.graphics,
        };
        self.tree.setup(id, &mut systems)
    }

    /// Run one frame body with `dt` milliseconds
    pub fn update(&mut self, dt: f64) -> Result<(), EngineError> {
        self.scenes.update_active_scene(&mut self.tree, dt);

        let mut systems = Systems {
            physics: &mut self.physics,
            graphics: &mut self.graphics,
        };
        self.tree.flush_requests(&mut systems);
        self.physics.prune(&self.tree);
        self.graphics.prune(&self.tree);

        self.physics.update(&mut self.tree);
        self.graphics.update(&self.tree, &self.sprites)?;
        self.graphics.draw()?;
        Ok(())
    }

    /// Drop every node and registration; the render target and sprites stay
    pub fn reset(&mut self) {
        self.tree = SceneTree::new();
        self.physics.clear();
        self.graphics.reset();
        self.scenes = SceneManager::new();
    }
}

/// Main engine struct
///
/// The engine coordinates all subsystems and manages the frame loop.
pub struct Engine {
    config: EngineConfig,
    world: World,
    tasks: TaskTracker<World>,
    scheduler: FrameScheduler,
    initial_load: Option<TaskId>,
    last_error: Option<String>,
}

impl Engine {
    /// Create a new engine instance
    pub fn new(
        config: EngineConfig,
        clock: Box<dyn Clock>,
        requester: Box<dyn FrameRequester>,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        logging::init(&config.dev);
        log::info!("Initializing engine...");

        let world = World::new(&config);
        let scheduler = FrameScheduler::new(clock, requester, config.game.frames_per_second);

        Ok(Self {
            config,
            world,
            tasks: TaskTracker::new(),
            scheduler,
            initial_load: None,
            last_error: None,
        })
    }

    /// Active configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Get the world
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Get mutable access to the world
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Get the task tracker
    pub fn tasks(&self) -> &TaskTracker<World> {
        &self.tasks
    }

    /// Get mutable access to the task tracker, e.g. to track sprite sheet loads
    pub fn tasks_mut(&mut self) -> &mut TaskTracker<World> {
        &mut self.tasks
    }

    /// Get the frame scheduler
    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    /// Attach the target that receives finished frames
    pub fn set_render_target(&mut self, target: impl RenderTarget + 'static) {
        self.world.graphics.sync_with_target(target);
    }

    /// Make a sprite sheet available to renderables
    pub fn add_sprite_sheet(&mut self, name: impl Into<String>, sheet: RgbaImage) {
        self.world.sprites.insert(name.into(), sheet);
    }

    /// Start loading the splash scene
    ///
    /// The load is tracked as the initial task; frames are skipped until it
    /// completes, at which point the scene is instantiated and activated.
    pub fn setup(&mut self, loader: &dyn SceneLoader) -> TaskId {
        let scene = self.config.game.splash_scene.clone();
        log::info!("Loading splash scene '{scene}'...");

        let id = self
            .tasks
            .register_task(loader.load_scene(&scene), move |blueprint, world: &mut World| {
                let root = world.tree.instantiate(blueprint);
                if let Err(err) = world.set_active_scene(root) {
                    log::error!("Failed to activate scene '{scene}': {err}");
                }
            });
        self.initial_load = Some(id);

        if self.config.dev.auto_start {
            self.start();
        }
        id
    }

    /// Whether the initial scene load has completed
    pub fn is_ready(&self) -> bool {
        self.initial_load.is_some_and(|id| !self.tasks.is_task_active(id))
    }

    /// Whether the frame loop is running
    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    /// Error that stopped the loop, if any
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Start the frame loop
    pub fn start(&mut self) -> Option<f64> {
        self.last_error = None;
        let elapsed = self.scheduler.start();
        if let Some(dt) = elapsed {
            self.on_frame(dt);
        }
        elapsed
    }

    /// Stop the frame loop; takes effect at the next tick
    pub fn stop(&mut self) {
        self.scheduler.stop();
    }

    /// Handle one animation callback from the platform
    ///
    /// Returns the elapsed milliseconds when a frame ran.
    pub fn tick(&mut self) -> Option<f64> {
        let dt = self.scheduler.tick()?;
        self.on_frame(dt);
        Some(dt)
    }

    /// Tear down the active scene
    pub fn teardown(&mut self) -> Result<(), EngineError> {
        self.world.teardown_active_scene()?;
        Ok(())
    }

    /// Stop, tear down, reset all state, then set up and start again
    pub fn restart(&mut self, loader: &dyn SceneLoader) -> Result<(), EngineError> {
        log::info!("Restarting engine...");

        self.stop();
        self.teardown()?;
        self.scheduler.reset();
        self.world.reset();
        self.tasks = TaskTracker::new();
        self.initial_load = None;
        self.last_error = None;

        self.setup(loader);
        if !self.is_running() {
            self.start();
        }
        Ok(())
    }

    /// Flip debug drawing; returns the new state
    pub fn toggle_debug_mode(&mut self) -> bool {
        let debug_mode = !self.config.dev.debug_mode;
        self.config.dev.debug_mode = debug_mode;
        self.world.graphics.set_debug_mode(debug_mode);
        log::info!("Debug mode {}", if debug_mode { "enabled" } else { "disabled" });
        debug_mode
    }

    fn on_frame(&mut self, dt: f64) {
        for event in self.tasks.poll(&mut self.world) {
            if let TaskEvent::Failed { id, error } = event {
                if Some(id) == self.initial_load {
                    let err = EngineError::TaskFailed { id, error };
                    log::error!("Initial scene load failed: {err}");
                    self.last_error = Some(err.to_string());
                }
            }
        }

        if !self.is_ready() {
            return;
        }

        if let Err(err) = self.world.update(dt) {
            log::error!("Frame failed, stopping: {err}");
            self.last_error = Some(err.to_string());
            self.scheduler.stop();
        }
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("world", &self.world)
            .field("tasks", &self.tasks)
            .field("scheduler", &self.scheduler)
            .field("initial_load", &self.initial_load)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::time::{CountingRequester, ManualClock};

    fn engine_with(config: EngineConfig) -> Result<Engine, EngineError> {
        Engine::new(config, Box::new(ManualClock::new(0.0)), Box::new(CountingRequester::new()))
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = EngineConfig::default();
        config.graphics.width = 0;
        assert!(matches!(engine_with(config), Err(EngineError::Config(_))));
    }

    #[test]
    fn test_not_ready_before_setup() {
        let engine = engine_with(EngineConfig::default()).unwrap();
        assert!(!engine.is_ready());
        assert!(!engine.is_running());
    }

    #[test]
    fn test_toggle_debug_mode() {
        let mut engine = engine_with(EngineConfig::default()).unwrap();
        assert!(engine.toggle_debug_mode());
        assert!(engine.world().graphics.debug_mode());
        assert!(!engine.toggle_debug_mode());
        assert!(!engine.config().dev.debug_mode);
    }

    #[test]
    fn test_error_messages() {
        let err = EngineError::from(RenderError::MissingCamera);
        assert_eq!(err.to_string(), "Render error: No active camera");
    }
}
