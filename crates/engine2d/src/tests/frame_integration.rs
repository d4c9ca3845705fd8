//! Integration tests for the per-frame pipeline
//!
//! Scene load → readiness gate → update → collision → render, driven through
//! the public engine API.

use crate::core::config::{EngineConfig, GraphicsConfig};
use crate::foundation::math::Vec2;
use crate::foundation::time::{CountingRequester, ManualClock};
use crate::physics::collider::Collider;
use crate::physics::shapes::ShapeKind;
use crate::render::camera::Camera;
use crate::render::renderable::Renderable;
use crate::render::target::ImageTarget;
use crate::scene::blueprint::{LoadError, NodeBlueprint, SceneLoader};
use crate::scene::node::{Node, NodeId};
use crate::scene::script::{Script, VelocityScript};
use crate::scene::transform::Transform2D;
use crate::scene::tree::SceneTree;
use crate::Engine;
use approx::assert_relative_eq;
use futures::channel::oneshot;
use futures::future::{self, FutureExt, LocalBoxFuture};
use image::Rgba;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
const FRAME: f64 = 20.0;

fn test_config() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.graphics = GraphicsConfig { width: 40, height: 30 };
    config
}

fn camera_blueprint(config: &EngineConfig) -> NodeBlueprint {
    NodeBlueprint::new(
        Node::named("camera")
            .with_transform(Transform2D::default())
            .with_camera(Camera::from_config(&config.graphics)),
    )
}

fn red_box(name: &str, at: Vec2, size: f32) -> Node {
    Node::named(name)
        .with_transform(Transform2D::at(at))
        .with_shape(ShapeKind::Rectangle {
            size: Vec2::new(size, size),
        })
        .with_renderable(Renderable::new().with_fill(RED))
}

/// Loader that hands out a freshly built blueprint per request
struct ReadyLoader<F: Fn() -> NodeBlueprint> {
    build: F,
    requests: Cell<u32>,
}

impl<F: Fn() -> NodeBlueprint> ReadyLoader<F> {
    fn new(build: F) -> Self {
        Self {
            build,
            requests: Cell::new(0),
        }
    }
}

impl<F: Fn() -> NodeBlueprint> SceneLoader for ReadyLoader<F> {
    fn load_scene(&self, _name: &str) -> LocalBoxFuture<'static, Result<NodeBlueprint, LoadError>> {
        self.requests.set(self.requests.get() + 1);
        future::ready(Ok((self.build)())).boxed_local()
    }
}

/// Loader whose scene arrives when the test sends it
struct ChannelLoader {
    receiver: RefCell<Option<oneshot::Receiver<NodeBlueprint>>>,
}

impl SceneLoader for ChannelLoader {
    fn load_scene(&self, name: &str) -> LocalBoxFuture<'static, Result<NodeBlueprint, LoadError>> {
        let name = name.to_string();
        match self.receiver.borrow_mut().take() {
            Some(receiver) => receiver
                .map(move |result| result.map_err(|_| LoadError::NotFound(name)))
                .boxed_local(),
            None => future::ready(Err(LoadError::NotFound(name))).boxed_local(),
        }
    }
}

/// Loader that always fails
struct FailingLoader;

impl SceneLoader for FailingLoader {
    fn load_scene(&self, name: &str) -> LocalBoxFuture<'static, Result<NodeBlueprint, LoadError>> {
        future::ready(Err(LoadError::Failed {
            scene: name.to_string(),
            reason: "sprite sheet missing".to_string(),
        }))
        .boxed_local()
    }
}

fn engine(config: EngineConfig) -> (Engine, ManualClock, ImageTarget) {
    let clock = ManualClock::new(0.0);
    let target = ImageTarget::new();
    let mut engine = Engine::new(config, Box::new(clock.clone()), Box::new(CountingRequester::new())).unwrap();
    engine.set_render_target(target.clone());
    (engine, clock, target)
}

fn find(tree: &SceneTree, root: NodeId, name: &str) -> Option<NodeId> {
    let mut found = None;
    tree.traverse_to_leaves(root, |id, node| {
        if found.is_none() && node.name() == name {
            found = Some(id);
        }
    });
    found
}

#[test]
fn test_full_frame_renders_scene() {
    let config = test_config();
    let scene_config = config.clone();
    let loader = ReadyLoader::new(move || {
        NodeBlueprint::new(Node::named("Splash"))
            .with_child(camera_blueprint(&scene_config))
            .with_child(NodeBlueprint::new(red_box("box", Vec2::new(5.0, 5.0), 10.0)))
    });
    let (mut engine, clock, target) = engine(config);

    engine.setup(&loader);
    assert_eq!(engine.start(), None);

    clock.advance(FRAME);
    assert!(engine.tick().is_some());

    assert!(engine.is_ready());
    assert_eq!(target.frames_presented(), 1);
    let frame = target.last_frame().unwrap();
    assert_eq!(frame.dimensions(), (40, 30));
    assert_eq!(*frame.get_pixel(6, 6), RED);
    assert_eq!(frame.get_pixel(20, 20)[3], 0);
}

#[test]
fn test_camera_movement_shifts_output() {
    let config = test_config();
    let scene_config = config.clone();
    let loader = ReadyLoader::new(move || {
        NodeBlueprint::new(Node::named("Splash"))
            .with_child(camera_blueprint(&scene_config))
            .with_child(NodeBlueprint::new(red_box("box", Vec2::new(10.0, 10.0), 4.0)))
    });
    let (mut engine, clock, target) = engine(config);
    engine.setup(&loader);
    engine.start();
    clock.advance(FRAME);
    engine.tick();

    let world = engine.world_mut();
    let root = world.scenes.active_scene().unwrap();
    let camera = find(&world.tree, root, "camera").unwrap();
    world.tree.transform_mut(camera).unwrap().move_by(Vec2::new(5.0, 5.0));

    clock.advance(FRAME);
    engine.tick();

    let frame = target.last_frame().unwrap();
    assert_eq!(*frame.get_pixel(5, 5), RED);
    assert_eq!(frame.get_pixel(11, 11)[3], 0);
}

#[test]
fn test_readiness_gate_waits_for_scene() {
    let config = test_config();
    let (sender, receiver) = oneshot::channel();
    let loader = ChannelLoader {
        receiver: RefCell::new(Some(receiver)),
    };
    let (mut engine, clock, target) = engine(config.clone());

    let load = engine.setup(&loader);
    engine.start();
    for _ in 0..3 {
        clock.advance(FRAME);
        assert!(engine.tick().is_some());
    }

    assert!(engine.tasks().is_task_active(load));
    assert!(!engine.is_ready());
    assert_eq!(target.frames_presented(), 0);

    sender
        .send(NodeBlueprint::new(Node::named("Splash")).with_child(camera_blueprint(&config)))
        .unwrap();
    clock.advance(FRAME);
    engine.tick();

    assert!(engine.is_ready());
    assert!(!engine.tasks().is_task_active(load));
    assert_eq!(target.frames_presented(), 1);
}

#[test]
fn test_failed_load_keeps_gate_closed() {
    let (mut engine, clock, target) = engine(test_config());

    let load = engine.setup(&FailingLoader);
    engine.start();
    clock.advance(FRAME);
    engine.tick();

    assert!(!engine.is_ready());
    assert!(engine.is_running());
    assert_eq!(
        engine.tasks().task_error(load),
        Some("Failed to load scene 'SplashScene': sprite sheet missing")
    );
    assert!(engine.last_error().is_some());
    assert_eq!(target.frames_presented(), 0);
}

#[test]
fn test_frame_error_stops_loop() {
    let loader = ReadyLoader::new(|| NodeBlueprint::new(red_box("no camera here", Vec2::zeros(), 5.0)));
    let (mut engine, clock, target) = engine(test_config());

    engine.setup(&loader);
    engine.start();
    clock.advance(FRAME);
    engine.tick();

    assert!(!engine.is_running());
    assert_eq!(engine.last_error(), Some("Render error: No active camera"));
    assert_eq!(target.frames_presented(), 0);

    clock.advance(FRAME);
    assert_eq!(engine.tick(), None);
}

#[test]
fn test_update_runs_before_collision() {
    let contacts = Rc::new(Cell::new(0_u32));
    let config = test_config();
    let scene_config = config.clone();
    let sink = Rc::clone(&contacts);
    let loader = ReadyLoader::new(move || {
        let counter = Rc::clone(&sink);
        let mover = NodeBlueprint::new(
            red_box("mover", Vec2::new(0.0, 0.0), 4.0).with_script(VelocityScript::new(Vec2::new(0.25, 0.0))),
        )
        .with_child(NodeBlueprint::new(
            Node::named("mover-hitbox")
                .with_collider(Collider::new().on_collision(move |_, _| counter.set(counter.get() + 1))),
        ));
        let wall = NodeBlueprint::new(red_box("wall", Vec2::new(8.0, 0.0), 4.0))
            .with_child(NodeBlueprint::new(Node::named("wall-hitbox").with_collider(Collider::new())));

        NodeBlueprint::new(Node::named("Splash"))
            .with_child(camera_blueprint(&scene_config))
            .with_child(mover)
            .with_child(wall)
    });
    let (mut engine, clock, _target) = engine(config);
    engine.setup(&loader);
    engine.start();

    // 20ms at 0.25 px/ms moves the mover 5px: [5, 9) overlaps the wall at [8, 12)
    clock.advance(FRAME);
    engine.tick();

    assert_eq!(contacts.get(), 1);
    let world = engine.world();
    let root = world.scenes.active_scene().unwrap();
    let mover = find(&world.tree, root, "mover").unwrap();
    assert_relative_eq!(world.tree.global_position(mover).x, 5.0);
    assert_eq!(world.physics.nodes().len(), 2);
}

#[test]
fn test_script_spawned_nodes_join_systems() {
    struct Spawner {
        spawned: bool,
    }

    impl Script for Spawner {
        fn on_update(&mut self, tree: &mut SceneTree, node: NodeId, _dt: f64) {
            if self.spawned {
                return;
            }
            self.spawned = true;
            let child = tree.spawn(red_box("spawned", Vec2::new(20.0, 20.0), 4.0));
            let _ = tree.add_child(node, child);
            tree.request_setup(child);
        }
    }

    let config = test_config();
    let scene_config = config.clone();
    let loader = ReadyLoader::new(move || {
        NodeBlueprint::new(Node::named("Splash").with_script(Spawner { spawned: false }))
            .with_child(camera_blueprint(&scene_config))
    });
    let (mut engine, clock, target) = engine(config);
    engine.setup(&loader);
    engine.start();
    clock.advance(FRAME);
    engine.tick();

    assert_eq!(engine.world().graphics.nodes().len(), 1);
    assert_eq!(*target.last_frame().unwrap().get_pixel(21, 21), RED);
}

#[test]
fn test_restart_reloads_scene() {
    let config = test_config();
    let scene_config = config.clone();
    let loader = ReadyLoader::new(move || {
        NodeBlueprint::new(Node::named("Splash"))
            .with_child(camera_blueprint(&scene_config))
            .with_child(NodeBlueprint::new(red_box("box", Vec2::new(1.0, 1.0), 3.0)))
    });
    let (mut engine, clock, target) = engine(config);
    engine.setup(&loader);
    engine.start();
    clock.advance(FRAME);
    engine.tick();
    assert_eq!(target.frames_presented(), 1);

    engine.restart(&loader).unwrap();
    assert!(engine.is_running());
    assert!(!engine.is_ready());

    clock.advance(FRAME);
    engine.tick();

    let world = engine.world();
    assert!(engine.is_ready());
    assert_eq!(loader.requests.get(), 2);
    assert_eq!(world.tree.len(), 3);
    assert_eq!(world.graphics.nodes().len(), 1);
    assert_eq!(target.frames_presented(), 2);
}

#[test]
fn test_debug_mode_outlines_shapes() {
    let mut config = test_config();
    config.dev.debug_mode = true;
    let scene_config = config.clone();
    let loader = ReadyLoader::new(move || {
        let outline_only = Node::named("outline")
            .with_transform(Transform2D::at(Vec2::new(2.0, 2.0)))
            .with_shape(ShapeKind::Rectangle {
                size: Vec2::new(6.0, 6.0),
            })
            .with_renderable(Renderable::new());
        NodeBlueprint::new(Node::named("Splash"))
            .with_child(camera_blueprint(&scene_config))
            .with_child(NodeBlueprint::new(outline_only))
    });
    let (mut engine, clock, target) = engine(config);
    engine.setup(&loader);
    engine.start();
    clock.advance(FRAME);
    engine.tick();

    let frame = target.last_frame().unwrap();
    assert_eq!(frame.get_pixel(2, 2)[3], 255);
    assert_eq!(frame.get_pixel(4, 4)[3], 0);

    engine.toggle_debug_mode();
    clock.advance(FRAME);
    engine.tick();
    assert_eq!(target.last_frame().unwrap().get_pixel(2, 2)[3], 0);
}
