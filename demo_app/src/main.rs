//! Bubbles demo
//!
//! Loads a small underwater scene, runs the engine headless on the system
//! clock for a fixed number of ticks and writes the last frame to a PNG.
//!
//! Usage: `bubbles_demo [config.toml|config.ron] [output.png]`

use engine2d::physics::Collider;
use engine2d::prelude::*;
use engine2d::render::RenderError;
use engine2d::scene::FpsReading;
use futures::future::{self, FutureExt, LocalBoxFuture};
use image::Rgba;
use std::time::Duration;
use thiserror::Error;

const TICKS: u32 = 240;
const SURFACE_HEIGHT: f32 = 24.0;

#[derive(Error, Debug)]
enum DemoError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("engine stopped: {0}")]
    Stopped(String),
}

/// Spawns a rising bubble at a fixed interval
struct BubbleSpawner {
    width: f32,
    height: f32,
    interval: f64,
    elapsed: f64,
    spawned: u32,
}

impl BubbleSpawner {
    fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            interval: 250.0,
            elapsed: 0.0,
            spawned: 0,
        }
    }

    fn spawn_bubble(&mut self, tree: &mut SceneTree, parent: NodeId) {
        // Spread bubbles across the floor without a random source
        let column = (self.spawned * 37) % 8;
        let x = self.width * (column as f32 + 0.5) / 8.0;
        let radius = 4.0 + (self.spawned % 3) as f32 * 2.0;
        self.spawned += 1;

        let bubble = tree.spawn(
            Node::named(format!("bubble-{}", self.spawned))
                .with_transform(Transform2D::at(Vec2::new(x, self.height - radius)))
                .with_shape(ShapeKind::Circle { radius })
                .with_renderable(
                    Renderable::new()
                        .with_layer(1)
                        .with_fill(Rgba([180, 220, 255, 160]))
                        .with_outline(Rgba([230, 245, 255, 255])),
                )
                .with_script(VelocityScript::new(Vec2::new(0.0, -0.06)))
                .with_script(PopAtSurface),
        );
        let hitbox = tree.spawn(Node::named("hitbox").with_collider(Collider::new().on_collision(pop)));

        let attached = tree.add_child(bubble, hitbox).and_then(|()| tree.add_child(parent, bubble));
        match attached {
            Ok(()) => tree.request_setup(bubble),
            Err(err) => log::warn!("Dropping bubble: {err}"),
        }
    }
}

impl Script for BubbleSpawner {
    fn on_update(&mut self, tree: &mut SceneTree, node: NodeId, dt: f64) {
        self.elapsed += dt;
        while self.elapsed >= self.interval {
            self.elapsed -= self.interval;
            self.spawn_bubble(tree, node);
        }
    }
}

/// Bursts a bubble once it reaches the surface
struct PopAtSurface;

impl Script for PopAtSurface {
    fn on_update(&mut self, tree: &mut SceneTree, node: NodeId, _dt: f64) {
        if tree.global_position(node).y <= SURFACE_HEIGHT {
            tree.request_teardown(node);
        }
    }
}

/// Touching bubbles burst each other
fn pop(tree: &mut SceneTree, event: CollisionEvent) {
    if let Some(bubble) = tree.parent(event.node) {
        log::debug!("{} popped", tree.get(bubble).map_or("bubble", |n| n.name()));
        tree.request_teardown(bubble);
    }
}

struct DeepSea {
    width: f32,
    height: f32,
    fps: FpsReading,
}

impl DeepSea {
    fn blueprint(&self) -> NodeBlueprint {
        let camera = Node::named("camera")
            .with_transform(Transform2D::default())
            .with_camera(Camera::new(Vec2::new(self.width, self.height)));

        let water = Node::named("water")
            .with_transform(Transform2D::default())
            .with_shape(ShapeKind::Rectangle {
                size: Vec2::new(self.width, self.height),
            })
            .with_renderable(Renderable::new().with_layer(-1).with_fill(Rgba([8, 40, 90, 255])));

        let surface = Node::named("surface")
            .with_transform(Transform2D::default())
            .with_shape(ShapeKind::Rectangle {
                size: Vec2::new(self.width, SURFACE_HEIGHT),
            })
            .with_renderable(Renderable::new().with_layer(2).with_fill(Rgba([40, 110, 170, 255])));

        let fps_counter = Node::named("fps").with_script(FpsCounterScript::with_reading(self.fps.clone()));

        let root = Node::named("DeepSea")
            .with_transform(Transform2D::default())
            .with_script(BubbleSpawner::new(self.width, self.height));

        NodeBlueprint::new(root)
            .with_child(NodeBlueprint::new(camera))
            .with_child(NodeBlueprint::new(water))
            .with_child(NodeBlueprint::new(surface))
            .with_child(NodeBlueprint::new(fps_counter))
    }
}

impl SceneLoader for DeepSea {
    fn load_scene(&self, name: &str) -> LocalBoxFuture<'static, Result<NodeBlueprint, LoadError>> {
        let result = if name == "DeepSea" {
            Ok(self.blueprint())
        } else {
            Err(LoadError::NotFound(name.to_string()))
        };
        future::ready(result).boxed_local()
    }
}

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), DemoError> {
    let mut args = std::env::args().skip(1);
    let mut config = match args.next() {
        Some(path) => EngineConfig::load_from_file(path)?,
        None => EngineConfig::default(),
    };
    let output = args.next().unwrap_or_else(|| "bubbles.png".to_string());

    config.game.splash_scene = "DeepSea".to_string();
    config.graphics.width = config.graphics.width.min(640);
    config.graphics.height = config.graphics.height.min(360);
    let frame_interval = Duration::from_secs_f64(config.game.frame_interval() / 1000.0);

    let loader = DeepSea {
        width: config.graphics.width as f32,
        height: config.graphics.height as f32,
        fps: FpsReading::default(),
    };

    let mut engine = Engine::new(config, Box::new(SystemClock::new()), Box::new(CountingRequester::new()))?;
    let target = ImageTarget::new();
    engine.set_render_target(target.clone());
    engine.setup(&loader);
    if !engine.is_running() {
        engine.start();
    }

    let mut frames = 0;
    for _ in 0..TICKS {
        if engine.tick().is_some() {
            frames += 1;
        }
        if !engine.is_running() {
            let reason = engine.last_error().unwrap_or("stopped").to_string();
            return Err(DemoError::Stopped(reason));
        }
        std::thread::sleep(frame_interval / 2);
    }

    engine.stop();
    engine.teardown()?;
    log::info!(
        "Ran {frames} frames, presented {}, last rate {} fps",
        target.frames_presented(),
        loader.fps.get()
    );

    target.save_png(&output)?;
    println!("Saved {output}");
    Ok(())
}
