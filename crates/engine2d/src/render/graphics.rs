//! Layered 2D renderer
//!
//! Each frame runs in two steps:
//! - [`Graphics::update`] culls registered renderables against the active
//!   camera and queues a draw instruction per visible node
//! - [`Graphics::draw`] composites every layer in ascending order onto a
//!   transparent frame of the configured size and presents it
//!
//! Culling uses open-interval rectangle overlap, so a node whose box only
//! touches the camera edge is not drawn.

use crate::core::config::GraphicsConfig;
use crate::foundation::math::Vec2;
use crate::render::draw_queue::{DrawInstruction, DrawQueue};
use crate::render::raster::{self, TileRegion};
use crate::render::renderable::SpriteSource;
use crate::render::target::RenderTarget;
use crate::scene::node::NodeId;
use crate::scene::tree::{NodeRegistry, SceneTree};
use image::{imageops, RgbaImage};
use thiserror::Error;

/// Rendering errors
#[derive(Error, Debug)]
pub enum RenderError {
    /// No camera is set or the camera node is gone
    #[error("No active camera")]
    MissingCamera,

    /// No render target has been attached
    #[error("No render target attached")]
    MissingTarget,

    /// A sprite sheet is not available from the sprite source
    #[error("Sprite sheet not found: {0}")]
    MissingSprite(String),

    /// Nothing has been presented yet
    #[error("No frame has been presented")]
    NoFrame,

    /// The target rejected the frame
    #[error("Present failed: {0}")]
    Present(String),

    /// Image encoding or I/O failure
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Renderer state: registered nodes, camera, target and the frame's draw queue
pub struct Graphics {
    width: u32,
    height: u32,
    debug_mode: bool,
    camera: Option<NodeId>,
    nodes: Vec<NodeId>,
    target: Option<Box<dyn RenderTarget>>,
    draw_queue: DrawQueue,
}

impl Graphics {
    /// Create a renderer producing frames of the configured size
    pub fn new(config: &GraphicsConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            debug_mode: false,
            camera: None,
            nodes: Vec::new(),
            target: None,
            draw_queue: DrawQueue::new(),
        }
    }

    /// Frame width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Frame height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether shape outlines are drawn
    pub fn debug_mode(&self) -> bool {
        self.debug_mode
    }

    /// Enable or disable shape outlines
    pub fn set_debug_mode(&mut self, debug_mode: bool) {
        self.debug_mode = debug_mode;
    }

    /// Attach the target that receives finished frames
    pub fn sync_with_target(&mut self, target: impl RenderTarget + 'static) {
        self.target = Some(Box::new(target));
    }

    /// Whether a target is attached
    pub fn has_target(&self) -> bool {
        self.target.is_some()
    }

    /// Use `camera` for culling and positioning
    pub fn set_camera(&mut self, camera: NodeId) {
        self.camera = Some(camera);
    }

    /// Active camera
    pub fn camera(&self) -> Option<NodeId> {
        self.camera
    }

    /// Register a renderable node; returns false if it was already registered
    pub fn register_node(&mut self, id: NodeId) -> bool {
        if self.nodes.contains(&id) {
            return false;
        }
        self.nodes.push(id);
        true
    }

    /// Deregister a renderable node; returns false if it was not registered
    pub fn deregister_node(&mut self, id: NodeId) -> bool {
        let before = self.nodes.len();
        self.nodes.retain(|&n| n != id);
        self.nodes.len() != before
    }

    /// Registered nodes in registration order
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Queued instructions for the current frame
    pub fn draw_queue(&self) -> &DrawQueue {
        &self.draw_queue
    }

    /// Registered nodes that are globally visible and inside the camera view
    pub fn visible_nodes(&self, tree: &SceneTree) -> Result<Vec<NodeId>, RenderError> {
        let view = self
            .camera
            .and_then(|camera| tree.camera_rectangle(camera))
            .ok_or(RenderError::MissingCamera)?;

        Ok(self
            .nodes
            .iter()
            .copied()
            .filter(|&id| tree.global_visible(id))
            .filter(|&id| tree.bounding_box(id).is_some_and(|bbox| bbox.overlaps_rectangle(&view)))
            .collect())
    }

    /// Build this frame's draw queue
    ///
    /// The queue is rebuilt from scratch: on error it is left empty. Only the
    /// part of each tile that can land on the frame is rasterized.
    pub fn update(&mut self, tree: &SceneTree, sprites: &dyn SpriteSource) -> Result<(), RenderError> {
        self.draw_queue.clear();
        let camera = self.camera.ok_or(RenderError::MissingCamera)?;
        let frame = Vec2::new(self.width as f32, self.height as f32);

        let mut instructions = Vec::new();
        for id in self.visible_nodes(tree)? {
            let position = tree.relative_position(camera, tree.global_position(id));
            let rotation = tree.global_rotation(id);
            let (width, height) = tree.tile_size(id);
            let region = TileRegion::visible_on(width, height, position, rotation.x, frame);

            instructions.push(DrawInstruction {
                tile: tree.render_region(id, sprites, self.debug_mode, region)?,
                region,
                position,
                rotation,
                layer: tree.global_layer(id),
            });
        }

        for instruction in instructions {
            self.draw_queue.push(instruction);
        }
        Ok(())
    }

    /// Composite the queued layers, present the frame and clear the queue
    pub fn draw(&mut self) -> Result<(), RenderError> {
        let target = self.target.as_mut().ok_or(RenderError::MissingTarget)?;

        let mut frame = RgbaImage::new(self.width, self.height);
        for (_, batch) in self.draw_queue.layers() {
            let mut surface = RgbaImage::new(self.width, self.height);
            for instruction in batch {
                raster::draw_region(
                    &mut surface,
                    &instruction.tile,
                    instruction.region,
                    instruction.position,
                    instruction.rotation.x,
                );
            }
            imageops::overlay(&mut frame, &surface, 0, 0);
        }

        target.present(&frame)?;
        self.draw_queue.clear();
        Ok(())
    }

    /// Drop queued instructions without presenting
    pub fn clear(&mut self) {
        self.draw_queue.clear();
    }

    /// Drop registrations (and the camera) of nodes that no longer exist
    pub fn prune(&mut self, tree: &SceneTree) {
        self.nodes.retain(|&id| tree.contains(id));
        if self.camera.is_some_and(|camera| !tree.contains(camera)) {
            self.camera = None;
        }
    }

    /// Forget every node and the camera; the target and settings stay
    pub fn reset(&mut self) {
        self.nodes.clear();
        self.camera = None;
        self.draw_queue.clear();
    }
}

impl NodeRegistry for Graphics {
    fn register(&mut self, tree: &SceneTree, id: NodeId) {
        let Some(node) = tree.get(id) else {
            return;
        };
        if node.is_renderable() {
            self.register_node(id);
        }
        if node.is_camera() && self.camera.is_none() {
            log::debug!("Adopting camera {id:?}");
            self.camera = Some(id);
        }
    }

    fn deregister(&mut self, _tree: &SceneTree, id: NodeId) {
        self.deregister_node(id);
        if self.camera == Some(id) {
            self.camera = None;
        }
    }
}

impl std::fmt::Debug for Graphics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graphics")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("debug_mode", &self.debug_mode)
            .field("camera", &self.camera)
            .field("nodes", &self.nodes.len())
            .field("has_target", &self.target.is_some())
            .field("queued", &self.draw_queue.len())
            .finish()
    }
}
