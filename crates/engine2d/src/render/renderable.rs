//! Renderable component
//!
//! A renderable node draws either a sprite (a rectangle cut from a named
//! sprite sheet) or its own shape. Visibility and layer are inherited: a node
//! is drawn only if it and every renderable ancestor is visible, and its layer
//! is the sum of all renderable layers on its ancestor chain.

use crate::foundation::math::{self, Vec2};
use crate::physics::shapes::{Rectangle, ShapeKind};
use crate::render::graphics::RenderError;
use crate::render::raster::{self, RasterTile, TileRegion};
use crate::scene::node::NodeId;
use crate::scene::tree::SceneTree;
use image::imageops;
use image::{GenericImageView, Rgba, RgbaImage};
use std::collections::HashMap;

/// Supplies sprite sheets by name
pub trait SpriteSource {
    /// Look up a loaded sheet
    fn sprite_sheet(&self, name: &str) -> Option<&RgbaImage>;
}

impl SpriteSource for HashMap<String, RgbaImage> {
    fn sprite_sheet(&self, name: &str) -> Option<&RgbaImage> {
        self.get(name)
    }
}

/// A region of a sprite sheet
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    /// Sheet name passed to the [`SpriteSource`]
    pub sheet: String,
    /// Source rectangle in sheet pixels
    pub source: Rectangle,
}

impl Sprite {
    /// Create a sprite from a sheet region
    pub fn new(sheet: impl Into<String>, source: Rectangle) -> Self {
        Self {
            sheet: sheet.into(),
            source,
        }
    }
}

/// Colours used when a shape draws itself
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeStyle {
    /// Interior colour, `None` leaves it transparent
    pub fill: Option<Rgba<u8>>,
    /// Outline colour, drawn in debug mode
    pub outline: Rgba<u8>,
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            fill: None,
            outline: Rgba([0, 0, 0, 255]),
        }
    }
}

/// Drawing state of a node
#[derive(Debug, Clone, PartialEq)]
pub struct Renderable {
    /// Local visibility flag
    pub visible: bool,
    /// Local layer, added to the ancestors' layers
    pub layer: i32,
    /// Sprite to draw instead of the node's shape
    pub sprite: Option<Sprite>,
    /// Shape colours
    pub style: ShapeStyle,
}

impl Renderable {
    /// Visible renderable on layer 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pattern: set the layer
    pub fn with_layer(mut self, layer: i32) -> Self {
        self.layer = layer;
        self
    }

    /// Builder pattern: set the visibility
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Builder pattern: draw a sprite
    pub fn with_sprite(mut self, sprite: Sprite) -> Self {
        self.sprite = Some(sprite);
        self
    }

    /// Builder pattern: fill the shape
    pub fn with_fill(mut self, color: Rgba<u8>) -> Self {
        self.style.fill = Some(color);
        self
    }

    /// Builder pattern: set the debug outline colour
    pub fn with_outline(mut self, color: Rgba<u8>) -> Self {
        self.style.outline = color;
        self
    }
}

impl Default for Renderable {
    fn default() -> Self {
        Self {
            visible: true,
            layer: 0,
            sprite: None,
            style: ShapeStyle::default(),
        }
    }
}

impl SceneTree {
    /// Whether the node and every renderable ancestor is visible
    pub fn global_visible(&self, id: NodeId) -> bool {
        if !self.contains(id) {
            return false;
        }
        let own = self.get(id).and_then(|n| n.renderable.as_ref()).map_or(true, |r| r.visible);
        let mut visible = own;
        self.traverse_to_root(id, |_, node| {
            if let Some(renderable) = node.renderable.as_ref() {
                visible &= renderable.visible;
            }
        });
        visible
    }

    /// Sum of the layers of the node and its renderable ancestors
    pub fn global_layer(&self, id: NodeId) -> i32 {
        let mut layer = self.get(id).and_then(|n| n.renderable.as_ref()).map_or(0, |r| r.layer);
        self.traverse_to_root(id, |_, node| {
            if let Some(renderable) = node.renderable.as_ref() {
                layer += renderable.layer;
            }
        });
        layer
    }

    /// World-space box used for culling and as the tile size
    ///
    /// The box starts at the node's global position and spans the scaled base
    /// size: the sprite's source size if any, else the shape's extent.
    pub fn bounding_box(&self, id: NodeId) -> Option<Rectangle> {
        let node = self.get(id)?;
        let base = match (node.renderable.as_ref().and_then(|r| r.sprite.as_ref()), node.shape) {
            (Some(sprite), _) => sprite.source.size,
            (None, Some(shape)) => shape.base_size(),
            (None, None) => math::zero(),
        };
        Some(Rectangle::new(
            self.global_position(id),
            self.global_scale(id).component_mul(&base),
        ))
    }

    /// Full tile size of a node in pixels: its bounding box, rounded
    pub fn tile_size(&self, id: NodeId) -> (u32, u32) {
        tile_dimensions(self.bounding_box(id).map_or(math::zero(), |b| b.size))
    }

    /// Rasterize a renderable node at its scaled size
    pub fn render_tile(
        &self,
        id: NodeId,
        sprites: &dyn SpriteSource,
        debug_mode: bool,
    ) -> Result<RasterTile, RenderError> {
        let (width, height) = self.tile_size(id);
        self.render_region(id, sprites, debug_mode, TileRegion::full(width, height))
    }

    /// Rasterize only the `region` window of a node's tile
    ///
    /// The returned image is `region.width × region.height`; pixels match the
    /// same window of [`render_tile`](Self::render_tile).
    pub fn render_region(
        &self,
        id: NodeId,
        sprites: &dyn SpriteSource,
        debug_mode: bool,
        region: TileRegion,
    ) -> Result<RasterTile, RenderError> {
        let Some(node) = self.get(id) else {
            return Ok(RasterTile::new(0, 0));
        };
        let Some(renderable) = node.renderable.as_ref() else {
            return Ok(RasterTile::new(0, 0));
        };

        if let Some(sprite) = renderable.sprite.as_ref() {
            return render_sprite(sprite, sprites, region);
        }

        let mut tile = RasterTile::new(region.width, region.height);
        if region.is_empty() {
            return Ok(tile);
        }
        match node.shape {
            Some(ShapeKind::Circle { .. }) => {
                if let Some(fill) = renderable.style.fill {
                    raster::fill_ellipse(&mut tile, region, fill);
                }
                if debug_mode {
                    raster::outline_ellipse(&mut tile, region, renderable.style.outline);
                }
            }
            Some(ShapeKind::Rectangle { .. }) => {
                if let Some(fill) = renderable.style.fill {
                    tile = raster::filled(region.width, region.height, fill);
                }
                if debug_mode {
                    raster::outline_rectangle(&mut tile, region, renderable.style.outline);
                }
            }
            None => {}
        }
        Ok(tile)
    }
}

fn tile_dimensions(size: Vec2) -> (u32, u32) {
    let side = |v: f32| if v.is_finite() && v > 0.0 { v.round() as u32 } else { 0 };
    (side(size.x), side(size.y))
}

/// Nearest-neighbour scale of the sprite's source rectangle, sampled only
/// over `region`
fn render_sprite(sprite: &Sprite, sprites: &dyn SpriteSource, region: TileRegion) -> Result<RasterTile, RenderError> {
    let sheet = sprites
        .sprite_sheet(&sprite.sheet)
        .ok_or_else(|| RenderError::MissingSprite(sprite.sheet.clone()))?;

    let (x, y) = tile_dimensions(sprite.source.position);
    let (w, h) = tile_dimensions(sprite.source.size);
    let source = imageops::crop_imm(sheet, x, y, w, h);
    let (source_w, source_h) = source.dimensions();

    let mut tile = RasterTile::new(region.width, region.height);
    if region.is_empty() || source_w == 0 || source_h == 0 {
        return Ok(tile);
    }

    let nearest = |full: u32, full_size: u32, source_size: u32| {
        let scaled = (f64::from(full) + 0.5) * f64::from(source_size) / f64::from(full_size);
        (scaled as u32).min(source_size - 1)
    };
    for (px, py, pixel) in tile.enumerate_pixels_mut() {
        let sx = nearest(region.x + px, region.full_width, source_w);
        let sy = nearest(region.y + py, region.full_height, source_h);
        *pixel = source.get_pixel(sx, sy);
    }
    Ok(tile)
}
