//! # Rendering System
//!
//! Software 2D renderer. Renderable nodes are culled against the active
//! camera, rasterized into tiles, grouped by layer and composited into a
//! single RGBA frame that is handed to a [`RenderTarget`].
//!
//! ## Architecture
//!
//! - **Camera**: view rectangle and camera-relative positioning
//! - **Renderable**: visibility, layer, sprite or shape styling of a node
//! - **Draw Queue**: per-frame instructions grouped by layer
//! - **Raster**: rotated blits and source-over blending
//! - **Graphics**: registration, culling, compositing and present
//! - **Target**: where finished frames go

pub mod camera;
pub mod draw_queue;
pub mod graphics;
pub mod raster;
pub mod renderable;
pub mod target;

pub use camera::Camera;
pub use draw_queue::{DrawInstruction, DrawQueue};
pub use graphics::{Graphics, RenderError};
pub use raster::{RasterTile, TileRegion};
pub use renderable::{Renderable, ShapeStyle, Sprite, SpriteSource};
pub use target::{ImageTarget, RenderTarget};
