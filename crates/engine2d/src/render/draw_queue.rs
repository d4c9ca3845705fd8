//! Draw queue for layered rendering
//!
//! Collects one frame's draw instructions grouped by layer. Layers iterate in
//! ascending numeric order (negative layers first); instructions keep their
//! push order within a layer.

use crate::foundation::math::Vec2;
use crate::render::raster::{RasterTile, TileRegion};
use std::collections::BTreeMap;

/// One tile to composite this frame
#[derive(Debug, Clone)]
pub struct DrawInstruction {
    /// Rendered pixels of `region`
    pub tile: RasterTile,
    /// Window of the node's full tile that `tile` holds
    pub region: TileRegion,
    /// Top-left corner of the full tile, relative to the camera
    pub position: Vec2,
    /// Global rotation; `rotation.x` is the drawing angle
    pub rotation: Vec2,
    /// Global layer
    pub layer: i32,
}

/// Layer-grouped draw instructions for a frame
#[derive(Debug, Default)]
pub struct DrawQueue {
    layers: BTreeMap<i32, Vec<DrawInstruction>>,
}

impl DrawQueue {
    /// Create an empty draw queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an instruction to its layer
    pub fn push(&mut self, instruction: DrawInstruction) {
        self.layers.entry(instruction.layer).or_default().push(instruction);
    }

    /// Layers in ascending order with their instructions
    pub fn layers(&self) -> impl Iterator<Item = (i32, &[DrawInstruction])> {
        self.layers.iter().map(|(layer, batch)| (*layer, batch.as_slice()))
    }

    /// Total number of instructions
    pub fn len(&self) -> usize {
        self.layers.values().map(Vec::len).sum()
    }

    /// Whether the queue holds no instructions
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Number of distinct layers
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Drop every instruction
    pub fn clear(&mut self) {
        self.layers.clear();
    }
}
