//! Software raster helpers
//!
//! Tiles and surfaces are straight-alpha RGBA images. Rotated tiles are drawn
//! by inverse mapping: each destination pixel center is rotated back into tile
//! space and sampled nearest-neighbour, then blended source-over.
//!
//! A node's tile can be far larger than the frame, so only a [`TileRegion`]
//! of it is ever rasterized: the window that can land on the surface.

use crate::foundation::math::{self, Vec2};
use image::{Rgba, RgbaImage};

/// Pixel data produced by a renderable
pub type RasterTile = RgbaImage;

/// Window into a node's full-size tile
///
/// The rasterized pixels cover `width × height` starting at (`x`, `y`) of a
/// tile that is `full_width × full_height` in total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRegion {
    /// Left column inside the full tile
    pub x: u32,
    /// Top row inside the full tile
    pub y: u32,
    /// Window width
    pub width: u32,
    /// Window height
    pub height: u32,
    /// Width of the full tile
    pub full_width: u32,
    /// Height of the full tile
    pub full_height: u32,
}

impl TileRegion {
    /// The whole tile
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
            full_width: width,
            full_height: height,
        }
    }

    /// Part of a `full_width × full_height` tile that can reach `surface`
    ///
    /// The tile's top-left sits at `position` and it turns by `rotation`
    /// around its center, as in [`draw_region`].
    pub fn visible_on(full_width: u32, full_height: u32, position: Vec2, rotation: f32, surface: Vec2) -> Self {
        if full_width == 0 || full_height == 0 {
            return Self::full(full_width, full_height);
        }

        let half = Vec2::new(full_width as f32, full_height as f32) / 2.0;
        let center = position + half;
        let corners = [
            Vec2::zeros(),
            Vec2::new(surface.x, 0.0),
            Vec2::new(0.0, surface.y),
            surface,
        ];

        let mut min = Vec2::new(f32::INFINITY, f32::INFINITY);
        let mut max = Vec2::new(f32::NEG_INFINITY, f32::NEG_INFINITY);
        for corner in corners {
            let source = math::rotate_point(corner - center, rotation) + half;
            min = min.inf(&source);
            max = max.sup(&source);
        }

        let clamp = |v: f32, limit: u32| if v.is_nan() { 0 } else { v.clamp(0.0, limit as f32) as u32 };
        let (x0, x1) = (clamp(min.x.floor(), full_width), clamp(max.x.ceil(), full_width));
        let (y0, y1) = (clamp(min.y.floor(), full_height), clamp(max.y.ceil(), full_height));

        Self {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
            full_width,
            full_height,
        }
    }

    /// Whether the window holds no pixels
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Whether the window covers the whole tile
    pub fn is_full(&self) -> bool {
        self.x == 0 && self.y == 0 && self.width == self.full_width && self.height == self.full_height
    }

    /// Full-tile coordinates of a window pixel
    fn to_full(self, x: u32, y: u32) -> (u32, u32) {
        (self.x + x, self.y + y)
    }
}

/// Blend `src` over `dst` (straight alpha)
pub fn blend_pixel(dst: &mut Rgba<u8>, src: Rgba<u8>) {
    let src_a = f32::from(src[3]) / 255.0;
    if src_a <= 0.0 {
        return;
    }
    if src_a >= 1.0 {
        *dst = src;
        return;
    }

    let dst_a = f32::from(dst[3]) / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);
    for channel in 0..3 {
        let s = f32::from(src[channel]) * src_a;
        let d = f32::from(dst[channel]) * dst_a * (1.0 - src_a);
        dst[channel] = ((s + d) / out_a).round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
}

/// Draw `tile` onto `surface` with its top-left at `position`, rotated by
/// `rotation` radians around the tile center
///
/// The tile turns the way a canvas `rotate(-rotation)` would.
pub fn draw_rotated(surface: &mut RgbaImage, tile: &RasterTile, position: Vec2, rotation: f32) {
    let (width, height) = tile.dimensions();
    draw_region(surface, tile, TileRegion::full(width, height), position, rotation);
}

/// Draw the `region` window of a tile; `pixels` holds exactly that window
///
/// `position` and `rotation` place the full tile, so a window lands where the
/// same pixels of the whole tile would.
pub fn draw_region(surface: &mut RgbaImage, pixels: &RasterTile, region: TileRegion, position: Vec2, rotation: f32) {
    if region.is_empty() || surface.width() == 0 || surface.height() == 0 {
        return;
    }
    debug_assert_eq!(pixels.dimensions(), (region.width, region.height));

    let half = Vec2::new(region.full_width as f32, region.full_height as f32) / 2.0;
    let center = position + half;
    let reach = half.norm();

    let min_x = (center.x - reach).floor().max(0.0) as u32;
    let min_y = (center.y - reach).floor().max(0.0) as u32;
    let max_x = (center.x + reach).ceil().min(surface.width() as f32);
    let max_y = (center.y + reach).ceil().min(surface.height() as f32);
    if max_x <= 0.0 || max_y <= 0.0 {
        return;
    }
    let (max_x, max_y) = (max_x as u32, max_y as u32);

    for y in min_y..max_y {
        for x in min_x..max_x {
            let destination = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
            let source = math::rotate_point(destination - center, rotation) + half;
            if source.x < 0.0 || source.y < 0.0 {
                continue;
            }
            let (sx, sy) = (source.x as u32, source.y as u32);
            if sx < region.x || sy < region.y || sx >= region.x + region.width || sy >= region.y + region.height {
                continue;
            }
            let texel = *pixels.get_pixel(sx - region.x, sy - region.y);
            blend_pixel(surface.get_pixel_mut(x, y), texel);
        }
    }
}

/// Solid tile of the given size
pub fn filled(width: u32, height: u32, color: Rgba<u8>) -> RasterTile {
    RgbaImage::from_pixel(width, height, color)
}

/// Fill the ellipse inscribed in the full tile, over the window `tile` holds
pub fn fill_ellipse(tile: &mut RasterTile, region: TileRegion, color: Rgba<u8>) {
    let (w, h) = (region.full_width, region.full_height);
    for (x, y, pixel) in tile.enumerate_pixels_mut() {
        let (fx, fy) = region.to_full(x, y);
        if inside_ellipse(w, h, fx, fy) {
            blend_pixel(pixel, color);
        }
    }
}

/// One-pixel border along the full tile edges
pub fn outline_rectangle(tile: &mut RasterTile, region: TileRegion, color: Rgba<u8>) {
    let (w, h) = (region.full_width, region.full_height);
    for (x, y, pixel) in tile.enumerate_pixels_mut() {
        let (fx, fy) = region.to_full(x, y);
        if fx == 0 || fy == 0 || fx + 1 == w || fy + 1 == h {
            blend_pixel(pixel, color);
        }
    }
}

/// One-pixel ring along the ellipse inscribed in the full tile
pub fn outline_ellipse(tile: &mut RasterTile, region: TileRegion, color: Rgba<u8>) {
    let (w, h) = (region.full_width, region.full_height);
    for (x, y, pixel) in tile.enumerate_pixels_mut() {
        let (fx, fy) = region.to_full(x, y);
        if !inside_ellipse(w, h, fx, fy) {
            continue;
        }
        let edge = fx == 0
            || fy == 0
            || !inside_ellipse(w, h, fx - 1, fy)
            || !inside_ellipse(w, h, fx, fy - 1)
            || fx + 1 >= w
            || fy + 1 >= h
            || !inside_ellipse(w, h, fx + 1, fy)
            || !inside_ellipse(w, h, fx, fy + 1);
        if edge {
            blend_pixel(pixel, color);
        }
    }
}

fn inside_ellipse(w: u32, h: u32, x: u32, y: u32) -> bool {
    let rx = w as f32 / 2.0;
    let ry = h as f32 / 2.0;
    let dx = (x as f32 + 0.5 - rx) / rx;
    let dy = (y as f32 + 0.5 - ry) / ry;
    dx * dx + dy * dy <= 1.0
}
