//! Presentation targets
//!
//! The renderer composites each frame in memory and hands the result to a
//! [`RenderTarget`]. Window or canvas back ends implement the trait outside
//! this crate; [`ImageTarget`] keeps frames in memory for tools and tests.

use crate::render::graphics::RenderError;
use image::{ImageFormat, RgbaImage};
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

/// Receives composited frames
pub trait RenderTarget {
    /// Show a finished frame
    fn present(&mut self, frame: &RgbaImage) -> Result<(), RenderError>;
}

#[derive(Debug, Default)]
struct ImageTargetState {
    last_frame: Option<RgbaImage>,
    frames_presented: u64,
}

/// In-memory target holding the most recent frame
///
/// Clones share the same storage, so a caller can keep a handle after giving
/// the target to the renderer.
#[derive(Debug, Default, Clone)]
pub struct ImageTarget {
    state: Rc<RefCell<ImageTargetState>>,
}

impl ImageTarget {
    /// Create an empty target
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the last presented frame
    pub fn last_frame(&self) -> Option<RgbaImage> {
        self.state.borrow().last_frame.clone()
    }

    /// Number of frames presented so far
    pub fn frames_presented(&self) -> u64 {
        self.state.borrow().frames_presented
    }

    /// Write the last presented frame as a PNG file
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<(), RenderError> {
        let state = self.state.borrow();
        let frame = state.last_frame.as_ref().ok_or(RenderError::NoFrame)?;
        frame.save_with_format(path.as_ref(), ImageFormat::Png)?;
        log::info!("Saved frame to {}", path.as_ref().display());
        Ok(())
    }
}

impl RenderTarget for ImageTarget {
    fn present(&mut self, frame: &RgbaImage) -> Result<(), RenderError> {
        let mut state = self.state.borrow_mut();
        state.last_frame = Some(frame.clone());
        state.frames_presented += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_clones_share_frames() {
        let target = ImageTarget::new();
        let mut handle = target.clone();

        handle.present(&RgbaImage::from_pixel(2, 2, Rgba([9, 9, 9, 255]))).unwrap();

        assert_eq!(target.frames_presented(), 1);
        assert_eq!(target.last_frame().unwrap().dimensions(), (2, 2));
    }

    #[test]
    fn test_save_without_frame_fails() {
        let target = ImageTarget::new();
        let path = std::env::temp_dir().join("engine2d_no_frame.png");
        assert!(matches!(target.save_png(path), Err(RenderError::NoFrame)));
    }

    #[test]
    fn test_save_png_writes_file() {
        let mut target = ImageTarget::new();
        target.present(&RgbaImage::from_pixel(3, 1, Rgba([255, 0, 0, 255]))).unwrap();

        let path = std::env::temp_dir().join("engine2d_image_target.png");
        target.save_png(&path).unwrap();

        let loaded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(loaded.dimensions(), (3, 1));
        assert_eq!(*loaded.get_pixel(0, 0), Rgba([255, 0, 0, 255]));
        let _ = std::fs::remove_file(path);
    }
}
