//! The persistent drawing surface.
//!
//! Invariant: every pixel is fully opaque; untouched pixels are pure white and
//! only pen strokes are anything else.

use image::{Rgba, RgbaImage};

use crate::config::CanvasConfig;

pub(crate) const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Fixed-size RGBA raster the pen draws on.
#[derive(Debug, Clone)]
pub struct DrawingSurface {
    image: RgbaImage,
}

impl DrawingSurface {
    /// A new all-white surface.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, WHITE),
        }
    }

    pub fn from_config(config: &CanvasConfig) -> Self {
        Self::new(config.width, config.height)
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Repaint the whole surface white.
    pub fn clear(&mut self) {
        for px in self.image.pixels_mut() {
            *px = WHITE;
        }
    }

    /// `true` when no pixel differs from pure white.
    pub fn is_blank(&self) -> bool {
        self.image.pixels().all(is_white)
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub(crate) fn image_mut(&mut self) -> &mut RgbaImage {
        &mut self.image
    }
}

/// Exact pure-white test on the colour channels (alpha ignored).
pub(crate) fn is_white(px: &Rgba<u8>) -> bool {
    px.0[0] == 255 && px.0[1] == 255 && px.0[2] == 255
}
