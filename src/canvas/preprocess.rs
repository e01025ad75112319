//! Turn the drawing surface into a recognition-ready tile.
//!
//! ## Algorithm
//!
//! 1. Scan for ink: any pixel whose R, G or B differs from 255.
//! 2. No ink → `Ok(None)`.
//! 3. Square side = `max(ink width, ink height) + 2 * padding`.
//! 4. Paste the ink bounding box onto a white square at `(padding, padding)`.
//! 5. Binarise: pixels with R, G and B all above the white threshold become
//!    pure white, everything else pure black.  Alpha is left alone.
//! 6. Encode as PNG.
//!
//! The source surface is only read.

use std::io::Cursor;

use image::{imageops, ImageFormat, RgbaImage};
use thiserror::Error;

use super::surface::{is_white, DrawingSurface, WHITE};
use crate::config::PreprocessConfig;

// ---------------------------------------------------------------------------
// PreprocessError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("failed to encode tile: {0}")]
    Encode(#[from] image::ImageError),
}

// ---------------------------------------------------------------------------
// InkBounds
// ---------------------------------------------------------------------------

/// Inclusive bounding box of the ink on the source surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InkBounds {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

impl InkBounds {
    pub fn width(&self) -> u32 {
        self.max_x - self.min_x + 1
    }

    pub fn height(&self) -> u32 {
        self.max_y - self.min_y + 1
    }

    /// Tight bounds of every non-white pixel, or `None` for a blank image.
    pub fn of(image: &RgbaImage) -> Option<Self> {
        let mut bounds: Option<Self> = None;

        for (x, y, px) in image.enumerate_pixels() {
            if is_white(px) {
                continue;
            }
            bounds = Some(match bounds {
                None => Self {
                    min_x: x,
                    min_y: y,
                    max_x: x,
                    max_y: y,
                },
                Some(b) => Self {
                    min_x: b.min_x.min(x),
                    min_y: b.min_y.min(y),
                    max_x: b.max_x.max(x),
                    max_y: b.max_y.max(y),
                },
            });
        }

        bounds
    }
}

// ---------------------------------------------------------------------------
// PreparedTile
// ---------------------------------------------------------------------------

/// A cropped, padded, binarised glyph ready for the OCR engine.
#[derive(Debug, Clone)]
pub struct PreparedTile {
    /// The binarised square tile.
    pub image: RgbaImage,
    /// `image` encoded as PNG.
    pub png: Vec<u8>,
    /// Where the ink sat on the source surface.
    pub ink_bounds: InkBounds,
}

impl PreparedTile {
    pub fn side(&self) -> u32 {
        self.image.width()
    }
}

// ---------------------------------------------------------------------------
// preprocess
// ---------------------------------------------------------------------------

/// Crop, centre and binarise the ink on `surface`.
///
/// Returns `Ok(None)` when the surface holds no ink at all.
pub fn preprocess(
    surface: &DrawingSurface,
    config: &PreprocessConfig,
) -> Result<Option<PreparedTile>, PreprocessError> {
    let source = surface.image();
    let Some(bounds) = InkBounds::of(source) else {
        log::debug!("preprocess: surface is blank");
        return Ok(None);
    };

    let padding = config.padding;
    let side = bounds.width().max(bounds.height()) + 2 * padding;

    let glyph = imageops::crop_imm(
        source,
        bounds.min_x,
        bounds.min_y,
        bounds.width(),
        bounds.height(),
    )
    .to_image();

    let mut tile = RgbaImage::from_pixel(side, side, WHITE);
    imageops::replace(&mut tile, &glyph, i64::from(padding), i64::from(padding));

    binarize(&mut tile, config.white_threshold);

    let mut png = Vec::new();
    tile.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

    log::debug!(
        "preprocess: ink {}x{} at ({}, {}) → {side}x{side} tile, {} bytes",
        bounds.width(),
        bounds.height(),
        bounds.min_x,
        bounds.min_y,
        png.len()
    );

    Ok(Some(PreparedTile {
        image: tile,
        png,
        ink_bounds: bounds,
    }))
}

/// Force every pixel to pure white or pure black, keeping alpha.
fn binarize(image: &mut RgbaImage, white_threshold: u8) {
    for px in image.pixels_mut() {
        let [r, g, b, _] = px.0;
        let value = if r > white_threshold && g > white_threshold && b > white_threshold {
            255
        } else {
            0
        };
        px.0[0] = value;
        px.0[1] = value;
        px.0[2] = value;
    }
}
