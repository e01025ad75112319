//! Core OCR engine trait and implementations.
//!
//! # Overview
//!
//! [`RecognitionEngine`] is the public interface used by the pipeline.  It is
//! object-safe and `Send + Sync` so it can be held behind an
//! `Arc<dyn RecognitionEngine>` and driven from `spawn_blocking`.
//!
//! [`TesseractEngine`] (feature `tesseract`) wraps libtesseract.  A fresh
//! Tesseract handle is initialised for every call, so the engine itself holds
//! no native state and needs no locking.
//!
//! [`UnavailableEngine`] is what the binary runs with when no backend was
//! compiled in: every call fails with [`OcrError::EngineInit`].
//!
//! [`MockRecognitionEngine`] (available under `#[cfg(test)]`) returns a
//! pre-configured response and records what it was asked to recognise.

use thiserror::Error;

use crate::ocr::params::{Recognition, RecognizeParams};

// ---------------------------------------------------------------------------
// OcrError
// ---------------------------------------------------------------------------

/// All errors that can arise from the OCR subsystem.
#[derive(Debug, Clone, Error)]
pub enum OcrError {
    /// The engine could not be initialised (missing traineddata, no backend).
    #[error("OCR engine initialisation failed: {0}")]
    EngineInit(String),

    /// The tile could not be handed to the engine.
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    /// The recognition pass itself failed.
    #[error("Recognition error: {0}")]
    Recognition(String),

    /// The blocking worker died before producing a result.
    #[error("OCR worker failed: {0}")]
    Internal(String),
}

// ---------------------------------------------------------------------------
// RecognitionEngine trait
// ---------------------------------------------------------------------------

/// Object-safe, thread-safe interface for single-character OCR.
///
/// # Contract
///
/// - `png` is a PNG-encoded, square, black-on-white tile.
/// - The call may block; the pipeline runs it on the blocking pool.
pub trait RecognitionEngine: Send + Sync {
    /// Recognise the glyph in `png`.
    fn recognize(&self, png: &[u8], params: &RecognizeParams) -> Result<Recognition, OcrError>;
}

// Compile-time assertion: Box<dyn RecognitionEngine> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn RecognitionEngine>) {}
};

impl<E: RecognitionEngine + ?Sized> RecognitionEngine for Box<E> {
    fn recognize(&self, png: &[u8], params: &RecognizeParams) -> Result<Recognition, OcrError> {
        (**self).recognize(png, params)
    }
}

// ---------------------------------------------------------------------------
// TesseractEngine
// ---------------------------------------------------------------------------

/// libtesseract-backed engine.
#[cfg(feature = "tesseract")]
#[derive(Debug, Clone, Default)]
pub struct TesseractEngine {
    datapath: Option<String>,
}

#[cfg(feature = "tesseract")]
impl TesseractEngine {
    /// `datapath` is the tessdata directory; `None` uses the library default.
    pub fn new(datapath: Option<String>) -> Self {
        Self { datapath }
    }
}

#[cfg(feature = "tesseract")]
impl RecognitionEngine for TesseractEngine {
    fn recognize(&self, png: &[u8], params: &RecognizeParams) -> Result<Recognition, OcrError> {
        use tesseract::Tesseract;

        let tess = Tesseract::new(self.datapath.as_deref(), Some(params.language.as_str()))
            .map_err(|e| OcrError::EngineInit(e.to_string()))?
            .set_variable("tessedit_pageseg_mode", params.page_seg_mode.tesseract_value())
            .map_err(|e| OcrError::EngineInit(e.to_string()))?;

        let tess = if params.char_whitelist.is_empty() {
            tess
        } else {
            tess.set_variable("tessedit_char_whitelist", &params.char_whitelist)
                .map_err(|e| OcrError::EngineInit(e.to_string()))?
        };

        let mut tess = tess
            .set_image_from_mem(png)
            .map_err(|e| OcrError::InvalidImage(e.to_string()))?
            .recognize()
            .map_err(|e| OcrError::Recognition(e.to_string()))?;

        let text = tess
            .get_text()
            .map_err(|e| OcrError::Recognition(e.to_string()))?;
        let confidence = tess.mean_text_conf() as f32;

        log::debug!("tesseract: {:?} ({confidence})", text.trim());
        Ok(Recognition::new(text, confidence))
    }
}

// ---------------------------------------------------------------------------
// UnavailableEngine
// ---------------------------------------------------------------------------

/// Placeholder used when no OCR backend is available.
#[derive(Debug, Clone, Default)]
pub struct UnavailableEngine {
    reason: String,
}

impl UnavailableEngine {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl RecognitionEngine for UnavailableEngine {
    fn recognize(&self, _png: &[u8], _params: &RecognizeParams) -> Result<Recognition, OcrError> {
        Err(OcrError::EngineInit(self.reason.clone()))
    }
}

// ---------------------------------------------------------------------------
// MockRecognitionEngine  (test-only)
// ---------------------------------------------------------------------------

/// A test double that returns a pre-configured response.
///
/// Every call is counted and the decoded tile is kept, so tests can check
/// both how often the engine ran and what it was fed.
#[cfg(test)]
pub struct MockRecognitionEngine {
    response: Result<Recognition, OcrError>,
    calls: std::sync::atomic::AtomicUsize,
    last_tile: std::sync::Mutex<Option<image::GrayImage>>,
}

#[cfg(test)]
impl MockRecognitionEngine {
    /// Create a mock that always returns `Ok(Recognition { text, confidence })`.
    pub fn ok(text: impl Into<String>, confidence: f32) -> Self {
        Self::with_response(Ok(Recognition::new(text, confidence)))
    }

    /// Create a mock that always returns `Err(error)`.
    pub fn err(error: OcrError) -> Self {
        Self::with_response(Err(error))
    }

    fn with_response(response: Result<Recognition, OcrError>) -> Self {
        Self {
            response,
            calls: std::sync::atomic::AtomicUsize::new(0),
            last_tile: std::sync::Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }

    /// Dimensions of the last tile passed to [`recognize`](RecognitionEngine::recognize).
    pub fn last_tile(&self) -> Option<(u32, u32)> {
        self.last_tile.lock().unwrap().as_ref().map(|t| t.dimensions())
    }

    /// The last tile, decoded to greyscale.
    pub fn last_tile_image(&self) -> Option<image::GrayImage> {
        self.last_tile.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl RecognitionEngine for MockRecognitionEngine {
    fn recognize(&self, png: &[u8], _params: &RecognizeParams) -> Result<Recognition, OcrError> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        let decoded =
            image::load_from_memory(png).map_err(|e| OcrError::InvalidImage(e.to_string()))?;
        *self.last_tile.lock().unwrap() = Some(decoded.to_luma8());
        self.response.clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png(side: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(side, side, Rgba([255, 255, 255, 255]));
        let mut out = Vec::new();
        img.write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
            .unwrap();
        out
    }

    #[test]
    fn mock_ok_returns_configured_recognition() {
        let engine = MockRecognitionEngine::ok("7", 92.0);
        let r = engine.recognize(&png(48), &RecognizeParams::default()).unwrap();
        assert_eq!(r.first_char(), Some('7'));
        assert_eq!(engine.calls(), 1);
        assert_eq!(engine.last_tile(), Some((48, 48)));
    }

    #[test]
    fn mock_err_returns_configured_error() {
        let engine = MockRecognitionEngine::err(OcrError::Recognition("boom".into()));
        let err = engine
            .recognize(&png(8), &RecognizeParams::default())
            .unwrap_err();
        assert!(matches!(err, OcrError::Recognition(_)));
        assert_eq!(engine.calls(), 1);
    }

    #[test]
    fn mock_rejects_garbage_bytes() {
        let engine = MockRecognitionEngine::ok("x", 1.0);
        let err = engine
            .recognize(b"not a png", &RecognizeParams::default())
            .unwrap_err();
        assert!(matches!(err, OcrError::InvalidImage(_)));
    }

    #[test]
    fn unavailable_engine_always_fails() {
        let engine = UnavailableEngine::new("built without tesseract");
        let err = engine
            .recognize(&png(8), &RecognizeParams::default())
            .unwrap_err();
        assert!(matches!(err, OcrError::EngineInit(_)));
        assert!(err.to_string().contains("built without tesseract"));
    }

    #[test]
    fn box_dyn_recognition_engine_compiles() {
        let engine: Box<dyn RecognitionEngine> = Box::new(MockRecognitionEngine::ok("a", 50.0));
        let _ = engine.recognize(&png(4), &RecognizeParams::default());
    }
}
