//! OCR (optical character recognition) engine module.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │              RecognitionEngine (trait)                  │
//! │                                                        │
//! │   ┌────────────────┐     ┌─────────────────────┐       │
//! │   │ RecognizeParams │────▶│ TesseractEngine     │       │
//! │   │ - language      │     │ (feature "tesseract")│      │
//! │   │ - whitelist     │     └──────────┬──────────┘       │
//! │   │ - page seg mode │                │                  │
//! │   └────────────────┘                 ▼                  │
//! │                      ┌──────────────────────────┐       │
//! │                      │ recognize(png) → text,   │       │
//! │                      │               confidence │       │
//! │                      └──────────────────────────┘       │
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! Only the first non-whitespace character of the engine's text is used
//! ([`Recognition::first_char`]).

pub mod engine;
pub mod params;
pub mod recorder;

// ── Public re-exports ──────────────────────────────────────────────────────

pub use engine::{OcrError, RecognitionEngine, UnavailableEngine};
pub use params::{PageSegMode, Recognition, RecognizeParams};
pub use recorder::TileRecorder;

#[cfg(feature = "tesseract")]
pub use engine::TesseractEngine;

#[cfg(test)]
pub use engine::MockRecognitionEngine;
