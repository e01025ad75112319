//! Air-writing recognition pipeline.
//!
//! A camera feeds a hand-landmark model; an extended index finger acts as a
//! pen on an offscreen drawing surface, and after the user pauses the surface
//! is cropped, binarised and handed to an OCR engine one character at a time.
//!
//! ```text
//! Camera ─▶ HandTracker ─▶ gesture ─▶ StrokeRenderer ─▶ DrawingSurface
//!                                                          │ (pen-up, debounced)
//!                                                          ▼
//!                      SessionState ◀── RecognitionEngine ◀── preprocess
//! ```

pub mod canvas;
pub mod config;
pub mod i18n;
pub mod ocr;
pub mod pipeline;
pub mod replay;
pub mod tracking;
