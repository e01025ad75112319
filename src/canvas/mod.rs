//! Drawing surface, stroke rendering and OCR tile preparation.
//!
//! ```text
//! fingertip (normalized) ─▶ map_to_surface ─▶ StrokeRenderer::draw_to
//!                                                   │
//!                                                   ▼
//!                                           DrawingSurface (RGBA, white)
//!                                                   │ read-only
//!                                                   ▼
//!                                   preprocess ─▶ PreparedTile { png, .. }
//! ```

pub mod preprocess;
pub mod stroke;
pub mod surface;

pub use preprocess::{preprocess, InkBounds, PreparedTile, PreprocessError};
pub use stroke::{map_to_surface, Pen, Point, Segment, StrokeRenderer};
pub use surface::DrawingSurface;
