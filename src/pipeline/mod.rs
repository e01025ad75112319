//! Session coordinator for air-writer.
//!
//! This module wires tracking → drawing → preprocessing → OCR and exposes
//! the shared state a front end reads.
//!
//! # Architecture
//!
//! ```text
//! FrameLoop ──TrackingEvent──┐
//! Scheduler ──Timer──────────┤
//! OCR worker ──Finished──────┼──▶ mpsc ──▶ Coordinator::run()  ← async tokio task
//! front end ──user actions───┘                 │
//!                                              ├─ StrokeRenderer → DrawingSurface
//!                                              ├─ preprocess → spawn_blocking(recognize)
//!                                              └─ writes SharedState
//!
//! SharedState (Arc<Mutex<SessionState>>) ←─── read by the front end
//! ```

pub mod runner;
pub mod scheduler;
pub mod state;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use runner::{Coordinator, Event, TimerKind};
pub use scheduler::{Debounce, Scheduler, TimerHandle, TimerId};
pub use state::{
    new_shared_state, PipelineState, SessionState, SharedState, Status, StatusKind,
};
