//! Hand tracking: camera frames → hand landmarks → pen state.
//!
//! # Pipeline
//!
//! ```text
//! Camera::open ─▶ FrameStream::next_frame ─▶ HandTracker::detect
//!                                               │
//!                                               ▼
//!                         TrackingEvent::Hand(Option<HandLandmarks>)  (mpsc)
//!                                               │
//!                                               ▼
//!                                gesture::is_writing → pen down / up
//! ```
//!
//! The camera and the landmark model are external collaborators; this module
//! only defines their seams ([`Camera`], [`FrameStream`], [`HandTracker`]) and
//! the [`FrameLoop`] task that wires them to the coordinator's event channel.

pub mod camera;
pub mod frame_loop;
pub mod gesture;
pub mod landmarks;

pub use camera::{Camera, CameraError, CameraRequest, FacingMode, Frame, FrameStream};
pub use frame_loop::{FrameLoop, TrackingEvent};
pub use gesture::{is_writing, PenState};
pub use landmarks::{
    HandLandmarks, HandTracker, Landmark, LandmarkError, TrackingError, INDEX_FINGER_PIP,
    INDEX_FINGER_TIP, NUM_LANDMARKS,
};
