//! Camera acquisition seam.
//!
//! [`Camera::open`] requests a video stream at a fixed resolution and returns
//! a [`FrameStream`].  The stream is a RAII guard: dropping it releases the
//! device.  Frames are pulled one at a time so at most one frame is ever in
//! flight through the landmark model.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::CameraConfig;

// ---------------------------------------------------------------------------
// FacingMode / CameraRequest
// ---------------------------------------------------------------------------

/// Which physical camera to prefer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// Front-facing (selfie) camera.
    User,
    /// Rear camera.
    Environment,
}

/// Stream parameters handed to [`Camera::open`].
#[derive(Debug, Clone, PartialEq)]
pub struct CameraRequest {
    pub width: u32,
    pub height: u32,
    pub facing: FacingMode,
}

impl From<&CameraConfig> for CameraRequest {
    fn from(config: &CameraConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            facing: config.facing,
        }
    }
}

// ---------------------------------------------------------------------------
// Frame
// ---------------------------------------------------------------------------

/// One video frame as delivered by a [`FrameStream`].
#[derive(Debug, Clone)]
pub struct Frame {
    /// Monotonic index within the stream, starting at 0.
    pub sequence: u64,
    pub width: u32,
    pub height: u32,
    /// Packed RGBA pixels; may be empty for sources that carry landmarks
    /// out of band.
    pub rgba: Vec<u8>,
}

// ---------------------------------------------------------------------------
// CameraError
// ---------------------------------------------------------------------------

/// Errors that can occur while acquiring the camera.
#[derive(Debug, Clone, Error)]
pub enum CameraError {
    #[error("camera permission denied")]
    PermissionDenied,

    #[error("no camera device available")]
    NoDevice,

    #[error("failed to start camera stream: {0}")]
    Stream(String),
}

// ---------------------------------------------------------------------------
// Camera / FrameStream traits
// ---------------------------------------------------------------------------

/// Source of camera streams.
#[async_trait]
pub trait Camera: Send + Sync {
    async fn open(&self, request: &CameraRequest) -> Result<Box<dyn FrameStream>, CameraError>;
}

/// An open camera stream.  Dropping it stops all tracks.
#[async_trait]
pub trait FrameStream: Send {
    /// Wait for the next frame; `None` once the stream has ended.
    async fn next_frame(&mut self) -> Option<Frame>;
}
