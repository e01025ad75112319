//! Hand landmark types and the [`HandTracker`] seam.
//!
//! Landmarks follow the 21-point hand topology used by common hand-pose
//! models (wrist = 0, thumb 1–4, index 5–8, middle 9–12, ring 13–16,
//! pinky 17–20).  Coordinates are normalized to `[0, 1]` with the origin at
//! the top-left of the camera frame.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::camera::Frame;

/// Number of landmarks reported per hand.
pub const NUM_LANDMARKS: usize = 21;
/// Index finger proximal interphalangeal joint.
pub const INDEX_FINGER_PIP: usize = 6;
/// Index finger tip.
pub const INDEX_FINGER_TIP: usize = 8;

// ---------------------------------------------------------------------------
// Landmark
// ---------------------------------------------------------------------------

/// A single normalized landmark.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    /// Relative depth; unused by the pipeline.
    #[serde(default)]
    pub z: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y, z: 0.0 }
    }
}

// ---------------------------------------------------------------------------
// LandmarkError
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Error, PartialEq)]
pub enum LandmarkError {
    #[error("expected {NUM_LANDMARKS} landmarks, got {0}")]
    WrongCount(usize),
}

// ---------------------------------------------------------------------------
// HandLandmarks
// ---------------------------------------------------------------------------

/// The 21 landmarks of one detected hand in a single frame.
///
/// Ephemeral: produced and consumed within one frame callback.
#[derive(Debug, Clone, PartialEq)]
pub struct HandLandmarks {
    points: [Landmark; NUM_LANDMARKS],
}

impl HandLandmarks {
    pub fn new(points: [Landmark; NUM_LANDMARKS]) -> Self {
        Self { points }
    }

    /// Build from a slice, rejecting anything that is not exactly 21 points.
    ///
    /// ```
    /// use air_writer::tracking::{HandLandmarks, Landmark, LandmarkError};
    ///
    /// assert!(HandLandmarks::from_slice(&[Landmark::default(); 21]).is_ok());
    /// assert_eq!(
    ///     HandLandmarks::from_slice(&[Landmark::default(); 5]),
    ///     Err(LandmarkError::WrongCount(5))
    /// );
    /// ```
    pub fn from_slice(points: &[Landmark]) -> Result<Self, LandmarkError> {
        let points: [Landmark; NUM_LANDMARKS] = points
            .try_into()
            .map_err(|_| LandmarkError::WrongCount(points.len()))?;
        Ok(Self { points })
    }

    pub fn get(&self, index: usize) -> Option<&Landmark> {
        self.points.get(index)
    }

    pub fn points(&self) -> &[Landmark] {
        &self.points
    }

    pub fn index_tip(&self) -> &Landmark {
        &self.points[INDEX_FINGER_TIP]
    }

    pub fn index_pip(&self) -> &Landmark {
        &self.points[INDEX_FINGER_PIP]
    }
}

// ---------------------------------------------------------------------------
// TrackingError
// ---------------------------------------------------------------------------

/// Errors surfaced by a [`HandTracker`] for a single frame.
#[derive(Debug, Clone, Error)]
pub enum TrackingError {
    /// Inference failed on this frame.
    #[error("hand inference failed: {0}")]
    Inference(String),

    /// The model produced a malformed landmark set.
    #[error(transparent)]
    Landmarks(#[from] LandmarkError),
}

// ---------------------------------------------------------------------------
// HandTracker trait
// ---------------------------------------------------------------------------

/// Async seam for the hand-landmark model.
///
/// Implementations report at most one hand: the most confident detection
/// that clears the configured detection threshold.
#[async_trait]
pub trait HandTracker: Send + Sync {
    async fn detect(&self, frame: &Frame) -> Result<Option<HandLandmarks>, TrackingError>;
}
