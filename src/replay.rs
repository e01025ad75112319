//! Recorded landmark traces.
//!
//! A trace stands in for both the camera and the hand-landmark model: it is a
//! JSON list of frames, each listing the hands detected in that frame.
//!
//! ```json
//! {
//!   "frame_interval_ms": 33,
//!   "frames": [
//!     { "hands": [] },
//!     { "hands": [ { "score": 0.93, "x": 0.42, "y": 0.31, "raised": true } ] },
//!     { "hands": [ { "score": 0.90, "landmarks": [ { "x": 0.5, "y": 0.9 }, ... ] } ] }
//!   ]
//! }
//! ```
//!
//! A hand is either the full 21-landmark set or just an index fingertip
//! position plus whether the finger is raised (pen down).
//!
//! [`ReplayCamera`] yields one empty [`Frame`] per trace frame at the trace's
//! pace; [`ReplayTracker`] answers [`HandTracker::detect`] by looking the
//! frame's sequence number up in the trace.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use crate::config::HandTrackingConfig;
use crate::tracking::{
    Camera, CameraError, CameraRequest, Frame, FrameStream, HandLandmarks, HandTracker, Landmark,
    TrackingError, INDEX_FINGER_PIP, INDEX_FINGER_TIP, NUM_LANDMARKS,
};

/// Vertical offset between fingertip and PIP joint in synthesised hands.
const SYNTHETIC_KNUCKLE_OFFSET: f32 = 0.05;

// ---------------------------------------------------------------------------
// Trace
// ---------------------------------------------------------------------------

fn default_frame_interval_ms() -> u64 {
    33
}

#[derive(Debug, Clone, Deserialize)]
pub struct Trace {
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,
    pub frames: Vec<TraceFrame>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TraceFrame {
    #[serde(default)]
    pub hands: Vec<TraceHand>,
}

/// One detected hand in a trace frame.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TraceHand {
    /// The full landmark set as a hand model would report it.
    Full { score: f32, landmarks: Vec<Landmark> },
    /// Just the index fingertip.
    Fingertip {
        score: f32,
        x: f32,
        y: f32,
        raised: bool,
    },
}

impl TraceHand {
    pub fn score(&self) -> f32 {
        match self {
            TraceHand::Full { score, .. } | TraceHand::Fingertip { score, .. } => *score,
        }
    }

    /// Build the landmark set, synthesising one for fingertip-only hands.
    pub fn to_landmarks(&self) -> Result<HandLandmarks, TrackingError> {
        match self {
            TraceHand::Full { landmarks, .. } => Ok(HandLandmarks::from_slice(landmarks)?),
            TraceHand::Fingertip { x, y, raised, .. } => {
                let mut points = [Landmark::new(*x, (*y + 0.3).min(1.0)); NUM_LANDMARKS];
                let pip_y = if *raised {
                    y + SYNTHETIC_KNUCKLE_OFFSET
                } else {
                    y - SYNTHETIC_KNUCKLE_OFFSET
                };
                points[INDEX_FINGER_TIP] = Landmark::new(*x, *y);
                points[INDEX_FINGER_PIP] = Landmark::new(*x, pip_y);
                Ok(HandLandmarks::new(points))
            }
        }
    }
}

impl Trace {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read trace {}", path.display()))?;
        Self::from_json(&content).with_context(|| format!("invalid trace {}", path.display()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let trace: Self = serde_json::from_str(json)?;
        Ok(trace)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

// ---------------------------------------------------------------------------
// ReplayCamera
// ---------------------------------------------------------------------------

/// A [`Camera`] that plays back a [`Trace`].
#[derive(Debug, Clone)]
pub struct ReplayCamera {
    trace: Arc<Trace>,
}

impl ReplayCamera {
    pub fn new(trace: Arc<Trace>) -> Self {
        Self { trace }
    }
}

#[async_trait]
impl Camera for ReplayCamera {
    async fn open(&self, request: &CameraRequest) -> Result<Box<dyn FrameStream>, CameraError> {
        if self.trace.is_empty() {
            return Err(CameraError::NoDevice);
        }
        Ok(Box::new(ReplayStream {
            total: self.trace.len() as u64,
            next: 0,
            interval: self.trace.frame_interval(),
            width: request.width,
            height: request.height,
        }))
    }
}

struct ReplayStream {
    total: u64,
    next: u64,
    interval: Duration,
    width: u32,
    height: u32,
}

#[async_trait]
impl FrameStream for ReplayStream {
    async fn next_frame(&mut self) -> Option<Frame> {
        if self.next >= self.total {
            return None;
        }
        tokio::time::sleep(self.interval).await;
        let frame = Frame {
            sequence: self.next,
            width: self.width,
            height: self.height,
            rgba: Vec::new(),
        };
        self.next += 1;
        Some(frame)
    }
}

// ---------------------------------------------------------------------------
// ReplayTracker
// ---------------------------------------------------------------------------

/// A [`HandTracker`] that reads detections from a [`Trace`].
///
/// Acquiring a hand needs `min_detection_confidence`; once a hand was seen in
/// the previous frame, `min_tracking_confidence` is enough to keep it.  The
/// highest-scoring hand among the first `max_num_hands` wins.
#[derive(Debug)]
pub struct ReplayTracker {
    trace: Arc<Trace>,
    options: HandTrackingConfig,
    tracking: AtomicBool,
}

impl ReplayTracker {
    pub fn new(trace: Arc<Trace>, options: HandTrackingConfig) -> Self {
        Self {
            trace,
            options,
            tracking: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl HandTracker for ReplayTracker {
    async fn detect(&self, frame: &Frame) -> Result<Option<HandLandmarks>, TrackingError> {
        let Some(recorded) = self.trace.frames.get(frame.sequence as usize) else {
            self.tracking.store(false, Ordering::Relaxed);
            return Ok(None);
        };

        let threshold = if self.tracking.load(Ordering::Relaxed) {
            self.options.min_tracking_confidence
        } else {
            self.options.min_detection_confidence
        };

        let best = recorded
            .hands
            .iter()
            .take(self.options.max_num_hands)
            .filter(|hand| hand.score() >= threshold)
            .max_by(|a, b| a.score().total_cmp(&b.score()));

        match best {
            Some(hand) => {
                let landmarks = hand.to_landmarks()?;
                self.tracking.store(true, Ordering::Relaxed);
                Ok(Some(landmarks))
            }
            None => {
                self.tracking.store(false, Ordering::Relaxed);
                Ok(None)
            }
        }
    }
}
