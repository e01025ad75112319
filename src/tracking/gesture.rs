//! Pen-down / pen-up classification.
//!
//! A raised, extended index finger writes: the fingertip sits higher in the
//! frame than the joint below it.  No other finger is inspected.

use super::landmarks::HandLandmarks;

/// Returns `true` when the index fingertip is strictly above its PIP joint.
///
/// Image y grows downwards, so "above" means a smaller y.  Equal heights are
/// not writing.
///
/// ```
/// use air_writer::tracking::{is_writing, HandLandmarks, Landmark};
///
/// let mut points = [Landmark::new(0.5, 0.5); 21];
/// points[8] = Landmark::new(0.5, 0.3);
/// assert!(is_writing(&HandLandmarks::new(points)));
/// ```
pub fn is_writing(hand: &HandLandmarks) -> bool {
    hand.index_tip().y < hand.index_pip().y
}

/// Per-frame pen state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PenState {
    Down,
    Up,
}

impl PenState {
    /// No hand in the frame counts as pen-up.
    pub fn from_hand(hand: Option<&HandLandmarks>) -> Self {
        match hand {
            Some(h) if is_writing(h) => PenState::Down,
            _ => PenState::Up,
        }
    }

    pub fn is_down(self) -> bool {
        self == PenState::Down
    }
}
