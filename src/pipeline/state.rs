//! Pipeline phase, status line and shared session state.
//!
//! [`SessionState`] is the single source of truth for everything a front end
//! shows: status line, recognised output, confidence, button labels.  Only
//! the [`Coordinator`](super::Coordinator) mutates it; readers lock
//! [`SharedState`] briefly and render.

use std::sync::{Arc, Mutex};

use crate::i18n::{Language, MessageKey};

// ---------------------------------------------------------------------------
// PipelineState
// ---------------------------------------------------------------------------

/// Recognition cycle phases.
///
/// ```text
/// Idle ──pen down──▶ Drawing ──pen up──▶ PendingRecognition
///        ──debounce──▶ Recognizing ──▶ Recognized | NotRecognized
///                                    | NoContent  | RecognitionFailed
/// Recognized / NotRecognized ──surface cleared──▶ Idle
/// NoContent ──status reverted──▶ Idle
/// any ──explicit clear──▶ Idle
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelineState {
    #[default]
    Idle,
    Drawing,
    PendingRecognition,
    Recognizing,
    Recognized,
    NotRecognized,
    NoContent,
    RecognitionFailed,
}

impl PipelineState {
    /// `true` while a stroke or a recognition cycle is still in progress.
    ///
    /// ```
    /// use air_writer::pipeline::PipelineState;
    ///
    /// assert!(!PipelineState::Idle.is_busy());
    /// assert!(PipelineState::Drawing.is_busy());
    /// assert!(PipelineState::PendingRecognition.is_busy());
    /// assert!(PipelineState::Recognizing.is_busy());
    /// assert!(!PipelineState::Recognized.is_busy());
    /// assert!(!PipelineState::RecognitionFailed.is_busy());
    /// ```
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            PipelineState::Drawing | PipelineState::PendingRecognition | PipelineState::Recognizing
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            PipelineState::Idle => "Idle",
            PipelineState::Drawing => "Drawing",
            PipelineState::PendingRecognition => "Pending",
            PipelineState::Recognizing => "Recognizing",
            PipelineState::Recognized => "Recognized",
            PipelineState::NotRecognized => "Not recognized",
            PipelineState::NoContent => "No content",
            PipelineState::RecognitionFailed => "Failed",
        }
    }
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Colour class of the status indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Idle,
    Loading,
    Active,
    Error,
}

/// The status line: what to say and how to colour it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status {
    pub key: MessageKey,
    pub kind: StatusKind,
}

impl Status {
    pub const fn new(key: MessageKey, kind: StatusKind) -> Self {
        Self { key, kind }
    }

    pub fn text(&self, lang: Language) -> &'static str {
        self.key.text(lang)
    }
}

impl Default for Status {
    fn default() -> Self {
        Status::new(MessageKey::StatusWaiting, StatusKind::Loading)
    }
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// Everything a front end needs to render the session.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub pipeline: PipelineState,
    pub status: Status,
    pub language: Language,

    pub camera_active: bool,
    /// Set between a start request and the camera opening (or failing).
    pub camera_starting: bool,
    /// When `false`, landmarks are ignored.
    pub drawing_enabled: bool,
    /// `true` between pen-down and pen-up.
    pub is_drawing: bool,

    /// Accumulated recognised characters.
    pub output: String,
    /// Confidence of the last recognised character, in percent.
    pub confidence: Option<u8>,

    /// The camera stream has run out of frames.
    pub stream_ended: bool,
}

impl SessionState {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            drawing_enabled: true,
            ..Self::default()
        }
    }

    /// Output text, or `"..."` while nothing has been recognised.
    pub fn output_label(&self) -> &str {
        if self.output.is_empty() {
            "..."
        } else {
            &self.output
        }
    }

    /// `"92%"`, or the localized "not available" marker.
    pub fn confidence_label(&self) -> String {
        match self.confidence {
            Some(percent) => format!("{percent}%"),
            None => MessageKey::ConfidenceNa.text(self.language).to_string(),
        }
    }

    pub fn status_text(&self) -> &'static str {
        self.status.text(self.language)
    }

    pub fn start_button_label(&self) -> &'static str {
        let key = if self.camera_active {
            MessageKey::StopCamera
        } else {
            MessageKey::StartCamera
        };
        key.text(self.language)
    }

    pub fn drawing_button_label(&self) -> &'static str {
        let key = if self.drawing_enabled {
            MessageKey::DrawingOn
        } else {
            MessageKey::DrawingOff
        };
        key.text(self.language)
    }

    /// The start/stop button is disabled while the camera is opening.
    pub fn start_enabled(&self) -> bool {
        !self.camera_starting
    }
}

// ---------------------------------------------------------------------------
// SharedState
// ---------------------------------------------------------------------------

/// Thread-safe handle to [`SessionState`].
///
/// Lock briefly; never hold the guard across an `.await`.
pub type SharedState = Arc<Mutex<SessionState>>;

pub fn new_shared_state(language: Language) -> SharedState {
    Arc::new(Mutex::new(SessionState::new(language)))
}
