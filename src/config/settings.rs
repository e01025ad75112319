//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.

use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;
use crate::ocr::PageSegMode;
use crate::tracking::FacingMode;

// ---------------------------------------------------------------------------
// CameraConfig
// ---------------------------------------------------------------------------

/// Video stream requested from the camera.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Requested frame width in pixels.
    pub width: u32,
    /// Requested frame height in pixels.
    pub height: u32,
    /// Which camera to prefer on devices that have more than one.
    pub facing: FacingMode,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            facing: FacingMode::User,
        }
    }
}

// ---------------------------------------------------------------------------
// HandTrackingConfig
// ---------------------------------------------------------------------------

/// Options handed to the hand-landmark model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandTrackingConfig {
    /// Maximum number of hands reported per frame.  The pipeline only ever
    /// looks at the most confident one.
    pub max_num_hands: usize,
    /// Model variant (0 = lite, 1 = full).
    pub model_complexity: u8,
    /// Minimum palm-detection score for a hand to be reported (0.0 – 1.0).
    pub min_detection_confidence: f32,
    /// Minimum landmark-tracking score before re-detection (0.0 – 1.0).
    pub min_tracking_confidence: f32,
}

impl Default for HandTrackingConfig {
    fn default() -> Self {
        Self {
            max_num_hands: 1,
            model_complexity: 1,
            min_detection_confidence: 0.5,
            min_tracking_confidence: 0.5,
        }
    }
}

// ---------------------------------------------------------------------------
// CanvasConfig
// ---------------------------------------------------------------------------

/// Drawing surface size and pen appearance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanvasConfig {
    /// Surface width in pixels.
    pub width: u32,
    /// Surface height in pixels.
    pub height: u32,
    /// Pen width in pixels.
    pub line_width: f32,
    /// Pen colour as `[r, g, b]`.
    pub stroke_color: [u8; 3],
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 400,
            line_width: 8.0,
            stroke_color: [0x25, 0x63, 0xeb],
        }
    }
}

// ---------------------------------------------------------------------------
// PreprocessConfig
// ---------------------------------------------------------------------------

/// Tile preparation before OCR.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreprocessConfig {
    /// White margin added on every side of the cropped glyph.
    pub padding: u32,
    /// A pixel stays white only if all of R, G and B are strictly above this.
    pub white_threshold: u8,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            padding: 20,
            white_threshold: 250,
        }
    }
}

// ---------------------------------------------------------------------------
// RecognitionConfig
// ---------------------------------------------------------------------------

/// OCR engine parameters and pipeline timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognitionConfig {
    /// Quiet period after the last stroke before recognition runs.
    pub debounce_ms: u64,
    /// Delay between a finished recognition and the surface being wiped.
    pub clear_delay_ms: u64,
    /// How long transient statuses ("board cleared", "draw a character
    /// first") stay up before reverting.
    pub status_revert_ms: u64,
    /// OCR language / traineddata name (e.g. `"eng"`).
    pub language: String,
    /// Characters the engine is allowed to emit.
    pub char_whitelist: String,
    /// Layout analysis mode; one glyph per tile by default.
    #[serde(default)]
    pub page_seg_mode: PageSegMode,
}

impl RecognitionConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn clear_delay(&self) -> Duration {
        Duration::from_millis(self.clear_delay_ms)
    }

    pub fn status_revert(&self) -> Duration {
        Duration::from_millis(self.status_revert_ms)
    }
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 1_500,
            clear_delay_ms: 500,
            status_revert_ms: 1_500,
            language: "eng".into(),
            char_whitelist: "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789"
                .into(),
            page_seg_mode: PageSegMode::SingleChar,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use air_writer::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
///
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Camera stream request.
    pub camera: CameraConfig,
    /// Hand-landmark model options.
    pub hands: HandTrackingConfig,
    /// Drawing surface and pen.
    pub canvas: CanvasConfig,
    /// Crop / pad / binarise settings.
    pub preprocess: PreprocessConfig,
    /// OCR parameters and timers.
    pub recognition: RecognitionConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
