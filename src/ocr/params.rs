//! Recognition parameter types and result types.

use serde::{Deserialize, Serialize};

use crate::config::RecognitionConfig;

// ---------------------------------------------------------------------------
// PageSegMode
// ---------------------------------------------------------------------------

/// Layout analysis mode requested from the engine.
///
/// Values follow the Tesseract `tessedit_pageseg_mode` numbering.  Written
/// in `settings.toml` as `single_char`, `single_word` and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageSegMode {
    /// Treat the image as a single uniform block of text.
    SingleBlock,
    /// Treat the image as a single text line.
    SingleLine,
    /// Treat the image as a single word.
    SingleWord,
    /// Treat the image as a single character.
    #[default]
    SingleChar,
}

impl PageSegMode {
    pub fn tesseract_value(self) -> &'static str {
        match self {
            PageSegMode::SingleBlock => "6",
            PageSegMode::SingleLine => "7",
            PageSegMode::SingleWord => "8",
            PageSegMode::SingleChar => "10",
        }
    }
}

// ---------------------------------------------------------------------------
// RecognizeParams
// ---------------------------------------------------------------------------

/// Everything the engine needs besides the image.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizeParams {
    /// Traineddata / language name (e.g. `"eng"`).
    pub language: String,
    /// Characters the engine may emit; empty means unrestricted.
    pub char_whitelist: String,
    pub page_seg_mode: PageSegMode,
}

impl From<&RecognitionConfig> for RecognizeParams {
    fn from(config: &RecognitionConfig) -> Self {
        Self {
            language: config.language.clone(),
            char_whitelist: config.char_whitelist.clone(),
            page_seg_mode: config.page_seg_mode,
        }
    }
}

impl Default for RecognizeParams {
    fn default() -> Self {
        Self::from(&RecognitionConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Recognition
// ---------------------------------------------------------------------------

/// Raw engine output.
#[derive(Debug, Clone, PartialEq)]
pub struct Recognition {
    pub text: String,
    /// Engine confidence, 0 – 100.
    pub confidence: f32,
}

impl Recognition {
    pub fn new(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            text: text.into(),
            confidence,
        }
    }

    /// The recognised character: first non-whitespace char of `text`.
    ///
    /// ```
    /// use air_writer::ocr::Recognition;
    ///
    /// assert_eq!(Recognition::new(" \n7\n", 90.0).first_char(), Some('7'));
    /// assert_eq!(Recognition::new(" \n ", 90.0).first_char(), None);
    /// ```
    pub fn first_char(&self) -> Option<char> {
        self.text.chars().find(|c| !c.is_whitespace())
    }

    /// Confidence rounded to a whole percent and clamped to 0 – 100.
    pub fn confidence_percent(&self) -> u8 {
        if self.confidence.is_nan() {
            return 0;
        }
        self.confidence.round().clamp(0.0, 100.0) as u8
    }
}
