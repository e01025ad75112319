//! Bilingual (English / Turkish) UI strings.
//!
//! Every user-visible string is looked up by [`MessageKey`]; there is no
//! runtime table and no fallback locale.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Language
// ---------------------------------------------------------------------------

/// Supported UI languages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Tr,
}

impl Language {
    /// The other language.
    pub fn toggled(self) -> Self {
        match self {
            Language::En => Language::Tr,
            Language::Tr => Language::En,
        }
    }

    /// Two-letter code as stored in preferences.
    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Tr => "tr",
        }
    }
}

// ---------------------------------------------------------------------------
// MessageKey
// ---------------------------------------------------------------------------

/// Identifier of a translatable string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    // Page chrome
    Title,
    Subtitle,
    CameraView,
    DrawingCanvas,
    StartCamera,
    StopCamera,
    Clear,
    DrawingOn,
    DrawingOff,
    AiRecognition,
    Confidence,
    HowToUse,
    Instruction1,
    Instruction2,
    Instruction3,
    Instruction4,

    // Status line
    StatusWaiting,
    StatusStarting,
    StatusStopping,
    StatusOff,
    StatusActive,
    StatusError,
    StatusDrawing,
    StatusReady,
    StatusRecognizing,
    StatusNoChar,
    StatusRecognized,
    StatusNotRecognized,
    StatusRecognitionFailed,
    StatusCleared,
    StatusReadyNext,
    StatusDrawingOn,
    StatusDrawingOff,

    ConfidenceNa,
}

impl MessageKey {
    /// Look up the string for `lang`.
    pub fn text(self, lang: Language) -> &'static str {
        match lang {
            Language::En => english(self),
            Language::Tr => turkish(self),
        }
    }
}

fn english(key: MessageKey) -> &'static str {
    use MessageKey::*;
    match key {
        Title => "✋ Finger Drawing",
        Subtitle => "Draw in the air with your index finger! 🚀",
        CameraView => "📹 Camera View",
        DrawingCanvas => "✍️ Drawing Canvas",
        StartCamera => "📷 Start Camera",
        StopCamera => "📷 Stop Camera",
        Clear => "🧹 Clear",
        DrawingOn => "✏️ Drawing: ON",
        DrawingOff => "⏸️ Drawing: OFF",
        AiRecognition => "🤖 AI Recognition",
        Confidence => "Confidence:",
        HowToUse => "📝 How to Use:",
        Instruction1 => "🎯 Point your index finger at the camera.",
        Instruction2 => "☝️ Raise your finger to start drawing.",
        Instruction3 => "🖐️ Close your hand to stop drawing.",
        Instruction4 => "🧹 Use the \"Clear\" button to reset the canvas.",
        StatusWaiting => "Waiting for camera...",
        StatusStarting => "Starting camera...",
        StatusStopping => "Stopping camera...",
        StatusOff => "Camera off. Press Start.",
        StatusActive => "Camera active - Show your hand!",
        StatusError => "Camera access error!",
        StatusDrawing => "Drawing... ✍️",
        StatusReady => "Ready to draw!",
        StatusRecognizing => "Recognizing character...",
        StatusNoChar => "Draw a character first!",
        StatusRecognized => "Character recognized!",
        StatusNotRecognized => "Could not recognize character.",
        StatusRecognitionFailed => "Recognition failed.",
        StatusCleared => "Board cleared! 🧹",
        StatusReadyNext => "Ready for next character!",
        StatusDrawingOn => "Drawing is ON!",
        StatusDrawingOff => "Drawing is OFF.",
        ConfidenceNa => "N/A",
    }
}

fn turkish(key: MessageKey) -> &'static str {
    use MessageKey::*;
    match key {
        Title => "✋ Parmakla Çizim",
        Subtitle => "İşaret parmağınızla havaya çizin! 🚀",
        CameraView => "📹 Kamera Görünümü",
        DrawingCanvas => "✍️ Çizim Alanı",
        StartCamera => "📷 Kamerayı Başlat",
        StopCamera => "📷 Kamerayı Durdur",
        Clear => "🧹 Temizle",
        DrawingOn => "✏️ Çizim: AÇIK",
        DrawingOff => "⏸️ Çizim: KAPALI",
        AiRecognition => "🤖 Yapay Zeka Tanıma",
        Confidence => "Doğruluk:",
        HowToUse => "📝 Nasıl Kullanılır:",
        Instruction1 => "🎯 İşaret parmağınızı kameraya doğrultun.",
        Instruction2 => "☝️ Çizime başlamak için parmağınızı kaldırın.",
        Instruction3 => "🖐️ Çizimi durdurmak için elinizi kapatın.",
        Instruction4 => "🧹 Tuvali sıfırlamak için \"Temizle\" düğmesini kullanın.",
        StatusWaiting => "Kamera bekleniyor...",
        StatusStarting => "Kamera başlatılıyor...",
        StatusStopping => "Kamera durduruluyor...",
        StatusOff => "Kamera kapalı. Başlat'a basın.",
        StatusActive => "Kamera aktif - Elinizi gösterin!",
        StatusError => "Kamera erişim hatası!",
        StatusDrawing => "Çiziliyor... ✍️",
        StatusReady => "Çizime hazır!",
        StatusRecognizing => "Karakter tanınıyor...",
        StatusNoChar => "Önce bir karakter çizin!",
        StatusRecognized => "Karakter tanındı!",
        StatusNotRecognized => "Karakter tanınamadı.",
        StatusRecognitionFailed => "Tanıma başarısız oldu.",
        StatusCleared => "Tahta temizlendi! 🧹",
        StatusReadyNext => "Sonraki karaktere hazır!",
        StatusDrawingOn => "Çizim AÇIK!",
        StatusDrawingOff => "Çizim KAPALI.",
        ConfidenceNa => "—",
    }
}
