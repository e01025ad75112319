//! Configuration module for air-writer.
//!
//! Provides `AppConfig` (top-level settings), sub-configs for each subsystem,
//! `AppPaths` for cross-platform config directories, TOML persistence via
//! `AppConfig::load` / `AppConfig::save`, and the persisted UI language in
//! [`Preferences`].

pub mod paths;
pub mod preferences;
pub mod settings;

pub use paths::AppPaths;
pub use preferences::Preferences;
pub use settings::{
    AppConfig, CameraConfig, CanvasConfig, HandTrackingConfig, PreprocessConfig,
    RecognitionConfig,
};
