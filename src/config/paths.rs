//! Cross-platform application paths using the `dirs` crate.
//!
//! Layout (config dir):
//!   Windows: %APPDATA%\air-writer\
//!   macOS:   ~/Library/Application Support/air-writer/
//!   Linux:   ~/.config/air-writer/

use std::path::PathBuf;

/// Holds all resolved application directory/file paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory for `settings.toml` and `preferences.toml`.
    pub config_dir: PathBuf,
    /// Full path to `settings.toml`.
    pub settings_file: PathBuf,
    /// Full path to `preferences.toml` (UI language only).
    pub preferences_file: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "air-writer";

    /// Resolves all paths using the `dirs` crate.
    ///
    /// Falls back to the current directory if the platform cannot provide a
    /// standard path.
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let settings_file = config_dir.join("settings.toml");
        let preferences_file = config_dir.join("preferences.toml");

        Self {
            config_dir,
            settings_file,
            preferences_file,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}
