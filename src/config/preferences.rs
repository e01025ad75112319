//! Persisted user preferences.
//!
//! Only the UI language survives a restart.  It lives in its own small
//! `preferences.toml` so toggling the language never rewrites `settings.toml`.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;
use crate::i18n::Language;

/// User-facing preferences restored on startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    /// UI language.  Defaults to English when the file is missing.
    #[serde(default)]
    pub language: Language,
}

impl Preferences {
    /// Load from the platform-appropriate `preferences.toml`.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().preferences_file)
    }

    /// Load from an explicit path; a missing file yields the defaults.
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Save to an explicit path, creating parent directories as needed.
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }
}
