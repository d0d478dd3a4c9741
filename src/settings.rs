//! User settings, loaded from a YAML file.
//!
//! Every field has a default; a missing or partially filled file is fine,
//! and a broken one degrades to defaults with a logged error.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub const CURRENT_VERSION: u32 = 1;
const SETTINGS_FILENAME: &str = "config.yaml";
const APP_NAME: &str = "folio";

/// How close (in rows) the viewer placeholder must be to the visible window
/// before the engine is constructed.
const DEFAULT_ACTIVATION_MARGIN: u16 = 6;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_version")]
    pub version: u32,

    /// Visibility-gate proximity margin in rows.
    #[serde(default = "default_activation_margin")]
    pub activation_margin: u16,

    /// Force the reduced visual tier regardless of pane width.
    /// `None` = decide from width.
    #[serde(default)]
    pub reduce_effects: Option<bool>,

    /// Override for the reading-history file location.
    #[serde(default)]
    pub history_file: Option<PathBuf>,
}

fn default_version() -> u32 {
    CURRENT_VERSION
}

fn default_activation_margin() -> u16 {
    DEFAULT_ACTIVATION_MARGIN
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            activation_margin: DEFAULT_ACTIVATION_MARGIN,
            reduce_effects: None,
            history_file: None,
        }
    }
}

impl Settings {
    /// Load settings from `explicit_path`, or the default config location.
    /// Any failure logs and returns defaults.
    #[must_use]
    pub fn load(explicit_path: Option<&Path>) -> Self {
        let path = match explicit_path {
            Some(p) => p.to_path_buf(),
            None => match Self::default_path() {
                Some(p) => p,
                None => return Self::default(),
            },
        };

        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(&path)
            .map_err(anyhow::Error::from)
            .and_then(|content| Ok(serde_yaml::from_str::<Self>(&content)?))
        {
            Ok(settings) => {
                log::info!("loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::error!("failed to load settings from {}: {e}", path.display());
                Self::default()
            }
        }
    }

    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_NAME).join(SETTINGS_FILENAME))
    }

    /// Resolved history file: explicit setting, else the platform data dir,
    /// else none (ephemeral history).
    #[must_use]
    pub fn history_path(&self) -> Option<PathBuf> {
        self.history_file.clone().or_else(|| {
            dirs::data_dir().map(|dir| dir.join(APP_NAME).join("history.json"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_fills_defaults() {
        let settings: Settings = serde_yaml::from_str("activation_margin: 12\n").unwrap();
        assert_eq!(settings.activation_margin, 12);
        assert_eq!(settings.version, CURRENT_VERSION);
        assert_eq!(settings.reduce_effects, None);
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(Some(&dir.path().join("nope.yaml")));
        assert_eq!(settings.activation_margin, DEFAULT_ACTIVATION_MARGIN);
    }

    #[test]
    fn corrupt_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, ":: not yaml ::").unwrap();
        let settings = Settings::load(Some(&path));
        assert_eq!(settings.version, CURRENT_VERSION);
    }
}
