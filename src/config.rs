//! Tool configuration persistence
//!
//! Stores user preferences in `~/.config/boxfit/config.yaml`. Preview
//! settings themselves live in JSON profiles (see [`crate::settings`]); this
//! file only records which profile to use and how results are listed.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::settings::{AppSettings, SettingsError};

/// Configuration that persists across sessions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreviewConfig {
    /// Profile loaded when no `--settings` is given. A bare name resolves
    /// inside the profiles directory.
    #[serde(default)]
    pub default_profile: Option<String>,

    /// List only overflowing blocks by default
    #[serde(default)]
    pub only_overflowing: bool,
}

impl PreviewConfig {
    /// Load config from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::config_file() else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };
        Self::load_from(&path)
    }

    /// Load from an explicit path, falling back to defaults on any failure
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match serde_yaml::from_str(&content) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse config at {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save config to disk
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> Result<(), String> {
        let path = crate::config_paths::config_file()
            .ok_or_else(|| "No config directory available".to_string())?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        let content = serde_yaml::to_string(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        std::fs::write(path, content)
            .map_err(|e| format!("Failed to write config to {}: {}", path.display(), e))?;

        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Path of the default profile, if one is configured
    pub fn default_profile_path(&self) -> Option<PathBuf> {
        let profile = self.default_profile.as_deref()?;
        let path = Path::new(profile);
        if path.components().count() > 1 || path.extension().is_some() {
            Some(path.to_path_buf())
        } else {
            crate::config_paths::profile_file(profile)
        }
    }
}

/// Write `settings` as `<dir>/<name>.json` so a bare `default_profile` name finds it
pub fn install_profile(
    settings: &AppSettings,
    dir: &Path,
    name: &str,
) -> Result<PathBuf, SettingsError> {
    let path = dir.join(format!("{}.json", name));
    settings.save_profile(&path)?;
    Ok(path)
}
