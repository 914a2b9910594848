//! Centralized configuration paths for boxfit
//!
//! All config files live under:
//! - Unix/macOS: `~/.config/boxfit/`
//! - Windows: `%APPDATA%\boxfit\`
//!
//! This module is the single source of truth for config paths.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

const APP_DIR: &str = "boxfit";

/// Base config directory for boxfit
///
/// Unix/macOS:
///   - If XDG_CONFIG_HOME is set: `$XDG_CONFIG_HOME/boxfit`
///   - Else: `~/.config/boxfit`
///
/// Windows:
///   - `%APPDATA%\boxfit`
pub fn config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        env::var("APPDATA")
            .ok()
            .map(|appdata| PathBuf::from(appdata).join(APP_DIR))
    }

    #[cfg(not(target_os = "windows"))]
    {
        env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
            .map(|config| config.join(APP_DIR))
    }
}

/// `~/.config/boxfit/config.yaml`
pub fn config_file() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.yaml"))
}

/// `~/.config/boxfit/profiles/`
pub fn profiles_dir() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("profiles"))
}

/// `~/.config/boxfit/profiles/<name>.json`
pub fn profile_file(name: &str) -> Option<PathBuf> {
    profiles_dir().map(|dir| dir.join(format!("{}.json", name)))
}

/// `~/.config/boxfit/logs/`
pub fn logs_dir() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("logs"))
}

fn ensure_dir(path: &Path) -> Result<(), String> {
    fs::create_dir_all(path)
        .map_err(|e| format!("Failed to create directory {}: {}", path.display(), e))
}

/// Ensure the base config dir exists, returning it
pub fn ensure_config_dir() -> Result<PathBuf, String> {
    let dir = config_dir().ok_or_else(|| "No config directory available".to_string())?;
    ensure_dir(&dir)?;
    Ok(dir)
}

/// Ensure profiles dir exists, returning it
pub fn ensure_profiles_dir() -> Result<PathBuf, String> {
    let profiles = ensure_config_dir()?.join("profiles");
    ensure_dir(&profiles)?;
    Ok(profiles)
}

/// Ensure logs dir exists, returning it
pub fn ensure_logs_dir() -> Result<PathBuf, String> {
    let logs = ensure_config_dir()?.join("logs");
    ensure_dir(&logs)?;
    Ok(logs)
}
