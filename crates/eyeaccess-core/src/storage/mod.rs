mod config;

pub use config::{
    ActivityConfig, CalibrationConfig, Config, ControlConfig, PreferencesConfig, TrackingConfig,
    ViewportConfig,
};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/eyeaccess[-dev]/` based on EYEACCESS_ENV.
///
/// Set EYEACCESS_ENV=dev to use development data directory. Only the
/// configuration lives here; session and activity state are never written.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("EYEACCESS_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("eyeaccess-dev")
    } else {
        base_dir.join("eyeaccess")
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir {
        path: dir.clone(),
        message: e.to_string(),
    })?;
    Ok(dir)
}
