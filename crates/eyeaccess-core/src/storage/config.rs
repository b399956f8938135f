//! TOML-based application configuration.
//!
//! Stores user preferences and tuning:
//! - Feedback toggles (sound, haptics, adaptive mode) and language
//! - Gaze simulator cadence, jitter and margins
//! - Calibration acknowledgment and activation notice delays
//! - Whether the activity log starts with demo entries
//! - Fallback viewport for shells that cannot measure one
//!
//! Configuration is stored at `~/.config/eyeaccess/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::{ConfigError, ValidationError};
use crate::gaze::SimulatorSettings;
use crate::viewport::Viewport;

/// Feedback and language preferences, toggled from the Settings screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreferencesConfig {
    #[serde(default = "default_true")]
    pub sound_enabled: bool,
    #[serde(default = "default_true")]
    pub haptic_enabled: bool,
    #[serde(default)]
    pub adaptive_mode: bool,
    #[serde(default = "default_language")]
    pub language: String,
}

/// Gaze simulator tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingConfig {
    #[serde(default = "default_sample_interval_ms")]
    pub sample_interval_ms: u64,
    #[serde(default = "default_jitter_px")]
    pub jitter_px: f64,
    #[serde(default = "default_margin_x")]
    pub margin_x: f64,
    #[serde(default = "default_margin_y")]
    pub margin_y: f64,
    /// Fixed RNG seed for reproducible walks.
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationConfig {
    #[serde(default = "default_step_ack_delay_ms")]
    pub step_ack_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlConfig {
    #[serde(default = "default_activation_notice_delay_ms")]
    pub activation_notice_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityConfig {
    #[serde(default = "default_true")]
    pub seed_demo_entries: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewportConfig {
    #[serde(default = "default_viewport_width")]
    pub width: f64,
    #[serde(default = "default_viewport_height")]
    pub height: f64,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/eyeaccess/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub preferences: PreferencesConfig,
    #[serde(default)]
    pub tracking: TrackingConfig,
    #[serde(default)]
    pub calibration: CalibrationConfig,
    #[serde(default)]
    pub control: ControlConfig,
    #[serde(default)]
    pub activity: ActivityConfig,
    #[serde(default)]
    pub viewport: ViewportConfig,
}

// Default functions
fn default_true() -> bool {
    true
}
fn default_language() -> String {
    "en".into()
}
fn default_sample_interval_ms() -> u64 {
    150
}
fn default_jitter_px() -> f64 {
    15.0
}
fn default_margin_x() -> f64 {
    50.0
}
fn default_margin_y() -> f64 {
    100.0
}
fn default_step_ack_delay_ms() -> u64 {
    crate::calibration::DEFAULT_ACK_DELAY_MS
}
fn default_activation_notice_delay_ms() -> u64 {
    crate::session::DEFAULT_NOTICE_DELAY_MS
}
fn default_viewport_width() -> f64 {
    390.0
}
fn default_viewport_height() -> f64 {
    844.0
}

impl Default for PreferencesConfig {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            haptic_enabled: true,
            adaptive_mode: false,
            language: default_language(),
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: default_sample_interval_ms(),
            jitter_px: default_jitter_px(),
            margin_x: default_margin_x(),
            margin_y: default_margin_y(),
            seed: None,
        }
    }
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            step_ack_delay_ms: default_step_ack_delay_ms(),
        }
    }
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            activation_notice_delay_ms: default_activation_notice_delay_ms(),
        }
    }
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            seed_demo_entries: true,
        }
    }
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: default_viewport_width(),
            height: default_viewport_height(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as number")));
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    // Unset optional: take JSON if it parses, else a string.
                    serde_json::Value::Null => serde_json::from_str(value)
                        .unwrap_or_else(|_| serde_json::Value::String(value.into())),
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there if the file is missing.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Self = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a value by key in memory. Returns error if the key is unknown or
    /// the value does not fit the field.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let mut json = serde_json::to_value(&*self).map_err(|e| invalid(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Self = serde_json::from_value(json).map_err(|e| invalid(e.to_string()))?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Check the gaze tuning and fallback viewport.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let to_config = |e: ValidationError| match e {
            ValidationError::InvalidValue { field, message } => ConfigError::InvalidValue {
                key: field,
                message,
            },
        };
        self.simulator_settings().validate().map_err(to_config)?;
        self.viewport().map(|_| ()).map_err(to_config)
    }

    /// Set a config value by key and persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.set_value(key, value)?;
        self.save()
    }

    pub fn simulator_settings(&self) -> SimulatorSettings {
        SimulatorSettings {
            sample_interval_ms: self.tracking.sample_interval_ms,
            jitter_px: self.tracking.jitter_px,
            margin_x: self.tracking.margin_x,
            margin_y: self.tracking.margin_y,
        }
    }

    pub fn viewport(&self) -> Result<Viewport, ValidationError> {
        Viewport::new(self.viewport.width, self.viewport.height)
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!("using default config: {e}");
            Self::default()
        })
    }
}
