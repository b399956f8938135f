//! Core error types for eyeaccess-core.
//!
//! Most "failures" in this crate are user-correctable preconditions on UI
//! actions (activating control before calibrating, for instance). Those are
//! ordinary values here and the screens turn them into prompts.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for eyeaccess-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Session gate rejected an action
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Calibration sequencer rejected an action
    #[error("Calibration error: {0}")]
    Calibration(#[from] CalibrationError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config directory could not be determined or created
    #[error("Failed to prepare config directory {path}: {message}")]
    DataDir { path: PathBuf, message: String },

    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Session gate errors.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    /// Activation or tracking attempted before calibration completed or was skipped
    #[error("Eye tracking must be calibrated first")]
    CalibrationRequired,
}

/// Calibration sequencer errors.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationError {
    /// The action only makes sense while calibrating
    #[error("No calibration in progress")]
    NotCalibrating,

    /// A confirmation is still being acknowledged
    #[error("Step {step} is still being acknowledged")]
    AcknowledgmentPending { step: usize },
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
