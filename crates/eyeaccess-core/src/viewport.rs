use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Screen dimensions in points, as measured by the shell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Result<Self, ValidationError> {
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            return Err(ValidationError::InvalidValue {
                field: "viewport".into(),
                message: format!("dimensions must be positive, got {width}x{height}"),
            });
        }
        Ok(Self { width, height })
    }

    pub fn center(&self) -> (f64, f64) {
        (self.width / 2.0, self.height / 2.0)
    }

    /// Point at the given fraction of width and height.
    pub fn at_fraction(&self, fx: f64, fy: f64) -> (f64, f64) {
        (self.width * fx, self.height * fy)
    }
}

impl Default for Viewport {
    /// A typical phone portrait viewport.
    fn default() -> Self {
        Self {
            width: 390.0,
            height: 844.0,
        }
    }
}
