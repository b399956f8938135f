use serde::{Deserialize, Serialize};

use crate::viewport::Viewport;

/// Target positions as (width, height) fractions, kept clear of the edges.
pub const CALIBRATION_FRACTIONS: [(f64, f64); 5] = [
    (0.15, 0.2), // top-left
    (0.85, 0.2), // top-right
    (0.5, 0.5),  // center
    (0.15, 0.8), // bottom-left
    (0.85, 0.8), // bottom-right
];

/// A screen-space calibration target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationPoint {
    pub x: f64,
    pub y: f64,
}

/// The five targets for a viewport. Recomputed only when the viewport changes.
pub fn calibration_points(viewport: &Viewport) -> Vec<CalibrationPoint> {
    CALIBRATION_FRACTIONS
        .iter()
        .map(|&(fx, fy)| {
            let (x, y) = viewport.at_fraction(fx, fy);
            CalibrationPoint { x, y }
        })
        .collect()
}
