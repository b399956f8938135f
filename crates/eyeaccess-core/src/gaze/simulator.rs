//! Simulated gaze input: a bounded random walk.
//!
//! Each sample adds two independent uniform deltas in
//! `[-jitter_px, +jitter_px]` to the current position and clamps it to
//! `[margin_x, W - margin_x] x [margin_y, H - margin_y]`.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{GazePosition, GazeSource};
use crate::error::ValidationError;
use crate::viewport::Viewport;

/// Missed intervals replayed by one `tick`; beyond this the cadence realigns.
const MAX_CATCH_UP_SAMPLES: u32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulatorSettings {
    pub sample_interval_ms: u64,
    pub jitter_px: f64,
    pub margin_x: f64,
    pub margin_y: f64,
}

impl Default for SimulatorSettings {
    fn default() -> Self {
        Self {
            sample_interval_ms: 150,
            jitter_px: 15.0,
            margin_x: 50.0,
            margin_y: 100.0,
        }
    }
}

impl SimulatorSettings {
    /// Reject values that would stall the cadence, overflow the jitter range
    /// or widen the clamp band past the viewport edges.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let invalid = |field: &str, message: String| {
            Err(ValidationError::InvalidValue {
                field: field.into(),
                message,
            })
        };
        if self.sample_interval_ms == 0 {
            return invalid("tracking.sample_interval_ms", "must be greater than 0".into());
        }
        if !(self.jitter_px >= 0.0 && (2.0 * self.jitter_px).is_finite()) {
            return invalid(
                "tracking.jitter_px",
                format!("must be a finite non-negative distance, got {}", self.jitter_px),
            );
        }
        for (field, margin) in [("tracking.margin_x", self.margin_x), ("tracking.margin_y", self.margin_y)] {
            if !(margin.is_finite() && margin >= 0.0) {
                return invalid(field, format!("must be a finite non-negative distance, got {margin}"));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct GazeSimulator {
    settings: SimulatorSettings,
    viewport: Viewport,
    position: GazePosition,
    rng: Pcg64,
    /// Next sample deadline; `None` while stopped.
    next_sample_at_ms: Option<u64>,
    samples: u64,
}

impl GazeSimulator {
    pub fn new(viewport: Viewport, settings: SimulatorSettings, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => Pcg64::seed_from_u64(seed),
            None => Pcg64::from_entropy(),
        };
        let mut sim = Self {
            settings,
            viewport,
            position: GazePosition::center_of(&viewport),
            rng,
            next_sample_at_ms: None,
            samples: 0,
        };
        sim.position = sim.clamp(sim.position);
        sim
    }

    pub fn settings(&self) -> &SimulatorSettings {
        &self.settings
    }

    /// Inclusive x and y ranges the position is kept within.
    ///
    /// On a viewport narrower than twice the margin the range collapses to
    /// the center line.
    pub fn bounds(&self) -> ((f64, f64), (f64, f64)) {
        let axis = |len: f64, margin: f64| {
            let lo = margin;
            let hi = len - margin;
            if lo <= hi {
                (lo, hi)
            } else {
                (len / 2.0, len / 2.0)
            }
        };
        (
            axis(self.viewport.width, self.settings.margin_x),
            axis(self.viewport.height, self.settings.margin_y),
        )
    }

    fn clamp(&self, p: GazePosition) -> GazePosition {
        let ((x_lo, x_hi), (y_lo, y_hi)) = self.bounds();
        GazePosition {
            x: p.x.clamp(x_lo, x_hi),
            y: p.y.clamp(y_lo, y_hi),
        }
    }

    fn sample(&mut self) -> GazePosition {
        let j = self.settings.jitter_px;
        let (dx, dy) = if j > 0.0 && (2.0 * j).is_finite() {
            (self.rng.gen_range(-j..=j), self.rng.gen_range(-j..=j))
        } else {
            (0.0, 0.0)
        };
        self.position = self.clamp(GazePosition {
            x: self.position.x + dx,
            y: self.position.y + dy,
        });
        self.samples += 1;
        self.position
    }
}

impl GazeSource for GazeSimulator {
    fn current_position(&self) -> GazePosition {
        self.position
    }

    /// Resumes from the last position; starting twice keeps the schedule.
    fn start_at(&mut self, now_ms: u64) {
        if self.next_sample_at_ms.is_some() {
            return;
        }
        self.samples = 0;
        self.next_sample_at_ms = Some(now_ms.saturating_add(self.settings.sample_interval_ms));
        debug!(x = self.position.x, y = self.position.y, "gaze simulator started");
    }

    fn stop(&mut self) {
        if self.next_sample_at_ms.take().is_some() {
            debug!(samples = self.samples, "gaze simulator stopped");
        }
    }

    fn is_running(&self) -> bool {
        self.next_sample_at_ms.is_some()
    }

    fn tick_at(&mut self, now_ms: u64) -> Option<GazePosition> {
        let due = self.next_sample_at_ms?;
        if now_ms < due {
            return None;
        }
        let interval = self.settings.sample_interval_ms.max(1);
        let missed = (now_ms - due) / interval + 1;
        for _ in 0..missed.min(MAX_CATCH_UP_SAMPLES as u64) {
            self.sample();
        }
        self.next_sample_at_ms = Some(if missed > MAX_CATCH_UP_SAMPLES as u64 {
            now_ms + interval
        } else {
            due + missed * interval
        });
        Some(self.position)
    }

    fn samples_since_start(&self) -> u64 {
        self.samples
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.position = self.clamp(self.position);
    }
}
