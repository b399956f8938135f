//! Gaze input.
//!
//! Screens only see the [`GazeSource`] trait, so the simulator can be swapped
//! for a real estimator without touching the session or the presenters.

mod simulator;

use serde::{Deserialize, Serialize};

use crate::viewport::Viewport;

pub use simulator::{GazeSimulator, SimulatorSettings};

/// Estimated on-screen gaze point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GazePosition {
    pub x: f64,
    pub y: f64,
}

impl GazePosition {
    pub fn center_of(viewport: &Viewport) -> Self {
        let (x, y) = viewport.center();
        Self { x, y }
    }

    /// Rounded to whole points, for display.
    pub fn rounded(&self) -> (i64, i64) {
        (self.x.round() as i64, self.y.round() as i64)
    }
}

/// Anything that can produce gaze positions on a cadence.
///
/// Sources are polled: the owner calls `tick_at` periodically and a source
/// returns `Some` when it produced a new position.
pub trait GazeSource: Send + std::fmt::Debug {
    fn current_position(&self) -> GazePosition;

    fn start_at(&mut self, now_ms: u64);

    fn stop(&mut self);

    fn is_running(&self) -> bool;

    fn tick_at(&mut self, now_ms: u64) -> Option<GazePosition>;

    /// Samples produced since the last `start_at`.
    fn samples_since_start(&self) -> u64;

    /// Apply new screen bounds; the position is re-clamped.
    fn set_viewport(&mut self, viewport: Viewport);

    fn start(&mut self) {
        self.start_at(crate::now_ms());
    }

    fn tick(&mut self) -> Option<GazePosition> {
        self.tick_at(crate::now_ms())
    }
}
