//! # EyeAccess Core Library
//!
//! Business logic for EyeAccess, a hands-free device control front-end driven
//! by eye-tracking input. The CLI binary and the Tauri shell are thin layers
//! over this crate; neither holds state of its own.
//!
//! ## Architecture
//!
//! - **Calibration Sequencer**: a wall-clock state machine that walks the user
//!   through five screen-space targets. The caller invokes `tick()`.
//! - **Gaze Source**: a bounded random walk standing in for a real gaze
//!   estimator, behind the [`GazeSource`] trait.
//! - **Session State Holder**: the activation gate and emergency stop.
//! - **Activity Log**: in-memory list of event records fed by [`Event`]s.
//! - **Screens**: view models for the four screens, built from one shared
//!   [`AppContext`].
//!
//! ## Key Components
//!
//! - [`AppContext`]: the shared session context injected into every screen
//! - [`CalibrationSequencer`]: calibration state machine
//! - [`GazeSimulator`]: simulated gaze input
//! - [`Config`]: TOML configuration

pub mod activity;
pub mod calibration;
pub mod camera;
pub mod context;
pub mod error;
pub mod events;
pub mod gaze;
pub mod prompt;
pub mod screens;
pub mod session;
pub mod storage;
pub mod viewport;

pub use activity::{ActivityKind, ActivityLog, ActivityLogEntry, ActivityStats};
pub use calibration::{CalibrationPoint, CalibrationSequencer, CalibrationState};
pub use camera::CameraPermission;
pub use context::AppContext;
pub use error::{CalibrationError, ConfigError, CoreError, SessionError, ValidationError};
pub use events::Event;
pub use gaze::{GazePosition, GazeSimulator, GazeSource};
pub use prompt::{Prompt, PromptAction, PromptStyle};
pub use screens::{ActionOutcome, Screen};
pub use session::{SessionState, SessionStateHolder};
pub use storage::Config;
pub use viewport::Viewport;

/// Milliseconds since the Unix epoch.
///
/// Every time-driven component takes explicit `now_ms` values in its `_at`
/// methods; the plain variants call this.
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
