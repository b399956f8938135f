use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::calibration::CalibrationState;
use crate::gaze::GazePosition;

/// Every state change in the system produces an Event.
/// The shell polls for events; the activity log records them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    CalibrationStarted {
        total_steps: usize,
        at: DateTime<Utc>,
    },
    /// The user confirmed the current target; acknowledgment is showing.
    CalibrationStepConfirmed {
        step: usize,
        at: DateTime<Utc>,
    },
    CalibrationStepAdvanced {
        step: usize,
        at: DateTime<Utc>,
    },
    CalibrationCompleted {
        total_steps: usize,
        at: DateTime<Utc>,
    },
    CalibrationSkipped {
        at_step: usize,
        at: DateTime<Utc>,
    },
    CalibrationReset {
        at: DateTime<Utc>,
    },
    TrackingStarted {
        position: GazePosition,
        at: DateTime<Utc>,
    },
    TrackingStopped {
        position: GazePosition,
        samples: u64,
        at: DateTime<Utc>,
    },
    ControlActivated {
        at: DateTime<Utc>,
    },
    ControlDeactivated {
        at: DateTime<Utc>,
    },
    EmergencyStop {
        was_active: bool,
        at: DateTime<Utc>,
    },
    /// A delayed activation/deactivation notice is due.
    NoticeDue {
        activated: bool,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        calibration: CalibrationState,
        calibrated: bool,
        active: bool,
        tracking: bool,
        position: GazePosition,
        at: DateTime<Utc>,
    },
}

/// Convert epoch milliseconds into an event timestamp.
pub(crate) fn timestamp(now_ms: u64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(now_ms as i64).unwrap_or_else(Utc::now)
}

impl Event {
    /// Short machine-readable name, matching the serialized `type` tag.
    pub fn name(&self) -> &'static str {
        match self {
            Event::CalibrationStarted { .. } => "calibration_started",
            Event::CalibrationStepConfirmed { .. } => "calibration_step_confirmed",
            Event::CalibrationStepAdvanced { .. } => "calibration_step_advanced",
            Event::CalibrationCompleted { .. } => "calibration_completed",
            Event::CalibrationSkipped { .. } => "calibration_skipped",
            Event::CalibrationReset { .. } => "calibration_reset",
            Event::TrackingStarted { .. } => "tracking_started",
            Event::TrackingStopped { .. } => "tracking_stopped",
            Event::ControlActivated { .. } => "control_activated",
            Event::ControlDeactivated { .. } => "control_deactivated",
            Event::EmergencyStop { .. } => "emergency_stop",
            Event::NoticeDue { .. } => "notice_due",
            Event::StateSnapshot { .. } => "state_snapshot",
        }
    }
}
