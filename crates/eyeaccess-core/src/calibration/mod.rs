mod points;
mod sequencer;

pub use points::{calibration_points, CalibrationPoint, CALIBRATION_FRACTIONS};
pub use sequencer::{CalibrationSequencer, CalibrationState, DEFAULT_ACK_DELAY_MS};
