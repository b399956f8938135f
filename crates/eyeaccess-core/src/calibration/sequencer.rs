//! Calibration sequencer.
//!
//! A wall-clock state machine with no internal timer. Confirming a target
//! starts a short acknowledgment; the caller drives `tick()` and the step
//! advances once the acknowledgment deadline has passed.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Calibrating(0..=4) -> Complete
//!              |
//!              +-> Skipped
//! ```
//!
//! `start()` re-enters `Calibrating(0)` from any state. `Skipped` gates
//! tracking exactly like `Complete`.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::points::{calibration_points, CalibrationPoint};
use crate::error::CalibrationError;
use crate::events::{timestamp, Event};
use crate::now_ms;
use crate::viewport::Viewport;

/// Delay between confirming a target and moving on.
pub const DEFAULT_ACK_DELAY_MS: u64 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CalibrationState {
    Idle,
    Calibrating { step: usize },
    Complete,
    /// User confirmed skipping calibration.
    Skipped,
}

impl CalibrationState {
    /// Whether this state lets tracking and activation proceed.
    pub fn is_satisfied(&self) -> bool {
        matches!(self, CalibrationState::Complete | CalibrationState::Skipped)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct PendingAck {
    step: usize,
    due_at_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationSequencer {
    points: Vec<CalibrationPoint>,
    state: CalibrationState,
    ack_delay_ms: u64,
    #[serde(default)]
    pending_ack: Option<PendingAck>,
}

impl CalibrationSequencer {
    pub fn new(viewport: &Viewport, ack_delay_ms: u64) -> Self {
        Self {
            points: calibration_points(viewport),
            state: CalibrationState::Idle,
            ack_delay_ms,
            pending_ack: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> CalibrationState {
        self.state
    }

    pub fn points(&self) -> &[CalibrationPoint] {
        &self.points
    }

    pub fn total_steps(&self) -> usize {
        self.points.len()
    }

    pub fn in_progress(&self) -> bool {
        matches!(self.state, CalibrationState::Calibrating { .. })
    }

    /// True for both `Complete` and `Skipped`.
    pub fn is_complete(&self) -> bool {
        self.state.is_satisfied()
    }

    pub fn current_step(&self) -> Option<usize> {
        match self.state {
            CalibrationState::Calibrating { step } => Some(step),
            _ => None,
        }
    }

    pub fn current_point(&self) -> Option<CalibrationPoint> {
        self.current_step().and_then(|i| self.points.get(i).copied())
    }

    /// Whether the confirmation acknowledgment is on screen.
    pub fn ack_visible(&self) -> bool {
        self.pending_ack.is_some()
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Event {
        self.start_at(now_ms())
    }

    pub fn start_at(&mut self, now_ms: u64) -> Event {
        self.state = CalibrationState::Calibrating { step: 0 };
        self.pending_ack = None;
        info!(total_steps = self.total_steps(), "calibration started");
        Event::CalibrationStarted {
            total_steps: self.total_steps(),
            at: timestamp(now_ms),
        }
    }

    pub fn confirm_step(&mut self) -> Result<Event, CalibrationError> {
        self.confirm_step_at(now_ms())
    }

    /// Confirm the current target. The step advances on a later `tick`.
    pub fn confirm_step_at(&mut self, now_ms: u64) -> Result<Event, CalibrationError> {
        let step = self.current_step().ok_or(CalibrationError::NotCalibrating)?;
        if let Some(pending) = self.pending_ack {
            return Err(CalibrationError::AcknowledgmentPending { step: pending.step });
        }
        self.pending_ack = Some(PendingAck {
            step,
            due_at_ms: now_ms.saturating_add(self.ack_delay_ms),
        });
        debug!(step, "calibration step confirmed");
        Ok(Event::CalibrationStepConfirmed {
            step,
            at: timestamp(now_ms),
        })
    }

    pub fn tick(&mut self) -> Option<Event> {
        self.tick_at(now_ms())
    }

    /// Call periodically. Returns an event once a pending acknowledgment
    /// resolves into the next step or into `Complete`.
    pub fn tick_at(&mut self, now_ms: u64) -> Option<Event> {
        let pending = self.pending_ack?;
        if now_ms < pending.due_at_ms {
            return None;
        }
        self.pending_ack = None;

        let step = match self.state {
            CalibrationState::Calibrating { step } if step == pending.step => step,
            // State moved on underneath the acknowledgment.
            _ => return None,
        };

        if step + 1 < self.total_steps() {
            self.state = CalibrationState::Calibrating { step: step + 1 };
            Some(Event::CalibrationStepAdvanced {
                step: step + 1,
                at: timestamp(now_ms),
            })
        } else {
            self.state = CalibrationState::Complete;
            info!("calibration complete");
            Some(Event::CalibrationCompleted {
                total_steps: self.total_steps(),
                at: timestamp(now_ms),
            })
        }
    }

    pub fn skip(&mut self) -> Result<Event, CalibrationError> {
        self.skip_at(now_ms())
    }

    /// Abandon calibration. Callers confirm with the user first.
    pub fn skip_at(&mut self, now_ms: u64) -> Result<Event, CalibrationError> {
        let step = self.current_step().ok_or(CalibrationError::NotCalibrating)?;
        self.pending_ack = None;
        self.state = CalibrationState::Skipped;
        info!(at_step = step, "calibration skipped");
        Ok(Event::CalibrationSkipped {
            at_step: step,
            at: timestamp(now_ms),
        })
    }

    pub fn reset(&mut self) -> Event {
        self.reset_at(now_ms())
    }

    pub fn reset_at(&mut self, now_ms: u64) -> Event {
        self.state = CalibrationState::Idle;
        self.pending_ack = None;
        info!("calibration reset");
        Event::CalibrationReset {
            at: timestamp(now_ms),
        }
    }

    /// Drop a pending acknowledgment without advancing.
    /// Returns whether one was pending.
    pub fn cancel_pending(&mut self) -> bool {
        self.pending_ack.take().is_some()
    }

    /// Recompute targets for a new viewport. Progress is kept.
    pub fn set_viewport(&mut self, viewport: &Viewport) {
        self.points = calibration_points(viewport);
    }
}

impl Default for CalibrationSequencer {
    fn default() -> Self {
        Self::new(&Viewport::default(), DEFAULT_ACK_DELAY_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0: u64 = 1_700_000_000_000;

    fn confirm_and_settle(seq: &mut CalibrationSequencer, now: u64) -> Option<Event> {
        seq.confirm_step_at(now).unwrap();
        seq.tick_at(now + DEFAULT_ACK_DELAY_MS)
    }

    #[test]
    fn starts_idle() {
        let seq = CalibrationSequencer::default();
        assert_eq!(seq.state(), CalibrationState::Idle);
        assert!(!seq.is_complete());
        assert_eq!(seq.current_point(), None);
    }

    #[test]
    fn confirm_outside_calibration_is_rejected() {
        let mut seq = CalibrationSequencer::default();
        assert_eq!(
            seq.confirm_step_at(T0),
            Err(CalibrationError::NotCalibrating)
        );
    }

    #[test]
    fn step_waits_for_acknowledgment() {
        let mut seq = CalibrationSequencer::default();
        seq.start_at(T0);
        seq.confirm_step_at(T0).unwrap();
        assert!(seq.ack_visible());

        assert_eq!(seq.tick_at(T0 + DEFAULT_ACK_DELAY_MS - 1), None);
        assert_eq!(seq.current_step(), Some(0));

        let event = seq.tick_at(T0 + DEFAULT_ACK_DELAY_MS);
        assert!(matches!(
            event,
            Some(Event::CalibrationStepAdvanced { step: 1, .. })
        ));
        assert!(!seq.ack_visible());
    }

    #[test]
    fn double_confirm_during_acknowledgment_is_ignored() {
        let mut seq = CalibrationSequencer::default();
        seq.start_at(T0);
        seq.confirm_step_at(T0).unwrap();
        assert_eq!(
            seq.confirm_step_at(T0 + 10),
            Err(CalibrationError::AcknowledgmentPending { step: 0 })
        );
        seq.tick_at(T0 + DEFAULT_ACK_DELAY_MS);
        assert_eq!(seq.current_step(), Some(1));
    }

    #[test]
    fn five_confirmations_complete() {
        let mut seq = CalibrationSequencer::default();
        seq.start_at(T0);
        let mut last = None;
        for i in 0..5 {
            last = confirm_and_settle(&mut seq, T0 + i * 1_000);
        }
        assert!(matches!(
            last,
            Some(Event::CalibrationCompleted { total_steps: 5, .. })
        ));
        assert_eq!(seq.state(), CalibrationState::Complete);
        assert!(seq.is_complete());
    }

    #[test]
    fn skip_from_every_step() {
        for target in 0..5u64 {
            let mut seq = CalibrationSequencer::default();
            seq.start_at(T0);
            for i in 0..target {
                confirm_and_settle(&mut seq, T0 + i * 1_000);
            }
            assert_eq!(seq.current_step(), Some(target as usize));
            let event = seq.skip_at(T0 + 10_000).unwrap();
            assert!(matches!(event, Event::CalibrationSkipped { at_step, .. } if at_step == target as usize));
            assert_eq!(seq.state(), CalibrationState::Skipped);
            assert!(seq.is_complete());
        }
    }

    #[test]
    fn skip_drops_pending_acknowledgment() {
        let mut seq = CalibrationSequencer::default();
        seq.start_at(T0);
        seq.confirm_step_at(T0).unwrap();
        seq.skip_at(T0 + 1).unwrap();
        assert_eq!(seq.tick_at(T0 + 10_000), None);
        assert_eq!(seq.state(), CalibrationState::Skipped);
    }

    #[test]
    fn restart_clears_completion() {
        let mut seq = CalibrationSequencer::default();
        seq.start_at(T0);
        seq.skip_at(T0).unwrap();
        seq.start_at(T0 + 1);
        assert_eq!(seq.state(), CalibrationState::Calibrating { step: 0 });
        assert!(!seq.is_complete());
    }

    #[test]
    fn cancel_pending_prevents_advance() {
        let mut seq = CalibrationSequencer::default();
        seq.start_at(T0);
        seq.confirm_step_at(T0).unwrap();
        assert!(seq.cancel_pending());
        assert_eq!(seq.tick_at(T0 + 10_000), None);
        assert_eq!(seq.current_step(), Some(0));
    }

    #[test]
    fn reset_returns_to_idle() {
        let mut seq = CalibrationSequencer::default();
        seq.start_at(T0);
        seq.skip_at(T0).unwrap();
        seq.reset_at(T0);
        assert_eq!(seq.state(), CalibrationState::Idle);
    }

    #[test]
    fn state_serializes_with_tag() {
        let json = serde_json::to_value(CalibrationState::Calibrating { step: 3 }).unwrap();
        assert_eq!(json["state"], "calibrating");
        assert_eq!(json["step"], 3);
    }
}
