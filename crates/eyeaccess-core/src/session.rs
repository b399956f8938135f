//! Session state holder: the activation gate.
//!
//! `active` can only be switched on once calibration is satisfied. No
//! background process exists behind the flag; activation schedules a delayed
//! notice which `tick()` releases.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::SessionError;
use crate::events::{timestamp, Event};
use crate::now_ms;

pub const DEFAULT_NOTICE_DELAY_MS: u64 = 300;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub active: bool,
    pub calibrated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct PendingNotice {
    activated: bool,
    due_at_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStateHolder {
    state: SessionState,
    notice_delay_ms: u64,
    #[serde(default)]
    pending_notice: Option<PendingNotice>,
}

impl SessionStateHolder {
    pub fn new(notice_delay_ms: u64) -> Self {
        Self {
            state: SessionState::default(),
            notice_delay_ms,
            pending_notice: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state.active
    }

    pub fn is_calibrated(&self) -> bool {
        self.state.calibrated
    }

    pub fn has_pending_notice(&self) -> bool {
        self.pending_notice.is_some()
    }

    pub fn activate(&mut self) -> Result<Event, SessionError> {
        self.activate_at(now_ms())
    }

    /// Toggle control on or off. Refused until calibration is satisfied.
    pub fn activate_at(&mut self, now_ms: u64) -> Result<Event, SessionError> {
        if !self.state.calibrated {
            warn!("activation refused: calibration required");
            return Err(SessionError::CalibrationRequired);
        }
        self.state.active = !self.state.active;
        self.pending_notice = Some(PendingNotice {
            activated: self.state.active,
            due_at_ms: now_ms.saturating_add(self.notice_delay_ms),
        });
        let at = timestamp(now_ms);
        if self.state.active {
            info!("eye control activated");
            Ok(Event::ControlActivated { at })
        } else {
            info!("eye control deactivated");
            Ok(Event::ControlDeactivated { at })
        }
    }

    pub fn emergency_stop(&mut self) -> Event {
        self.emergency_stop_at(now_ms())
    }

    /// Force `active = false` and drop any pending notice. Always succeeds.
    pub fn emergency_stop_at(&mut self, now_ms: u64) -> Event {
        let was_active = self.state.active;
        self.state.active = false;
        self.pending_notice = None;
        warn!(was_active, "emergency stop");
        Event::EmergencyStop {
            was_active,
            at: timestamp(now_ms),
        }
    }

    /// Called by the context when the sequencer completes or is skipped.
    pub(crate) fn on_calibration_complete(&mut self) {
        self.state.calibrated = true;
    }

    /// Forget calibration. Control is switched off with it.
    pub(crate) fn clear_calibration(&mut self) {
        self.state.calibrated = false;
        self.state.active = false;
        self.pending_notice = None;
    }

    /// Drop a pending notice. Returns whether one was pending.
    pub fn cancel_pending(&mut self) -> bool {
        self.pending_notice.take().is_some()
    }

    pub fn tick(&mut self) -> Option<Event> {
        self.tick_at(now_ms())
    }

    pub fn tick_at(&mut self, now_ms: u64) -> Option<Event> {
        let pending = self.pending_notice?;
        if now_ms < pending.due_at_ms {
            return None;
        }
        self.pending_notice = None;
        Some(Event::NoticeDue {
            activated: pending.activated,
            at: timestamp(now_ms),
        })
    }
}

impl Default for SessionStateHolder {
    fn default() -> Self {
        Self::new(DEFAULT_NOTICE_DELAY_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0: u64 = 1_700_000_000_000;

    fn calibrated() -> SessionStateHolder {
        let mut s = SessionStateHolder::default();
        s.on_calibration_complete();
        s
    }

    #[test]
    fn activate_requires_calibration() {
        let mut s = SessionStateHolder::default();
        assert_eq!(s.activate_at(T0), Err(SessionError::CalibrationRequired));
        assert!(!s.is_active());
        assert!(!s.has_pending_notice());
    }

    #[test]
    fn activate_toggles() {
        let mut s = calibrated();
        assert!(matches!(s.activate_at(T0), Ok(Event::ControlActivated { .. })));
        assert!(s.is_active());
        assert!(matches!(
            s.activate_at(T0 + 1),
            Ok(Event::ControlDeactivated { .. })
        ));
        assert!(!s.is_active());
    }

    #[test]
    fn notice_is_delayed() {
        let mut s = calibrated();
        s.activate_at(T0).unwrap();
        assert_eq!(s.tick_at(T0 + DEFAULT_NOTICE_DELAY_MS - 1), None);
        assert!(matches!(
            s.tick_at(T0 + DEFAULT_NOTICE_DELAY_MS),
            Some(Event::NoticeDue { activated: true, .. })
        ));
        assert_eq!(s.tick_at(T0 + 10_000), None);
    }

    #[test]
    fn emergency_stop_always_deactivates() {
        let mut idle = SessionStateHolder::default();
        idle.emergency_stop_at(T0);
        assert!(!idle.is_active());

        let mut s = calibrated();
        s.activate_at(T0).unwrap();
        let event = s.emergency_stop_at(T0 + 1);
        assert!(matches!(event, Event::EmergencyStop { was_active: true, .. }));
        assert!(!s.is_active());
    }

    #[test]
    fn emergency_stop_cancels_pending_notice() {
        let mut s = calibrated();
        s.activate_at(T0).unwrap();
        s.emergency_stop_at(T0 + 1);
        assert_eq!(s.tick_at(T0 + 10_000), None);
    }

    #[test]
    fn clearing_calibration_deactivates() {
        let mut s = calibrated();
        s.activate_at(T0).unwrap();
        s.clear_calibration();
        assert_eq!(s.state(), SessionState::default());
        assert_eq!(s.activate_at(T0 + 1), Err(SessionError::CalibrationRequired));
    }
}
