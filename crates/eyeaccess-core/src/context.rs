//! Shared session context.
//!
//! One `AppContext` holds every piece of session state and is handed to each
//! screen. It wires the components together:
//!
//! - sequencer `Complete`/`Skipped` marks the session calibrated;
//! - tracking is gated on the sequencer, activation on the session;
//! - every emitted [`Event`] is recorded into the activity log;
//! - delayed outcomes (calibration complete, activation notice) queue a
//!   [`Prompt`] for the shell to show.
//!
//! There is no internal timer. The owner calls `tick()` at least as often as
//! the gaze cadence and `teardown()` when the UI goes away.

use std::collections::VecDeque;

use tracing::{debug, info};

use crate::activity::{ActivityLog, ActivityStats};
use crate::calibration::CalibrationSequencer;
use crate::camera::CameraPermission;
use crate::error::{CalibrationError, CoreError, SessionError};
use crate::events::{timestamp, Event};
use crate::gaze::{GazePosition, GazeSimulator, GazeSource};
use crate::now_ms;
use crate::prompt::Prompt;
use crate::session::SessionStateHolder;
use crate::storage::Config;
use crate::viewport::Viewport;

/// Result of one `tick`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickOutcome {
    pub events: Vec<Event>,
    /// New gaze position, if the source sampled during this tick.
    pub gaze: Option<GazePosition>,
}

#[derive(Debug)]
pub struct AppContext {
    config: Config,
    viewport: Viewport,
    sequencer: CalibrationSequencer,
    session: SessionStateHolder,
    gaze: Box<dyn GazeSource>,
    activity: ActivityLog,
    stats_baseline: ActivityStats,
    camera: CameraPermission,
    camera_requested: bool,
    prompts: VecDeque<Prompt>,
}

impl AppContext {
    /// Build a context with the simulated gaze source.
    pub fn new(config: Config) -> Result<Self, CoreError> {
        let viewport = config.viewport()?;
        let gaze = GazeSimulator::new(viewport, config.simulator_settings(), config.tracking.seed);
        Self::with_gaze_source(config, Box::new(gaze))
    }

    /// Build a context around any gaze source.
    pub fn with_gaze_source(config: Config, mut gaze: Box<dyn GazeSource>) -> Result<Self, CoreError> {
        config.validate()?;
        let viewport = config.viewport()?;
        gaze.set_viewport(viewport);
        let (activity, stats_baseline) = if config.activity.seed_demo_entries {
            (ActivityLog::seeded(chrono::Utc::now()), ActivityStats::demo())
        } else {
            (ActivityLog::new(), ActivityStats::default())
        };
        Ok(Self {
            sequencer: CalibrationSequencer::new(&viewport, config.calibration.step_ack_delay_ms),
            session: SessionStateHolder::new(config.control.activation_notice_delay_ms),
            viewport,
            gaze,
            activity,
            stats_baseline,
            camera: CameraPermission::default(),
            camera_requested: false,
            prompts: VecDeque::new(),
            config,
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Mutable config. Changes to timing take effect for new contexts only.
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn sequencer(&self) -> &CalibrationSequencer {
        &self.sequencer
    }

    pub fn session(&self) -> &SessionStateHolder {
        &self.session
    }

    pub fn gaze(&self) -> &dyn GazeSource {
        self.gaze.as_ref()
    }

    pub fn activity(&self) -> &ActivityLog {
        &self.activity
    }

    pub fn is_tracking(&self) -> bool {
        self.gaze.is_running()
    }

    pub fn gaze_position(&self) -> GazePosition {
        self.gaze.current_position()
    }

    pub fn camera_permission(&self) -> CameraPermission {
        self.camera
    }

    pub fn camera_requested(&self) -> bool {
        self.camera_requested
    }

    /// Baseline counters plus what the current log records.
    pub fn stats(&self) -> ActivityStats {
        self.stats_baseline.combined(&ActivityStats::from_log(&self.activity))
    }

    pub fn snapshot(&self) -> Event {
        self.snapshot_at(now_ms())
    }

    pub fn snapshot_at(&self, now_ms: u64) -> Event {
        Event::StateSnapshot {
            calibration: self.sequencer.state(),
            calibrated: self.session.is_calibrated(),
            active: self.session.is_active(),
            tracking: self.is_tracking(),
            position: self.gaze.current_position(),
            at: timestamp(now_ms),
        }
    }

    // ── Prompts ──────────────────────────────────────────────────────

    pub fn push_prompt(&mut self, prompt: Prompt) {
        self.prompts.push_back(prompt);
    }

    /// Drain prompts queued by delayed transitions, oldest first.
    pub fn take_prompts(&mut self) -> Vec<Prompt> {
        self.prompts.drain(..).collect()
    }

    // ── Calibration ──────────────────────────────────────────────────

    /// Restart calibration at step 0. Stops tracking first.
    pub fn start_calibration_at(&mut self, now_ms: u64) -> Vec<Event> {
        let mut events = Vec::new();
        if let Some(stopped) = self.stop_tracking_at(now_ms) {
            events.push(stopped);
        }
        let started = self.sequencer.start_at(now_ms);
        events.push(self.emit(started));
        events
    }

    pub fn confirm_calibration_step_at(&mut self, now_ms: u64) -> Result<Event, CalibrationError> {
        let event = self.sequencer.confirm_step_at(now_ms)?;
        Ok(self.emit(event))
    }

    /// Skip the rest of calibration. Callers confirm with the user first.
    pub fn skip_calibration_at(&mut self, now_ms: u64) -> Result<Event, CalibrationError> {
        let event = self.sequencer.skip_at(now_ms)?;
        self.session.on_calibration_complete();
        Ok(self.emit(event))
    }

    /// Forget calibration: sequencer back to idle, control off, tracking off.
    pub fn reset_calibration_at(&mut self, now_ms: u64) -> Vec<Event> {
        let mut events = Vec::new();
        if let Some(stopped) = self.stop_tracking_at(now_ms) {
            events.push(stopped);
        }
        let was_active = self.session.is_active();
        self.session.clear_calibration();
        if was_active {
            events.push(self.emit(Event::ControlDeactivated {
                at: timestamp(now_ms),
            }));
        }
        let reset = self.sequencer.reset_at(now_ms);
        events.push(self.emit(reset));
        events
    }

    // ── Tracking ─────────────────────────────────────────────────────

    /// Start the gaze source. Requires a completed or skipped calibration.
    pub fn start_tracking_at(&mut self, now_ms: u64) -> Result<Option<Event>, SessionError> {
        if !self.sequencer.is_complete() {
            return Err(SessionError::CalibrationRequired);
        }
        if self.gaze.is_running() {
            return Ok(None);
        }
        self.gaze.start_at(now_ms);
        let position = self.gaze.current_position();
        info!(x = position.x, y = position.y, "eye tracking started");
        Ok(Some(self.emit(Event::TrackingStarted {
            position,
            at: timestamp(now_ms),
        })))
    }

    pub fn stop_tracking_at(&mut self, now_ms: u64) -> Option<Event> {
        if !self.gaze.is_running() {
            return None;
        }
        let samples = self.gaze.samples_since_start();
        let position = self.gaze.current_position();
        self.gaze.stop();
        info!(samples, "eye tracking stopped");
        Some(self.emit(Event::TrackingStopped {
            position,
            samples,
            at: timestamp(now_ms),
        }))
    }

    pub fn toggle_tracking_at(&mut self, now_ms: u64) -> Result<Option<Event>, SessionError> {
        if self.gaze.is_running() {
            Ok(self.stop_tracking_at(now_ms))
        } else {
            self.start_tracking_at(now_ms)
        }
    }

    // ── Control ──────────────────────────────────────────────────────

    pub fn activate_at(&mut self, now_ms: u64) -> Result<Event, SessionError> {
        let event = self.session.activate_at(now_ms)?;
        Ok(self.emit(event))
    }

    pub fn emergency_stop_at(&mut self, now_ms: u64) -> Event {
        let event = self.session.emergency_stop_at(now_ms);
        self.emit(event)
    }

    // ── Activity ─────────────────────────────────────────────────────

    pub fn clear_activity(&mut self) {
        self.activity.clear();
    }

    // ── Camera ───────────────────────────────────────────────────────

    /// Note that the shell asked the platform for camera access.
    pub fn mark_camera_requested(&mut self) {
        self.camera_requested = true;
    }

    pub fn set_camera_permission(&mut self, permission: CameraPermission) {
        debug!(?permission, "camera permission updated");
        self.camera = permission;
        if permission != CameraPermission::Undetermined {
            self.camera_requested = true;
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Apply a newly measured viewport to the targets and the gaze bounds.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.sequencer.set_viewport(&viewport);
        self.gaze.set_viewport(viewport);
    }

    pub fn tick(&mut self) -> TickOutcome {
        self.tick_at(now_ms())
    }

    /// Advance every delayed transition and the gaze cadence.
    pub fn tick_at(&mut self, now_ms: u64) -> TickOutcome {
        let mut outcome = TickOutcome::default();

        if let Some(event) = self.sequencer.tick_at(now_ms) {
            if matches!(event, Event::CalibrationCompleted { .. }) {
                self.session.on_calibration_complete();
                self.prompts.push_back(Prompt::calibration_complete());
            }
            outcome.events.push(self.emit(event));
        }

        if let Some(event) = self.session.tick_at(now_ms) {
            if let Event::NoticeDue { activated, .. } = event {
                self.prompts.push_back(Prompt::activation_notice(activated));
            }
            outcome.events.push(self.emit(event));
        }

        outcome.gaze = self.gaze.tick_at(now_ms);
        outcome
    }

    /// Cancel every pending timer: gaze cadence, acknowledgment, notice.
    /// State is kept; a later `start_tracking` resumes from the last position.
    pub fn teardown(&mut self) {
        self.teardown_at(now_ms());
    }

    pub fn teardown_at(&mut self, now_ms: u64) {
        self.stop_tracking_at(now_ms);
        let ack = self.sequencer.cancel_pending();
        let notice = self.session.cancel_pending();
        debug!(ack, notice, "context torn down");
    }

    fn emit(&mut self, event: Event) -> Event {
        self.activity.record(&event);
        event
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::CalibrationState;
    use crate::error::ConfigError;

    const T0: u64 = 1_700_000_000_000;

    fn ctx() -> AppContext {
        let mut config = Config::default();
        config.activity.seed_demo_entries = false;
        config.tracking.seed = Some(3);
        AppContext::new(config).unwrap()
    }

    #[test]
    fn new_rejects_unusable_gaze_tuning() {
        let mut config = Config::default();
        config.tracking.margin_x = -10.0;
        assert!(matches!(
            AppContext::new(config),
            Err(CoreError::Config(ConfigError::InvalidValue { .. }))
        ));
    }

    fn calibrate(ctx: &mut AppContext, mut now: u64) -> u64 {
        ctx.start_calibration_at(now);
        for _ in 0..5 {
            ctx.confirm_calibration_step_at(now).unwrap();
            now += 500;
            ctx.tick_at(now);
        }
        now
    }

    #[test]
    fn completion_marks_session_calibrated_and_prompts() {
        let mut ctx = ctx();
        calibrate(&mut ctx, T0);
        assert_eq!(ctx.sequencer().state(), CalibrationState::Complete);
        assert!(ctx.session().is_calibrated());
        let prompts = ctx.take_prompts();
        assert_eq!(prompts, vec![Prompt::calibration_complete()]);
        assert!(ctx.take_prompts().is_empty());
    }

    #[test]
    fn skip_marks_session_calibrated() {
        let mut ctx = ctx();
        ctx.start_calibration_at(T0);
        ctx.skip_calibration_at(T0 + 1).unwrap();
        assert!(ctx.session().is_calibrated());
        assert!(ctx.activate_at(T0 + 2).is_ok());
    }

    #[test]
    fn tracking_requires_calibration() {
        let mut ctx = ctx();
        assert_eq!(
            ctx.start_tracking_at(T0),
            Err(SessionError::CalibrationRequired)
        );
        assert!(!ctx.is_tracking());
    }

    #[test]
    fn restarting_calibration_stops_tracking() {
        let mut ctx = ctx();
        let now = calibrate(&mut ctx, T0);
        ctx.start_tracking_at(now).unwrap();
        let events = ctx.start_calibration_at(now + 1_000);
        assert!(matches!(events[0], Event::TrackingStopped { .. }));
        assert!(!ctx.is_tracking());
        assert_eq!(
            ctx.start_tracking_at(now + 1_001),
            Err(SessionError::CalibrationRequired)
        );
    }

    #[test]
    fn tick_produces_gaze_while_tracking() {
        let mut ctx = ctx();
        let now = calibrate(&mut ctx, T0);
        ctx.start_tracking_at(now).unwrap();
        assert!(ctx.tick_at(now + 150).gaze.is_some());
        ctx.stop_tracking_at(now + 200);
        assert!(ctx.tick_at(now + 1_000).gaze.is_none());
    }

    #[test]
    fn activation_notice_queues_prompt() {
        let mut ctx = ctx();
        let now = calibrate(&mut ctx, T0);
        ctx.take_prompts();
        ctx.activate_at(now).unwrap();
        let outcome = ctx.tick_at(now + 300);
        assert!(matches!(
            outcome.events.as_slice(),
            [Event::NoticeDue { activated: true, .. }]
        ));
        assert_eq!(ctx.take_prompts(), vec![Prompt::activation_notice(true)]);
    }

    #[test]
    fn events_land_in_activity_log() {
        let mut ctx = ctx();
        let now = calibrate(&mut ctx, T0);
        ctx.start_tracking_at(now).unwrap();
        ctx.activate_at(now).unwrap();
        ctx.emergency_stop_at(now + 1);
        let sources: Vec<_> = ctx
            .activity()
            .entries()
            .iter()
            .filter_map(|e| e.source_event.as_deref())
            .collect();
        assert_eq!(
            sources,
            [
                "calibration_completed",
                "tracking_started",
                "control_activated",
                "emergency_stop"
            ]
        );
    }

    #[test]
    fn reset_calibration_turns_everything_off() {
        let mut ctx = ctx();
        let now = calibrate(&mut ctx, T0);
        ctx.start_tracking_at(now).unwrap();
        ctx.activate_at(now).unwrap();

        let events = ctx.reset_calibration_at(now + 10);
        let names: Vec<_> = events.iter().map(Event::name).collect();
        assert_eq!(
            names,
            ["tracking_stopped", "control_deactivated", "calibration_reset"]
        );
        assert!(!ctx.session().is_calibrated());
        assert!(!ctx.session().is_active());
        assert_eq!(ctx.sequencer().state(), CalibrationState::Idle);
    }

    #[test]
    fn teardown_cancels_pending_delays() {
        let mut ctx = ctx();
        ctx.start_calibration_at(T0);
        ctx.confirm_calibration_step_at(T0).unwrap();
        ctx.teardown_at(T0 + 10);
        let outcome = ctx.tick_at(T0 + 10_000);
        assert!(outcome.events.is_empty());
        assert_eq!(ctx.sequencer().current_step(), Some(0));
    }

    #[test]
    fn camera_permission_marks_requested() {
        let mut ctx = ctx();
        assert!(!ctx.camera_requested());
        ctx.set_camera_permission(CameraPermission::Denied);
        assert!(ctx.camera_requested());
        assert!(!ctx.camera_permission().is_granted());
    }

    #[test]
    fn seeded_context_reports_demo_stats() {
        let ctx = AppContext::new(Config::default()).unwrap();
        assert_eq!(ctx.activity().len(), 6);
        assert_eq!(ctx.stats(), ActivityStats::demo());
    }
}
