//! Eye tracking screen: camera gate, calibration overlay, gaze cursor.

use serde::Serialize;
use tracing::debug;

use super::{ActionOutcome, ButtonView, StatusLine};
use crate::calibration::CalibrationPoint;
use crate::camera::CameraPermission;
use crate::context::AppContext;
use crate::error::SessionError;
use crate::events::Event;
use crate::prompt::Prompt;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum TrackingView {
    Loading {
        message: String,
    },
    PermissionRequired {
        title: String,
        message: String,
        button: ButtonView,
        /// The platform has been asked and has not answered yet.
        request_pending: bool,
    },
    Ready(ReadyView),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadyView {
    pub title: String,
    pub subtitle: String,
    pub calibration: Option<CalibrationOverlay>,
    pub gaze_cursor: Option<GazeCursor>,
    pub calibrate_button: ButtonView,
    pub tracking_button: ButtonView,
    pub calibration_status: StatusLine,
    pub tracking_status: StatusLine,
    pub position_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalibrationOverlay {
    pub target: CalibrationPoint,
    pub step: usize,
    pub total_steps: usize,
    pub step_label: String,
    pub instruction: String,
    /// Check mark over the target while the tap is acknowledged.
    pub ack_visible: bool,
    pub skip_button: ButtonView,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GazeCursor {
    pub x: i64,
    pub y: i64,
}

pub fn view(ctx: &AppContext) -> TrackingView {
    match ctx.camera_permission() {
        CameraPermission::Undetermined if !ctx.camera_requested() => TrackingView::Loading {
            message: "Loading camera permissions...".into(),
        },
        CameraPermission::Undetermined | CameraPermission::Denied => {
            TrackingView::PermissionRequired {
                title: "Camera Access Required".into(),
                message: "We need camera access to track your eye movements and enable \
                          hands-free control."
                    .into(),
                button: ButtonView::new("Grant Camera Permission", true),
                request_pending: ctx.camera_permission() == CameraPermission::Undetermined,
            }
        }
        CameraPermission::Granted => TrackingView::Ready(ready_view(ctx)),
    }
}

fn ready_view(ctx: &AppContext) -> ReadyView {
    let sequencer = ctx.sequencer();
    let calibrating = sequencer.in_progress();
    let calibrated = sequencer.is_complete();
    let tracking = ctx.is_tracking();

    let calibration = match (sequencer.current_step(), sequencer.current_point()) {
        (Some(step), Some(target)) => Some(CalibrationOverlay {
            target,
            step,
            total_steps: sequencer.total_steps(),
            step_label: format!("Step {} of {}", step + 1, sequencer.total_steps()),
            instruction: "Look at the target and tap it".into(),
            ack_visible: sequencer.ack_visible(),
            skip_button: ButtonView::new("Skip Calibration", true),
        }),
        _ => None,
    };

    let (gaze_cursor, position_text) = if tracking {
        let (x, y) = ctx.gaze_position().rounded();
        (
            Some(GazeCursor { x, y }),
            Some(format!("Gaze Position: ({x}, {y})")),
        )
    } else {
        (None, None)
    };

    ReadyView {
        title: "Eye Tracking".into(),
        subtitle: "Calibrate and test your eye movement detection".into(),
        calibration,
        gaze_cursor,
        calibrate_button: ButtonView::new(
            if calibrating { "Calibrating..." } else { "Calibrate" },
            !calibrating,
        ),
        tracking_button: ButtonView::new(
            if tracking { "Stop Tracking" } else { "Start Tracking" },
            !calibrating,
        ),
        calibration_status: StatusLine::new(
            calibrated,
            "Calibration complete",
            "Calibration required",
        ),
        tracking_status: StatusLine::new(tracking, "Eye tracking active", "Eye tracking inactive"),
        position_text,
    }
}

pub fn start_calibration(ctx: &mut AppContext, now_ms: u64) -> ActionOutcome {
    if ctx.sequencer().in_progress() {
        debug!("calibrate pressed while calibrating; ignored");
        return ActionOutcome::none();
    }
    ActionOutcome::events(ctx.start_calibration_at(now_ms))
}

/// Tap on the calibration target. Taps outside a calibration or during an
/// acknowledgment are ignored.
pub fn confirm_step(ctx: &mut AppContext, now_ms: u64) -> ActionOutcome {
    match ctx.confirm_calibration_step_at(now_ms) {
        Ok(event) => ActionOutcome::event(event),
        Err(e) => {
            debug!(error = %e, "calibration tap ignored");
            ActionOutcome::none()
        }
    }
}

pub fn request_skip(ctx: &AppContext) -> ActionOutcome {
    if !ctx.sequencer().in_progress() {
        return ActionOutcome::none();
    }
    ActionOutcome::prompt(Prompt::skip_calibration())
}

pub fn confirm_skip(ctx: &mut AppContext, now_ms: u64) -> ActionOutcome {
    match ctx.skip_calibration_at(now_ms) {
        Ok(event) => ActionOutcome::event(event),
        Err(e) => {
            debug!(error = %e, "skip confirmation ignored");
            ActionOutcome::none()
        }
    }
}

/// Start or stop tracking. The button is disabled while calibrating.
pub fn toggle_tracking(ctx: &mut AppContext, now_ms: u64) -> ActionOutcome {
    if ctx.sequencer().in_progress() {
        return ActionOutcome::none();
    }
    tracking_outcome(ctx.toggle_tracking_at(now_ms))
}

/// "Start Tracking" from the calibration-complete prompt.
pub fn start_tracking(ctx: &mut AppContext, now_ms: u64) -> ActionOutcome {
    tracking_outcome(ctx.start_tracking_at(now_ms))
}

fn tracking_outcome(result: Result<Option<Event>, SessionError>) -> ActionOutcome {
    match result {
        Ok(Some(event)) => ActionOutcome::event(event),
        Ok(None) => ActionOutcome::none(),
        Err(SessionError::CalibrationRequired) => {
            ActionOutcome::prompt(Prompt::calibration_required_for_tracking())
        }
    }
}

/// "Grant Camera Permission" pressed; the shell asks the platform.
pub fn request_camera(ctx: &mut AppContext) -> ActionOutcome {
    ctx.mark_camera_requested();
    ActionOutcome::none()
}

pub fn grant_permission(ctx: &mut AppContext) {
    ctx.set_camera_permission(CameraPermission::Granted);
}

pub fn deny_permission(ctx: &mut AppContext) {
    ctx.set_camera_permission(CameraPermission::Denied);
}
