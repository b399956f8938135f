//! Control screen: activation toggle and emergency stop.

use serde::Serialize;

use super::{ActionOutcome, ButtonView, Screen, StatusLine};
use crate::context::AppContext;
use crate::error::SessionError;
use crate::prompt::Prompt;

const HOW_IT_WORKS: [&str; 4] = [
    "Look at where you want to click",
    "Double blink to perform a tap",
    "Single blink to drag/hold",
    "Works across all apps",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCard {
    pub active: bool,
    pub text: String,
    pub subtext: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Requirement {
    pub label: String,
    pub met: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlView {
    pub title: String,
    pub subtitle: String,
    pub status: StatusCard,
    pub primary_button: ButtonView,
    pub emergency_button: ButtonView,
    pub calibration: StatusLine,
    /// "Calibrate Now" link, shown only while uncalibrated.
    pub calibrate_link: Option<ButtonView>,
    pub how_it_works: Vec<String>,
    pub requirements: Vec<Requirement>,
}

pub fn view(ctx: &AppContext) -> ControlView {
    let session = ctx.session().state();
    let status = if session.active {
        StatusCard {
            active: true,
            text: "Eye Control Active".into(),
            subtext: "Move your eyes to control the cursor".into(),
        }
    } else {
        StatusCard {
            active: false,
            text: "Eye Control Inactive".into(),
            subtext: "Tap activate to begin eye control".into(),
        }
    };

    ControlView {
        title: "EyeAccess Control".into(),
        subtitle: "Independence through eye movement".into(),
        status,
        primary_button: ButtonView::new(
            if session.active { "Deactivate" } else { "Activate" },
            true,
        ),
        emergency_button: ButtonView::new("Emergency Stop", true),
        calibration: StatusLine::new(
            session.calibrated,
            "Eye tracking calibrated",
            "Eye tracking not calibrated",
        ),
        calibrate_link: (!session.calibrated).then(|| ButtonView::new("Calibrate Now", true)),
        how_it_works: HOW_IT_WORKS.iter().map(|s| s.to_string()).collect(),
        requirements: vec![
            Requirement {
                label: "Eye tracking calibrated".into(),
                met: session.calibrated,
            },
            Requirement {
                label: "Camera permission granted".into(),
                met: ctx.camera_permission().is_granted(),
            },
        ],
    }
}

/// Toggle eye control. Uncalibrated sessions get the "Calibration Required"
/// prompt instead.
pub fn activate(ctx: &mut AppContext, now_ms: u64) -> ActionOutcome {
    match ctx.activate_at(now_ms) {
        Ok(event) => ActionOutcome::event(event),
        Err(SessionError::CalibrationRequired) => {
            ActionOutcome::prompt(Prompt::calibration_required_for_control())
        }
    }
}

pub fn emergency_stop(ctx: &mut AppContext, now_ms: u64) -> ActionOutcome {
    ActionOutcome::event(ctx.emergency_stop_at(now_ms)).with_prompt(Prompt::emergency_stop())
}

pub fn calibrate_now() -> ActionOutcome {
    ActionOutcome {
        navigate_to: Some(Screen::Tracking),
        ..ActionOutcome::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Event;
    use crate::storage::Config;

    fn ctx() -> AppContext {
        let mut config = Config::default();
        config.activity.seed_demo_entries = false;
        AppContext::new(config).unwrap()
    }

    #[test]
    fn uncalibrated_view_offers_calibration() {
        let v = view(&ctx());
        assert_eq!(v.status.text, "Eye Control Inactive");
        assert_eq!(v.primary_button.label, "Activate");
        assert!(!v.calibration.ok);
        assert!(v.calibrate_link.is_some());
        assert!(v.requirements.iter().all(|r| !r.met));
    }

    #[test]
    fn activate_uncalibrated_prompts() {
        let mut ctx = ctx();
        let outcome = activate(&mut ctx, 0);
        assert!(outcome.events.is_empty());
        assert_eq!(
            outcome.prompt,
            Some(Prompt::calibration_required_for_control())
        );
        assert!(!ctx.session().is_active());
    }

    #[test]
    fn activate_after_skip_switches_on() {
        let mut ctx = ctx();
        ctx.start_calibration_at(0);
        ctx.skip_calibration_at(1).unwrap();

        let outcome = activate(&mut ctx, 2);
        assert!(matches!(
            outcome.events.as_slice(),
            [Event::ControlActivated { .. }]
        ));
        let v = view(&ctx);
        assert_eq!(v.status.text, "Eye Control Active");
        assert_eq!(v.primary_button.label, "Deactivate");
        assert!(v.calibrate_link.is_none());
    }

    #[test]
    fn emergency_stop_acknowledges() {
        let mut ctx = ctx();
        let outcome = emergency_stop(&mut ctx, 0);
        assert_eq!(outcome.prompt, Some(Prompt::emergency_stop()));
        assert!(!ctx.session().is_active());
    }
}
