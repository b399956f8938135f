//! Screen presenters.
//!
//! Each screen turns the shared [`AppContext`] into a serializable view model
//! and exposes its user actions. Actions never fail for user-correctable
//! reasons; those come back as a [`Prompt`] in the [`ActionOutcome`].

pub mod activity;
pub mod control;
pub mod settings;
pub mod tracking;

use serde::{Deserialize, Serialize};

use crate::context::AppContext;
use crate::error::{CoreError, ValidationError};
use crate::events::Event;
use crate::prompt::{actions, Prompt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    Control,
    Tracking,
    Activity,
    Settings,
}

impl Screen {
    /// Tab order.
    pub const ALL: [Screen; 4] = [
        Screen::Control,
        Screen::Tracking,
        Screen::Activity,
        Screen::Settings,
    ];

    /// Tab label.
    pub fn title(&self) -> &'static str {
        match self {
            Screen::Control => "Control",
            Screen::Tracking => "Eye Tracking",
            Screen::Activity => "Activity",
            Screen::Settings => "Settings",
        }
    }
}

/// What a user action produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ActionOutcome {
    pub events: Vec<Event>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<Prompt>,
    /// Screen the shell should switch to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub navigate_to: Option<Screen>,
}

impl ActionOutcome {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn events(events: Vec<Event>) -> Self {
        Self {
            events,
            ..Self::default()
        }
    }

    pub fn event(event: Event) -> Self {
        Self::events(vec![event])
    }

    pub fn prompt(prompt: Prompt) -> Self {
        Self {
            prompt: Some(prompt),
            ..Self::default()
        }
    }

    pub fn with_prompt(mut self, prompt: Prompt) -> Self {
        self.prompt = Some(prompt);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.prompt.is_none() && self.navigate_to.is_none()
    }
}

/// A button's label and whether it can be pressed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ButtonView {
    pub label: String,
    pub enabled: bool,
}

impl ButtonView {
    pub fn new(label: impl Into<String>, enabled: bool) -> Self {
        Self {
            label: label.into(),
            enabled,
        }
    }
}

/// A status line: good (green) or not (red).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusLine {
    pub ok: bool,
    pub text: String,
}

impl StatusLine {
    pub fn new(ok: bool, when_ok: &str, otherwise: &str) -> Self {
        Self {
            ok,
            text: if ok { when_ok } else { otherwise }.to_string(),
        }
    }
}

/// Route a prompt button back to the screen action it confirms.
pub fn handle_prompt_action(
    ctx: &mut AppContext,
    action_id: &str,
    now_ms: u64,
) -> Result<ActionOutcome, CoreError> {
    let outcome = match action_id {
        actions::GO_TO_CALIBRATION => control::calibrate_now(),
        actions::START_TRACKING => tracking::start_tracking(ctx, now_ms),
        actions::CONFIRM_SKIP => tracking::confirm_skip(ctx, now_ms),
        actions::CONFIRM_RESET => settings::confirm_reset(ctx, now_ms),
        actions::GRANT_CAMERA => tracking::request_camera(ctx),
        other => {
            return Err(ValidationError::InvalidValue {
                field: "action_id".into(),
                message: format!("unknown prompt action '{other}'"),
            }
            .into())
        }
    };
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Config;

    fn ctx() -> AppContext {
        let mut config = Config::default();
        config.activity.seed_demo_entries = false;
        AppContext::new(config).unwrap()
    }

    #[test]
    fn tabs_in_order() {
        let titles: Vec<_> = Screen::ALL.iter().map(Screen::title).collect();
        assert_eq!(titles, ["Control", "Eye Tracking", "Activity", "Settings"]);
    }

    #[test]
    fn go_to_calibration_navigates() {
        let mut ctx = ctx();
        let outcome = handle_prompt_action(&mut ctx, actions::GO_TO_CALIBRATION, 0).unwrap();
        assert_eq!(outcome.navigate_to, Some(Screen::Tracking));
    }

    #[test]
    fn unknown_action_is_rejected() {
        let mut ctx = ctx();
        assert!(handle_prompt_action(&mut ctx, "launch_rockets", 0).is_err());
    }

    #[test]
    fn confirm_skip_routes_to_tracking() {
        let mut ctx = ctx();
        ctx.start_calibration_at(0);
        let outcome = handle_prompt_action(&mut ctx, actions::CONFIRM_SKIP, 1).unwrap();
        assert!(matches!(
            outcome.events.as_slice(),
            [Event::CalibrationSkipped { at_step: 0, .. }]
        ));
        assert!(ctx.session().is_calibrated());
    }
}
