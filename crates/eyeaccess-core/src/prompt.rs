//! Modal dialog model.
//!
//! Screens describe the dialog; the shell renders it and reports back the
//! chosen `action_id`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptStyle {
    Default,
    Cancel,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptAction {
    pub label: String,
    pub style: PromptStyle,
    /// Action the shell sends back when chosen; `None` just dismisses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_id: Option<String>,
}

impl PromptAction {
    pub fn ok() -> Self {
        Self::dismiss("OK")
    }

    pub fn cancel() -> Self {
        Self {
            label: "Cancel".into(),
            style: PromptStyle::Cancel,
            action_id: None,
        }
    }

    pub fn dismiss(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            style: PromptStyle::Default,
            action_id: None,
        }
    }

    pub fn run(label: impl Into<String>, action_id: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            style: PromptStyle::Default,
            action_id: Some(action_id.into()),
        }
    }

    pub fn destructive(label: impl Into<String>, action_id: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            style: PromptStyle::Destructive,
            action_id: Some(action_id.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    pub title: String,
    pub message: String,
    pub actions: Vec<PromptAction>,
}

impl Prompt {
    pub fn new(title: impl Into<String>, message: impl Into<String>, actions: Vec<PromptAction>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            actions,
        }
    }

    /// A prompt with a single "OK".
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(title, message, vec![PromptAction::ok()])
    }

    /// Cancel plus one destructive confirmation.
    pub fn confirm_destructive(
        title: impl Into<String>,
        message: impl Into<String>,
        label: impl Into<String>,
        action_id: impl Into<String>,
    ) -> Self {
        Self::new(
            title,
            message,
            vec![PromptAction::cancel(), PromptAction::destructive(label, action_id)],
        )
    }

    pub fn is_destructive(&self) -> bool {
        self.actions.iter().any(|a| a.style == PromptStyle::Destructive)
    }

    /// The action ids a shell may send back for this prompt.
    pub fn action_ids(&self) -> impl Iterator<Item = &str> {
        self.actions.iter().filter_map(|a| a.action_id.as_deref())
    }
}

/// Action ids a shell sends back from prompt buttons.
pub mod actions {
    pub const GO_TO_CALIBRATION: &str = "go_to_calibration";
    pub const START_TRACKING: &str = "start_tracking";
    pub const CONFIRM_SKIP: &str = "confirm_skip";
    pub const CONFIRM_RESET: &str = "confirm_reset";
    pub const GRANT_CAMERA: &str = "grant_camera";
}

// ── Canned dialogs ───────────────────────────────────────────────────

impl Prompt {
    pub fn calibration_required_for_control() -> Self {
        Self::new(
            "Calibration Required",
            "Please calibrate your eye tracking first in the Eye Tracking tab.",
            vec![
                PromptAction::cancel(),
                PromptAction::run("Go to Calibration", actions::GO_TO_CALIBRATION),
            ],
        )
    }

    pub fn calibration_required_for_tracking() -> Self {
        Self::info(
            "Calibration Required",
            "Please complete the calibration process first before starting eye tracking.",
        )
    }

    pub fn calibration_complete() -> Self {
        Self::new(
            "Calibration Complete!",
            "Your eye tracking has been successfully calibrated. You can now start tracking.",
            vec![PromptAction::run("Start Tracking", actions::START_TRACKING)],
        )
    }

    pub fn skip_calibration() -> Self {
        Self::confirm_destructive(
            "Skip Calibration",
            "Are you sure you want to skip calibration? This may affect tracking accuracy.",
            "Skip",
            actions::CONFIRM_SKIP,
        )
    }

    pub fn reset_calibration() -> Self {
        Self::confirm_destructive(
            "Reset Calibration",
            "This will clear your current eye tracking calibration. \
             You'll need to recalibrate before using eye control.",
            "Reset",
            actions::CONFIRM_RESET,
        )
    }

    pub fn calibration_reset_done() -> Self {
        Self::info(
            "Success",
            "Calibration has been reset. Please recalibrate in the Eye Tracking tab.",
        )
    }

    pub fn activation_notice(activated: bool) -> Self {
        if activated {
            Self::info(
                "Activated",
                "Eye control is now active. The app will run in the background \
                 and track your eye movements.",
            )
        } else {
            Self::info(
                "Deactivated",
                "Eye control has been deactivated. You can now use your device normally.",
            )
        }
    }

    pub fn emergency_stop() -> Self {
        Self::info("Emergency Stop", "Eye control has been immediately deactivated.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destructive_confirmation_has_cancel_first() {
        let p = Prompt::confirm_destructive("Skip", "Sure?", "Skip", "confirm_skip");
        assert_eq!(p.actions[0].style, PromptStyle::Cancel);
        assert!(p.is_destructive());
        assert_eq!(p.action_ids().collect::<Vec<_>>(), ["confirm_skip"]);
    }

    #[test]
    fn calibration_complete_offers_tracking() {
        let p = Prompt::calibration_complete();
        assert_eq!(p.action_ids().collect::<Vec<_>>(), [actions::START_TRACKING]);
    }

    #[test]
    fn info_prompt_only_dismisses() {
        let p = Prompt::info("Help", "Docs");
        assert!(!p.is_destructive());
        assert_eq!(p.action_ids().count(), 0);
    }
}
