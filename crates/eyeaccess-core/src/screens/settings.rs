//! Settings screen: preference toggles, configuration items, about block.
//!
//! Toggles change the context's config in memory; the shell persists it with
//! [`Config::save`](crate::storage::Config::save) afterwards.

use serde::Serialize;
use tracing::info;

use super::ActionOutcome;
use crate::context::AppContext;
use crate::error::{CoreError, ValidationError};
use crate::prompt::Prompt;

pub const TOGGLE_SOUND: &str = "sound";
pub const TOGGLE_HAPTIC: &str = "haptic";
pub const TOGGLE_ADAPTIVE: &str = "adaptive";

pub const ITEM_CALIBRATION: &str = "calibration";
pub const ITEM_SENSITIVITY: &str = "sensitivity";
pub const ITEM_ADVANCED: &str = "advanced";
pub const ITEM_ACCESSIBILITY: &str = "accessibility";
pub const ITEM_LANGUAGE: &str = "language";
pub const ITEM_HELP: &str = "help";

const TOGGLES: [(&str, &str, &str); 3] = [
    (TOGGLE_SOUND, "Sound Feedback", "Play sounds for eye tracking events"),
    (TOGGLE_HAPTIC, "Haptic Feedback", "Vibration feedback for interactions"),
    (TOGGLE_ADAPTIVE, "Adaptive Mode", "Automatically adjust settings based on usage"),
];

const ITEMS: [(&str, &str, &str, ItemKind); 6] = [
    (ITEM_CALIBRATION, "Reset Calibration", "Clear current calibration and start fresh", ItemKind::Action),
    (ITEM_SENSITIVITY, "Eye Tracking Sensitivity", "Adjust tracking sensitivity and responsiveness", ItemKind::Navigation),
    (ITEM_ADVANCED, "Advanced Settings", "Fine-tune tracking parameters and algorithms", ItemKind::Navigation),
    (ITEM_ACCESSIBILITY, "Accessibility Features", "Additional accessibility options and integrations", ItemKind::Navigation),
    (ITEM_LANGUAGE, "Language", "Change app language and regional settings", ItemKind::Navigation),
    (ITEM_HELP, "Help & Support", "Tutorials, documentation, and support", ItemKind::Navigation),
];

const UPCOMING_LANGUAGES: [&str; 3] = ["Urdu", "Spanish", "French"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// Runs something immediately (after confirmation).
    Action,
    /// Opens a sub-page.
    Navigation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToggleRow {
    pub id: String,
    pub title: String,
    pub description: String,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemRow {
    pub id: String,
    pub title: String,
    pub description: String,
    pub kind: ItemKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AboutBlock {
    pub app_name: String,
    pub version: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettingsView {
    pub title: String,
    pub subtitle: String,
    pub toggles: Vec<ToggleRow>,
    pub items: Vec<ItemRow>,
    pub about: AboutBlock,
    pub privacy_notice: String,
}

pub fn view(ctx: &AppContext) -> SettingsView {
    let toggles = TOGGLES
        .iter()
        .map(|&(id, title, description)| ToggleRow {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            enabled: toggle_state(ctx, id).unwrap_or(false),
        })
        .collect();
    let items = ITEMS
        .iter()
        .map(|&(id, title, description, kind)| ItemRow {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            kind,
        })
        .collect();

    SettingsView {
        title: "Settings".into(),
        subtitle: "Customize your eye control experience".into(),
        toggles,
        items,
        about: AboutBlock {
            app_name: "EyeAccess".into(),
            version: format!("Version {}", env!("CARGO_PKG_VERSION")),
            description: "Empowering independence through eye movement technology. \
                          Designed specifically for people with limited mobility."
                .into(),
        },
        privacy_notice: "Your privacy is protected. All eye tracking data is processed \
                         locally on your device and never shared."
            .into(),
    }
}

fn toggle_state(ctx: &AppContext, id: &str) -> Option<bool> {
    let prefs = &ctx.config().preferences;
    match id {
        TOGGLE_SOUND => Some(prefs.sound_enabled),
        TOGGLE_HAPTIC => Some(prefs.haptic_enabled),
        TOGGLE_ADAPTIVE => Some(prefs.adaptive_mode),
        _ => None,
    }
}

/// Flip a preference toggle and return its new value.
pub fn toggle(ctx: &mut AppContext, id: &str) -> Result<bool, CoreError> {
    let prefs = &mut ctx.config_mut().preferences;
    let slot = match id {
        TOGGLE_SOUND => &mut prefs.sound_enabled,
        TOGGLE_HAPTIC => &mut prefs.haptic_enabled,
        TOGGLE_ADAPTIVE => &mut prefs.adaptive_mode,
        other => {
            return Err(ValidationError::InvalidValue {
                field: "toggle".into(),
                message: format!("unknown toggle '{other}'"),
            }
            .into())
        }
    };
    *slot = !*slot;
    info!(toggle = id, enabled = *slot, "preference changed");
    Ok(*slot)
}

/// Press a configuration item.
pub fn select_item(ctx: &AppContext, id: &str) -> Result<ActionOutcome, CoreError> {
    let prompt = match id {
        ITEM_CALIBRATION => Prompt::reset_calibration(),
        ITEM_SENSITIVITY => Prompt::info(
            "Sensitivity Settings",
            "Adjust how sensitive the eye tracking responds to your movements.",
        ),
        ITEM_ADVANCED => Prompt::info(
            "Advanced Settings",
            "Advanced configuration options for power users.",
        ),
        ITEM_ACCESSIBILITY => Prompt::info(
            "Accessibility",
            "Configure additional accessibility features and integrations.",
        ),
        ITEM_LANGUAGE => Prompt::info("Language Settings", language_message(&ctx.config().preferences.language)),
        ITEM_HELP => Prompt::info(
            "Help & Support",
            "Access tutorials, documentation, and support resources.",
        ),
        other => {
            return Err(ValidationError::InvalidValue {
                field: "item".into(),
                message: format!("unknown settings item '{other}'"),
            }
            .into())
        }
    };
    Ok(ActionOutcome::prompt(prompt))
}

fn language_message(code: &str) -> String {
    let current = match code {
        "en" => "English",
        "ur" => "Urdu",
        "es" => "Spanish",
        "fr" => "French",
        other => other,
    };
    let upcoming: Vec<String> = UPCOMING_LANGUAGES
        .iter()
        .filter(|lang| **lang != current)
        .map(|lang| format!("• {lang}"))
        .collect();
    format!(
        "Current language: {current}\n\nAdditional languages coming soon:\n{}",
        upcoming.join("\n")
    )
}

/// Confirmed "Reset" from the reset-calibration prompt.
pub fn confirm_reset(ctx: &mut AppContext, now_ms: u64) -> ActionOutcome {
    ActionOutcome::events(ctx.reset_calibration_at(now_ms)).with_prompt(Prompt::calibration_reset_done())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Event;
    use crate::prompt::actions;
    use crate::storage::Config;

    fn ctx() -> AppContext {
        let mut config = Config::default();
        config.activity.seed_demo_entries = false;
        AppContext::new(config).unwrap()
    }

    #[test]
    fn view_lists_toggles_and_items() {
        let v = view(&ctx());
        let toggles: Vec<_> = v.toggles.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(toggles, ["sound", "haptic", "adaptive"]);
        assert_eq!(v.items.len(), 6);
        assert_eq!(v.items[0].kind, ItemKind::Action);
        assert!(v.about.version.starts_with("Version "));
    }

    #[test]
    fn toggle_flips_config() {
        let mut ctx = ctx();
        let before = ctx.config().preferences.sound_enabled;
        assert_eq!(toggle(&mut ctx, TOGGLE_SOUND).unwrap(), !before);
        assert_eq!(ctx.config().preferences.sound_enabled, !before);
        let row = view(&ctx).toggles.into_iter().find(|t| t.id == "sound").unwrap();
        assert_eq!(row.enabled, !before);
    }

    #[test]
    fn unknown_toggle_is_rejected() {
        let mut ctx = ctx();
        assert!(toggle(&mut ctx, "dark_mode").is_err());
        assert!(select_item(&ctx, "dark_mode").is_err());
    }

    #[test]
    fn reset_item_asks_first() {
        let outcome = select_item(&ctx(), ITEM_CALIBRATION).unwrap();
        let prompt = outcome.prompt.unwrap();
        assert!(prompt.is_destructive());
        assert_eq!(prompt.action_ids().collect::<Vec<_>>(), [actions::CONFIRM_RESET]);
    }

    #[test]
    fn language_prompt_names_current_language() {
        let outcome = select_item(&ctx(), ITEM_LANGUAGE).unwrap();
        let message = outcome.prompt.unwrap().message;
        assert!(message.starts_with("Current language: English"));
        assert!(message.contains("• Urdu"));
    }

    #[test]
    fn confirm_reset_clears_calibration() {
        let mut ctx = ctx();
        ctx.start_calibration_at(0);
        ctx.skip_calibration_at(1).unwrap();
        assert!(ctx.session().is_calibrated());

        let outcome = confirm_reset(&mut ctx, 2);
        assert!(matches!(
            outcome.events.last(),
            Some(Event::CalibrationReset { .. })
        ));
        assert_eq!(outcome.prompt, Some(Prompt::calibration_reset_done()));
        assert!(!ctx.session().is_calibrated());
    }
}
