use eyeaccess_core::screens::{self, activity, control, settings, tracking, Screen};
use eyeaccess_core::{now_ms, AppContext, Config, Viewport};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::{Mutex, MutexGuard};
use tauri::State;

/// Shared session context, protected by a Mutex.
/// Every screen works on this one context; the background ticker in
/// `ticker.rs` advances it between commands.
pub struct AppState(pub Mutex<AppContext>);

impl AppState {
    pub fn new() -> Result<Self, String> {
        let config = Config::load_or_default();
        AppContext::new(config)
            .map(|ctx| Self(Mutex::new(ctx)))
            .map_err(|e| e.to_string())
    }

    pub fn lock(&self) -> Result<MutexGuard<'_, AppContext>, String> {
        self.0.lock().map_err(|e| e.to_string())
    }
}

fn to_json<T: Serialize>(value: T) -> Result<Value, String> {
    serde_json::to_value(value).map_err(|e| e.to_string())
}

// ── Session commands ────────────────────────────────────────────────

#[tauri::command]
pub fn cmd_tabs() -> Value {
    Value::Array(
        Screen::ALL
            .iter()
            .map(|s| json!({ "screen": s, "title": s.title() }))
            .collect(),
    )
}

#[tauri::command]
pub fn cmd_state_snapshot(state: State<'_, AppState>) -> Result<Value, String> {
    let ctx = state.lock()?;
    to_json(ctx.snapshot())
}

/// Prompt button pressed in the web view.
#[tauri::command]
pub fn cmd_prompt_action(state: State<'_, AppState>, action_id: String) -> Result<Value, String> {
    let mut ctx = state.lock()?;
    let outcome = screens::handle_prompt_action(&mut ctx, &action_id, now_ms()).map_err(|e| e.to_string())?;
    to_json(outcome)
}

#[tauri::command]
pub fn cmd_set_viewport(state: State<'_, AppState>, width: f64, height: f64) -> Result<(), String> {
    let viewport = Viewport::new(width, height).map_err(|e| e.to_string())?;
    state.lock()?.set_viewport(viewport);
    Ok(())
}

// ── Control screen ──────────────────────────────────────────────────

#[tauri::command]
pub fn cmd_control_view(state: State<'_, AppState>) -> Result<Value, String> {
    let ctx = state.lock()?;
    to_json(control::view(&ctx))
}

#[tauri::command]
pub fn cmd_control_activate(state: State<'_, AppState>) -> Result<Value, String> {
    let mut ctx = state.lock()?;
    to_json(control::activate(&mut ctx, now_ms()))
}

#[tauri::command]
pub fn cmd_control_emergency_stop(state: State<'_, AppState>) -> Result<Value, String> {
    let mut ctx = state.lock()?;
    to_json(control::emergency_stop(&mut ctx, now_ms()))
}

#[tauri::command]
pub fn cmd_control_calibrate_now() -> Result<Value, String> {
    to_json(control::calibrate_now())
}

// ── Tracking screen ─────────────────────────────────────────────────

#[tauri::command]
pub fn cmd_tracking_view(state: State<'_, AppState>) -> Result<Value, String> {
    let ctx = state.lock()?;
    to_json(tracking::view(&ctx))
}

#[tauri::command]
pub fn cmd_tracking_start_calibration(state: State<'_, AppState>) -> Result<Value, String> {
    let mut ctx = state.lock()?;
    to_json(tracking::start_calibration(&mut ctx, now_ms()))
}

#[tauri::command]
pub fn cmd_tracking_confirm_step(state: State<'_, AppState>) -> Result<Value, String> {
    let mut ctx = state.lock()?;
    to_json(tracking::confirm_step(&mut ctx, now_ms()))
}

#[tauri::command]
pub fn cmd_tracking_request_skip(state: State<'_, AppState>) -> Result<Value, String> {
    let ctx = state.lock()?;
    to_json(tracking::request_skip(&ctx))
}

#[tauri::command]
pub fn cmd_tracking_toggle(state: State<'_, AppState>) -> Result<Value, String> {
    let mut ctx = state.lock()?;
    to_json(tracking::toggle_tracking(&mut ctx, now_ms()))
}

#[tauri::command]
pub fn cmd_tracking_request_camera(state: State<'_, AppState>) -> Result<Value, String> {
    let mut ctx = state.lock()?;
    to_json(tracking::request_camera(&mut ctx))
}

/// Result of the web view's `getUserMedia` request.
#[tauri::command]
pub fn cmd_tracking_camera_result(state: State<'_, AppState>, granted: bool) -> Result<(), String> {
    let mut ctx = state.lock()?;
    if granted {
        tracking::grant_permission(&mut ctx);
    } else {
        tracking::deny_permission(&mut ctx);
    }
    Ok(())
}

#[tauri::command]
pub fn cmd_tracking_camera_permission(state: State<'_, AppState>) -> Result<Value, String> {
    let ctx = state.lock()?;
    to_json(ctx.camera_permission())
}

// ── Activity screen ─────────────────────────────────────────────────

#[tauri::command]
pub fn cmd_activity_view(state: State<'_, AppState>) -> Result<Value, String> {
    let ctx = state.lock()?;
    to_json(activity::view(&ctx))
}

#[tauri::command]
pub fn cmd_activity_clear(state: State<'_, AppState>) -> Result<Value, String> {
    let mut ctx = state.lock()?;
    to_json(activity::clear(&mut ctx))
}

// ── Settings screen ─────────────────────────────────────────────────

#[tauri::command]
pub fn cmd_settings_view(state: State<'_, AppState>) -> Result<Value, String> {
    let ctx = state.lock()?;
    to_json(settings::view(&ctx))
}

/// Flip a preference and persist the config.
#[tauri::command]
pub fn cmd_settings_toggle(state: State<'_, AppState>, id: String) -> Result<bool, String> {
    let mut ctx = state.lock()?;
    let enabled = settings::toggle(&mut ctx, &id).map_err(|e| e.to_string())?;
    ctx.config().save().map_err(|e| e.to_string())?;
    Ok(enabled)
}

#[tauri::command]
pub fn cmd_settings_select_item(state: State<'_, AppState>, id: String) -> Result<Value, String> {
    let ctx = state.lock()?;
    let outcome = settings::select_item(&ctx, &id).map_err(|e| e.to_string())?;
    to_json(outcome)
}

// ── Config commands ─────────────────────────────────────────────────

#[tauri::command]
pub fn cmd_config_get(state: State<'_, AppState>, key: String) -> Result<Value, String> {
    let ctx = state.lock()?;
    match ctx.config().get(&key) {
        Some(value) => Ok(Value::String(value)),
        None => Err(format!("unknown key: {key}")),
    }
}

/// Timing and viewport changes apply after restart.
#[tauri::command]
pub fn cmd_config_set(state: State<'_, AppState>, key: String, value: String) -> Result<(), String> {
    let mut ctx = state.lock()?;
    ctx.config_mut().set(&key, &value).map_err(|e| e.to_string())
}

#[tauri::command]
pub fn cmd_config_list(state: State<'_, AppState>) -> Result<Value, String> {
    let ctx = state.lock()?;
    to_json(ctx.config())
}
