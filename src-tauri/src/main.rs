// Prevents additional console window on Windows in release builds
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

//! EyeAccess Desktop Application
//!
//! A Tauri shell around eyeaccess-core. The web view renders the view models
//! the bridge commands return; all session state lives in the core context.

use tauri::{Manager, WindowEvent};
use tracing_subscriber::EnvFilter;

mod bridge;
mod ticker;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let state = bridge::AppState::new().unwrap_or_else(|e| {
        eprintln!("Failed to initialize session: {}", e);
        std::process::exit(1);
    });

    tauri::Builder::default()
        .manage(state)
        .setup(|app| {
            #[cfg(debug_assertions)]
            {
                eprintln!("DEBUG MODE: Opening DevTools...");
                if let Some(window) = app.get_webview_window("main") {
                    window.open_devtools();
                }
            }
            ticker::spawn(app.handle().clone());
            Ok(())
        })
        .on_window_event(|window, event| {
            if let WindowEvent::Destroyed = event {
                if let Ok(mut ctx) = window.state::<bridge::AppState>().lock() {
                    ctx.teardown();
                }
            }
        })
        .invoke_handler(tauri::generate_handler![
            // Session commands
            bridge::cmd_tabs,
            bridge::cmd_state_snapshot,
            bridge::cmd_prompt_action,
            bridge::cmd_set_viewport,
            // Control screen
            bridge::cmd_control_view,
            bridge::cmd_control_activate,
            bridge::cmd_control_emergency_stop,
            bridge::cmd_control_calibrate_now,
            // Tracking screen
            bridge::cmd_tracking_view,
            bridge::cmd_tracking_start_calibration,
            bridge::cmd_tracking_confirm_step,
            bridge::cmd_tracking_request_skip,
            bridge::cmd_tracking_toggle,
            bridge::cmd_tracking_request_camera,
            bridge::cmd_tracking_camera_result,
            bridge::cmd_tracking_camera_permission,
            // Activity screen
            bridge::cmd_activity_view,
            bridge::cmd_activity_clear,
            // Settings screen
            bridge::cmd_settings_view,
            bridge::cmd_settings_toggle,
            bridge::cmd_settings_select_item,
            // Config commands
            bridge::cmd_config_get,
            bridge::cmd_config_set,
            bridge::cmd_config_list,
        ])
        .run(tauri::generate_context!())
        .unwrap_or_else(|e| {
            eprintln!("Tauri application error: {}", e);
            std::process::exit(1);
        });
}
