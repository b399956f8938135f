//! Background loop that advances the shared context.
//!
//! Emits to the web view:
//! - `gaze-updated` with the new position on every gaze sample
//! - `session-event` for each event a tick produced
//! - `prompt` for dialogs queued by delayed transitions

use std::time::Duration;

use tauri::{AppHandle, Emitter, Manager};
use tracing::{debug, warn};

use crate::bridge::AppState;

pub fn spawn(app: AppHandle) {
    let interval_ms = match app.state::<AppState>().lock() {
        Ok(ctx) => ctx.config().tracking.sample_interval_ms.max(1),
        Err(e) => {
            warn!("ticker not started: {e}");
            return;
        }
    };

    tauri::async_runtime::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_millis(interval_ms));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        debug!(interval_ms, "session ticker started");

        loop {
            ticker.tick().await;
            let (outcome, prompts) = {
                let state = app.state::<AppState>();
                let mut ctx = match state.lock() {
                    Ok(ctx) => ctx,
                    Err(e) => {
                        warn!("session ticker stopped: {e}");
                        break;
                    }
                };
                let outcome = ctx.tick();
                (outcome, ctx.take_prompts())
            };

            if let Some(position) = outcome.gaze {
                let _ = app.emit("gaze-updated", position);
            }
            for event in outcome.events {
                let _ = app.emit("session-event", event);
            }
            for prompt in prompts {
                let _ = app.emit("prompt", prompt);
            }
        }
    });
}
