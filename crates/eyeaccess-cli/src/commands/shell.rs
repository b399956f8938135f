//! Line-oriented interactive session.
//!
//! Reads one command per line from stdin and answers with one JSON line on
//! stdout. A background interval drives `tick()` at the gaze cadence so
//! delayed transitions fire on their own; `tick <ms>` fast-forwards the
//! session clock.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use eyeaccess_core::screens::{self, activity, control, settings, tracking};
use eyeaccess_core::{now_ms, AppContext, Config, CoreError};
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

#[derive(Args)]
pub struct ShellArgs {
    /// Config file to load and persist preference toggles to
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed for the simulated gaze walk
    #[arg(long)]
    seed: Option<u64>,
}

struct Shell {
    ctx: AppContext,
    config_path: Option<PathBuf>,
    /// Added to the wall clock by `tick <ms>`.
    offset_ms: u64,
}

enum Step {
    Reply(Value),
    Quit,
}

impl Shell {
    fn now(&self) -> u64 {
        now_ms() + self.offset_ms
    }

    /// Background tick. Only reports when something happened.
    fn tick(&mut self) -> Option<Value> {
        let now = self.now();
        let outcome = self.ctx.tick_at(now);
        let prompts = self.ctx.take_prompts();
        if outcome.events.is_empty() && prompts.is_empty() {
            return None;
        }
        Some(json!({ "tick": { "events": outcome.events, "prompts": prompts } }))
    }

    fn save_config(&self) -> Result<(), CoreError> {
        match &self.config_path {
            Some(path) => self.ctx.config().save_to(path)?,
            None => self.ctx.config().save()?,
        }
        Ok(())
    }

    fn handle(&mut self, line: &str) -> Result<Step, Box<dyn std::error::Error>> {
        let mut parts = line.split_whitespace();
        let Some(command) = parts.next() else {
            return Ok(Step::Reply(Value::Null));
        };
        let arg = parts.next();
        let now = self.now();
        let ctx = &mut self.ctx;
        debug!(command, "shell command");

        let reply = match command {
            "status" => json!({
                "snapshot": ctx.snapshot_at(now),
                "control": control::view(ctx),
            }),
            "calibrate" => serde_json::to_value(tracking::start_calibration(ctx, now))?,
            "confirm" => serde_json::to_value(tracking::confirm_step(ctx, now))?,
            "skip" => serde_json::to_value(tracking::request_skip(ctx))?,
            "track" => serde_json::to_value(tracking::toggle_tracking(ctx, now))?,
            "tracking" => serde_json::to_value(tracking::view(ctx))?,
            "activate" => serde_json::to_value(control::activate(ctx, now))?,
            "stop" => serde_json::to_value(control::emergency_stop(ctx, now))?,
            "log" => serde_json::to_value(activity::view(ctx))?,
            "clear" => serde_json::to_value(activity::clear(ctx))?,
            "settings" => serde_json::to_value(settings::view(ctx))?,
            "toggle" => {
                let id = arg.ok_or("usage: toggle <sound|haptic|adaptive>")?;
                let enabled = settings::toggle(ctx, id)?;
                self.save_config()?;
                json!({ "toggle": id, "enabled": enabled })
            }
            "item" => {
                let id = arg.ok_or("usage: item <id>")?;
                serde_json::to_value(settings::select_item(ctx, id)?)?
            }
            "reset-calibration" => {
                serde_json::to_value(settings::select_item(ctx, settings::ITEM_CALIBRATION)?)?
            }
            "answer" => {
                let id = arg.ok_or("usage: answer <action_id>")?;
                serde_json::to_value(screens::handle_prompt_action(ctx, id, now)?)?
            }
            "tick" => {
                let ms: u64 = arg.ok_or("usage: tick <ms>")?.parse()?;
                self.offset_ms += ms;
                let tick = self.tick();
                json!({ "advanced_ms": ms, "tick": tick.map(|t| t["tick"].clone()) })
            }
            "quit" | "exit" => return Ok(Step::Quit),
            other => return Err(format!("unknown command: {other}").into()),
        };
        Ok(Step::Reply(reply))
    }
}

pub fn run(args: ShellArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load_or_default(),
    };
    if args.seed.is_some() {
        config.tracking.seed = args.seed;
    }
    let interval_ms = config.tracking.sample_interval_ms.max(1);

    let mut ctx = AppContext::new(config)?;
    // No camera on a terminal; the simulated source stands in for it.
    tracking::grant_permission(&mut ctx);

    let mut shell = Shell {
        ctx,
        config_path: args.config,
        offset_ms: 0,
    };

    let rt = runtime()?;
    rt.block_on(repl(&mut shell, interval_ms))?;

    shell.ctx.teardown_at(shell.now());
    info!("shell closed");
    Ok(())
}

/// Single-threaded runtime with the timer driver; stdin reads use the
/// blocking pool and need no I/O driver.
fn runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
}

async fn repl(shell: &mut Shell, interval_ms: u64) -> Result<(), Box<dyn std::error::Error>> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(Duration::from_millis(interval_ms));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Some(report) = shell.tick() {
                    println!("{report}");
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match shell.handle(line.trim()) {
                    Ok(Step::Reply(Value::Null)) => {}
                    Ok(Step::Reply(reply)) => println!("{reply}"),
                    Ok(Step::Quit) => break,
                    Err(e) => println!("{}", json!({ "error": e.to_string() })),
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use eyeaccess_core::prompt::actions;

    #[test]
    fn runtime_drives_the_ticker() {
        let rt = runtime().unwrap();
        rt.block_on(async {
            let mut ticker = tokio::time::interval(Duration::from_millis(1));
            ticker.tick().await;
            ticker.tick().await;
        });
    }

    fn shell() -> Shell {
        let mut config = Config::default();
        config.activity.seed_demo_entries = false;
        config.tracking.seed = Some(5);
        let mut ctx = AppContext::new(config).unwrap();
        tracking::grant_permission(&mut ctx);
        Shell {
            ctx,
            config_path: None,
            offset_ms: 0,
        }
    }

    fn reply(shell: &mut Shell, line: &str) -> Value {
        match shell.handle(line).unwrap() {
            Step::Reply(v) => v,
            Step::Quit => panic!("unexpected quit"),
        }
    }

    #[test]
    fn calibrate_and_activate() {
        let mut shell = shell();
        reply(&mut shell, "calibrate");
        for _ in 0..5 {
            reply(&mut shell, "confirm");
            reply(&mut shell, "tick 500");
        }
        assert!(shell.ctx.session().is_calibrated());

        let out = reply(&mut shell, "activate");
        assert_eq!(out["events"][0]["type"], "control_activated");
        let out = reply(&mut shell, "stop");
        assert_eq!(out["prompt"]["title"], "Emergency Stop");
    }

    #[test]
    fn uncalibrated_activate_prompts() {
        let mut shell = shell();
        let out = reply(&mut shell, "activate");
        assert_eq!(out["prompt"]["title"], "Calibration Required");
    }

    #[test]
    fn skip_goes_through_answer() {
        let mut shell = shell();
        reply(&mut shell, "calibrate");
        let out = reply(&mut shell, "skip");
        assert_eq!(out["prompt"]["title"], "Skip Calibration");
        let out = reply(&mut shell, &format!("answer {}", actions::CONFIRM_SKIP));
        assert_eq!(out["events"][0]["type"], "calibration_skipped");
    }

    #[test]
    fn toggle_saves_to_given_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut shell = shell();
        shell.config_path = Some(path.clone());

        let out = reply(&mut shell, "toggle sound");
        assert_eq!(out["enabled"], false);
        let saved = Config::load_from(&path).unwrap();
        assert!(!saved.preferences.sound_enabled);
    }

    #[test]
    fn bad_commands_are_errors() {
        let mut shell = shell();
        assert!(shell.handle("fly").is_err());
        assert!(shell.handle("toggle").is_err());
        assert!(shell.handle("tick soon").is_err());
        assert!(matches!(shell.handle("quit"), Ok(Step::Quit)));
    }
}
