//! Scripted session on a simulated clock: calibrate, track, activate, stop.

use clap::Args;
use eyeaccess_core::gaze::GazePosition;
use eyeaccess_core::screens::{activity, control, tracking, ActionOutcome};
use eyeaccess_core::{now_ms, AppContext, Config, Event, Prompt};
use serde::Serialize;
use tracing::info;

#[derive(Args)]
pub struct DemoArgs {
    /// Seed for the simulated gaze walk
    #[arg(long)]
    seed: Option<u64>,
    /// Number of gaze samples to collect while tracking
    #[arg(long, default_value = "20")]
    samples: u64,
}

#[derive(Serialize)]
struct DemoReport {
    events: Vec<Event>,
    prompts: Vec<Prompt>,
    gaze: Vec<GazePosition>,
    snapshot: Event,
    activity: activity::ActivityView,
}

#[derive(Default)]
struct Recorder {
    events: Vec<Event>,
    prompts: Vec<Prompt>,
}

impl Recorder {
    fn outcome(&mut self, outcome: ActionOutcome) {
        self.events.extend(outcome.events);
        self.prompts.extend(outcome.prompt);
    }

    fn tick(&mut self, ctx: &mut AppContext, now: u64) -> Option<GazePosition> {
        let tick = ctx.tick_at(now);
        self.events.extend(tick.events);
        self.prompts.extend(ctx.take_prompts());
        tick.gaze
    }
}

pub fn run(args: DemoArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load_or_default();
    if args.seed.is_some() {
        config.tracking.seed = args.seed;
    }
    let ack_ms = config.calibration.step_ack_delay_ms;
    let notice_ms = config.control.activation_notice_delay_ms;
    let interval_ms = config.tracking.sample_interval_ms.max(1);

    let mut ctx = AppContext::new(config)?;
    let mut rec = Recorder::default();
    let mut now = now_ms();

    tracking::grant_permission(&mut ctx);

    rec.outcome(tracking::start_calibration(&mut ctx, now));
    for _ in 0..ctx.sequencer().total_steps() {
        rec.outcome(tracking::confirm_step(&mut ctx, now));
        now += ack_ms;
        rec.tick(&mut ctx, now);
    }

    rec.outcome(tracking::toggle_tracking(&mut ctx, now));
    let mut gaze = Vec::new();
    while ctx.is_tracking() && (gaze.len() as u64) < args.samples {
        now += interval_ms;
        if let Some(position) = rec.tick(&mut ctx, now) {
            gaze.push(position);
        }
    }
    rec.outcome(tracking::toggle_tracking(&mut ctx, now));

    rec.outcome(control::activate(&mut ctx, now));
    now += notice_ms;
    rec.tick(&mut ctx, now);
    rec.outcome(control::emergency_stop(&mut ctx, now));

    ctx.teardown_at(now);
    info!(samples = gaze.len(), events = rec.events.len(), "demo finished");

    let report = DemoReport {
        snapshot: ctx.snapshot_at(now),
        activity: activity::view(&ctx),
        events: rec.events,
        prompts: rec.prompts,
        gaze,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
