//! Property tests for the calibration sequencer, the gaze walk and the
//! session gate.

use eyeaccess_core::calibration::{CalibrationSequencer, CalibrationState};
use eyeaccess_core::gaze::{GazeSimulator, GazeSource, SimulatorSettings};
use eyeaccess_core::storage::Config;
use eyeaccess_core::{AppContext, Viewport};
use proptest::prelude::*;

const T0: u64 = 1_700_000_000_000;

// ── Calibration step ordering ────────────────────────────────

#[derive(Debug, Clone)]
enum CalOp {
    Start,
    Confirm,
    Advance(u64),
    Skip,
    Reset,
}

fn cal_op() -> impl Strategy<Value = CalOp> {
    prop_oneof![
        1 => Just(CalOp::Start),
        6 => Just(CalOp::Confirm),
        6 => (0u64..1_200).prop_map(CalOp::Advance),
        1 => Just(CalOp::Skip),
        1 => Just(CalOp::Reset),
    ]
}

proptest! {
    /// While calibrating, the step only moves forward unless `start` resets it.
    #[test]
    fn calibration_step_never_goes_back(ops in proptest::collection::vec(cal_op(), 1..80)) {
        let mut seq = CalibrationSequencer::new(&Viewport::default(), 500);
        let mut now = T0;
        let mut last_step: Option<usize> = None;

        for op in ops {
            let restarted = matches!(op, CalOp::Start);
            match op {
                CalOp::Start => { seq.start_at(now); }
                CalOp::Confirm => { let _ = seq.confirm_step_at(now); }
                CalOp::Advance(ms) => { now += ms; seq.tick_at(now); }
                CalOp::Skip => { let _ = seq.skip_at(now); }
                CalOp::Reset => { seq.reset_at(now); }
            }

            match seq.state() {
                CalibrationState::Calibrating { step } => {
                    prop_assert!(step < seq.total_steps());
                    if restarted {
                        prop_assert_eq!(step, 0);
                    } else if let Some(prev) = last_step {
                        prop_assert!(step >= prev, "step went from {} to {}", prev, step);
                    }
                    last_step = Some(step);
                }
                _ => last_step = None,
            }
        }
    }

    /// Every sampled position stays inside the margins.
    #[test]
    fn gaze_stays_in_bounds(
        width in 200.0f64..2_000.0,
        height in 300.0f64..3_000.0,
        jitter in 0.0f64..200.0,
        seed in any::<u64>(),
        steps in proptest::collection::vec(1u64..2_000, 1..60),
    ) {
        let settings = SimulatorSettings { jitter_px: jitter, ..SimulatorSettings::default() };
        let viewport = Viewport::new(width, height).unwrap();
        let mut sim = GazeSimulator::new(viewport, settings, Some(seed));
        let mut now = T0;
        sim.start_at(now);

        for dt in steps {
            now += dt;
            if let Some(p) = sim.tick_at(now) {
                prop_assert!(p.x >= 50.0 && p.x <= width - 50.0, "x = {}", p.x);
                prop_assert!(p.y >= 100.0 && p.y <= height - 100.0, "y = {}", p.y);
            }
        }
    }
}

// ── Session gate ─────────────────────────────────────────────

#[derive(Debug, Clone)]
enum SessionOp {
    Activate,
    EmergencyStop,
    StartCalibration,
    Skip,
    Reset,
    Advance(u64),
}

fn session_op() -> impl Strategy<Value = SessionOp> {
    prop_oneof![
        4 => Just(SessionOp::Activate),
        2 => Just(SessionOp::EmergencyStop),
        1 => Just(SessionOp::StartCalibration),
        1 => Just(SessionOp::Skip),
        1 => Just(SessionOp::Reset),
        3 => (0u64..1_000).prop_map(SessionOp::Advance),
    ]
}

proptest! {
    #[test]
    fn control_is_never_active_uncalibrated(ops in proptest::collection::vec(session_op(), 1..60)) {
        let mut config = Config::default();
        config.activity.seed_demo_entries = false;
        config.tracking.seed = Some(1);
        let mut ctx = AppContext::new(config).unwrap();
        let mut now = T0;

        for op in ops {
            match op {
                SessionOp::Activate => { let _ = ctx.activate_at(now); }
                SessionOp::EmergencyStop => {
                    ctx.emergency_stop_at(now);
                    prop_assert!(!ctx.session().is_active());
                }
                SessionOp::StartCalibration => { ctx.start_calibration_at(now); }
                SessionOp::Skip => { let _ = ctx.skip_calibration_at(now); }
                SessionOp::Reset => { ctx.reset_calibration_at(now); }
                SessionOp::Advance(ms) => { now += ms; ctx.tick_at(now); }
            }
            let state = ctx.session().state();
            prop_assert!(!state.active || state.calibrated);
        }
    }
}
