//! Integration test: line following through the full control loop.
//!
//! Validates:
//! 1. The drift-and-loss scenario against the built-in table
//! 2. The debounce chain ends in a stop state that only "on line" leaves
//! 3. Identical inputs give identical outputs
//! 4. Left and right halves mirror each other

use std::sync::Arc;

use proptest::prelude::*;
use rover_common::motion::MotionCommand;
use rover_control_unit::command::arbitration::CommandSource;
use rover_control_unit::sensor::quantizer::LineInput;
use rover_control_unit::state::line::{LineFollower, OutputCode, StateId, TransitionTable};

use super::sim_loop;

// ── Helpers ─────────────────────────────────────────────────────────

fn follower() -> LineFollower {
    LineFollower::new(Arc::new(TransitionTable::canonical()))
}

fn input_codes() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(0u8..4, 1..64)
}

// ── Tests ───────────────────────────────────────────────────────────

#[test]
fn drift_and_loss_scenario_through_loop() {
    let (mut lp, _bump) = sim_loop(vec![3, 3, 2, 0, 0, 0, 3]);

    let mut states = Vec::new();
    for _ in 0..7 {
        let rec = lp.cycle().unwrap();
        assert_eq!(rec.source, CommandSource::LineFollower);
        states.push(lp.follower().table().name(rec.state).to_string());
    }

    assert_eq!(
        states,
        ["Center", "Center", "Left1", "LeftOff1", "LeftOff2", "LeftStop", "Center"]
    );

    let straight = MotionCommand::forward(500);
    let turn_right = MotionCommand::pivot_right(1000);
    assert_eq!(
        lp.io().actuator.history(),
        &[
            straight,
            straight,
            turn_right,
            turn_right,
            straight,
            MotionCommand::STOP,
            straight
        ]
    );

    let holds: Vec<u32> = lp.trace().map(|r| r.hold_ms).collect();
    assert_eq!(holds, [500, 500, 500, 500, 500, 10, 500]);
    assert_eq!(lp.stats().terminal_entries, 1);
}

#[test]
fn drift_then_three_losses_parks_in_left_stop() {
    let mut f = follower();
    for code in [2, 0, 0, 0] {
        f.step(LineInput::from_code(code));
    }
    assert_eq!(f.state(), StateId::LEFT_STOP);
}

#[test]
fn every_state_input_pair_lands_in_table() {
    let table = TransitionTable::canonical();
    for id in table.ids() {
        for input in LineInput::ALL {
            let step = table.step(id, input);
            assert!(step.state.index() < table.len());
            assert_eq!(step.output, table.record(step.state).output);
        }
    }
}

#[test]
fn terminal_state_keeps_motors_stopped_and_polls() {
    let (mut lp, _bump) = sim_loop(vec![1, 0, 0, 0, 0, 0, 0]);
    for _ in 0..7 {
        lp.cycle().unwrap();
    }
    assert_eq!(lp.follower().state(), StateId::RIGHT_STOP);
    let history = lp.io().actuator.history();
    assert!(history.iter().skip(4).all(MotionCommand::is_stop));
    assert_eq!(lp.stats().terminal_entries, 1);
}

proptest! {
    #[test]
    fn stop_state_holds_until_on_line(waits in prop::collection::vec(0u8..3, 0..32)) {
        let mut f = follower();
        for code in [2, 0, 0, 0] {
            f.step(LineInput::from_code(code));
        }
        for code in waits {
            let step = f.step(LineInput::from_code(code));
            prop_assert_eq!(step.state, StateId::LEFT_STOP);
            prop_assert_eq!(step.output, OutputCode::Stop);
        }
        let step = f.step(LineInput::OnLine);
        prop_assert_eq!(step.state, StateId::CENTER);
    }

    #[test]
    fn identical_inputs_identical_runs(codes in input_codes()) {
        let (mut a, _ba) = sim_loop(codes.clone());
        let (mut b, _bb) = sim_loop(codes.clone());
        for _ in 0..codes.len() {
            let ra = a.cycle().unwrap();
            let rb = b.cycle().unwrap();
            prop_assert_eq!(ra.state, rb.state);
            prop_assert_eq!(ra.command, rb.command);
            prop_assert_eq!(ra.hold_ms, rb.hold_ms);
        }
        prop_assert_eq!(a.io().actuator.history(), b.io().actuator.history());
    }

    #[test]
    fn mirrored_inputs_mirror_the_run(codes in input_codes()) {
        let table = TransitionTable::canonical();
        let mut f = follower();
        let mut m = follower();
        for code in codes {
            let input = LineInput::from_code(code);
            let a = f.step(input);
            let b = m.step(input.mirrored());
            prop_assert_eq!(table.mirror(a.state), Some(b.state));
            prop_assert_eq!(a.output.mirrored(), b.output);
            prop_assert_eq!(a.dwell_ms, b.dwell_ms);
        }
    }
}
