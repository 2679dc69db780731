//! Integration test: collision arbitration.
//!
//! Validates:
//! 1. A latched contact always wins the cycle with the recovery maneuver
//! 2. The latch reads all clear again by the next cycle
//! 3. The line follower cursor is untouched by recovery
//! 4. Contacts pressed on the simulated panel reach the loop through the
//!    bump watcher thread

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::{Duration, Instant};

use proptest::prelude::*;
use rover_common::consts::{COLLISION_BACKUP_SPEED_DEFAULT, COLLISION_TURN_SPEED_DEFAULT};
use rover_common::motion::{MotionCommand, MotionMode};
use rover_common::sensor::{BumpMask, Contacts};
use rover_control_unit::command::arbitration::CommandSource;
use rover_control_unit::safety::bump::spawn_bump_watcher;
use rover_control_unit::safety::collision::CollisionState;
use rover_hal::drivers::simulation::SimBumpers;

use super::{Steady, sim_loop, sim_loop_with};

// ── Helpers ─────────────────────────────────────────────────────────

fn recovery_turn(contacts: Contacts) -> MotionMode {
    let (mut lp, bump) = sim_loop(vec![3]);
    bump.signal(BumpMask::from_contacts(contacts));
    lp.cycle().unwrap();
    lp.io().actuator.history()[1].mode
}

// ── Tests ───────────────────────────────────────────────────────────

#[test]
fn rotation_follows_contact_side() {
    assert_eq!(recovery_turn(Contacts::BUMP0), MotionMode::PivotLeft);
    assert_eq!(recovery_turn(Contacts::BUMP1), MotionMode::PivotLeft);
    assert_eq!(recovery_turn(Contacts::BUMP4), MotionMode::PivotRight);
    assert_eq!(recovery_turn(Contacts::BUMP5), MotionMode::PivotRight);
    assert_eq!(recovery_turn(Contacts::MIDDLE), MotionMode::PivotLeft);
    assert_eq!(
        recovery_turn(Contacts::BUMP0 | Contacts::BUMP5),
        MotionMode::PivotLeft
    );
}

#[test]
fn collision_beats_proximity() {
    let (mut lp, bump) = sim_loop_with(vec![3], Steady::blocked());
    bump.signal(BumpMask::from_contacts(Contacts::BUMP2));

    let rec = lp.cycle().unwrap();
    assert_eq!(rec.source, CommandSource::Collision);
    assert_eq!(rec.contacts, Some(Contacts::BUMP2));

    let rec = lp.cycle().unwrap();
    assert_eq!(rec.source, CommandSource::Proximity);
    assert_eq!(lp.stats().collisions, 1);
    assert_eq!(lp.stats().avoidances, 1);
}

#[test]
fn panel_press_reaches_loop_through_watcher() {
    let (bumpers, panel) = SimBumpers::new();
    let (mut lp, source) = sim_loop(vec![3]);
    let running = Arc::new(AtomicBool::new(true));
    let watcher = spawn_bump_watcher(bumpers, 1000, source, Arc::clone(&running)).unwrap();

    panel.press(Contacts::BUMP4);
    let deadline = Instant::now() + Duration::from_secs(2);
    while lp.collision().poll() == CollisionState::Clear {
        assert!(Instant::now() < deadline, "bump never latched");
        std::thread::sleep(Duration::from_millis(1));
    }
    panel.release();
    std::thread::sleep(Duration::from_millis(20));

    let rec = lp.cycle().unwrap();
    assert_eq!(rec.source, CommandSource::Collision);
    assert!(rec.contacts.unwrap().contains(Contacts::BUMP4));
    assert_eq!(lp.io().actuator.history()[1].mode, MotionMode::PivotRight);
    assert_eq!(lp.collision().poll(), CollisionState::Clear);

    let latched = watcher.stop().unwrap();
    assert!(latched >= 1);
}

proptest! {
    #[test]
    fn triggered_latch_always_wins(
        prefix in prop::collection::vec(0u8..4, 0..24),
        next_code in 0u8..4,
        bits in 1u8..64,
    ) {
        let mut script = prefix.clone();
        script.push(next_code);
        let (mut lp, bump) = sim_loop(script);
        for _ in 0..prefix.len() {
            lp.cycle().unwrap();
        }
        let cursor = lp.follower().state();
        let issued_before = lp.io().actuator.history().len();

        let contacts = Contacts::from_bits_truncate(bits);
        bump.signal(BumpMask::from_contacts(contacts));
        let rec = lp.cycle().unwrap();

        prop_assert_eq!(rec.source, CommandSource::Collision);
        prop_assert_eq!(rec.command, MotionCommand::backward(COLLISION_BACKUP_SPEED_DEFAULT));
        prop_assert_eq!(lp.follower().state(), cursor);

        let issued: Vec<MotionCommand> = lp.io().actuator.history().range(issued_before..).copied().collect();
        prop_assert_eq!(issued.len(), 3);
        prop_assert_eq!(issued[0], MotionCommand::backward(COLLISION_BACKUP_SPEED_DEFAULT));
        prop_assert!(matches!(issued[1].mode, MotionMode::PivotLeft | MotionMode::PivotRight));
        prop_assert_eq!(issued[1].left_speed, COLLISION_TURN_SPEED_DEFAULT);
        prop_assert!(issued[2].is_stop());

        prop_assert_eq!(lp.collision().poll(), CollisionState::Clear);
        let after = lp.cycle().unwrap();
        prop_assert_eq!(after.source, CommandSource::LineFollower);
        prop_assert_eq!(after.input.map(|i| i.code()), Some(next_code));
    }
}
