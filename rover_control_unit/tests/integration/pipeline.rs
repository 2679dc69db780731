//! Integration test: acquisition thread feeding the control loop.
//!
//! Validates:
//! 1. The first publication is the primed, unfiltered sample
//! 2. A step change converges monotonically without overshoot
//! 3. Proximity avoidance driven by real acquisition
//! 4. The loop fails and stops the motors once acquisition stops
//! 5. Ctrl-C during a long settle drain ends the run cleanly

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use rover_common::control_unit::config::{ControllerConfig, FilterConfig};
use rover_common::motion::MotionCommand;
use rover_common::sensor::{Channel, RawSample};
use rover_control_unit::command::arbitration::CommandSource;
use rover_control_unit::pipeline::acquisition::spawn_acquisition;
use rover_control_unit::pipeline::slot::{SlotError, estimate_channel};
use rover_hal::drivers::simulation::SimProximity;

use super::sim_loop_config;

const TIMEOUT: Duration = Duration::from_millis(500);

fn filter(smoothing: u32) -> FilterConfig {
    FilterConfig {
        smoothing,
        ..Default::default()
    }
}

#[test]
fn step_change_converges_without_overshoot() {
    let (adc, levels) = SimProximity::quiet(RawSample::new(1000, 1000, 1000));
    let (publisher, mut receiver) = estimate_channel();
    let running = Arc::new(AtomicBool::new(true));
    let handle = spawn_acquisition(adc, &filter(8), publisher, Arc::clone(&running), None).unwrap();

    let first = receiver.recv_timeout(TIMEOUT).unwrap();
    assert_eq!(first.center, 1000.0);

    levels.set(Channel::Center, 5000);
    let deadline = Instant::now() + Duration::from_secs(2);
    let mut last = first.center;
    while last < 4990.0 {
        assert!(Instant::now() < deadline, "estimate stuck at {last}");
        let e = receiver.recv_timeout(TIMEOUT).unwrap();
        assert!(e.center >= last, "went backwards: {} < {last}", e.center);
        assert!(e.center <= 5000.0, "overshoot: {}", e.center);
        assert_eq!(e.left, 1000.0);
        last = e.center;
    }

    let stats = handle.stop().unwrap();
    assert!(stats.ticks > 0);
    loop {
        match receiver.recv_timeout(TIMEOUT) {
            Ok(_) => continue,
            Err(e) => {
                assert_eq!(e, SlotError::Disconnected);
                break;
            }
        }
    }
}

#[test]
fn acquisition_drives_avoidance() {
    let (adc, levels) = SimProximity::quiet(RawSample::new(1000, 20_000, 1000));
    let (publisher, receiver) = estimate_channel();
    let running = Arc::new(AtomicBool::new(true));

    let config = ControllerConfig {
        filter: filter(1),
        ..Default::default()
    };
    let handle = spawn_acquisition(adc, &config.filter, publisher, Arc::clone(&running), None).unwrap();
    let (mut lp, _bump) = sim_loop_config(vec![3], receiver, &config);

    let rec = lp.cycle().unwrap();
    assert_eq!(rec.source, CommandSource::Proximity);
    assert_eq!(rec.command, MotionCommand::backward(1500));
    assert!(rec.distances.center_mm < 150);

    levels.set(Channel::Center, 1000);
    let mut cleared = false;
    for _ in 0..50 {
        if lp.cycle().unwrap().source == CommandSource::LineFollower {
            cleared = true;
            break;
        }
    }
    assert!(cleared, "obstacle never cleared");
    assert!(lp.stats().avoidances >= 1);

    handle.stop().unwrap();
}

#[test]
fn run_fails_when_acquisition_stops() {
    let (adc, _levels) = SimProximity::quiet(RawSample::default());
    let (publisher, receiver) = estimate_channel();
    let running = Arc::new(AtomicBool::new(true));
    let config = ControllerConfig::default();
    let handle = spawn_acquisition(adc, &config.filter, publisher, Arc::clone(&running), None).unwrap();
    let (mut lp, _bump) = sim_loop_config(vec![3], receiver, &config);

    lp.cycle().unwrap();
    handle.stop().unwrap();

    let err = lp.run(&AtomicBool::new(true), None).unwrap_err();
    assert!(err.to_string().contains("estimate pipeline"));
    assert_eq!(lp.io().actuator.current(), MotionCommand::STOP);
}

#[test]
fn shutdown_during_settle_drain_is_clean() {
    let (adc, _levels) = SimProximity::quiet(RawSample::default());
    let (publisher, receiver) = estimate_channel();
    let running = Arc::new(AtomicBool::new(true));
    let mut config = ControllerConfig::default();
    // About one second of samples per cycle at the default rate.
    config.filter.settle_samples = 2000;
    let handle = spawn_acquisition(adc, &config.filter, publisher, Arc::clone(&running), None).unwrap();
    let (mut lp, _bump) = sim_loop_config(vec![3], receiver, &config);

    let flag = Arc::clone(&running);
    let interrupt = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(300));
        flag.store(false, Ordering::SeqCst);
    });

    let result = lp.run(&running, None);
    interrupt.join().unwrap();
    let acq = handle.stop().unwrap();

    let stats = result.expect("interrupted run must end cleanly");
    assert_eq!(stats.cycles, 0);
    assert!(acq.ticks > 0);
    assert_eq!(lp.io().actuator.current(), MotionCommand::STOP);
}
