//! Shared fixtures.

mod collision;
mod line_following;
mod pipeline;
mod startup;

use std::sync::Arc;
use std::time::Duration;

use rover_common::control_unit::config::ControllerConfig;
use rover_common::sensor::FilteredEstimate;
use rover_control_unit::cycle::{ControlLoop, LoopIo};
use rover_control_unit::pipeline::slot::{EstimateSource, SlotError};
use rover_control_unit::safety::bump::{BumpEventSource, bump_latch};
use rover_control_unit::state::line::TransitionTable;
use rover_hal::SystemClock;
use rover_hal::drivers::simulation::{ScriptedLine, SimMotors};

/// Filtered reading well inside obstacle range on every channel.
pub const NEAR_READING: f64 = 20_000.0;

/// Every channel reads the same fixed estimate; never stale.
pub struct Steady(pub FilteredEstimate);

impl Steady {
    /// Nothing in range.
    pub fn open() -> Self {
        Self(FilteredEstimate::default())
    }

    /// Obstacle close on every channel.
    pub fn blocked() -> Self {
        Self(FilteredEstimate::new(NEAR_READING, NEAR_READING, NEAR_READING))
    }
}

impl EstimateSource for Steady {
    fn next_estimate(&mut self, _timeout: Duration) -> Result<FilteredEstimate, SlotError> {
        Ok(self.0)
    }
}

pub type SimLoop<E = Steady> = ControlLoop<ScriptedLine, SimMotors, SystemClock, E>;

/// Loop over simulated collaborators with delays disabled.
///
/// With the default sensor layout a raw mask equals its quantized code, so
/// `script` can be written directly in input codes.
pub fn sim_loop_with<E: EstimateSource>(script: Vec<u8>, estimates: E) -> (SimLoop<E>, BumpEventSource) {
    sim_loop_config(script, estimates, &ControllerConfig::default())
}

pub fn sim_loop_config<E: EstimateSource>(
    script: Vec<u8>,
    estimates: E,
    config: &ControllerConfig,
) -> (SimLoop<E>, BumpEventSource) {
    let (source, latch) = bump_latch();
    let io = LoopIo {
        line: ScriptedLine::new(script),
        actuator: SimMotors::new(),
        clock: SystemClock::with_time_scale(0.0),
        estimates,
    };
    let lp = ControlLoop::new(config, Arc::new(TransitionTable::canonical()), io, latch);
    (lp, source)
}

pub fn sim_loop(script: Vec<u8>) -> (SimLoop, BumpEventSource) {
    sim_loop_with(script, Steady::open())
}
