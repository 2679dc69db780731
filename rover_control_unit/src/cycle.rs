//! Foreground control loop.
//!
//! One cycle:
//! 1. Drain `settle_samples` fresh proximity estimates and calibrate them.
//! 2. Arbitrate: collision latch first, then proximity, then line follower.
//! 3. Actuate. The line follower reads and quantizes the line sensor,
//!    steps the table, maps the entered state's output code to a motion
//!    command and waits out its dwell time. Maneuvers run step by step to
//!    completion and leave the line follower's cursor untouched.
//!
//! ## RT Setup
//! With the `rt` feature the acquisition thread can be locked into memory,
//! pinned to a core and moved to `SCHED_FIFO`. Without it every call is a
//! no-op.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use heapless::Deque;
use rover_common::consts::TRACE_DEPTH;
use rover_common::control_unit::config::ControllerConfig;
use rover_common::hal::driver::{DelayClock, LineSensor, MotionActuator};
use rover_common::motion::MotionCommand;
use rover_common::sensor::{Contacts, Distances};
use tracing::{debug, error, info, warn};

use crate::command::arbitration::{CommandSource, Decision, arbitrate};
use crate::command::maneuver::Maneuver;
use crate::command::motion::MotionMap;
use crate::error::ControlError;
use crate::pipeline::slot::{EstimateSource, SlotError};
use crate::safety::bump::BumpLatch;
use crate::safety::collision::CollisionArbitrator;
use crate::safety::proximity::{Obstacle, ProximityGuard};
use crate::sensor::calibration::Calibrator;
use crate::sensor::quantizer::{LineInput, LineQuantizer};
use crate::state::line::{LineFollower, StateId, TransitionTable};

// ─── Cycle Statistics ───────────────────────────────────────────────

/// Per-loop counters. O(1) update, no allocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleStats {
    /// Total cycles executed.
    pub cycles: u64,
    /// Cycles driven by the line follower.
    pub line_steps: u64,
    /// Collision recoveries executed.
    pub collisions: u64,
    /// Proximity avoidance maneuvers executed.
    pub avoidances: u64,
    /// Entries into a terminal (stopped) line state.
    pub terminal_entries: u64,
    /// Estimates overwritten before the loop consumed them.
    pub skipped_samples: u64,
    /// Maximum time from fresh estimate to actuation [ns].
    pub max_decision_ns: u64,
    /// Running sum for average decision time.
    pub sum_decision_ns: u64,
}

impl CycleStats {
    #[inline]
    fn record_decision(&mut self, ns: u64) {
        self.sum_decision_ns = self.sum_decision_ns.saturating_add(ns);
        self.max_decision_ns = self.max_decision_ns.max(ns);
    }

    /// Average decision time [ns] (0 if no cycles).
    pub fn avg_decision_ns(&self) -> u64 {
        self.sum_decision_ns.checked_div(self.cycles).unwrap_or(0)
    }
}

/// What one cycle did, kept in the diagnostic trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleRecord {
    pub cycle: u64,
    pub source: CommandSource,
    /// Line follower state after the cycle.
    pub state: StateId,
    /// Quantized reading, for line-follower cycles.
    pub input: Option<LineInput>,
    /// Contacts handled, for collision cycles.
    pub contacts: Option<Contacts>,
    /// First command issued this cycle.
    pub command: MotionCommand,
    /// Time spent actuating (dwell or maneuver) [ms].
    pub hold_ms: u32,
    pub distances: Distances,
}

// ─── Control Loop ───────────────────────────────────────────────────

/// Collaborators owned by the loop.
pub struct LoopIo<L, M, C, E> {
    pub line: L,
    pub actuator: M,
    pub clock: C,
    pub estimates: E,
}

/// The foreground loop. Owns the line follower cursor and the reading side
/// of both handoffs (estimate slot and bump latch).
pub struct ControlLoop<L, M, C, E> {
    io: LoopIo<L, M, C, E>,
    quantizer: LineQuantizer,
    follower: LineFollower,
    motion: MotionMap,
    calibrator: Calibrator,
    collision: CollisionArbitrator,
    proximity: ProximityGuard,
    settle_samples: u32,
    stale_timeout: Duration,
    terminal_poll_ms: u32,
    status_interval: u64,
    stats: CycleStats,
    trace: Deque<CycleRecord, TRACE_DEPTH>,
}

impl<L, M, C, E> ControlLoop<L, M, C, E>
where
    L: LineSensor,
    M: MotionActuator,
    C: DelayClock,
    E: EstimateSource,
{
    pub fn new(
        config: &ControllerConfig,
        table: Arc<TransitionTable>,
        io: LoopIo<L, M, C, E>,
        latch: BumpLatch,
    ) -> Self {
        Self {
            io,
            quantizer: LineQuantizer::from_config(&config.line),
            follower: LineFollower::new(table),
            motion: MotionMap::from_config(&config.line),
            calibrator: Calibrator::new(config.calibration),
            collision: CollisionArbitrator::new(latch, config.collision.clone()),
            proximity: ProximityGuard::new(config.proximity.clone()),
            settle_samples: config.filter.settle_samples.max(1),
            stale_timeout: Duration::from_millis(u64::from(config.filter.stale_timeout_ms)),
            terminal_poll_ms: config.line.terminal_poll_ms,
            status_interval: u64::from(config.diagnostics.status_interval),
            stats: CycleStats::default(),
            trace: Deque::new(),
        }
    }

    /// Run until `running` is cleared or `max_cycles` have executed.
    ///
    /// Motors are stopped on exit, including on error. A disconnected
    /// estimate pipeline after `running` was cleared counts as a clean stop.
    pub fn run(&mut self, running: &AtomicBool, max_cycles: Option<u64>) -> Result<CycleStats, ControlError> {
        info!(
            state = self.follower.state_name(),
            actuator = self.io.actuator.name(),
            "control loop started"
        );

        while running.load(Ordering::Acquire) && max_cycles.is_none_or(|max| self.stats.cycles < max) {
            match self.cycle() {
                Ok(_) => {}
                // Acquisition shares the shutdown flag and may drop its
                // publisher while this cycle is still draining estimates.
                Err(ControlError::Pipeline(SlotError::Disconnected)) if !running.load(Ordering::Acquire) => {
                    debug!("estimate pipeline closed during shutdown");
                    break;
                }
                Err(e) => {
                    error!("control cycle failed: {e}");
                    if let Err(stop_err) = self.io.actuator.apply(&MotionCommand::STOP) {
                        warn!("failed to stop motors: {stop_err}");
                    }
                    return Err(e);
                }
            }
        }

        self.io.actuator.apply(&MotionCommand::STOP)?;
        info!(
            cycles = self.stats.cycles,
            collisions = self.stats.collisions,
            avoidances = self.stats.avoidances,
            "control loop stopped"
        );
        Ok(self.stats.clone())
    }

    /// Execute one full cycle.
    pub fn cycle(&mut self) -> Result<CycleRecord, ControlError> {
        let mut estimate = self.io.estimates.next_estimate(self.stale_timeout)?;
        for _ in 1..self.settle_samples {
            estimate = self.io.estimates.next_estimate(self.stale_timeout)?;
        }
        let received = Instant::now();
        self.stats.skipped_samples = self.io.estimates.skipped();
        let distances = self.calibrator.convert(&estimate);

        let obstacle = self.proximity.detect(&distances);
        let decision = arbitrate(self.collision.poll(), obstacle);

        let cycle = self.stats.cycles;
        let mut record = CycleRecord {
            cycle,
            source: decision.source(),
            state: self.follower.state(),
            input: None,
            contacts: None,
            command: MotionCommand::STOP,
            hold_ms: 0,
            distances,
        };

        match decision {
            Decision::Recover(contacts) => {
                self.stats.record_decision(received.elapsed().as_nanos() as u64);
                self.recover(contacts, &mut record)?;
            }
            Decision::Avoid(obstacle) => {
                self.stats.record_decision(received.elapsed().as_nanos() as u64);
                self.avoid(&obstacle, &mut record)?;
            }
            Decision::FollowLine => self.follow_line(received, &mut record)?,
        }

        self.stats.cycles += 1;
        self.push_trace(record);
        if self.status_interval > 0 && self.stats.cycles % self.status_interval == 0 {
            self.log_status();
        }
        Ok(record)
    }

    fn follow_line(&mut self, received: Instant, record: &mut CycleRecord) -> Result<(), ControlError> {
        let was_terminal = self.follower.table().record(self.follower.state()).is_terminal();
        let input = self.quantizer.quantize(self.io.line.read_line());
        let step = self.follower.step(input);
        let command = self.motion.command(step.output);

        self.io.actuator.apply(&command)?;
        self.stats.record_decision(received.elapsed().as_nanos() as u64);
        self.stats.line_steps += 1;

        let hold_ms = if step.dwell_ms == 0 {
            if !was_terminal {
                self.stats.terminal_entries += 1;
                info!(state = self.follower.state_name(), "line lost, holding");
            }
            self.terminal_poll_ms
        } else {
            step.dwell_ms
        };

        debug!(
            cycle = record.cycle,
            input = input.code(),
            state = self.follower.state_name(),
            output = step.output.code(),
            "line step"
        );

        record.state = step.state;
        record.input = Some(input);
        record.command = command;
        record.hold_ms = hold_ms;
        self.io.clock.delay_ms(hold_ms);
        Ok(())
    }

    fn recover(&mut self, contacts: Contacts, record: &mut CycleRecord) -> Result<(), ControlError> {
        let plan = self.collision.plan(contacts);
        info!(
            contacts = contacts.bits(),
            degrees = plan.degrees,
            "collision, running recovery"
        );
        self.execute(&plan.maneuver, record)?;
        self.collision.complete();
        self.stats.collisions += 1;
        record.contacts = Some(contacts);
        Ok(())
    }

    fn avoid(&mut self, obstacle: &Obstacle, record: &mut CycleRecord) -> Result<(), ControlError> {
        info!(
            channel = ?obstacle.channel,
            distance_mm = obstacle.distance_mm,
            "obstacle, avoiding"
        );
        let maneuver = self.proximity.maneuver(obstacle);
        self.execute(&maneuver, record)?;
        self.stats.avoidances += 1;
        Ok(())
    }

    fn execute(&mut self, maneuver: &Maneuver, record: &mut CycleRecord) -> Result<(), ControlError> {
        if let Some(first) = maneuver.steps().iter().find(|s| !s.command.is_stop()) {
            record.command = first.command;
        }
        for step in maneuver.steps() {
            self.io.actuator.apply(&step.command)?;
            self.io.clock.delay_ms(step.duration_ms);
        }
        record.hold_ms = maneuver.total_ms();
        Ok(())
    }

    fn push_trace(&mut self, record: CycleRecord) {
        if self.trace.is_full() {
            self.trace.pop_front();
        }
        // Room was made above.
        let _ = self.trace.push_back(record);
    }

    fn log_status(&self) {
        let s = &self.stats;
        info!(
            cycles = s.cycles,
            line_steps = s.line_steps,
            collisions = s.collisions,
            avoidances = s.avoidances,
            terminal_entries = s.terminal_entries,
            skipped_samples = s.skipped_samples,
            avg_decision_ns = s.avg_decision_ns(),
            max_decision_ns = s.max_decision_ns,
            state = self.follower.state_name(),
            "status"
        );
    }

    pub fn stats(&self) -> &CycleStats {
        &self.stats
    }

    /// Most recent cycles, oldest first.
    pub fn trace(&self) -> impl Iterator<Item = &CycleRecord> + '_ {
        self.trace.iter()
    }

    pub fn follower(&self) -> &LineFollower {
        &self.follower
    }

    pub fn collision(&self) -> &CollisionArbitrator {
        &self.collision
    }

    pub fn io(&self) -> &LoopIo<L, M, C, E> {
        &self.io
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
