//! # Rover Control Unit
//!
//! Reactive motion controller running against the simulation collaborators
//! from `rover_hal`.
//!
//! Loads and validates the TOML configuration, spawns the acquisition and
//! bump-watcher threads, then runs the foreground control loop until
//! Ctrl-C or `--cycles` is reached. The motors are stopped on every exit
//! path.

use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use clap::Parser;
use rover_common::consts::DEFAULT_CONFIG_PATH;
use rover_common::sensor::{Contacts, RawSample};
use rover_control_unit::config::{LoadedConfig, load_config};
use rover_control_unit::cycle::{ControlLoop, LoopIo};
use rover_control_unit::pipeline::acquisition::spawn_acquisition;
use rover_control_unit::pipeline::slot::estimate_channel;
use rover_control_unit::rt::RtParams;
use rover_control_unit::safety::bump::{bump_latch, spawn_bump_watcher};
use rover_hal::SystemClock;
use rover_hal::drivers::simulation::{ScriptedLine, SimBumpers, SimMotors, SimProximity};
use tracing::{Level, error, info};
use tracing_subscriber::EnvFilter;

/// Simulated ADC level with nothing in range (below the calibration cut-off).
const FAR_LEVEL: u16 = 1000;

/// How long a scheduled bump stays pressed [ms].
const BUMP_HOLD_MS: u64 = 50;

/// Rover Control Unit: line follower with collision arbitration
#[derive(Parser, Debug)]
#[command(name = "rover_control_unit")]
#[command(version)]
#[command(about = "Reactive motion controller for a differential-drive robot")]
struct Args {
    /// Path to the controller configuration TOML.
    #[arg(default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Stop after this many control cycles (default: run until Ctrl-C).
    #[arg(long)]
    cycles: Option<u64>,

    /// Comma-separated raw line sensor masks replayed by the simulated sensor.
    #[arg(long, default_value = "3,3,2,2,3,1,1,3")]
    line_script: String,

    /// Press the simulated bumper this many milliseconds after start.
    #[arg(long, value_name = "MS")]
    bump_after_ms: Option<u64>,

    /// Switch bits pressed by `--bump-after-ms` (bit 0 = rightmost).
    #[arg(long, default_value_t = 0x01)]
    bump_switches: u8,

    /// Uniform noise on the simulated proximity ADC [counts].
    #[arg(long, default_value_t = 8)]
    noise: u16,

    /// Seed for the simulated ADC noise.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Delay scale factor (0.1 runs dwell times ten times faster).
    #[arg(long, default_value_t = 1.0)]
    time_scale: f64,

    /// CPU core to pin the acquisition thread to (with the `rt` feature).
    #[arg(long, default_value_t = 1)]
    cpu_core: usize,

    /// SCHED_FIFO priority of the acquisition thread (with the `rt` feature).
    #[arg(long, default_value_t = 80)]
    rt_priority: i32,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();
    let loaded = load_config(&args.config);

    let level = match (&loaded, args.verbose) {
        (_, true) => Level::DEBUG,
        (Ok(l), false) => l
            .config
            .shared
            .log_level
            .as_directive()
            .parse()
            .unwrap_or(Level::INFO),
        (Err(_), false) => Level::INFO,
    };
    setup_tracing(level, args.json);

    info!("Rover Control Unit v{} starting...", env!("CARGO_PKG_VERSION"));

    let result = match loaded {
        Ok(loaded) => run(&args, loaded),
        Err(e) => Err(Box::new(e) as Box<dyn std::error::Error>),
    };
    if let Err(e) = result {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("Rover Control Unit shutdown complete");
}

fn run(args: &Args, loaded: LoadedConfig) -> Result<(), Box<dyn std::error::Error>> {
    let LoadedConfig { config, table } = loaded;
    info!(
        service = %config.shared.service_name,
        states = table.len(),
        sample_rate_hz = config.filter.sample_rate_hz,
        smoothing = config.filter.smoothing,
        "Config OK"
    );

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    })?;

    // ── Collaborators ──
    let line = ScriptedLine::parse(&args.line_script)?;
    let far = RawSample::new(FAR_LEVEL, FAR_LEVEL, FAR_LEVEL);
    let (adc, _levels) = SimProximity::new(far, args.noise, args.seed);
    let (mut bumpers, _panel) = SimBumpers::new();
    if let Some(ms) = args.bump_after_ms {
        let contacts = Contacts::from_bits_truncate(args.bump_switches);
        bumpers = bumpers.schedule(
            Duration::from_millis(ms),
            Duration::from_millis(BUMP_HOLD_MS),
            contacts,
        );
        info!(after_ms = ms, contacts = contacts.bits(), "bump scheduled");
    }

    // ── Background threads ──
    let (publisher, receiver) = estimate_channel();
    let rt = RtParams {
        cpu_core: args.cpu_core,
        priority: args.rt_priority,
    };
    let acquisition = spawn_acquisition(adc, &config.filter, publisher, Arc::clone(&running), Some(rt))?;
    let (source, latch) = bump_latch();
    let watcher = spawn_bump_watcher(bumpers, config.collision.poll_hz, source, Arc::clone(&running))?;

    // ── Foreground loop ──
    let io = LoopIo {
        line,
        actuator: SimMotors::new(),
        clock: SystemClock::with_time_scale(args.time_scale),
        estimates: receiver,
    };
    let mut control = ControlLoop::new(&config, table, io, latch);
    let result = control.run(&running, args.cycles);

    running.store(false, Ordering::SeqCst);
    let acq = acquisition.stop();
    let latched = watcher.stop();
    let stats = result?;
    let acq = acq?;
    let latched = latched?;

    info!(
        cycles = stats.cycles,
        line_steps = stats.line_steps,
        collisions = stats.collisions,
        avoidances = stats.avoidances,
        terminal_entries = stats.terminal_entries,
        skipped_samples = stats.skipped_samples,
        acquisition_ticks = acq.ticks,
        acquisition_overruns = acq.overruns,
        bump_reads_latched = latched,
        motor_commands = control.io().actuator.applied(),
        final_state = control.follower().state_name(),
        "Run summary"
    );
    Ok(())
}

/// Setup tracing subscriber based on CLI arguments.
fn setup_tracing(level: Level, json: bool) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }
}
