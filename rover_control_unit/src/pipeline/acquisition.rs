//! Periodic proximity acquisition.
//!
//! Runs on a dedicated thread: sample the ADC, filter, publish into the
//! estimate slot. Pacing uses absolute deadlines so the period does not
//! drift with the work done per tick. The routine never waits on the
//! foreground loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use rover_common::control_unit::config::FilterConfig;
use rover_common::hal::driver::ProximityAdc;
use rover_common::sensor::FilteredEstimate;
use tracing::{debug, info, warn};

use super::filter::ProximityFilter;
use super::slot::EstimatePublisher;
use crate::error::ControlError;
use crate::rt::RtParams;

/// Counters returned when the acquisition thread exits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AcquisitionStats {
    pub ticks: u64,
    /// Ticks that started after their deadline had already passed.
    pub overruns: u64,
}

/// Filter state plus its ADC and publisher.
pub struct Acquisition<A: ProximityAdc> {
    adc: A,
    filter: ProximityFilter,
    publisher: EstimatePublisher,
}

impl<A: ProximityAdc> Acquisition<A> {
    /// Prime the filter from one ADC sample and publish it.
    pub fn new(mut adc: A, smoothing: u32, mut publisher: EstimatePublisher) -> Self {
        let filter = ProximityFilter::primed(adc.sample(), smoothing);
        publisher.publish(&filter.estimate());
        Self {
            adc,
            filter,
            publisher,
        }
    }

    /// One acquisition tick.
    #[inline]
    pub fn tick(&mut self) -> FilteredEstimate {
        let raw = self.adc.sample();
        let estimate = self.filter.apply(raw);
        self.publisher.publish(&estimate);
        estimate
    }

    /// Tick every `period` until `running` is cleared.
    pub fn run(mut self, period: Duration, running: &AtomicBool) -> AcquisitionStats {
        let mut stats = AcquisitionStats::default();
        let mut deadline = Instant::now() + period;

        while running.load(Ordering::Acquire) {
            let now = Instant::now();
            if now < deadline {
                std::thread::sleep(deadline - now);
            } else if now > deadline + period {
                // Fell more than a full period behind; resynchronize.
                stats.overruns += 1;
                if stats.overruns.is_power_of_two() {
                    warn!(overruns = stats.overruns, "acquisition overrun, resynchronizing");
                }
                deadline = now;
            }

            self.tick();
            stats.ticks += 1;
            deadline += period;
        }
        stats
    }
}

/// Handle to a running acquisition thread.
pub struct AcquisitionHandle {
    handle: JoinHandle<AcquisitionStats>,
    running: Arc<AtomicBool>,
}

impl AcquisitionHandle {
    /// Clear the running flag and wait for the thread.
    pub fn stop(self) -> Result<AcquisitionStats, ControlError> {
        self.running.store(false, Ordering::Release);
        self.handle
            .join()
            .map_err(|_| ControlError::ThreadPanicked("acquisition"))
    }
}

/// Spawn the acquisition thread.
///
/// `running` is shared with the rest of the process; clearing it from any
/// side stops the thread after its current tick.
pub fn spawn_acquisition<A>(
    adc: A,
    config: &FilterConfig,
    publisher: EstimatePublisher,
    running: Arc<AtomicBool>,
    rt: Option<RtParams>,
) -> Result<AcquisitionHandle, ControlError>
where
    A: ProximityAdc + 'static,
{
    let period = Duration::from_micros(config.period_us());
    let smoothing = config.smoothing;
    let flag = Arc::clone(&running);

    let handle = std::thread::Builder::new()
        .name("acquisition".into())
        .spawn(move || {
            if let Some(params) = rt {
                if let Err(e) = params.apply() {
                    warn!("acquisition RT setup failed, continuing best-effort: {e}");
                }
            }
            let acquisition = Acquisition::new(adc, smoothing, publisher);
            debug!(period_us = period.as_micros() as u64, smoothing, "acquisition started");
            let stats = acquisition.run(period, &flag);
            info!(ticks = stats.ticks, overruns = stats.overruns, "acquisition stopped");
            stats
        })
        .map_err(|e| ControlError::Spawn("acquisition", e.to_string()))?;

    Ok(AcquisitionHandle { handle, running })
}

// ─── Tests ──────────────────────────────────────────────────────────
