//! Bump event latch and watcher.
//!
//! The latch holds the raw active-low bump mask. The event source ANDs
//! newly pressed switches into it, so contacts accumulate until handled.
//! Only the collision arbitrator, through [`BumpLatch::clear`], writes
//! all-clear back.
//!
//! ```text
//! BumpWatcher thread ── signal(mask) ──► [AtomicU8 latch] ◄── load/clear ── arbitrator
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use rover_common::hal::driver::BumpSensor;
use rover_common::sensor::BumpMask;
use tracing::{debug, info};

use crate::error::ControlError;

/// Create a connected source/latch pair, initially all clear.
pub fn bump_latch() -> (BumpEventSource, BumpLatch) {
    let mask = Arc::new(AtomicU8::new(BumpMask::ALL_CLEAR.raw()));
    (
        BumpEventSource {
            mask: Arc::clone(&mask),
        },
        BumpLatch { mask },
    )
}

/// Writing half, owned by whatever observes the switches.
#[derive(Debug)]
pub struct BumpEventSource {
    mask: Arc<AtomicU8>,
}

impl BumpEventSource {
    /// Latch the pressed switches of `mask`. A clear mask is a no-op.
    #[inline]
    pub fn signal(&self, mask: BumpMask) {
        if !mask.is_clear() {
            self.mask.fetch_and(mask.raw(), Ordering::AcqRel);
        }
    }
}

/// Reading half, owned by the collision arbitrator.
#[derive(Debug)]
pub struct BumpLatch {
    mask: Arc<AtomicU8>,
}

impl BumpLatch {
    #[inline]
    pub fn load(&self) -> BumpMask {
        BumpMask::from_raw(self.mask.load(Ordering::Acquire))
    }

    /// Reset to all clear after a recovery has completed.
    #[inline]
    pub fn clear(&self) {
        self.mask.store(BumpMask::ALL_CLEAR.raw(), Ordering::Release);
    }
}

// ─── Watcher ────────────────────────────────────────────────────────

/// Handle to the polling thread that feeds a [`BumpEventSource`].
pub struct BumpWatcherHandle {
    handle: JoinHandle<u64>,
    running: Arc<AtomicBool>,
}

impl BumpWatcherHandle {
    /// Stop polling; returns how many pressed readings were latched.
    pub fn stop(self) -> Result<u64, ControlError> {
        self.running.store(false, Ordering::Release);
        self.handle
            .join()
            .map_err(|_| ControlError::ThreadPanicked("bump watcher"))
    }
}

/// Poll `sensor` at `poll_hz` and latch any pressed switches.
pub fn spawn_bump_watcher<B>(
    mut sensor: B,
    poll_hz: u32,
    source: BumpEventSource,
    running: Arc<AtomicBool>,
) -> Result<BumpWatcherHandle, ControlError>
where
    B: BumpSensor + 'static,
{
    let period = Duration::from_micros(1_000_000 / u64::from(poll_hz.max(1)));
    let flag = Arc::clone(&running);

    let handle = std::thread::Builder::new()
        .name("bump-watcher".into())
        .spawn(move || {
            let mut latched = 0u64;
            let mut last = BumpMask::ALL_CLEAR;
            while flag.load(Ordering::Acquire) {
                let mask = sensor.read_bumpers();
                if !mask.is_clear() {
                    source.signal(mask);
                    latched += 1;
                    if mask != last {
                        debug!(contacts = ?mask.contacts(), "bump contact");
                    }
                }
                last = mask;
                std::thread::sleep(period);
            }
            info!(latched, "bump watcher stopped");
            latched
        })
        .map_err(|e| ControlError::Spawn("bump watcher", e.to_string()))?;

    Ok(BumpWatcherHandle { handle, running })
}

// ─── Tests ──────────────────────────────────────────────────────────
