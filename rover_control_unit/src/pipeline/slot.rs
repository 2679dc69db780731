//! Single-slot estimate handoff (acquisition → foreground).
//!
//! A lock-free seqlock holding the latest [`FilteredEstimate`]. One
//! [`EstimatePublisher`] writes, one [`EstimateReceiver`] reads; neither is
//! `Clone`, so single-writer/single-reader holds by construction.
//!
//! ## Protocol
//! - Writer: `seq` → odd, write channels, `seq` → even (Release).
//! - Reader: load `seq` (Acquire), read channels, fence, re-check `seq`.
//!   Odd or changed sequence means a write was in progress; retry.
//!
//! An even sequence the receiver has not seen yet is the "ready" signal.
//! Consuming it records the sequence, so the same publication is never
//! returned twice. When the writer outpaces the reader, older publications
//! are overwritten and only the most recent one is delivered.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering, fence};
use std::time::{Duration, Instant};

use rover_common::sensor::FilteredEstimate;
use thiserror::Error;

/// Polls spent yielding before the receiver starts sleeping.
const YIELD_POLLS: u32 = 64;

/// Sleep between polls once yielding has not produced a sample.
const POLL_SLEEP: Duration = Duration::from_micros(50);

/// Receive failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SlotError {
    /// No fresh publication within the timeout.
    #[error("no fresh estimate within {}ms", .waited.as_millis())]
    Stale { waited: Duration },

    /// The publisher was dropped and everything published was consumed.
    #[error("estimate publisher disconnected")]
    Disconnected,
}

#[derive(Debug, Default)]
struct EstimateSlot {
    seq: AtomicU64,
    left: AtomicU64,
    center: AtomicU64,
    right: AtomicU64,
    closed: AtomicBool,
}

/// Create a connected publisher/receiver pair.
pub fn estimate_channel() -> (EstimatePublisher, EstimateReceiver) {
    let slot = Arc::new(EstimateSlot::default());
    (
        EstimatePublisher {
            slot: Arc::clone(&slot),
            seq: 0,
        },
        EstimateReceiver {
            slot,
            last_seen: 0,
            skipped: 0,
        },
    )
}

// ─── Writer ─────────────────────────────────────────────────────────

/// Writing half. Never blocks.
#[derive(Debug)]
pub struct EstimatePublisher {
    slot: Arc<EstimateSlot>,
    /// Writer-owned copy of the sequence.
    seq: u64,
}

impl EstimatePublisher {
    /// Overwrite the slot and mark it fresh.
    #[inline]
    pub fn publish(&mut self, estimate: &FilteredEstimate) {
        let slot = &*self.slot;
        slot.seq.store(self.seq.wrapping_add(1), Ordering::Relaxed);
        fence(Ordering::Release);

        slot.left.store(estimate.left.to_bits(), Ordering::Relaxed);
        slot.center.store(estimate.center.to_bits(), Ordering::Relaxed);
        slot.right.store(estimate.right.to_bits(), Ordering::Relaxed);

        self.seq = self.seq.wrapping_add(2);
        slot.seq.store(self.seq, Ordering::Release);
    }

    /// Number of completed publications.
    #[inline]
    pub const fn published(&self) -> u64 {
        self.seq / 2
    }
}

impl Drop for EstimatePublisher {
    fn drop(&mut self) {
        self.slot.closed.store(true, Ordering::Release);
    }
}

// ─── Reader ─────────────────────────────────────────────────────────

/// Reading half, owned by the foreground loop.
#[derive(Debug)]
pub struct EstimateReceiver {
    slot: Arc<EstimateSlot>,
    last_seen: u64,
    skipped: u64,
}

impl EstimateReceiver {
    /// Take the latest publication if it has not been consumed yet.
    pub fn try_recv(&mut self) -> Option<FilteredEstimate> {
        let slot = &*self.slot;
        loop {
            let s1 = slot.seq.load(Ordering::Acquire);
            if s1 == self.last_seen {
                return None;
            }
            if s1 & 1 != 0 {
                std::hint::spin_loop();
                continue;
            }

            let left = f64::from_bits(slot.left.load(Ordering::Relaxed));
            let center = f64::from_bits(slot.center.load(Ordering::Relaxed));
            let right = f64::from_bits(slot.right.load(Ordering::Relaxed));

            fence(Ordering::Acquire);
            let s2 = slot.seq.load(Ordering::Relaxed);
            if s1 != s2 {
                std::hint::spin_loop();
                continue;
            }

            let delivered = s1.wrapping_sub(self.last_seen) / 2;
            self.skipped += delivered.saturating_sub(1);
            self.last_seen = s1;
            return Some(FilteredEstimate { left, center, right });
        }
    }

    /// Block until a fresh publication arrives or `timeout` elapses.
    pub fn recv_timeout(&mut self, timeout: Duration) -> Result<FilteredEstimate, SlotError> {
        let start = Instant::now();
        let mut polls = 0u32;
        loop {
            if let Some(estimate) = self.try_recv() {
                return Ok(estimate);
            }
            if self.slot.closed.load(Ordering::Acquire) {
                // The final publication may have landed after the poll above.
                return self.try_recv().ok_or(SlotError::Disconnected);
            }
            let waited = start.elapsed();
            if waited >= timeout {
                return Err(SlotError::Stale { waited });
            }
            if polls < YIELD_POLLS {
                polls += 1;
                std::thread::yield_now();
            } else {
                std::thread::sleep(POLL_SLEEP.min(timeout - waited));
            }
        }
    }

    /// Whether an unconsumed publication is waiting.
    #[inline]
    pub fn is_ready(&self) -> bool {
        let s = self.slot.seq.load(Ordering::Acquire);
        s != self.last_seen && s & 1 == 0
    }

    /// Publications overwritten before the receiver got to them.
    #[inline]
    pub const fn skipped(&self) -> u64 {
        self.skipped
    }
}

// ─── Source Trait ───────────────────────────────────────────────────

/// Where the foreground loop gets fresh estimates from.
///
/// Implemented by [`EstimateReceiver`]; tests substitute scripted sources.
pub trait EstimateSource {
    /// Next unconsumed estimate, waiting at most `timeout`.
    fn next_estimate(&mut self, timeout: Duration) -> Result<FilteredEstimate, SlotError>;

    /// Publications dropped by most-recent-wins so far.
    fn skipped(&self) -> u64 {
        0
    }
}

impl EstimateSource for EstimateReceiver {
    fn next_estimate(&mut self, timeout: Duration) -> Result<FilteredEstimate, SlotError> {
        self.recv_timeout(timeout)
    }

    fn skipped(&self) -> u64 {
        EstimateReceiver::skipped(self)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
