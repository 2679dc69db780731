//! Simulated bump switch panel.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::{Duration, Instant};

use rover_common::hal::driver::BumpSensor;
use rover_common::sensor::{BumpMask, Contacts};

/// A press that starts at a fixed offset from panel creation.
#[derive(Debug, Clone, Copy)]
struct ScheduledPress {
    from: Instant,
    until: Instant,
    contacts: Contacts,
}

/// Handle for pressing switches from outside the polling thread.
#[derive(Debug, Clone)]
pub struct BumpPanel(Arc<AtomicU8>);

impl BumpPanel {
    /// Hold `contacts` down (in addition to any already held).
    pub fn press(&self, contacts: Contacts) {
        self.0.fetch_or(contacts.bits(), Ordering::Relaxed);
    }

    /// Release every manually held switch.
    pub fn release(&self) {
        self.0.store(0, Ordering::Relaxed);
    }

    /// Currently held switches.
    pub fn held(&self) -> Contacts {
        Contacts::from_bits_truncate(self.0.load(Ordering::Relaxed))
    }
}

/// Bump port reporting manual and scheduled presses as an active-low mask.
#[derive(Debug)]
pub struct SimBumpers {
    held: Arc<AtomicU8>,
    created: Instant,
    schedule: Vec<ScheduledPress>,
}

impl SimBumpers {
    /// Panel with nothing pressed.
    pub fn new() -> (Self, BumpPanel) {
        let held = Arc::new(AtomicU8::new(0));
        let panel = BumpPanel(Arc::clone(&held));
        (
            Self {
                held,
                created: Instant::now(),
                schedule: Vec::new(),
            },
            panel,
        )
    }

    /// Press `contacts` for `hold`, starting `after` panel creation.
    pub fn schedule(mut self, after: Duration, hold: Duration, contacts: Contacts) -> Self {
        let from = self.created + after;
        self.schedule.push(ScheduledPress {
            from,
            until: from + hold,
            contacts,
        });
        self
    }

    fn pressed_at(&self, now: Instant) -> Contacts {
        let manual = Contacts::from_bits_truncate(self.held.load(Ordering::Relaxed));
        self.schedule
            .iter()
            .filter(|p| p.from <= now && now < p.until)
            .fold(manual, |acc, p| acc | p.contacts)
    }
}

impl BumpSensor for SimBumpers {
    fn read_bumpers(&mut self) -> BumpMask {
        BumpMask::from_contacts(self.pressed_at(Instant::now()))
    }
}
