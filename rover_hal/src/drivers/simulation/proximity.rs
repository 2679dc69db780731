//! Simulated three-channel proximity ADC.

use std::sync::Arc;
use std::sync::atomic::{AtomicU16, Ordering};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rover_common::hal::driver::ProximityAdc;
use rover_common::sensor::{Channel, RawSample};

/// Full-scale ADC reading.
pub const ADC_MAX: u16 = u16::MAX;

type Levels = [AtomicU16; 3];

const fn slot(channel: Channel) -> usize {
    match channel {
        Channel::Left => 0,
        Channel::Center => 1,
        Channel::Right => 2,
    }
}

/// Shared handle for moving simulated obstacles while the ADC is sampled
/// from another thread.
#[derive(Debug, Clone)]
pub struct ProximityLevels(Arc<Levels>);

impl ProximityLevels {
    /// Set the noiseless reading of one channel.
    pub fn set(&self, channel: Channel, raw: u16) {
        self.0[slot(channel)].store(raw, Ordering::Relaxed);
    }

    /// Set all three channels at once.
    pub fn set_all(&self, sample: RawSample) {
        for channel in Channel::ALL {
            self.set(channel, sample.get(channel));
        }
    }

    /// Current noiseless reading of one channel.
    pub fn get(&self, channel: Channel) -> u16 {
        self.0[slot(channel)].load(Ordering::Relaxed)
    }
}

/// ADC returning the configured level of each channel plus uniform noise.
#[derive(Debug)]
pub struct SimProximity {
    levels: Arc<Levels>,
    noise: u16,
    rng: StdRng,
    samples: u64,
}

impl SimProximity {
    /// ADC starting at `base`, with `±noise` counts of uniform noise drawn
    /// from a generator seeded with `seed`.
    pub fn new(base: RawSample, noise: u16, seed: u64) -> (Self, ProximityLevels) {
        let levels = Arc::new([
            AtomicU16::new(base.left),
            AtomicU16::new(base.center),
            AtomicU16::new(base.right),
        ]);
        let handle = ProximityLevels(Arc::clone(&levels));
        (
            Self {
                levels,
                noise,
                rng: StdRng::seed_from_u64(seed),
                samples: 0,
            },
            handle,
        )
    }

    /// Noise-free ADC.
    pub fn quiet(base: RawSample) -> (Self, ProximityLevels) {
        Self::new(base, 0, 0)
    }

    /// Number of samples taken so far.
    pub const fn samples(&self) -> u64 {
        self.samples
    }

    fn read(&mut self, channel: Channel) -> u16 {
        let level = i32::from(self.levels[slot(channel)].load(Ordering::Relaxed));
        let noise = i32::from(self.noise);
        let jitter = if noise == 0 { 0 } else { self.rng.gen_range(-noise..=noise) };
        (level + jitter).clamp(0, i32::from(ADC_MAX)) as u16
    }
}

impl ProximityAdc for SimProximity {
    fn sample(&mut self) -> RawSample {
        self.samples += 1;
        RawSample {
            left: self.read(Channel::Left),
            center: self.read(Channel::Center),
            right: self.read(Channel::Right),
        }
    }
}
