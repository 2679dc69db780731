//! Exponential low-pass filter for proximity channels.
//!
//! ```text
//! e[k+1] = e[k] + (raw - e[k]) / N
//! ```
//!
//! For a constant input `r` the error decays geometrically:
//! `|e[k] - r| = |e[0] - r| · (1 - 1/N)^k`, monotonically and without
//! overshoot. `N = 1` passes the input through.

use rover_common::sensor::{FilteredEstimate, RawSample};

/// Single-channel exponential filter state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpFilter {
    estimate: f64,
    gain: f64,
}

impl ExpFilter {
    /// Filter primed with `initial`. `smoothing` of 0 is treated as 1.
    pub fn new(initial: f64, smoothing: u32) -> Self {
        Self {
            estimate: initial,
            gain: 1.0 / f64::from(smoothing.max(1)),
        }
    }

    #[inline]
    pub fn apply(&mut self, raw: f64) -> f64 {
        self.estimate += (raw - self.estimate) * self.gain;
        self.estimate
    }

    #[inline]
    pub const fn estimate(&self) -> f64 {
        self.estimate
    }

    /// Re-prime with a new starting value.
    #[inline]
    pub fn reset(&mut self, initial: f64) {
        self.estimate = initial;
    }
}

/// Filters for the three proximity channels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProximityFilter {
    left: ExpFilter,
    center: ExpFilter,
    right: ExpFilter,
}

impl ProximityFilter {
    /// Prime every channel with the first raw sample.
    pub fn primed(first: RawSample, smoothing: u32) -> Self {
        Self {
            left: ExpFilter::new(f64::from(first.left), smoothing),
            center: ExpFilter::new(f64::from(first.center), smoothing),
            right: ExpFilter::new(f64::from(first.right), smoothing),
        }
    }

    #[inline]
    pub fn apply(&mut self, raw: RawSample) -> FilteredEstimate {
        FilteredEstimate {
            left: self.left.apply(f64::from(raw.left)),
            center: self.center.apply(f64::from(raw.center)),
            right: self.right.apply(f64::from(raw.right)),
        }
    }

    pub fn estimate(&self) -> FilteredEstimate {
        FilteredEstimate {
            left: self.left.estimate(),
            center: self.center.estimate(),
            right: self.right.estimate(),
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn unit_smoothing_passes_through() {
        let mut f = ExpFilter::new(0.0, 1);
        assert_eq!(f.apply(42.0), 42.0);
        assert_eq!(f.apply(-3.0), -3.0);
    }

    #[test]
    fn zero_smoothing_behaves_as_one() {
        let mut f = ExpFilter::new(10.0, 0);
        assert_eq!(f.apply(20.0), 20.0);
    }

    #[test]
    fn first_step_moves_one_nth() {
        let mut f = ExpFilter::new(0.0, 256);
        let e = f.apply(256.0);
        assert!((e - 1.0).abs() < 1e-12);
    }

    #[test]
    fn primed_filter_holds_steady_input() {
        let raw = RawSample::new(1000, 2000, 3000);
        let mut f = ProximityFilter::primed(raw, 256);
        for _ in 0..100 {
            f.apply(raw);
        }
        assert_eq!(f.estimate(), FilteredEstimate::from_raw(raw));
    }

    #[test]
    fn channels_are_independent() {
        let mut f = ProximityFilter::primed(RawSample::new(0, 0, 0), 2);
        let e = f.apply(RawSample::new(100, 0, 50));
        assert_eq!(e, FilteredEstimate::new(50.0, 0.0, 25.0));
    }

    #[test]
    fn reset_reprimes() {
        let mut f = ExpFilter::new(0.0, 4);
        f.apply(100.0);
        f.reset(7.0);
        assert_eq!(f.estimate(), 7.0);
    }

    proptest! {
        #[test]
        fn converges_geometrically(
            e0 in 0.0f64..16_384.0,
            r in 0.0f64..16_384.0,
            n in 1u32..1024,
            k in 0usize..2000,
        ) {
            let mut f = ExpFilter::new(e0, n);
            for _ in 0..k {
                f.apply(r);
            }
            let expected = (e0 - r).abs() * (1.0 - 1.0 / f64::from(n)).powi(k as i32);
            let actual = (f.estimate() - r).abs();
            prop_assert!((actual - expected).abs() <= 1e-6 * (1.0 + (e0 - r).abs()),
                "actual={actual} expected={expected}");
        }

        #[test]
        fn approaches_monotonically_without_overshoot(
            e0 in 0.0f64..16_384.0,
            r in 0.0f64..16_384.0,
            n in 1u32..512,
        ) {
            let mut f = ExpFilter::new(e0, n);
            let mut prev_err = (e0 - r).abs();
            for _ in 0..500 {
                let e = f.apply(r);
                let err = (e - r).abs();
                prop_assert!(err <= prev_err + 1e-9);
                if e0 <= r {
                    prop_assert!(e <= r + 1e-9);
                } else {
                    prop_assert!(e >= r - 1e-9);
                }
                prev_err = err;
            }
        }
    }
}
