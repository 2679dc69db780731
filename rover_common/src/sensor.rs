//! Sensor value types shared between drivers and the control unit.
//!
//! Proximity values flow `RawSample` → `FilteredEstimate` → `Distances`.
//! Bump switches report an active-low [`BumpMask`]; [`Contacts`] is the
//! active-high view used for decisions.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use static_assertions::const_assert;

use crate::consts::BUMP_SWITCH_COUNT;

// ─── Proximity ──────────────────────────────────────────────────────

/// Proximity channel position on the chassis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Left,
    Center,
    Right,
}

impl Channel {
    pub const ALL: [Self; 3] = [Self::Left, Self::Center, Self::Right];

    /// Channel on the opposite side (center maps to itself).
    pub const fn mirrored(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Center => Self::Center,
            Self::Right => Self::Left,
        }
    }
}

/// Unprocessed ADC readings, one per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawSample {
    pub left: u16,
    pub center: u16,
    pub right: u16,
}

impl RawSample {
    pub const fn new(left: u16, center: u16, right: u16) -> Self {
        Self { left, center, right }
    }

    pub const fn get(&self, channel: Channel) -> u16 {
        match channel {
            Channel::Left => self.left,
            Channel::Center => self.center,
            Channel::Right => self.right,
        }
    }
}

/// Low-pass filtered estimate per channel, in ADC units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FilteredEstimate {
    pub left: f64,
    pub center: f64,
    pub right: f64,
}

impl FilteredEstimate {
    pub const fn new(left: f64, center: f64, right: f64) -> Self {
        Self { left, center, right }
    }

    pub fn from_raw(raw: RawSample) -> Self {
        Self::new(f64::from(raw.left), f64::from(raw.center), f64::from(raw.right))
    }

    pub const fn get(&self, channel: Channel) -> f64 {
        match channel {
            Channel::Left => self.left,
            Channel::Center => self.center,
            Channel::Right => self.right,
        }
    }
}

/// Calibrated distances [mm].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Distances {
    pub left_mm: u32,
    pub center_mm: u32,
    pub right_mm: u32,
}

impl Distances {
    pub const fn get(&self, channel: Channel) -> u32 {
        match channel {
            Channel::Left => self.left_mm,
            Channel::Center => self.center_mm,
            Channel::Right => self.right_mm,
        }
    }
}

// ─── Bump switches ──────────────────────────────────────────────────

const_assert!(BUMP_SWITCH_COUNT <= 8);

bitflags! {
    /// Pressed bump switches (active-high). Bit 0 is the rightmost switch.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Contacts: u8 {
        const BUMP0 = 0x01;
        const BUMP1 = 0x02;
        const BUMP2 = 0x04;
        const BUMP3 = 0x08;
        const BUMP4 = 0x10;
        const BUMP5 = 0x20;
    }
}

impl Contacts {
    /// Switches on the right side of the bumper.
    pub const RIGHT_SIDE: Self = Self::from_bits_truncate(Self::BUMP0.bits() | Self::BUMP1.bits());
    /// Switches in the middle of the bumper.
    pub const MIDDLE: Self = Self::from_bits_truncate(Self::BUMP2.bits() | Self::BUMP3.bits());
    /// Switches on the left side of the bumper.
    pub const LEFT_SIDE: Self = Self::from_bits_truncate(Self::BUMP4.bits() | Self::BUMP5.bits());

    /// Physical mirror image: bit `i` becomes bit `5 - i`.
    pub const fn mirrored(self) -> Self {
        let b = self.bits();
        let mut out = 0u8;
        let mut i = 0;
        while i < BUMP_SWITCH_COUNT {
            if b & (1 << i) != 0 {
                out |= 1 << (BUMP_SWITCH_COUNT - 1 - i);
            }
            i += 1;
        }
        Self::from_bits_truncate(out)
    }
}

impl Default for Contacts {
    fn default() -> Self {
        Self::empty()
    }
}

/// Raw active-low bump mask as read from the port: a cleared bit means the
/// switch is pressed. `0x3F` is all clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BumpMask(u8);

impl BumpMask {
    pub const ALL_CLEAR: Self = Self(Contacts::all().bits());

    /// Keep only the six switch bits.
    pub const fn from_raw(raw: u8) -> Self {
        Self(raw & Contacts::all().bits())
    }

    pub const fn from_contacts(contacts: Contacts) -> Self {
        Self(!contacts.bits() & Contacts::all().bits())
    }

    #[inline]
    pub const fn raw(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn contacts(self) -> Contacts {
        Contacts::from_bits_truncate(!self.0)
    }

    #[inline]
    pub const fn is_clear(self) -> bool {
        self.0 == Self::ALL_CLEAR.0
    }
}

impl Default for BumpMask {
    fn default() -> Self {
        Self::ALL_CLEAR
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_clear_has_no_contacts() {
        assert_eq!(BumpMask::ALL_CLEAR.raw(), 0x3F);
        assert!(BumpMask::default().is_clear());
        assert!(BumpMask::ALL_CLEAR.contacts().is_empty());
    }

    #[test]
    fn active_low_decoding() {
        // Switch 0 and 5 pressed.
        let mask = BumpMask::from_raw(0b01_1110);
        assert_eq!(mask.contacts(), Contacts::BUMP0 | Contacts::BUMP5);
        assert!(!mask.is_clear());
    }

    #[test]
    fn upper_bits_ignored() {
        assert!(BumpMask::from_raw(0xFF).is_clear());
        assert_eq!(BumpMask::from_raw(0xC0).contacts(), Contacts::all());
    }

    #[test]
    fn contacts_roundtrip_through_mask() {
        let c = Contacts::LEFT_SIDE | Contacts::BUMP2;
        assert_eq!(BumpMask::from_contacts(c).contacts(), c);
    }

    #[test]
    fn mirror_swaps_sides() {
        assert_eq!(Contacts::RIGHT_SIDE.mirrored(), Contacts::LEFT_SIDE);
        assert_eq!(Contacts::MIDDLE.mirrored(), Contacts::MIDDLE);
        assert_eq!(Contacts::BUMP1.mirrored(), Contacts::BUMP4);
    }

    #[test]
    fn channel_accessors() {
        let raw = RawSample::new(1, 2, 3);
        let est = FilteredEstimate::from_raw(raw);
        for ch in Channel::ALL {
            assert_eq!(est.get(ch), f64::from(raw.get(ch)));
        }
        assert_eq!(Channel::Left.mirrored(), Channel::Right);
    }
}
