//! Per-channel settings of one LArASIC channel.

use derive_more::Display;

use crate::error::WibDriverError;

/// Test capacitor switch. Ordinal 0 is "On", unlike every other on/off
/// setting in the catalog; the hardware bit is 1 when the capacitor is
/// connected.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum TestCap {
    /// Test capacitor connected, test pulses reach the channel.
    #[display("On")]
    #[default]
    On = 0,
    /// Test capacitor disconnected.
    #[display("Off")]
    Off = 1,
}

impl TestCap {
    pub const LABELS: [&'static str; 2] = ["On", "Off"];

    pub fn from_ordinal(ordinal: u8) -> Result<Self, WibDriverError> {
        match ordinal {
            0 => Ok(TestCap::On),
            1 => Ok(TestCap::Off),
            _ => Err(WibDriverError::OrdinalOutOfRange {
                setting: "test capacitor",
                ordinal,
                max: 1,
            }),
        }
    }

    #[must_use]
    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    /// Register bit: 1 when connected.
    #[must_use]
    pub const fn hw_bit(self) -> u8 {
        match self {
            TestCap::On => 1,
            TestCap::Off => 0,
        }
    }

    #[must_use]
    pub const fn from_hw_bit(bit: u8) -> Self {
        if bit & 1 == 1 { TestCap::On } else { TestCap::Off }
    }
}

/// Channel baseline voltage.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Baseline {
    #[display("900 mV")]
    Mv900 = 0,
    /// The tool default for collection-plane channels.
    #[display("200 mV")]
    #[default]
    Mv200 = 1,
}

impl Baseline {
    pub const LABELS: [&'static str; 2] = ["900 mV", "200 mV"];

    pub fn from_ordinal(ordinal: u8) -> Result<Self, WibDriverError> {
        match ordinal {
            0 => Ok(Baseline::Mv900),
            1 => Ok(Baseline::Mv200),
            _ => Err(WibDriverError::OrdinalOutOfRange {
                setting: "baseline",
                ordinal,
                max: 1,
            }),
        }
    }

    #[must_use]
    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    /// Register bit; same as the ordinal for this setting.
    #[must_use]
    pub const fn hw_bit(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub const fn from_hw_bit(bit: u8) -> Self {
        if bit & 1 == 1 {
            Baseline::Mv200
        } else {
            Baseline::Mv900
        }
    }
}

/// Charge amplifier gain.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Gain {
    #[display("4.7 mV/fC")]
    #[default]
    Mv4_7 = 0,
    #[display("7.8 mV/fC")]
    Mv7_8 = 1,
    #[display("14 mV/fC")]
    Mv14 = 2,
    #[display("25 mV/fC")]
    Mv25 = 3,
}

impl Gain {
    pub const LABELS: [&'static str; 4] = ["4.7 mV/fC", "7.8 mV/fC", "14 mV/fC", "25 mV/fC"];

    /// Ordinal→code permutation for the per-channel register path.
    const HW_CODES: [u8; 4] = [3, 1, 0, 2];

    pub fn from_ordinal(ordinal: u8) -> Result<Self, WibDriverError> {
        match ordinal {
            0 => Ok(Gain::Mv4_7),
            1 => Ok(Gain::Mv7_8),
            2 => Ok(Gain::Mv14),
            3 => Ok(Gain::Mv25),
            _ => Err(WibDriverError::OrdinalOutOfRange {
                setting: "gain",
                ordinal,
                max: 3,
            }),
        }
    }

    #[must_use]
    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub const fn hw_code(self) -> u8 {
        Self::HW_CODES[self as usize]
    }

    pub fn from_hw_code(code: u8) -> Result<Self, WibDriverError> {
        match code {
            3 => Ok(Gain::Mv4_7),
            1 => Ok(Gain::Mv7_8),
            0 => Ok(Gain::Mv14),
            2 => Ok(Gain::Mv25),
            _ => Err(WibDriverError::CodeOutOfRange {
                setting: "gain",
                code,
            }),
        }
    }
}

/// Shaper peaking time.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum PeakingTime {
    #[display("0.5 us")]
    #[default]
    Us0_5 = 0,
    #[display("1 us")]
    Us1 = 1,
    #[display("2 us")]
    Us2 = 2,
    #[display("3 us")]
    Us3 = 3,
}

impl PeakingTime {
    pub const LABELS: [&'static str; 4] = ["0.5 us", "1 us", "2 us", "3 us"];

    /// Ordinal→code permutation for the per-channel register path.
    const HW_CODES: [u8; 4] = [2, 0, 3, 1];

    pub fn from_ordinal(ordinal: u8) -> Result<Self, WibDriverError> {
        match ordinal {
            0 => Ok(PeakingTime::Us0_5),
            1 => Ok(PeakingTime::Us1),
            2 => Ok(PeakingTime::Us2),
            3 => Ok(PeakingTime::Us3),
            _ => Err(WibDriverError::OrdinalOutOfRange {
                setting: "peaking time",
                ordinal,
                max: 3,
            }),
        }
    }

    #[must_use]
    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub const fn hw_code(self) -> u8 {
        Self::HW_CODES[self as usize]
    }

    pub fn from_hw_code(code: u8) -> Result<Self, WibDriverError> {
        match code {
            2 => Ok(PeakingTime::Us0_5),
            0 => Ok(PeakingTime::Us1),
            3 => Ok(PeakingTime::Us2),
            1 => Ok(PeakingTime::Us3),
            _ => Err(WibDriverError::CodeOutOfRange {
                setting: "peaking time",
                code,
            }),
        }
    }
}

/// Connection of one channel to the chip's monitor output.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum ChannelMonitor {
    #[display("Off")]
    #[default]
    Off = 0,
    #[display("On")]
    On = 1,
}

impl ChannelMonitor {
    pub const LABELS: [&'static str; 2] = ["Off", "On"];

    pub fn from_ordinal(ordinal: u8) -> Result<Self, WibDriverError> {
        match ordinal {
            0 => Ok(ChannelMonitor::Off),
            1 => Ok(ChannelMonitor::On),
            _ => Err(WibDriverError::OrdinalOutOfRange {
                setting: "channel monitor",
                ordinal,
                max: 1,
            }),
        }
    }

    #[must_use]
    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub const fn hw_bit(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub const fn from_hw_bit(bit: u8) -> Self {
        if bit & 1 == 1 {
            ChannelMonitor::On
        } else {
            ChannelMonitor::Off
        }
    }
}

/// Per-channel single-ended buffer. Overridden when the chip-global
/// differential buffer is on.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum ChannelBuffer {
    #[display("Off")]
    #[default]
    Off = 0,
    #[display("Single On")]
    SingleEnded = 1,
}

impl ChannelBuffer {
    pub const LABELS: [&'static str; 2] = ["Off", "Single On"];

    pub fn from_ordinal(ordinal: u8) -> Result<Self, WibDriverError> {
        match ordinal {
            0 => Ok(ChannelBuffer::Off),
            1 => Ok(ChannelBuffer::SingleEnded),
            _ => Err(WibDriverError::OrdinalOutOfRange {
                setting: "channel buffer",
                ordinal,
                max: 1,
            }),
        }
    }

    #[must_use]
    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub const fn hw_bit(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub const fn from_hw_bit(bit: u8) -> Self {
        if bit & 1 == 1 {
            ChannelBuffer::SingleEnded
        } else {
            ChannelBuffer::Off
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 3)]
    #[case(1, 1)]
    #[case(2, 0)]
    #[case(3, 2)]
    fn gain_table(#[case] ordinal: u8, #[case] code: u8) {
        let g = Gain::from_ordinal(ordinal).unwrap();
        assert_eq!(g.hw_code(), code);
        assert_eq!(Gain::from_hw_code(code).unwrap(), g);
    }

    #[rstest]
    #[case(0, 2)]
    #[case(1, 0)]
    #[case(2, 3)]
    #[case(3, 1)]
    fn peaking_time_table(#[case] ordinal: u8, #[case] code: u8) {
        let p = PeakingTime::from_ordinal(ordinal).unwrap();
        assert_eq!(p.hw_code(), code);
        assert_eq!(PeakingTime::from_hw_code(code).unwrap(), p);
    }

    #[test]
    fn gain_codes_are_a_bijection() {
        let mut seen = [false; 4];
        for ordinal in 0..4 {
            let code = Gain::from_ordinal(ordinal).unwrap().hw_code();
            assert!(!seen[code as usize]);
            seen[code as usize] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn peaking_time_codes_are_a_bijection() {
        let mut seen = [false; 4];
        for ordinal in 0..4 {
            let code = PeakingTime::from_ordinal(ordinal).unwrap().hw_code();
            assert!(!seen[code as usize]);
            seen[code as usize] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn out_of_range_ordinals_are_loud() {
        assert!(Gain::from_ordinal(4).is_err());
        assert!(PeakingTime::from_ordinal(4).is_err());
        assert!(TestCap::from_ordinal(2).is_err());
        assert!(Baseline::from_ordinal(2).is_err());
    }

    #[test]
    fn test_cap_ordinal_zero_is_on() {
        assert_eq!(TestCap::from_ordinal(0).unwrap(), TestCap::On);
        assert_eq!(TestCap::On.hw_bit(), 1);
        assert_eq!(TestCap::Off.hw_bit(), 0);
    }

    #[test]
    fn labels_match_display() {
        assert_eq!(Gain::Mv14.to_string(), Gain::LABELS[2]);
        assert_eq!(PeakingTime::Us3.to_string(), PeakingTime::LABELS[3]);
        assert_eq!(Baseline::Mv200.to_string(), "200 mV");
    }
}
