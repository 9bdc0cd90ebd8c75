//! Chip-global settings shared by all 16 channels of one LArASIC.

use derive_more::Display;

use crate::error::WibDriverError;

/// Pulser DAC gain matching. Ordinal 0 is "On"; turning it off locks the
/// gain at 4.7 mV/fC.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum DacGainMatching {
    #[display("On")]
    #[default]
    On = 0,
    #[display("Off")]
    Off = 1,
}

impl DacGainMatching {
    pub const LABELS: [&'static str; 2] = ["On", "Off"];

    pub fn from_ordinal(ordinal: u8) -> Result<Self, WibDriverError> {
        match ordinal {
            0 => Ok(DacGainMatching::On),
            1 => Ok(DacGainMatching::Off),
            _ => Err(WibDriverError::OrdinalOutOfRange {
                setting: "DAC gain matching",
                ordinal,
                max: 1,
            }),
        }
    }

    #[must_use]
    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    /// Register bit; same as the ordinal, so "On" encodes as 0.
    #[must_use]
    pub const fn hw_bit(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub const fn from_hw_bit(bit: u8) -> Self {
        if bit & 1 == 1 {
            DacGainMatching::Off
        } else {
            DacGainMatching::On
        }
    }
}

/// Chip-global differential buffer; overrides the per-channel single-ended
/// buffers when on.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum GlobalBuffer {
    #[display("Off")]
    #[default]
    Off = 0,
    #[display("Differential On")]
    Differential = 1,
}

impl GlobalBuffer {
    pub const LABELS: [&'static str; 2] = ["Off", "Differential On"];

    pub fn from_ordinal(ordinal: u8) -> Result<Self, WibDriverError> {
        match ordinal {
            0 => Ok(GlobalBuffer::Off),
            1 => Ok(GlobalBuffer::Differential),
            _ => Err(WibDriverError::OrdinalOutOfRange {
                setting: "differential buffer",
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
            GlobalBuffer::Differential
        } else {
            GlobalBuffer::Off
        }
    }
}

/// Input coupling. AC encodes as register bit 1.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Coupling {
    #[display("AC")]
    #[default]
    Ac = 0,
    #[display("DC")]
    Dc = 1,
}

impl Coupling {
    pub const LABELS: [&'static str; 2] = ["AC", "DC"];

    pub fn from_ordinal(ordinal: u8) -> Result<Self, WibDriverError> {
        match ordinal {
            0 => Ok(Coupling::Ac),
            1 => Ok(Coupling::Dc),
            _ => Err(WibDriverError::OrdinalOutOfRange {
                setting: "coupling",
                ordinal,
                max: 1,
            }),
        }
    }

    #[must_use]
    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    /// Register bit: 1 for AC, 0 for DC.
    #[must_use]
    pub const fn hw_bit(self) -> u8 {
        match self {
            Coupling::Ac => 1,
            Coupling::Dc => 0,
        }
    }

    #[must_use]
    pub const fn from_hw_bit(bit: u8) -> Self {
        if bit & 1 == 1 { Coupling::Ac } else { Coupling::Dc }
    }
}

/// Leakage current selection. The four UI choices decompose into a base
/// current bit and an orthogonal ×10 multiplier flag in the register.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Leakage {
    #[display("100 pA")]
    #[default]
    Pa100 = 0,
    #[display("500 pA")]
    Pa500 = 1,
    /// 100 pA with the ×10 multiplier.
    #[display("1 nA")]
    Na1 = 2,
    /// 500 pA with the ×10 multiplier.
    #[display("5 nA")]
    Na5 = 3,
}

impl Leakage {
    pub const LABELS: [&'static str; 4] = ["100 pA", "500 pA", "1 nA", "5 nA"];

    pub fn from_ordinal(ordinal: u8) -> Result<Self, WibDriverError> {
        match ordinal {
            0 => Ok(Leakage::Pa100),
            1 => Ok(Leakage::Pa500),
            2 => Ok(Leakage::Na1),
            3 => Ok(Leakage::Na5),
            _ => Err(WibDriverError::OrdinalOutOfRange {
                setting: "leakage current",
                ordinal,
                max: 3,
            }),
        }
    }

    #[must_use]
    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    /// Base current bit: `ordinal % 2`, 1 selecting the 500 pA base.
    #[must_use]
    pub const fn leak_bit(self) -> u8 {
        self as u8 % 2
    }

    /// ×10 multiplier flag: `ordinal / 2`.
    #[must_use]
    pub const fn times_ten(self) -> bool {
        self as u8 / 2 == 1
    }

    /// Recombines the register decomposition; the inverse of
    /// [`leak_bit`](Self::leak_bit) and [`times_ten`](Self::times_ten).
    #[must_use]
    pub const fn from_parts(leak_bit: u8, times_ten: bool) -> Self {
        match (leak_bit & 1, times_ten) {
            (0, false) => Leakage::Pa100,
            (_, false) => Leakage::Pa500,
            (0, true) => Leakage::Na1,
            (_, true) => Leakage::Na5,
        }
    }
}

/// Monitor source for channel 0.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Ch0Monitor {
    #[display("Analog")]
    #[default]
    Analog = 0,
    #[display("Temperature")]
    Temperature = 1,
    #[display("Bandgap")]
    Bandgap = 2,
}

impl Ch0Monitor {
    pub const LABELS: [&'static str; 3] = ["Analog", "Temperature", "Bandgap"];

    /// Ordinal→code table; code 2 is unused by the chip.
    const HW_CODES: [u8; 3] = [0, 1, 3];

    pub fn from_ordinal(ordinal: u8) -> Result<Self, WibDriverError> {
        match ordinal {
            0 => Ok(Ch0Monitor::Analog),
            1 => Ok(Ch0Monitor::Temperature),
            2 => Ok(Ch0Monitor::Bandgap),
            _ => Err(WibDriverError::OrdinalOutOfRange {
                setting: "channel 0 monitor",
                ordinal,
                max: 2,
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
            0 => Ok(Ch0Monitor::Analog),
            1 => Ok(Ch0Monitor::Temperature),
            3 => Ok(Ch0Monitor::Bandgap),
            _ => Err(WibDriverError::CodeOutOfRange {
                setting: "channel 0 monitor",
                code,
            }),
        }
    }
}

/// High-frequency filter on channel 15.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Ch15Filter {
    #[display("Off")]
    #[default]
    Off = 0,
    #[display("On")]
    On = 1,
}

impl Ch15Filter {
    pub const LABELS: [&'static str; 2] = ["Off", "On"];

    pub fn from_ordinal(ordinal: u8) -> Result<Self, WibDriverError> {
        match ordinal {
            0 => Ok(Ch15Filter::Off),
            1 => Ok(Ch15Filter::On),
            _ => Err(WibDriverError::OrdinalOutOfRange {
                setting: "channel 15 filter",
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
        if bit & 1 == 1 { Ch15Filter::On } else { Ch15Filter::Off }
    }
}

/// Routing of the internal pulser DAC. The P5A chip revision no longer has
/// the external option; it is kept because the register code space does.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum PulserSwitch {
    #[display("Disconnected")]
    #[default]
    Disconnected = 0,
    #[display("Internal")]
    Internal = 1,
    #[display("External")]
    External = 2,
    #[display("Measure")]
    Measure = 3,
}

impl PulserSwitch {
    pub const LABELS: [&'static str; 4] = ["Disconnected", "Internal", "External", "Measure"];

    pub fn from_ordinal(ordinal: u8) -> Result<Self, WibDriverError> {
        match ordinal {
            0 => Ok(PulserSwitch::Disconnected),
            1 => Ok(PulserSwitch::Internal),
            2 => Ok(PulserSwitch::External),
            3 => Ok(PulserSwitch::Measure),
            _ => Err(WibDriverError::OrdinalOutOfRange {
                setting: "pulser DAC switch",
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
        self as u8
    }

    #[must_use]
    pub const fn from_hw_code(code: u8) -> Self {
        match code & 0x3 {
            0 => PulserSwitch::Disconnected,
            1 => PulserSwitch::Internal,
            2 => PulserSwitch::External,
            _ => PulserSwitch::Measure,
        }
    }
}

/// 6-bit pulser DAC amplitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PulserDac(u8);

impl PulserDac {
    pub const MAX: u8 = 0x3F;

    pub fn new(value: u8) -> Result<Self, WibDriverError> {
        if value > Self::MAX {
            return Err(WibDriverError::DacOutOfRange(value));
        }
        Ok(Self(value))
    }

    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 0, false)]
    #[case(1, 1, false)]
    #[case(2, 0, true)]
    #[case(3, 1, true)]
    fn leakage_decomposition(#[case] ordinal: u8, #[case] leak: u8, #[case] x10: bool) {
        let l = Leakage::from_ordinal(ordinal).unwrap();
        assert_eq!(l.leak_bit(), leak);
        assert_eq!(l.times_ten(), x10);
        assert_eq!(Leakage::from_parts(leak, x10), l);
    }

    #[test]
    fn five_na_times_ten_is_ordinal_three() {
        let l = Leakage::from_parts(1, true);
        assert_eq!(l, Leakage::Na5);
        assert_eq!(l.ordinal(), 3);
    }

    #[rstest]
    #[case(0, 0)]
    #[case(1, 1)]
    #[case(2, 3)]
    fn ch0_monitor_table(#[case] ordinal: u8, #[case] code: u8) {
        let m = Ch0Monitor::from_ordinal(ordinal).unwrap();
        assert_eq!(m.hw_code(), code);
        assert_eq!(Ch0Monitor::from_hw_code(code).unwrap(), m);
    }

    #[test]
    fn ch0_monitor_code_two_is_invalid() {
        assert!(matches!(
            Ch0Monitor::from_hw_code(2),
            Err(WibDriverError::CodeOutOfRange { code: 2, .. })
        ));
    }

    #[test]
    fn coupling_ac_is_bit_one() {
        assert_eq!(Coupling::Ac.hw_bit(), 1);
        assert_eq!(Coupling::Dc.hw_bit(), 0);
        assert_eq!(Coupling::from_hw_bit(1), Coupling::Ac);
    }

    #[test]
    fn dac_range_is_six_bits() {
        assert_eq!(PulserDac::new(0x3F).unwrap().value(), 0x3F);
        assert_eq!(
            PulserDac::new(0x40),
            Err(WibDriverError::DacOutOfRange(0x40))
        );
    }

    #[test]
    fn out_of_range_ordinals_are_loud() {
        assert!(Leakage::from_ordinal(4).is_err());
        assert!(Ch0Monitor::from_ordinal(3).is_err());
        assert!(PulserSwitch::from_ordinal(4).is_err());
    }
}
