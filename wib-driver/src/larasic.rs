//! LArASIC register map and bit-field packing.
//!
//! One canonical layout is implemented (see DESIGN.md): channel registers
//! at `130 + channel`, global registers at 146/147, COLDATA command
//! register at page 0 / register 20. Encoder and decoder are bit-exact
//! inverses; the tests pin every offset.

use crate::error::WibDriverError;
use crate::settings::{
    Baseline, Ch0Monitor, Ch15Filter, ChannelBuffer, ChannelMonitor, Coupling, DacGainMatching,
    Gain, GlobalBuffer, Leakage, PeakingTime, PulserDac, PulserSwitch, TestCap,
};

/// First per-channel register; channel `n` lives at `CHANNEL_REG_BASE + n`.
pub const CHANNEL_REG_BASE: u8 = 130;
/// Chip-global register 1 (buffer, coupling, leakage, monitor source).
pub const GLOBAL_REG_1: u8 = 146;
/// Chip-global register 2 (pulser DAC switch and amplitude).
pub const GLOBAL_REG_2: u8 = 147;
/// COLDATA command register, on page 0.
pub const COLDATA_CMD_REG: u8 = 20;
/// Command-register value that latches shadow-written LArASIC registers.
pub const LATCH_CODE: u8 = 8;
/// Command-register value that enables the chip pulser switches.
pub const PULSER_ON_CODE: u8 = 1;
/// Command-register value that disables the chip pulser switches.
pub const PULSER_OFF_CODE: u8 = 0;

/// Register address of one channel's settings byte.
pub fn channel_register(channel: u8) -> Result<u8, WibDriverError> {
    if channel > 15 {
        return Err(WibDriverError::ChannelOutOfRange(channel));
    }
    Ok(CHANNEL_REG_BASE + channel)
}

/// The six logical settings packed into one channel register byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChannelSettings {
    pub test_cap: TestCap,
    pub baseline: Baseline,
    pub gain: Gain,
    pub peaking_time: PeakingTime,
    pub monitor: ChannelMonitor,
    pub buffer: ChannelBuffer,
}

impl ChannelSettings {
    /// Packs the settings into the channel register byte.
    ///
    /// Layout, LSB first: test_cap(1), baseline(1), gain(2),
    /// peaking_time(2), monitor(1), buffer(1).
    #[must_use]
    pub fn encode(&self) -> u8 {
        self.test_cap.hw_bit()
            | self.baseline.hw_bit() << 1
            | self.gain.hw_code() << 2
            | self.peaking_time.hw_code() << 4
            | self.monitor.hw_bit() << 6
            | self.buffer.hw_bit() << 7
    }

    /// Structural inverse of [`encode`](Self::encode). Every byte value
    /// decodes: the 2-bit codes cover their whole code space.
    #[must_use]
    pub fn decode(byte: u8) -> Self {
        Self {
            test_cap: TestCap::from_hw_bit(byte),
            baseline: Baseline::from_hw_bit(byte >> 1),
            // The 2-bit tables are permutations of 0..=3, so unwrapping
            // after masking cannot fail.
            gain: Gain::from_hw_code(byte >> 2 & 0x3).expect("2-bit gain code"),
            peaking_time: PeakingTime::from_hw_code(byte >> 4 & 0x3).expect("2-bit peaking code"),
            monitor: ChannelMonitor::from_hw_bit(byte >> 6),
            buffer: ChannelBuffer::from_hw_bit(byte >> 7),
        }
    }
}

/// The chip-global settings packed into registers 1 and 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GlobalSettings {
    pub dac_gain_match: DacGainMatching,
    pub buffer: GlobalBuffer,
    pub coupling: Coupling,
    pub leakage: Leakage,
    pub ch15_filter: Ch15Filter,
    pub monitor: Ch0Monitor,
    pub pulser_switch: PulserSwitch,
    pub pulser_dac: PulserDac,
}

impl GlobalSettings {
    /// Packs global register 1.
    ///
    /// Layout, LSB first: dac_gain_match(1), buffer(1), coupling(1),
    /// leak_10x(1), ch15_filter(1), monitor(2), leak(1).
    #[must_use]
    pub fn encode_reg1(&self) -> u8 {
        self.dac_gain_match.hw_bit()
            | self.buffer.hw_bit() << 1
            | self.coupling.hw_bit() << 2
            | (self.leakage.times_ten() as u8) << 3
            | self.ch15_filter.hw_bit() << 4
            | self.monitor.hw_code() << 5
            | self.leakage.leak_bit() << 7
    }

    /// Packs global register 2: the pulser DAC switch in bits 0..=1 and
    /// the 6-bit DAC value bit-reversed into bits 2..=7 (value bit `i` at
    /// byte bit `7 - i`). The reversal matches the shift-register order
    /// the chip clocks the DAC word in with.
    #[must_use]
    pub fn encode_reg2(&self) -> u8 {
        reverse_dac(self.pulser_dac.value()) | self.pulser_switch.hw_code()
    }

    #[must_use]
    pub fn encode(&self) -> (u8, u8) {
        (self.encode_reg1(), self.encode_reg2())
    }

    /// Structural inverse of [`encode`](Self::encode). Fails only on a
    /// monitor code the chip never produces.
    pub fn decode(reg1: u8, reg2: u8) -> Result<Self, WibDriverError> {
        Ok(Self {
            dac_gain_match: DacGainMatching::from_hw_bit(reg1),
            buffer: GlobalBuffer::from_hw_bit(reg1 >> 1),
            coupling: Coupling::from_hw_bit(reg1 >> 2),
            leakage: Leakage::from_parts(reg1 >> 7 & 1, reg1 >> 3 & 1 == 1),
            ch15_filter: Ch15Filter::from_hw_bit(reg1 >> 4),
            monitor: Ch0Monitor::from_hw_code(reg1 >> 5 & 0x3)?,
            pulser_switch: PulserSwitch::from_hw_code(reg2),
            pulser_dac: PulserDac::new(unreverse_dac(reg2)).expect("6-bit reversal"),
        })
    }
}

fn reverse_dac(dac: u8) -> u8 {
    (0..6).fold(0, |byte, i| byte | (dac >> i & 1) << (7 - i))
}

fn unreverse_dac(byte: u8) -> u8 {
    (0..6).fold(0, |dac, i| dac | (byte >> (7 - i) & 1) << i)
}
