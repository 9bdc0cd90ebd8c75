use thiserror::Error;

/// Validation and precondition errors raised before anything is sent to
/// the hardware.
#[derive(Error, Debug, PartialEq, Clone)]
#[non_exhaustive]
pub enum WibDriverError {
    /// A UI ordinal is outside the declared range of its setting. This is
    /// a programmer or config-file error, never a user error, and is
    /// deliberately loud.
    #[error("{setting} ordinal ({ordinal}) is out of range [0, {max}]")]
    OrdinalOutOfRange {
        setting: &'static str,
        ordinal: u8,
        max: u8,
    },

    /// A register value read back from the hardware (or a saved file) does
    /// not decode to any legal setting.
    #[error("{setting} hardware code ({code:#04X}) does not decode")]
    CodeOutOfRange { setting: &'static str, code: u8 },

    /// Pulser DAC values are 6 bits.
    #[error("pulser DAC value ({0:#04X}) exceeds 6 bits")]
    DacOutOfRange(u8),

    /// LArASIC channels are numbered 0..=15.
    #[error("channel ({0}) is out of range [0, 15]")]
    ChannelOutOfRange(u8),

    /// Regulator outputs are limited to 0..=6 V.
    #[error("regulator voltage ({0} V) is out of range [0 V, 6 V]")]
    VoltageOutOfRange(f64),

    /// LArASIC register writes must not be issued while the pulser
    /// switches are enabled. Disable the pulser first or request the
    /// auto-toggle wrap.
    #[error("register write refused: the pulser is enabled and auto-toggle was not requested")]
    PulserEnabled,
}
