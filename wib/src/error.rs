use thiserror::Error;

use wib_core::transport::TransportError;
use wib_driver::WibDriverError;

/// Anything a session operation can fail with.
#[derive(Error, Debug, PartialEq)]
#[non_exhaustive]
pub enum WibError {
    /// A sequence is already in flight on this session.
    #[error("a configuration operation is already in flight")]
    Busy,

    /// A sequence step failed and the remainder was not issued. Writes
    /// before the failing step are on the hardware and are not rolled
    /// back.
    #[error(
        "applied up to step {} of {total}; step {step} ({what}) failed: {source}",
        .step - 1
    )]
    SequenceAborted {
        /// 1-based index of the failing step.
        step: usize,
        total: usize,
        what: String,
        source: TransportError,
    },

    /// The firmware processed a bulk request and reported failure.
    #[error("request rejected by the firmware: {extra}")]
    Rejected { extra: String },

    /// A board register address outside the WIB's mapped window.
    #[error("register {0:#010X} is outside the WIB address window")]
    AddressOutOfWindow(u32),

    /// A script name the WIB does not ship.
    #[error("no on-board script named {0:?}")]
    UnknownScript(String),

    #[error(transparent)]
    Driver(#[from] WibDriverError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}
