//! Configuration engine for the DUNE WIB front end.
//!
//! Translates human-meaningful LArASIC settings (gain, peaking time,
//! baseline, leakage current, pulser DAC, ...) into addressed register
//! writes, and sequences those writes with the latch and pulser-safety
//! steps the hardware requires. The actual command channel lives behind
//! [`wib_core::Transport`]; this crate only builds values and sequences.

pub mod config;
pub mod error;
pub mod larasic;
pub mod power;
pub mod sequence;
pub mod settings;

pub use config::{ApplyOptions, BoardConfig, ConfigFileError, FembConfig};
pub use error::WibDriverError;
pub use larasic::{ChannelSettings, GlobalSettings};
pub use power::{PowerRails, PowerSequence};
pub use sequence::{CommandSequence, Step};
