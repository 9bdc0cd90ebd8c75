//! Configure DUNE WIB front-end electronics over a control channel.
//!
//! The heavy lifting lives in [`wib_driver`] (setting catalog, register
//! packing, command sequencing) and [`wib_core`] (addressing, request
//! vocabulary, the [`Transport`](wib_core::Transport) seam). This crate
//! ties them into a [`Session`]: one stateful, serialized connection to
//! one board.
//!
//! ```no_run
//! use wib::prelude::*;
//! # fn open_transport() -> wib_emulator::WibEmulator { wib_emulator::WibEmulator::new() }
//!
//! # fn main() -> Result<(), wib::WibError> {
//! let mut session = Session::new(open_transport());
//! let chip = ChipAddress::from_asic(0, 2);
//! let settings = ChannelSettings {
//!     gain: Gain::Mv14,
//!     peaking_time: PeakingTime::Us2,
//!     ..Default::default()
//! };
//! session.write_channel(chip, 7, &settings, true)?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod session;

pub use error::WibError;
pub use session::Session;

pub mod prelude {
    pub use crate::error::WibError;
    pub use crate::session::Session;
    pub use wib_core::address::ChipAddress;
    pub use wib_core::command::{FastCommand, PowerStage};
    pub use wib_core::transport::{Transport, TransportError};
    pub use wib_driver::config::{ApplyOptions, BoardConfig, FembConfig};
    pub use wib_driver::larasic::{ChannelSettings, GlobalSettings};
    pub use wib_driver::power::{PowerRails, PowerSequence};
    pub use wib_driver::settings::{
        Baseline, Ch0Monitor, Ch15Filter, ChannelBuffer, ChannelMonitor, Coupling,
        DacGainMatching, Gain, GlobalBuffer, Leakage, PeakingTime, PulserDac, PulserSwitch,
        TestCap,
    };
}
