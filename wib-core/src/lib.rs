//! Core types shared by the WIB configuration stack: the chip addressing
//! model, the request/reply vocabulary understood by the WIB firmware, and
//! the [`Transport`] trait that carries those requests.
//!
//! [`Transport`]: transport::Transport

pub mod address;
pub mod command;
pub mod transport;

pub use address::ChipAddress;
pub use command::{FastCommand, Reply, Request};
pub use transport::{Transport, TransportError};
