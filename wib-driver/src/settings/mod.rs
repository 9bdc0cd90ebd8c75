//! The setting catalog: every logical LArASIC setting, its legal values,
//! its UI labels, and the translation between UI ordinals and the codes
//! the chips expect.
//!
//! The ordinal→code tables for gain and peaking time are fixed small
//! permutations, not identities; they are pinned by tests because a wrong
//! table silently mis-sets the analog front end.

mod channel;
mod global;

pub use channel::{Baseline, ChannelBuffer, ChannelMonitor, Gain, PeakingTime, TestCap};
pub use global::{
    Ch0Monitor, Ch15Filter, Coupling, DacGainMatching, GlobalBuffer, Leakage, PulserDac,
    PulserSwitch,
};
