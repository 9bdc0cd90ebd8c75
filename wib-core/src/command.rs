//! The request/reply vocabulary of the WIB control channel.
//!
//! Each [`Request`] expects exactly one [`Reply`] shape; the transport is a
//! plain blocking request/reply channel and owns no state of its own.

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Lowest addressable WIB board register.
pub const WIB_REG_FIRST: u32 = 0xA001_0000;
/// Highest addressable WIB board register.
pub const WIB_REG_LAST: u32 = 0xA00C_00C0;

/// Board-level trigger codes distributed to all COLDATA at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum FastCommand {
    /// Reset front-end state machines.
    Reset = 1,
    /// Latch shadow-written registers into the chips.
    Act = 2,
    /// Re-align frame timing.
    Sync = 4,
    /// Edge marker.
    Edge = 8,
    /// Idle pattern.
    Idle = 16,
    /// Combined edge + act.
    EdgeAct = 32,
}

impl FastCommand {
    /// Code understood by the firmware.
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Name used by the on-board script interpreter.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            FastCommand::Reset => "reset",
            FastCommand::Act => "act",
            FastCommand::Sync => "sync",
            FastCommand::Edge => "edge",
            FastCommand::Idle => "idle",
            FastCommand::EdgeAct => "edge_act",
        }
    }
}

/// Per-FEMB block of a [`ConfigureWib`] request.
///
/// Fields carry hardware codes, not UI ordinals; the translation happens in
/// the aggregate builder before this struct is filled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigureFemb {
    pub enabled: bool,
    pub test_cap: bool,
    pub gain: u8,
    pub peak_time: u8,
    pub baseline: u8,
    pub pulse_dac: u8,
    pub leak: bool,
    pub leak_10x: bool,
    pub ac_couple: bool,
    pub buffer: u8,
    pub strobe_skip: u32,
    pub strobe_delay: u32,
    pub strobe_length: u32,
}

/// Optional COLDADC calibration register override block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColdAdcOverride {
    pub reg_0: u8,
    pub reg_4: u8,
    pub reg_24: u8,
    pub reg_25: u8,
    pub reg_26: u8,
    pub reg_27: u8,
    pub reg_29: u8,
    pub reg_30: u8,
}

/// One bulk "apply full configuration" request, atomic from the caller's
/// point of view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigureWib {
    pub fembs: [ConfigureFemb; 4],
    pub cold: bool,
    pub pulser: bool,
    pub adc_test_pattern: bool,
    pub frame_dd: bool,
    pub adc_conf: Option<ColdAdcOverride>,
}

/// Stage selector for the FEMB power-on sequence. The stages are mutually
/// exclusive, not bit flags.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum PowerStage {
    /// Run the whole sequence in one request.
    #[display("full power sequence")]
    Full = 0,
    /// Run up to the point where an external ACT edge is required.
    #[display("power sequence up to ACT")]
    WaitForAct = 1,
    /// Resume after the ACT edge was delivered.
    #[display("power sequence resume after ACT")]
    Resume = 2,
}

/// FEMB power-on request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerWib {
    pub femb_on: [bool; 4],
    pub cold: bool,
    pub stage: PowerStage,
}

/// Regulator output levels, in volts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfigurePower {
    pub dc2dc_o1: f64,
    pub dc2dc_o2: f64,
    pub dc2dc_o3: f64,
    pub dc2dc_o4: f64,
    pub ldo_a0: f64,
    pub ldo_a1: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Request {
    /// Read a 32-bit WIB board register.
    Peek { addr: u32 },
    /// Write a 32-bit WIB board register.
    Poke { addr: u32, value: u32 },
    /// Read a COLDATA-routed register. `chip_addr` is the COLDATA I2C
    /// address, `reg_page` selects the LArASIC (1..=4) or the COLDATA
    /// itself (0).
    CdPeek {
        femb: u8,
        coldata: u8,
        chip_addr: u8,
        reg_page: u8,
        reg_addr: u8,
    },
    /// Write a COLDATA-routed register.
    CdPoke {
        femb: u8,
        coldata: u8,
        chip_addr: u8,
        reg_page: u8,
        reg_addr: u8,
        data: u8,
    },
    /// Broadcast a fast command to all FEMBs.
    CdFastCmd { cmd: FastCommand },
    /// Apply a full board configuration in one shot.
    ConfigureWib(ConfigureWib),
    /// Set the regulator output voltages. Powers off any running FEMB.
    ConfigurePower(ConfigurePower),
    /// Run the FEMB power-on sequence.
    PowerWib(PowerWib),
    /// Run command text through the on-board script interpreter, or a
    /// named script stored on the WIB when `file` is set.
    Script { script: String, file: bool },
    /// Restart the WIB software.
    Reboot,
    /// Query the software build version.
    GetSwVersion,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Reply {
    /// Echo of a board register access.
    RegValue { addr: u32, value: u32 },
    /// Echo of a COLDATA register access, `data` as read back or written.
    CdRegValue {
        femb: u8,
        coldata: u8,
        chip_addr: u8,
        reg_page: u8,
        reg_addr: u8,
        data: u8,
    },
    /// Outcome of a bulk request, with optional log text from the firmware.
    Status { success: bool, extra: String },
    /// Software version string.
    Version { version: String },
    Empty,
}

impl Reply {
    /// Reply shape name, for mismatch diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Reply::RegValue { .. } => "RegValue",
            Reply::CdRegValue { .. } => "CDRegValue",
            Reply::Status { .. } => "Status",
            Reply::Version { .. } => "Version",
            Reply::Empty => "Empty",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(FastCommand::Reset, 1, "reset")]
    #[case(FastCommand::Act, 2, "act")]
    #[case(FastCommand::Sync, 4, "sync")]
    #[case(FastCommand::Edge, 8, "edge")]
    #[case(FastCommand::Idle, 16, "idle")]
    #[case(FastCommand::EdgeAct, 32, "edge_act")]
    fn fast_command_codes(#[case] cmd: FastCommand, #[case] code: u8, #[case] name: &str) {
        assert_eq!(cmd.code(), code);
        assert_eq!(cmd.name(), name);
    }

    #[test]
    fn reply_kind_names() {
        assert_eq!(Reply::Empty.kind(), "Empty");
        assert_eq!(
            Reply::Status {
                success: true,
                extra: String::new()
            }
            .kind(),
            "Status"
        );
    }
}
