//! Ordered command sequences for per-register chip configuration.
//!
//! Each builder returns a [`CommandSequence`] the session executes one
//! step at a time over the transport. Builders that write LArASIC
//! registers refuse to run while the pulser is enabled unless the caller
//! asks for the disable/restore wrap.

use std::fmt::Write as _;

use wib_core::address::{ChipAddress, COLDATA_PER_FEMB, FEMBS_PER_WIB, coldata_i2c_address};
use wib_core::command::FastCommand;

use crate::error::WibDriverError;
use crate::larasic::{
    COLDATA_CMD_REG, ChannelSettings, GLOBAL_REG_1, GLOBAL_REG_2, GlobalSettings, LATCH_CODE,
    PULSER_OFF_CODE, PULSER_ON_CODE, channel_register,
};

/// Scripts shipped on the WIB itself, runnable by name.
pub const ONBOARD_SCRIPTS: [&str; 6] = [
    "conf_pll_timing",
    "cdr_reset",
    "pll_sticky_clear",
    "ept_reset",
    "si5344_62p5mhz_config",
    "si5344_50mhz_config",
];

/// One transport-level action of a [`CommandSequence`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// An I2C register write to one chip behind a COLDATA.
    ChipWrite {
        femb: u8,
        coldata: u8,
        chip_addr: u8,
        page: u8,
        reg: u8,
        value: u8,
    },
    /// A board-level fast command to all FEMBs.
    FastCommand(FastCommand),
    /// Drive the pulser switches of every chip to the given state. The
    /// session expands this into the [`toggle_pulser`] sub-sequence so a
    /// mid-sequence failure leaves the pulser flag accounted for.
    SetPulser { on: bool },
    /// A pause, only meaningful inside a script rendering.
    Delay { seconds: f64 },
}

impl Step {
    /// What this step does, for failure reports.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Step::ChipWrite {
                femb,
                coldata,
                chip_addr,
                page,
                reg,
                value,
            } => format!(
                "write femb {femb} coldata {coldata} chip {chip_addr} page {page} reg {reg:#04X} value {value:#04X}"
            ),
            Step::FastCommand(cmd) => format!("fast command {}", cmd.name()),
            Step::SetPulser { on: true } => "enable pulser".to_string(),
            Step::SetPulser { on: false } => "disable pulser".to_string(),
            Step::Delay { seconds } => format!("delay {seconds} s"),
        }
    }
}

/// An ordered list of steps, consumed once by the session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandSequence {
    steps: Vec<Step>,
}

impl CommandSequence {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, step: Step) {
        self.steps.push(step);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Renders the sequence in the firmware's script micro-language.
    ///
    /// `cd-i2c` fields are decimal except the register and value, which
    /// the parser takes as hex. [`Step::SetPulser`] steps render as their
    /// expansion.
    #[must_use]
    pub fn to_script(&self) -> String {
        let mut script = String::new();
        for step in &self.steps {
            match step {
                Step::ChipWrite {
                    femb,
                    coldata,
                    chip_addr,
                    page,
                    reg,
                    value,
                } => {
                    let _ = writeln!(
                        script,
                        "cd-i2c {femb} {coldata} {chip_addr} {page} {reg:X} {value:X}"
                    );
                }
                Step::FastCommand(cmd) => {
                    let _ = writeln!(script, "fast {}", cmd.name());
                }
                Step::SetPulser { on } => {
                    script.push_str(&toggle_pulser(!on).to_script());
                }
                Step::Delay { seconds } => {
                    let _ = writeln!(script, "delay {seconds}");
                }
            }
        }
        script
    }
}

impl IntoIterator for CommandSequence {
    type Item = Step;
    type IntoIter = std::vec::IntoIter<Step>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.into_iter()
    }
}

/// Writes one channel's settings byte and latches it: two steps.
pub fn write_channel(
    addr: ChipAddress,
    channel: u8,
    settings: &ChannelSettings,
    pulser_on: bool,
    auto_toggle: bool,
) -> Result<CommandSequence, WibDriverError> {
    let mut seq = CommandSequence::new();
    push_channel_write(&mut seq, addr, channel, settings)?;
    push_latch(&mut seq, addr.femb(), addr.coldata());
    wrap_pulser(seq, pulser_on, auto_toggle)
}

/// Writes the chip-global register pair.
///
/// Each register is written twice to guard against single-event upsets,
/// to the same chip number behind both COLDATAs of the FEMB, then each
/// COLDATA gets a latch trigger. Ten steps.
pub fn write_global(
    addr: ChipAddress,
    settings: &GlobalSettings,
    pulser_on: bool,
    auto_toggle: bool,
) -> Result<CommandSequence, WibDriverError> {
    let mut seq = CommandSequence::new();
    push_global_writes(&mut seq, addr, settings);
    wrap_pulser(seq, pulser_on, auto_toggle)
}

/// Writes all 16 channel bytes of one chip, then the global pair as in
/// [`write_global`]. Twenty-six steps.
pub fn write_all_channels(
    addr: ChipAddress,
    channels: &[ChannelSettings; 16],
    global: &GlobalSettings,
    pulser_on: bool,
    auto_toggle: bool,
) -> Result<CommandSequence, WibDriverError> {
    let mut seq = CommandSequence::new();
    for (channel, settings) in channels.iter().enumerate() {
        push_channel_write(&mut seq, addr, channel as u8, settings)?;
    }
    push_global_writes(&mut seq, addr, global);
    wrap_pulser(seq, pulser_on, auto_toggle)
}

/// Drives the pulser command register of every COLDATA on the board to
/// the opposite of `currently_on`, then issues one Act fast command so
/// the chips take the new switch state. Nine steps.
///
/// Flips nothing itself; the caller owns the pulser-state flag.
#[must_use]
pub fn toggle_pulser(currently_on: bool) -> CommandSequence {
    let value = if currently_on {
        PULSER_OFF_CODE
    } else {
        PULSER_ON_CODE
    };
    let mut seq = CommandSequence::new();
    for femb in 0..FEMBS_PER_WIB as u8 {
        for coldata in 0..COLDATA_PER_FEMB as u8 {
            seq.push(Step::ChipWrite {
                femb,
                coldata,
                chip_addr: coldata_i2c_address(coldata),
                page: 0,
                reg: COLDATA_CMD_REG,
                value,
            });
        }
    }
    seq.push(Step::FastCommand(FastCommand::Act));
    seq
}

fn push_channel_write(
    seq: &mut CommandSequence,
    addr: ChipAddress,
    channel: u8,
    settings: &ChannelSettings,
) -> Result<(), WibDriverError> {
    seq.push(Step::ChipWrite {
        femb: addr.femb(),
        coldata: addr.coldata(),
        chip_addr: addr.coldata_i2c_address(),
        page: addr.chip(),
        reg: channel_register(channel)?,
        value: settings.encode(),
    });
    Ok(())
}

fn push_global_writes(seq: &mut CommandSequence, addr: ChipAddress, settings: &GlobalSettings) {
    let (reg1, reg2) = settings.encode();
    for coldata in 0..COLDATA_PER_FEMB as u8 {
        for _ in 0..2 {
            for (reg, value) in [(GLOBAL_REG_1, reg1), (GLOBAL_REG_2, reg2)] {
                seq.push(Step::ChipWrite {
                    femb: addr.femb(),
                    coldata,
                    chip_addr: coldata_i2c_address(coldata),
                    page: addr.chip(),
                    reg,
                    value,
                });
            }
        }
    }
    for coldata in 0..COLDATA_PER_FEMB as u8 {
        push_latch(seq, addr.femb(), coldata);
    }
}

fn push_latch(seq: &mut CommandSequence, femb: u8, coldata: u8) {
    seq.push(Step::ChipWrite {
        femb,
        coldata,
        chip_addr: coldata_i2c_address(coldata),
        page: 0,
        reg: COLDATA_CMD_REG,
        value: LATCH_CODE,
    });
}

fn wrap_pulser(
    seq: CommandSequence,
    pulser_on: bool,
    auto_toggle: bool,
) -> Result<CommandSequence, WibDriverError> {
    if !pulser_on {
        return Ok(seq);
    }
    if !auto_toggle {
        return Err(WibDriverError::PulserEnabled);
    }
    let mut wrapped = CommandSequence::new();
    wrapped.push(Step::SetPulser { on: false });
    wrapped.steps.extend(seq.steps);
    wrapped.push(Step::SetPulser { on: true });
    Ok(wrapped)
}
