//! One configuration session against one WIB.
//!
//! The session owns the transport, the pulser-state flag, and the
//! in-flight guard; every register write on the board goes through
//! [`Session::execute`] so the pulser precondition and the
//! abort-on-first-failure rule hold everywhere.

use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use wib_core::address::ChipAddress;
use wib_core::command::{Reply, Request, WIB_REG_FIRST, WIB_REG_LAST};
use wib_core::transport::{Transport, TransportError};
use wib_driver::config::{ApplyOptions, BoardConfig};
use wib_driver::larasic::{ChannelSettings, GlobalSettings};
use wib_driver::power::{PowerRails, PowerSequence};
use wib_driver::sequence::{self, CommandSequence, ONBOARD_SCRIPTS, Step};

use crate::error::WibError;

/// A blocking session on one WIB.
///
/// Operations are serialized: a second operation started while one is in
/// flight fails with [`WibError::Busy`] instead of interleaving register
/// writes. There is no rollback; a failed sequence reports how far it
/// got and the operator re-triggers the whole logical operation.
pub struct Session<T: Transport> {
    transport: T,
    pulser_on: bool,
    busy: bool,
}

impl<T: Transport> Session<T> {
    /// Opens a session assuming the pulser is off, the power-on state of
    /// the chips.
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            pulser_on: false,
            busy: false,
        }
    }

    /// Last confirmed pulser state.
    #[must_use]
    pub fn pulser_on(&self) -> bool {
        self.pulser_on
    }

    /// Shared view of the transport.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Hands the transport back, ending the session.
    #[must_use]
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Writes one channel's settings and latches them.
    ///
    /// With `auto_toggle` set, an enabled pulser is switched off for the
    /// write and restored afterwards; without it the call is refused
    /// while the pulser is on.
    pub fn write_channel(
        &mut self,
        addr: ChipAddress,
        channel: u8,
        settings: &ChannelSettings,
        auto_toggle: bool,
    ) -> Result<(), WibError> {
        let seq = sequence::write_channel(addr, channel, settings, self.pulser_on, auto_toggle)?;
        self.execute(seq)
    }

    /// Writes one chip's global register pair to both COLDATAs of its
    /// FEMB. Pulser handling as in [`write_channel`](Self::write_channel).
    pub fn write_global(
        &mut self,
        addr: ChipAddress,
        settings: &GlobalSettings,
        auto_toggle: bool,
    ) -> Result<(), WibError> {
        let seq = sequence::write_global(addr, settings, self.pulser_on, auto_toggle)?;
        self.execute(seq)
    }

    /// Writes all 16 channels of one chip followed by its global pair.
    pub fn write_all_channels(
        &mut self,
        addr: ChipAddress,
        channels: &[ChannelSettings; 16],
        global: &GlobalSettings,
        auto_toggle: bool,
    ) -> Result<(), WibError> {
        let seq =
            sequence::write_all_channels(addr, channels, global, self.pulser_on, auto_toggle)?;
        self.execute(seq)
    }

    /// Drives every chip's pulser switches to `on`. No-op if the session
    /// already confirmed that state.
    pub fn set_pulser(&mut self, on: bool) -> Result<(), WibError> {
        if self.pulser_on == on {
            debug!(on, "pulser already in requested state");
            return Ok(());
        }
        let mut seq = CommandSequence::new();
        seq.push(Step::SetPulser { on });
        self.execute(seq)
    }

    /// Applies a full board configuration in one bulk request.
    ///
    /// Atomic from this side: the firmware either reports success or the
    /// whole apply is considered not applied. On success the session's
    /// pulser flag tracks the configuration's pulser field.
    pub fn apply_configuration(
        &mut self,
        config: &BoardConfig,
        options: &ApplyOptions,
    ) -> Result<(), WibError> {
        let request = config.to_request(options)?;
        self.guarded(|session| {
            session.send_status(&request)?;
            session.pulser_on = config.pulser;
            info!(pulser = config.pulser, cold = config.cold, "board configuration applied");
            Ok(())
        })
    }

    /// Sets the regulator outputs. Powers off any running FEMB, so the
    /// pulser flag resets too.
    pub fn configure_power(&mut self, rails: &PowerRails) -> Result<(), WibError> {
        let request = rails.to_request()?;
        self.guarded(|session| {
            session.send_status(&request)?;
            session.pulser_on = false;
            warn!("regulators reconfigured, any powered FEMB is now off");
            Ok(())
        })
    }

    /// Runs the staged FEMB power-on sequence.
    pub fn power_on(&mut self, power: &PowerSequence) -> Result<(), WibError> {
        let request = power.to_request();
        self.guarded(|session| {
            session.send_status(&request)?;
            info!(stage = %power.stage, "power sequence accepted");
            Ok(())
        })
    }

    /// Feeds raw command text to the on-board script interpreter.
    pub fn run_script(&mut self, script: &str) -> Result<(), WibError> {
        self.guarded(|session| {
            session.send_status(&Request::Script {
                script: script.to_string(),
                file: false,
            })
        })
    }

    /// Runs one of the scripts stored on the WIB by name.
    pub fn run_onboard_script(&mut self, name: &str) -> Result<(), WibError> {
        if !ONBOARD_SCRIPTS.contains(&name) {
            return Err(WibError::UnknownScript(name.to_string()));
        }
        self.guarded(|session| {
            session.send_status(&Request::Script {
                script: name.to_string(),
                file: true,
            })
        })
    }

    /// Reads a 32-bit board register. The address is checked against the
    /// WIB's mapped window before anything is sent.
    pub fn peek(&mut self, addr: u32) -> Result<u32, WibError> {
        check_window(addr)?;
        match self.transport.send(&Request::Peek { addr })? {
            Reply::RegValue { value, .. } => Ok(value),
            other => Err(unexpected("RegValue", &other)),
        }
    }

    /// Writes a 32-bit board register and returns the echoed value.
    pub fn poke(&mut self, addr: u32, value: u32) -> Result<u32, WibError> {
        check_window(addr)?;
        match self.transport.send(&Request::Poke { addr, value })? {
            Reply::RegValue { value, .. } => Ok(value),
            other => Err(unexpected("RegValue", &other)),
        }
    }

    /// Reads one COLDATA-routed register. `page` 0 addresses the COLDATA
    /// itself, 1..=4 the LArASICs behind it.
    pub fn cd_peek(&mut self, addr: ChipAddress, page: u8, reg: u8) -> Result<u8, WibError> {
        let request = Request::CdPeek {
            femb: addr.femb(),
            coldata: addr.coldata(),
            chip_addr: addr.coldata_i2c_address(),
            reg_page: page,
            reg_addr: reg,
        };
        match self.transport.send(&request)? {
            Reply::CdRegValue { data, .. } => Ok(data),
            other => Err(unexpected("CDRegValue", &other)),
        }
    }

    /// Restarts the WIB software. The link drops; reconnecting is the
    /// transport owner's business.
    pub fn reboot(&mut self) -> Result<(), WibError> {
        self.transport.send(&Request::Reboot)?;
        Ok(())
    }

    /// Software build version reported by the WIB.
    pub fn sw_version(&mut self) -> Result<String, WibError> {
        match self.transport.send(&Request::GetSwVersion)? {
            Reply::Version { version } => Ok(version),
            other => Err(unexpected("Version", &other)),
        }
    }

    /// Runs a sequence step by step, aborting on the first failure.
    ///
    /// The failing step's description and position are reported; earlier
    /// steps stay applied. [`Step::SetPulser`] expands here so the pulser
    /// flag only moves once its toggle sub-sequence completed.
    pub fn execute(&mut self, seq: CommandSequence) -> Result<(), WibError> {
        self.guarded(|session| {
            let total = seq.len();
            for (index, step) in seq.into_iter().enumerate() {
                debug!(step = index + 1, total, what = %step.describe(), "sequence step");
                session.run_step(&step).map_err(|source| {
                    WibError::SequenceAborted {
                        step: index + 1,
                        total,
                        what: step.describe(),
                        source,
                    }
                })?;
            }
            Ok(())
        })
    }

    fn run_step(&mut self, step: &Step) -> Result<(), TransportError> {
        match *step {
            Step::ChipWrite {
                femb,
                coldata,
                chip_addr,
                page,
                reg,
                value,
            } => {
                let reply = self.transport.send(&Request::CdPoke {
                    femb,
                    coldata,
                    chip_addr,
                    reg_page: page,
                    reg_addr: reg,
                    data: value,
                })?;
                match reply {
                    Reply::CdRegValue { .. } => Ok(()),
                    other => Err(TransportError::UnexpectedReply {
                        expected: "CDRegValue",
                        got: other.kind(),
                    }),
                }
            }
            Step::FastCommand(cmd) => {
                match self.transport.send(&Request::CdFastCmd { cmd })? {
                    Reply::Empty => Ok(()),
                    other => Err(TransportError::UnexpectedReply {
                        expected: "Empty",
                        got: other.kind(),
                    }),
                }
            }
            Step::SetPulser { on } => {
                for sub in sequence::toggle_pulser(!on) {
                    self.run_step(&sub)?;
                }
                self.pulser_on = on;
                debug!(on, "pulser state confirmed");
                Ok(())
            }
            Step::Delay { seconds } => {
                thread::sleep(Duration::from_secs_f64(seconds));
                Ok(())
            }
        }
    }

    fn guarded<R>(
        &mut self,
        op: impl FnOnce(&mut Self) -> Result<R, WibError>,
    ) -> Result<R, WibError> {
        if self.busy {
            return Err(WibError::Busy);
        }
        self.busy = true;
        let result = op(self);
        self.busy = false;
        result
    }

    fn send_status(&mut self, request: &Request) -> Result<(), WibError> {
        match self.transport.send(request)? {
            Reply::Status { success: true, .. } => Ok(()),
            Reply::Status {
                success: false,
                extra,
            } => Err(WibError::Rejected { extra }),
            other => Err(unexpected("Status", &other)),
        }
    }
}

fn check_window(addr: u32) -> Result<(), WibError> {
    if (WIB_REG_FIRST..=WIB_REG_LAST).contains(&addr) {
        Ok(())
    } else {
        Err(WibError::AddressOutOfWindow(addr))
    }
}

fn unexpected(expected: &'static str, got: &Reply) -> WibError {
    WibError::Transport(TransportError::UnexpectedReply {
        expected,
        got: got.kind(),
    })
}
