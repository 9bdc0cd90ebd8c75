//! A software WIB.
//!
//! [`WibEmulator`] answers the whole control vocabulary from in-memory
//! register maps and records everything it was asked to do, so sequences
//! and sessions can be tested step by step without a board. Failure
//! injection covers the two interesting transport faults: a dead link
//! and a refusal partway through a sequence.

use std::collections::HashMap;

use wib_core::command::{
    ConfigurePower, ConfigureWib, FastCommand, PowerWib, Reply, Request,
    WIB_REG_FIRST, WIB_REG_LAST,
};
use wib_core::transport::{Transport, TransportError};

/// Version string the emulator reports for `GetSwVersion`.
pub const EMULATED_VERSION: &str = "wib-emulator 0.3.0";

#[derive(Default)]
pub struct WibEmulator {
    board_regs: HashMap<u32, u32>,
    cd_regs: HashMap<(u8, u8, u8, u8, u8), u8>,
    fast_commands: Vec<FastCommand>,
    scripts: Vec<(String, bool)>,
    requests: Vec<Request>,
    last_configure: Option<ConfigureWib>,
    last_power: Option<PowerWib>,
    last_rails: Option<ConfigurePower>,
    rebooted: bool,
    down: bool,
    cd_pokes_left: Option<usize>,
}

impl WibEmulator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops the link; every later send fails with [`TransportError::Closed`].
    pub fn break_down(&mut self) {
        self.down = true;
    }

    pub fn repair(&mut self) {
        self.down = false;
    }

    /// Accepts `n` more `CDPoke` requests, then refuses every following
    /// one. Other request kinds are unaffected.
    pub fn fail_after_cd_pokes(&mut self, n: usize) {
        self.cd_pokes_left = Some(n);
    }

    /// COLDATA-routed register content, if anything was written there.
    #[must_use]
    pub fn cd_reg(&self, femb: u8, coldata: u8, chip_addr: u8, page: u8, reg: u8) -> Option<u8> {
        self.cd_regs
            .get(&(femb, coldata, chip_addr, page, reg))
            .copied()
    }

    #[must_use]
    pub fn board_reg(&self, addr: u32) -> Option<u32> {
        self.board_regs.get(&addr).copied()
    }

    #[must_use]
    pub fn fast_commands(&self) -> &[FastCommand] {
        &self.fast_commands
    }

    /// Scripts received, each with its run-from-file flag.
    #[must_use]
    pub fn scripts(&self) -> &[(String, bool)] {
        &self.scripts
    }

    /// Every request that reached the emulator, in order.
    #[must_use]
    pub fn requests(&self) -> &[Request] {
        &self.requests
    }

    #[must_use]
    pub fn last_configure(&self) -> Option<&ConfigureWib> {
        self.last_configure.as_ref()
    }

    #[must_use]
    pub fn last_power(&self) -> Option<&PowerWib> {
        self.last_power.as_ref()
    }

    #[must_use]
    pub fn last_rails(&self) -> Option<&ConfigurePower> {
        self.last_rails.as_ref()
    }

    #[must_use]
    pub fn rebooted(&self) -> bool {
        self.rebooted
    }

    fn handle(&mut self, request: &Request) -> Result<Reply, TransportError> {
        match request {
            Request::Peek { addr } => {
                check_window(*addr)?;
                Ok(Reply::RegValue {
                    addr: *addr,
                    value: self.board_regs.get(addr).copied().unwrap_or(0),
                })
            }
            Request::Poke { addr, value } => {
                check_window(*addr)?;
                self.board_regs.insert(*addr, *value);
                Ok(Reply::RegValue {
                    addr: *addr,
                    value: *value,
                })
            }
            Request::CdPeek {
                femb,
                coldata,
                chip_addr,
                reg_page,
                reg_addr,
            } => Ok(Reply::CdRegValue {
                femb: *femb,
                coldata: *coldata,
                chip_addr: *chip_addr,
                reg_page: *reg_page,
                reg_addr: *reg_addr,
                data: self
                    .cd_reg(*femb, *coldata, *chip_addr, *reg_page, *reg_addr)
                    .unwrap_or(0),
            }),
            Request::CdPoke {
                femb,
                coldata,
                chip_addr,
                reg_page,
                reg_addr,
                data,
            } => {
                if let Some(left) = &mut self.cd_pokes_left {
                    if *left == 0 {
                        return Err(TransportError::Refused(format!(
                            "CDPoke femb {femb} chip {chip_addr} page {reg_page} reg {reg_addr:#04X}"
                        )));
                    }
                    *left -= 1;
                }
                self.cd_regs
                    .insert((*femb, *coldata, *chip_addr, *reg_page, *reg_addr), *data);
                Ok(Reply::CdRegValue {
                    femb: *femb,
                    coldata: *coldata,
                    chip_addr: *chip_addr,
                    reg_page: *reg_page,
                    reg_addr: *reg_addr,
                    data: *data,
                })
            }
            Request::CdFastCmd { cmd } => {
                self.fast_commands.push(*cmd);
                Ok(Reply::Empty)
            }
            Request::ConfigureWib(conf) => {
                self.last_configure = Some(conf.clone());
                Ok(Reply::Status {
                    success: true,
                    extra: String::new(),
                })
            }
            Request::ConfigurePower(rails) => {
                self.last_rails = Some(*rails);
                Ok(Reply::Status {
                    success: true,
                    extra: String::new(),
                })
            }
            Request::PowerWib(power) => {
                self.last_power = Some(*power);
                Ok(Reply::Status {
                    success: true,
                    extra: String::new(),
                })
            }
            Request::Script { script, file } => {
                self.scripts.push((script.clone(), *file));
                Ok(Reply::Status {
                    success: true,
                    extra: String::new(),
                })
            }
            Request::Reboot => {
                self.rebooted = true;
                Ok(Reply::Empty)
            }
            Request::GetSwVersion => Ok(Reply::Version {
                version: EMULATED_VERSION.to_string(),
            }),
        }
    }
}

fn check_window(addr: u32) -> Result<(), TransportError> {
    if (WIB_REG_FIRST..=WIB_REG_LAST).contains(&addr) {
        Ok(())
    } else {
        Err(TransportError::Refused(format!(
            "register {addr:#010X} outside the WIB address window"
        )))
    }
}

impl Transport for WibEmulator {
    fn send(&mut self, request: &Request) -> Result<Reply, TransportError> {
        if self.down {
            return Err(TransportError::Closed);
        }
        self.requests.push(request.clone());
        self.handle(request)
    }

    fn is_open(&self) -> bool {
        !self.down
    }

    fn close(&mut self) -> Result<(), TransportError> {
        self.down = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pokes_read_back() {
        let mut emu = WibEmulator::new();
        let reply = emu
            .send(&Request::Poke {
                addr: WIB_REG_FIRST,
                value: 0xDEAD,
            })
            .unwrap();
        assert_eq!(
            reply,
            Reply::RegValue {
                addr: WIB_REG_FIRST,
                value: 0xDEAD
            }
        );
        assert_eq!(
            emu.send(&Request::Peek { addr: WIB_REG_FIRST }).unwrap(),
            Reply::RegValue {
                addr: WIB_REG_FIRST,
                value: 0xDEAD
            }
        );
    }

    #[test]
    fn out_of_window_access_is_refused() {
        let mut emu = WibEmulator::new();
        assert!(matches!(
            emu.send(&Request::Peek { addr: 0x1000 }),
            Err(TransportError::Refused(_))
        ));
    }

    #[test]
    fn cd_pokes_land_in_the_register_map() {
        let mut emu = WibEmulator::new();
        emu.send(&Request::CdPoke {
            femb: 2,
            coldata: 1,
            chip_addr: 2,
            reg_page: 4,
            reg_addr: 135,
            data: 0x03,
        })
        .unwrap();
        assert_eq!(emu.cd_reg(2, 1, 2, 4, 135), Some(0x03));
        assert_eq!(emu.cd_reg(2, 0, 3, 4, 135), None);
    }

    #[test]
    fn injected_failure_counts_only_cd_pokes() {
        let mut emu = WibEmulator::new();
        emu.fail_after_cd_pokes(1);
        let poke = Request::CdPoke {
            femb: 0,
            coldata: 0,
            chip_addr: 3,
            reg_page: 1,
            reg_addr: 130,
            data: 0,
        };
        assert!(emu.send(&poke).is_ok());
        assert!(emu.send(&Request::GetSwVersion).is_ok());
        assert!(matches!(
            emu.send(&poke),
            Err(TransportError::Refused(_))
        ));
    }

    #[test]
    fn broken_link_refuses_everything() {
        let mut emu = WibEmulator::new();
        emu.break_down();
        assert!(!emu.is_open());
        assert_eq!(
            emu.send(&Request::GetSwVersion),
            Err(TransportError::Closed)
        );
        emu.repair();
        assert!(emu.send(&Request::GetSwVersion).is_ok());
    }
}
