//! FEMB power sequencing and regulator setpoints.

use serde::{Deserialize, Serialize};

use wib_core::command::{ConfigurePower, PowerStage, PowerWib, Request};

use crate::error::WibDriverError;

/// Regulators may not be driven above this level.
pub const MAX_RAIL_VOLTAGE: f64 = 6.0;

/// One power-on user action: which FEMBs to bring up, with which COLDADC
/// configuration, and how far to run the staged sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerSequence {
    pub femb_on: [bool; 4],
    pub cold: bool,
    pub stage: PowerStage,
}

impl PowerSequence {
    /// Full sequence for one FEMB, warm configuration.
    #[must_use]
    pub fn single_femb(femb: u8, cold: bool) -> Self {
        let mut femb_on = [false; 4];
        femb_on[femb as usize % femb_on.len()] = true;
        Self {
            femb_on,
            cold,
            stage: PowerStage::Full,
        }
    }

    #[must_use]
    pub fn to_request(&self) -> Request {
        Request::PowerWib(PowerWib {
            femb_on: self.femb_on,
            cold: self.cold,
            stage: self.stage,
        })
    }
}

/// Regulator output setpoints, in volts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerRails {
    pub dc2dc_o1: f64,
    pub dc2dc_o2: f64,
    pub dc2dc_o3: f64,
    pub dc2dc_o4: f64,
    pub ldo_a0: f64,
    pub ldo_a1: f64,
}

impl Default for PowerRails {
    /// The nominal bring-up levels: 4 V on the DC/DC converters, 2.5 V on
    /// the LDOs.
    fn default() -> Self {
        Self {
            dc2dc_o1: 4.0,
            dc2dc_o2: 4.0,
            dc2dc_o3: 4.0,
            dc2dc_o4: 4.0,
            ldo_a0: 2.5,
            ldo_a1: 2.5,
        }
    }
}

impl PowerRails {
    fn rails(&self) -> [f64; 6] {
        [
            self.dc2dc_o1,
            self.dc2dc_o2,
            self.dc2dc_o3,
            self.dc2dc_o4,
            self.ldo_a0,
            self.ldo_a1,
        ]
    }

    /// Checks every rail against the 0..=6 V regulator limits.
    pub fn validate(&self) -> Result<(), WibDriverError> {
        for v in self.rails() {
            if !(0.0..=MAX_RAIL_VOLTAGE).contains(&v) {
                return Err(WibDriverError::VoltageOutOfRange(v));
            }
        }
        Ok(())
    }

    /// Builds the regulator request. Applying it powers off any running
    /// FEMB, so the session reports it as a power-cycle.
    pub fn to_request(&self) -> Result<Request, WibDriverError> {
        self.validate()?;
        Ok(Request::ConfigurePower(ConfigurePower {
            dc2dc_o1: self.dc2dc_o1,
            dc2dc_o2: self.dc2dc_o2,
            dc2dc_o3: self.dc2dc_o3,
            dc2dc_o4: self.dc2dc_o4,
            ldo_a0: self.ldo_a0,
            ldo_a1: self.ldo_a1,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn single_femb_selects_one_slot() {
        let seq = PowerSequence::single_femb(2, true);
        assert_eq!(seq.femb_on, [false, false, true, false]);
        assert_eq!(seq.stage, PowerStage::Full);
        let Request::PowerWib(req) = seq.to_request() else {
            panic!("wrong request kind");
        };
        assert!(req.cold);
    }

    #[test]
    fn default_rails_are_nominal() {
        let rails = PowerRails::default();
        assert_eq!(rails.rails(), [4.0, 4.0, 4.0, 4.0, 2.5, 2.5]);
        assert!(rails.to_request().is_ok());
    }

    #[rstest]
    #[case(6.5)]
    #[case(-0.1)]
    fn out_of_range_rails_are_refused(#[case] bad: f64) {
        let rails = PowerRails {
            ldo_a1: bad,
            ..Default::default()
        };
        assert_eq!(
            rails.to_request(),
            Err(WibDriverError::VoltageOutOfRange(bad))
        );
    }
}
