//! Persisted board configuration and the bulk-apply request builder.
//!
//! The file format stores UI ordinals, not hardware codes, nested per
//! FEMB. Translation to the codes the firmware's bulk path expects
//! happens in [`BoardConfig::to_request`]; the bulk tables are specified
//! independently of the per-channel register tables and are not the same
//! permutations.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use wib_core::command::{ColdAdcOverride, ConfigureFemb, ConfigureWib, Request};

use crate::error::WibDriverError;
use crate::settings::{Gain, Leakage, PeakingTime, PulserDac};

/// Bulk-path gain ordinal→code table. Independent of [`Gain::hw_code`].
const BULK_GAIN_CODES: [u8; 4] = [2, 1, 3, 0];
/// Bulk-path peaking-time ordinal→code table. Independent of
/// [`PeakingTime::hw_code`].
const BULK_PEAK_CODES: [u8; 4] = [1, 0, 3, 2];

#[derive(Error, Debug)]
pub enum ConfigFileError {
    #[error("config file i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("config file does not parse: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("config file holds an illegal value: {0}")]
    Invalid(#[from] WibDriverError),
}

/// Per-FEMB block of the persisted configuration. All multi-valued fields
/// are UI ordinals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FembConfig {
    pub test_cap: bool,
    pub gain: u8,
    pub peak_time: u8,
    pub baseline: u8,
    pub pulse_dac: u8,
    /// Leakage base ordinal, 0 or 1; [`leak_10x`](Self::leak_10x) selects
    /// the upper half of the four-entry UI list.
    pub leak: u8,
    pub leak_10x: bool,
    pub ac_couple: bool,
    pub buffer: u8,
    pub strobe_skip: u32,
    pub strobe_delay: u32,
    pub strobe_length: u32,
}

impl Default for FembConfig {
    fn default() -> Self {
        Self {
            test_cap: true,
            gain: 0,
            peak_time: 0,
            baseline: 1,
            pulse_dac: 0,
            leak: 0,
            leak_10x: false,
            ac_couple: true,
            buffer: 0,
            strobe_skip: 255,
            strobe_delay: 255,
            strobe_length: 255,
        }
    }
}

impl FembConfig {
    /// Leakage selection as the four-entry UI ordinal.
    #[must_use]
    pub fn leakage_ordinal(&self) -> u8 {
        self.leak % 2 + if self.leak_10x { 2 } else { 0 }
    }

    /// Stores a four-entry UI ordinal as its `(leak, leak_10x)` split.
    pub fn set_leakage_ordinal(&mut self, ordinal: u8) -> Result<(), WibDriverError> {
        let leakage = Leakage::from_ordinal(ordinal)?;
        self.leak = leakage.leak_bit();
        self.leak_10x = leakage.times_ten();
        Ok(())
    }

    fn validate(&self) -> Result<(), WibDriverError> {
        Gain::from_ordinal(self.gain)?;
        PeakingTime::from_ordinal(self.peak_time)?;
        Leakage::from_ordinal(self.leakage_ordinal())?;
        if self.baseline > 1 {
            return Err(WibDriverError::OrdinalOutOfRange {
                setting: "baseline",
                ordinal: self.baseline,
                max: 1,
            });
        }
        if self.buffer > 1 {
            return Err(WibDriverError::OrdinalOutOfRange {
                setting: "differential buffer",
                ordinal: self.buffer,
                max: 1,
            });
        }
        PulserDac::new(self.pulse_dac)?;
        Ok(())
    }

    fn to_request(&self, enabled: bool) -> ConfigureFemb {
        ConfigureFemb {
            enabled,
            test_cap: self.test_cap,
            gain: BULK_GAIN_CODES[self.gain as usize],
            peak_time: BULK_PEAK_CODES[self.peak_time as usize],
            baseline: self.baseline,
            pulse_dac: self.pulse_dac,
            leak: self.leak % 2 == 1,
            leak_10x: self.leak_10x,
            ac_couple: self.ac_couple,
            buffer: 2 * self.buffer,
            strobe_skip: self.strobe_skip,
            strobe_delay: self.strobe_delay,
            strobe_length: self.strobe_length,
        }
    }
}

/// Extra apply-time options that are not persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ApplyOptions {
    pub adc_test_pattern: bool,
    pub frame_dd: bool,
    pub adc_conf: Option<ColdAdcOverride>,
}

/// The whole persisted board state: four FEMB blocks plus board flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    pub cold: bool,
    pub pulser: bool,
    pub enabled_fembs: [bool; 4],
    pub femb_configs: [FembConfig; 4],
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            cold: false,
            pulser: false,
            enabled_fembs: [true, false, false, false],
            femb_configs: Default::default(),
        }
    }
}

impl BoardConfig {
    /// Reads a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigFileError> {
        let config: Self = serde_json::from_str(&fs::read_to_string(path)?)?;
        for femb in &config.femb_configs {
            femb.validate()?;
        }
        Ok(config)
    }

    /// Reads a configuration, falling back to the built-in defaults if
    /// the file is missing or malformed. The fallback is reported, never
    /// silent.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "config file unusable, using defaults");
                Self::default()
            }
        }
    }

    /// Writes the configuration as JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigFileError> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Builds the one-shot bulk request. Pure transform, no I/O; fails
    /// loudly on any out-of-range ordinal instead of clamping.
    pub fn to_request(&self, options: &ApplyOptions) -> Result<Request, WibDriverError> {
        for femb in &self.femb_configs {
            femb.validate()?;
        }
        let fembs =
            std::array::from_fn(|i| self.femb_configs[i].to_request(self.enabled_fembs[i]));
        Ok(Request::ConfigureWib(ConfigureWib {
            fembs,
            cold: self.cold,
            pulser: self.pulser,
            adc_test_pattern: options.adc_test_pattern,
            frame_dd: options.frame_dd,
            adc_conf: options.adc_conf,
        }))
    }
}
