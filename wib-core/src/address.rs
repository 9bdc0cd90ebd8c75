//! Addressing of the front-end hierarchy: a WIB carries up to four FEMBs,
//! each FEMB two COLDATA chips, each COLDATA four LArASIC chips of 16
//! channels.

/// Number of FEMB slots on a WIB.
pub const FEMBS_PER_WIB: usize = 4;
/// Number of COLDATA chips (chip-pairs) per FEMB.
pub const COLDATA_PER_FEMB: usize = 2;
/// Number of LArASIC chips behind one COLDATA.
pub const CHIPS_PER_COLDATA: usize = 4;
/// Number of LArASIC chips on one FEMB.
pub const CHIPS_PER_FEMB: usize = COLDATA_PER_FEMB * CHIPS_PER_COLDATA;
/// Number of analog channels per LArASIC.
pub const CHANNELS_PER_CHIP: usize = 16;

/// I2C address of a COLDATA, resolved from its index on the FEMB.
///
/// The board wiring puts COLDATA 0 at chip address 3 and COLDATA 1 at chip
/// address 2. This mapping is fixed; earlier tool revisions that assumed an
/// identity mapping are not supported.
#[must_use]
pub const fn coldata_i2c_address(coldata: u8) -> u8 {
    3 - (coldata % 2)
}

/// Location of one LArASIC chip.
///
/// `chip` is the 1-based chip number used in COLDATA register pages; page 0
/// addresses the COLDATA itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChipAddress {
    femb: u8,
    coldata: u8,
    chip: u8,
}

impl ChipAddress {
    /// Address of chip `chip_in_pair` (0..=3) behind COLDATA `coldata`
    /// (0..=1) on FEMB `femb` (0..=3).
    #[must_use]
    pub const fn new(femb: u8, coldata: u8, chip_in_pair: u8) -> Self {
        Self {
            femb: femb % FEMBS_PER_WIB as u8,
            coldata: coldata % COLDATA_PER_FEMB as u8,
            chip: (chip_in_pair % CHIPS_PER_COLDATA as u8) + 1,
        }
    }

    /// Address of ASIC `asic` (0..=7) on FEMB `femb`, the flat numbering
    /// used by the per-chip control panels.
    #[must_use]
    pub const fn from_asic(femb: u8, asic: u8) -> Self {
        let asic = asic % CHIPS_PER_FEMB as u8;
        Self::new(femb, asic / CHIPS_PER_COLDATA as u8, asic)
    }

    /// FEMB slot, 0..=3.
    #[must_use]
    pub const fn femb(&self) -> u8 {
        self.femb
    }

    /// COLDATA index on the FEMB, 0..=1.
    #[must_use]
    pub const fn coldata(&self) -> u8 {
        self.coldata
    }

    /// 1-based chip number within the COLDATA, used as the register page.
    #[must_use]
    pub const fn chip(&self) -> u8 {
        self.chip
    }

    /// I2C address of the COLDATA this chip sits behind.
    #[must_use]
    pub const fn coldata_i2c_address(&self) -> u8 {
        coldata_i2c_address(self.coldata)
    }
}
