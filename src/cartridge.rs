/*!
Cartridge: iNES (v1) parsing and the device face of the mapper.

The cartridge sits first on both buses so its mapper may shadow any range
it wants; with no image loaded it declines everything. Loading replaces
the mapper wholesale, so a reload swaps the whole address translation in
one step.

iNES layout: 16-byte header ("NES\x1A", PRG bank count in 16 KiB units,
CHR bank count in 8 KiB units, two flag bytes, padding), an optional
512-byte trainer which is skipped, then PRG ROM followed by CHR ROM.
*/

use std::path::Path;

use thiserror::Error;

use crate::bus::{BusId, Device};
use crate::mapper::{Mapper, Nrom};

const HEADER_LEN: usize = 16;
const TRAINER_LEN: usize = 512;
const PRG_BANK_LEN: usize = 0x4000;
const CHR_BANK_LEN: usize = 0x2000;

/// Nametable arrangement requested by the cartridge.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mirroring {
    Horizontal,
    Vertical,
}

/// Failures surfaced while loading a ROM image.
#[derive(Error, Debug)]
pub enum RomError {
    #[error("not an iNES image (bad magic)")]
    BadMagic,
    #[error("image truncated: {0}")]
    Truncated(&'static str),
    #[error("mapper {0} is not supported")]
    UnsupportedMapper(u8),
    #[error("could not read ROM file")]
    Io(#[from] std::io::Error),
}

pub struct Cartridge {
    mapper: Option<Box<dyn Mapper>>,
    mirroring: Mirroring,
}

impl Cartridge {
    /// An empty slot; every bus access is declined until `load` succeeds.
    pub fn new() -> Self {
        Self {
            mapper: None,
            mirroring: Mirroring::Horizontal,
        }
    }

    /// Parse an iNES byte stream and install the mapper it names.
    ///
    /// The previous mapper stays in place if parsing fails.
    pub fn load(&mut self, data: &[u8]) -> Result<(), RomError> {
        if data.len() < HEADER_LEN {
            return Err(RomError::Truncated("header"));
        }
        if &data[0..4] != b"NES\x1A" {
            return Err(RomError::BadMagic);
        }

        let prg_banks = data[4];
        let chr_banks = data[5];
        let flags6 = data[6];
        let flags7 = data[7];

        // Mapper number is split across the two flag bytes, low nibble in
        // flags 6 and high nibble in flags 7.
        let mapper_number = (flags7 & 0xF0) | (flags6 >> 4);

        let mirroring = if flags6 & 0x01 != 0 {
            Mirroring::Vertical
        } else {
            Mirroring::Horizontal
        };

        let mut offset = HEADER_LEN;
        if flags6 & 0x04 != 0 {
            // Trainer data is of no use to us; skip it.
            if data.len() < offset + TRAINER_LEN {
                return Err(RomError::Truncated("trainer"));
            }
            offset += TRAINER_LEN;
        }

        let prg_len = prg_banks as usize * PRG_BANK_LEN;
        if data.len() < offset + prg_len {
            return Err(RomError::Truncated("PRG ROM"));
        }
        let prg = data[offset..offset + prg_len].to_vec();
        offset += prg_len;

        let chr_len = chr_banks as usize * CHR_BANK_LEN;
        if data.len() < offset + chr_len {
            return Err(RomError::Truncated("CHR ROM"));
        }
        let chr = data[offset..offset + chr_len].to_vec();

        let mapper: Box<dyn Mapper> = match mapper_number {
            0 => Box::new(Nrom::new(prg_banks, chr_banks, prg, chr)),
            other => return Err(RomError::UnsupportedMapper(other)),
        };

        log::debug!(
            "cartridge: mapper {mapper_number}, {prg_banks}x16K PRG, {chr_banks}x8K CHR, {mirroring:?} mirroring"
        );

        self.mapper = Some(mapper);
        self.mirroring = mirroring;
        Ok(())
    }

    /// Convenience wrapper: read an iNES file from disk and `load` it.
    pub fn load_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), RomError> {
        let bytes = std::fs::read(path)?;
        self.load(&bytes)
    }

    pub fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    pub fn is_loaded(&self) -> bool {
        self.mapper.is_some()
    }
}

impl Default for Cartridge {
    fn default() -> Self {
        Self::new()
    }
}

impl Device for Cartridge {
    fn read(&mut self, bus: BusId, addr: u16, _debug: bool) -> Option<u8> {
        self.mapper.as_mut()?.read(bus, addr)
    }

    fn write(&mut self, bus: BusId, addr: u16, data: u8, _debug: bool) -> bool {
        match self.mapper.as_mut() {
            Some(mapper) => mapper.write(bus, addr, data),
            None => false,
        }
    }
}
