//! Shared builders for minimal iNES (v1) images.
//!
//! These de-duplicate ROM construction across the cartridge, CPU, PPU
//! and console tests. They support just what the suite needs: NROM,
//! simple flags, an optional trainer, and vector placement.

/// Build an iNES image with the given bank counts and flag bytes. PRG
/// bytes are zero-filled; CHR bytes too (pass `chr_8k = 0` for a CHR RAM
/// board).
pub fn build_ines(
    prg_16k: u8,
    chr_8k: u8,
    flags6: u8,
    flags7: u8,
    trainer: Option<&[u8; 512]>,
) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(
        16 + trainer.map_or(0, |t| t.len())
            + prg_16k as usize * 0x4000
            + chr_8k as usize * 0x2000,
    );

    bytes.extend_from_slice(b"NES\x1A");
    bytes.push(prg_16k);
    bytes.push(chr_8k);
    bytes.push(flags6);
    bytes.push(flags7);
    bytes.extend_from_slice(&[0u8; 8]);

    if let Some(t) = trainer {
        bytes.extend_from_slice(t);
    }

    bytes.resize(bytes.len() + prg_16k as usize * 0x4000, 0);
    bytes.resize(bytes.len() + chr_8k as usize * 0x2000, 0);
    bytes
}

/// Build a one-bank NROM image with `program` at $8000 and the
/// interrupt vectors set. `vectors` is `(reset, nmi, irq)`, defaulting
/// to $8000 for all three.
pub fn build_nrom_with_prg(program: &[u8], vectors: Option<(u16, u16, u16)>) -> Vec<u8> {
    assert!(
        program.len() <= 0x4000,
        "program must fit a 16 KiB PRG bank"
    );

    let mut rom = build_ines(1, 1, 0, 0, None);
    let prg_start = 16;
    rom[prg_start..prg_start + program.len()].copy_from_slice(program);

    // Vectors live at the top of the single bank: NMI, RESET, IRQ.
    let (reset, nmi, irq) = vectors.unwrap_or((0x8000, 0x8000, 0x8000));
    let base = prg_start + 0x3FFA;
    rom[base] = (nmi & 0xFF) as u8;
    rom[base + 1] = (nmi >> 8) as u8;
    rom[base + 2] = (reset & 0xFF) as u8;
    rom[base + 3] = (reset >> 8) as u8;
    rom[base + 4] = (irq & 0xFF) as u8;
    rom[base + 5] = (irq >> 8) as u8;

    rom
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_layout_is_correct() {
        let rom = build_ines(2, 1, 0x01, 0x40, None);
        assert_eq!(&rom[0..4], b"NES\x1A");
        assert_eq!(rom[4], 2);
        assert_eq!(rom[5], 1);
        assert_eq!(rom[6], 0x01);
        assert_eq!(rom[7], 0x40);
        assert_eq!(rom.len(), 16 + 2 * 0x4000 + 0x2000);
    }

    #[test]
    fn trainer_sits_between_header_and_prg() {
        let trainer = [0xEE; 512];
        let rom = build_ines(1, 0, 0x04, 0, Some(&trainer));
        assert_eq!(rom[16], 0xEE);
        assert_eq!(rom.len(), 16 + 512 + 0x4000);
    }

    #[test]
    fn vectors_land_at_the_top_of_the_bank() {
        let rom = build_nrom_with_prg(&[0xEA], Some((0x8123, 0x8456, 0x89AB)));
        let prg = &rom[16..16 + 0x4000];
        assert_eq!(prg[0x3FFA], 0x56); // NMI low
        assert_eq!(prg[0x3FFB], 0x84);
        assert_eq!(prg[0x3FFC], 0x23); // RESET low
        assert_eq!(prg[0x3FFD], 0x81);
        assert_eq!(prg[0x3FFE], 0xAB); // IRQ low
        assert_eq!(prg[0x3FFF], 0x89);
    }
}
