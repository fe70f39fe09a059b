#![doc = r#"
famicore - NES emulation core.

This crate models the NES hardware: a 6502 CPU and a 2C02-style PPU joined
by two address buses, with work RAM, video RAM, an NROM cartridge loaded
from iNES images, and a shift-register controller. A master clock advances
the PPU three dots for every CPU cycle.

The host (windowing, audio, file dialogs) stays outside: the core hands
pixels to a caller-supplied sink as they are produced, accepts button
presses, and exposes a `tick`/`tick_frame` pump plus debugger hooks.

Modules:
- bus: address decoding across registered devices, per-bus identity
- ram: 2 KiB work RAM, mirrored through $1FFF
- vram: nametables with cartridge-controlled mirroring and palette RAM
- cartridge: iNES parsing and the mapper behind it
- mapper: Mapper trait and NROM (mapper 0)
- controller: serial pad read at $4016
- cpu: register file, addressing modes, instruction set, disassembler
- ppu: scanline/dot state machine, background fetch pipeline, registers
- nes: console facade wiring everything to the master clock
"#]

pub mod bus;
pub mod cartridge;
pub mod controller;
pub mod cpu;
pub mod mapper;
pub mod nes;
pub mod ppu;
pub mod ram;
pub mod vram;

pub use bus::{Bus, BusId, Device};
pub use cartridge::{Cartridge, Mirroring, RomError};
pub use controller::{Button, Controller};
pub use cpu::disasm::Disassembly;
pub use cpu::{Cpu, CpuDebugInfo};
pub use nes::Nes;
pub use ppu::palette::Rgb;
pub use ppu::Ppu;

// Shared iNES image builders, compiled for tests only.
#[cfg(test)]
pub mod test_utils;
