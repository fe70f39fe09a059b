/*!
The console: owns the two buses, wires every device onto them, and runs
the master clock.

Wiring mirrors the physical machine. CPU bus: cartridge first (its mapper
may shadow any range), then RAM, the PPU's register window, and the
controller. PPU bus: cartridge first (CHR), then VRAM. The master clock
advances the PPU one dot per tick and the CPU once every third tick; the
NMI line the PPU raises at the start of vblank is latched here and
scheduled into the CPU within the same tick, so the CPU sees it on its
very next cycle.
*/

use std::cell::{Ref, RefCell};
use std::path::Path;
use std::rc::Rc;

use crate::bus::{Bus, BusId};
use crate::cartridge::{Cartridge, RomError};
use crate::controller::{Button, Controller};
use crate::cpu::disasm::{self, Disassembly};
use crate::cpu::{Cpu, CpuDebugInfo};
use crate::ppu::palette::Rgb;
use crate::ppu::Ppu;
use crate::ram::Ram;
use crate::vram::VRam;

pub struct Nes {
    cpu_bus: Rc<Bus>,
    ppu_bus: Rc<Bus>,
    cpu: Cpu,
    ppu: Rc<RefCell<Ppu>>,
    cartridge: Rc<RefCell<Cartridge>>,
    controller: Rc<RefCell<Controller>>,
    master_ticks: u64,
}

impl Nes {
    /// Build the machine: buses, devices, wiring. The CPU has nothing to
    /// execute until a ROM is loaded.
    pub fn new() -> Self {
        let cpu_bus = Rc::new(Bus::new(BusId::Cpu));
        let ppu_bus = Rc::new(Bus::new(BusId::Ppu));

        let cartridge = Rc::new(RefCell::new(Cartridge::new()));
        let ram = Rc::new(RefCell::new(Ram::new()));
        let vram = Rc::new(RefCell::new(VRam::new(cartridge.clone())));
        let ppu = Rc::new(RefCell::new(Ppu::new(ppu_bus.clone())));
        let controller = Rc::new(RefCell::new(Controller::new()));

        // The cartridge goes first on both buses so it can claim any
        // address it wants to.
        cpu_bus.connect(cartridge.clone());
        cpu_bus.connect(ram);
        cpu_bus.connect(ppu.clone());
        cpu_bus.connect(controller.clone());

        ppu_bus.connect(cartridge.clone());
        ppu_bus.connect(vram);

        let cpu = Cpu::new(cpu_bus.clone());

        Self {
            cpu_bus,
            ppu_bus,
            cpu,
            ppu,
            cartridge,
            controller,
            master_ticks: 0,
        }
    }

    /// Consume an iNES byte stream and reset the machine onto it.
    pub fn load_rom(&mut self, bytes: &[u8]) -> Result<(), RomError> {
        self.cartridge.borrow_mut().load(bytes)?;
        self.reset();
        Ok(())
    }

    /// Load an iNES file from disk.
    pub fn load_rom_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), RomError> {
        self.cartridge.borrow_mut().load_file(path)?;
        self.reset();
        Ok(())
    }

    /// Advance one master-clock unit: one PPU dot, and one CPU cycle on
    /// every third call.
    pub fn tick(&mut self) {
        self.ppu.borrow_mut().tick();
        if self.ppu.borrow_mut().take_nmi() {
            self.cpu.schedule_nmi();
        }

        self.master_ticks += 1;
        if self.master_ticks % 3 == 0 {
            self.cpu.tick();
        }
    }

    /// Run until the PPU finishes the current frame.
    pub fn tick_frame(&mut self) {
        loop {
            self.tick();
            if self.ppu.borrow_mut().take_frame_complete() {
                break;
            }
        }
    }

    /// Register the callback invoked for every visible pixel.
    pub fn set_pixel_sink<F>(&mut self, sink: F)
    where
        F: FnMut(u16, u16, Rgb) + 'static,
    {
        self.ppu.borrow_mut().set_pixel_sink(Box::new(sink));
    }

    pub fn press(&mut self, button: Button) {
        self.controller.borrow_mut().press(button);
    }

    pub fn release(&mut self, button: Button) {
        self.controller.borrow_mut().release(button);
    }

    pub fn reset(&mut self) {
        self.cpu.reset();
        self.ppu.borrow_mut().reset();
        self.master_ticks = 0;
    }

    pub fn cpu_debug_info(&self) -> CpuDebugInfo {
        self.cpu.debug_info()
    }

    /// Decode the instruction at `addr` against the current CPU
    /// snapshot, without disturbing machine state.
    pub fn disassemble(&self, addr: u16) -> Option<Disassembly> {
        let info = self.cpu.debug_info();
        let bus = self.cpu_bus.clone();
        disasm::disassemble(addr, info.x, info.y, &mut |address| bus.debug_read(address))
    }

    /// Borrow the PPU for debugger queries (pattern tables, palettes,
    /// scan position).
    pub fn ppu(&self) -> Ref<'_, Ppu> {
        self.ppu.borrow()
    }

    /// The PPU-side bus, for tools that inspect nametables or palette
    /// RAM directly.
    pub fn ppu_bus(&self) -> &Bus {
        &self.ppu_bus
    }
}

impl Default for Nes {
    fn default() -> Self {
        Self::new()
    }
}
