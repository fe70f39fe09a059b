/*!
Address bus shared by the devices of one half of the system.

The console carries two of these: the CPU bus (RAM, PPU registers,
controller, cartridge PRG space) and the PPU bus (cartridge CHR space,
VRAM). A bus knows its own identity and forwards it to every device, so a
device connected to both buses (the cartridge) can tell which side an
access came from.

Dispatch walks devices in registration order and stops at the first one
that claims the address. Registration order is therefore part of the
memory map: the cartridge is connected first so its mapper may shadow any
range it wants. Unclaimed reads return 0 and unclaimed writes are dropped,
both with a warning; real hardware leaves these lines floating.
*/

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Identity of a bus, forwarded to devices on every access.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BusId {
    Cpu,
    Ppu,
}

impl fmt::Display for BusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusId::Cpu => f.write_str("cpu"),
            BusId::Ppu => f.write_str("ppu"),
        }
    }
}

/// A memory-mapped device attached to a bus.
///
/// `read` returns `Some(byte)` when the device claims the address, `None`
/// to let dispatch continue. `write` returns whether the write was
/// claimed. The `debug` flag marks side-effect-free accesses issued by
/// debugger code; devices whose reads have side effects must either serve
/// them without the side effect or treat a debug access as a programming
/// error.
pub trait Device {
    fn read(&mut self, bus: BusId, addr: u16, debug: bool) -> Option<u8>;
    fn write(&mut self, bus: BusId, addr: u16, data: u8, debug: bool) -> bool;
}

pub struct Bus {
    id: BusId,
    devices: RefCell<Vec<Rc<RefCell<dyn Device>>>>,
}

impl Bus {
    pub fn new(id: BusId) -> Self {
        Self {
            id,
            devices: RefCell::new(Vec::new()),
        }
    }

    pub fn id(&self) -> BusId {
        self.id
    }

    /// Attach a device. Earlier devices win address conflicts.
    pub fn connect(&self, device: Rc<RefCell<dyn Device>>) {
        self.devices.borrow_mut().push(device);
    }

    /// Read one byte, dispatching to the first device that claims `addr`.
    pub fn read(&self, addr: u16) -> u8 {
        self.dispatch_read(addr, false)
    }

    /// Side-effect-free read for debugger use.
    pub fn debug_read(&self, addr: u16) -> u8 {
        self.dispatch_read(addr, true)
    }

    /// Little-endian two-byte read of `addr` then `addr + 1`.
    pub fn read16(&self, addr: u16) -> u16 {
        let low = self.read(addr) as u16;
        let high = self.read(addr.wrapping_add(1)) as u16;
        (high << 8) | low
    }

    /// Write one byte to the first device that claims `addr`.
    pub fn write(&self, addr: u16, data: u8) {
        for device in self.devices.borrow().iter() {
            if device.borrow_mut().write(self.id, addr, data, false) {
                return;
            }
        }
        log::warn!("{} bus: dropped write of {data:#04x} to unmapped {addr:#06x}", self.id);
    }

    fn dispatch_read(&self, addr: u16, debug: bool) -> u8 {
        for device in self.devices.borrow().iter() {
            if let Some(data) = device.borrow_mut().read(self.id, addr, debug) {
                return data;
            }
        }
        log::warn!("{} bus: read from unmapped {addr:#06x}", self.id);
        0
    }
}
