/*!
6502 addressing modes.

Each mode is pure: given the program counter (still pointing at the
opcode), the index registers, and a read callback, it produces the
effective address plus a page-cross flag. The CPU advances PC by the
mode's byte size afterwards, so resolution never moves machine state.

The page-cross flag only reports *potential* extra work; whether a cycle
is actually added is decided together with the instruction (stores, for
example, always pay the indexed cycle up front in their base count).
*/

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AddrMode {
    Accumulator,
    Implied,
    Immediate,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    Relative,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    Indirect,
    IndirectX,
    IndirectY,
}

impl AddrMode {
    /// Instruction size in bytes, opcode included. This is how far the
    /// CPU advances PC after the fetch.
    pub const fn size(self) -> u16 {
        match self {
            AddrMode::Accumulator | AddrMode::Implied => 1,
            AddrMode::Immediate
            | AddrMode::ZeroPage
            | AddrMode::ZeroPageX
            | AddrMode::ZeroPageY
            | AddrMode::Relative
            | AddrMode::IndirectX
            | AddrMode::IndirectY => 2,
            AddrMode::Absolute | AddrMode::AbsoluteX | AddrMode::AbsoluteY | AddrMode::Indirect => 3,
        }
    }

    /// Short name used by the disassembler.
    pub const fn name(self) -> &'static str {
        match self {
            AddrMode::Accumulator => "ACC",
            AddrMode::Implied => "IMP",
            AddrMode::Immediate => "IMM",
            AddrMode::ZeroPage => "ZPA",
            AddrMode::ZeroPageX => "ZPX",
            AddrMode::ZeroPageY => "ZPY",
            AddrMode::Relative => "REL",
            AddrMode::Absolute => "ABS",
            AddrMode::AbsoluteX => "ABX",
            AddrMode::AbsoluteY => "ABY",
            AddrMode::Indirect => "IND",
            AddrMode::IndirectX => "INX",
            AddrMode::IndirectY => "INY",
        }
    }

    /// Render an operand the way assemblers print this mode.
    pub fn format(self, operand: u16) -> String {
        match self {
            AddrMode::Accumulator => "A".to_string(),
            AddrMode::Implied => String::new(),
            AddrMode::Immediate => format!("#${operand:02X}"),
            AddrMode::ZeroPage | AddrMode::Relative => format!("${operand:02X}"),
            AddrMode::ZeroPageX => format!("${operand:02X},X"),
            AddrMode::ZeroPageY => format!("${operand:02X},Y"),
            AddrMode::Absolute => format!("${operand:04X}"),
            AddrMode::AbsoluteX => format!("${operand:04X},X"),
            AddrMode::AbsoluteY => format!("${operand:04X},Y"),
            AddrMode::Indirect => format!("(${operand:04X})"),
            AddrMode::IndirectX => format!("(${operand:02X},X)"),
            AddrMode::IndirectY => format!("(${operand:02X}),Y"),
        }
    }

    /// Compute the effective address for an instruction whose opcode sits
    /// at `pc`. Returns the address and whether a page boundary was
    /// crossed while indexing.
    pub fn resolve(self, pc: u16, x: u8, y: u8, read: &mut dyn FnMut(u16) -> u8) -> (u16, bool) {
        match self {
            // No memory operand; the handler works on a register.
            AddrMode::Accumulator | AddrMode::Implied => (0, false),

            AddrMode::Immediate => (pc.wrapping_add(1), false),

            AddrMode::ZeroPage => (read(pc.wrapping_add(1)) as u16, false),

            AddrMode::ZeroPageX => (read(pc.wrapping_add(1)).wrapping_add(x) as u16, false),

            AddrMode::ZeroPageY => (read(pc.wrapping_add(1)).wrapping_add(y) as u16, false),

            AddrMode::Relative => {
                let offset = read(pc.wrapping_add(1));
                let base = pc.wrapping_add(2);
                let target = if offset < 0x80 {
                    base.wrapping_add(offset as u16)
                } else {
                    base.wrapping_add(offset as u16).wrapping_sub(0x100)
                };
                (target, false)
            }

            AddrMode::Absolute => (Self::read_word(pc.wrapping_add(1), read), false),

            AddrMode::AbsoluteX => {
                let base = Self::read_word(pc.wrapping_add(1), read);
                let addr = base.wrapping_add(x as u16);
                (addr, (addr & 0xFF00) != (base & 0xFF00))
            }

            AddrMode::AbsoluteY => {
                let base = Self::read_word(pc.wrapping_add(1), read);
                let addr = base.wrapping_add(y as u16);
                (addr, (addr & 0xFF00) != (base & 0xFF00))
            }

            AddrMode::Indirect => {
                let pointer = Self::read_word(pc.wrapping_add(1), read);
                let low = read(pointer);
                // Original 6502 quirk: fetching the high byte from $xxFF
                // wraps within the page instead of crossing it.
                let high = if pointer & 0x00FF == 0x00FF {
                    read(pointer & 0xFF00)
                } else {
                    read(pointer.wrapping_add(1))
                };
                ((high as u16) << 8 | low as u16, false)
            }

            AddrMode::IndirectX => {
                let low_ptr = read(pc.wrapping_add(1)).wrapping_add(x);
                let high_ptr = low_ptr.wrapping_add(1);
                let low = read(low_ptr as u16);
                let high = read(high_ptr as u16);
                ((high as u16) << 8 | low as u16, false)
            }

            AddrMode::IndirectY => {
                let zp = read(pc.wrapping_add(1));
                let low = read(zp as u16);
                let high = read(zp.wrapping_add(1) as u16);
                let base = (high as u16) << 8 | low as u16;
                let addr = base.wrapping_add(y as u16);
                (addr, (addr & 0xFF00) != (base & 0xFF00))
            }
        }
    }

    #[inline]
    fn read_word(addr: u16, read: &mut dyn FnMut(u16) -> u8) -> u16 {
        let low = read(addr) as u16;
        let high = read(addr.wrapping_add(1)) as u16;
        (high << 8) | low
    }
}
