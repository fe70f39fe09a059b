/*!
The 56 official 6502 instructions.

A flat 256-entry table maps each opcode to its instruction, addressing
mode and base cycle count; `execute` carries the semantics. A handler
returns whether it is willing to pay the page-cross penalty: the extra
cycle lands only when the addressing mode crossed a page *and* the
instruction reads its operand late enough to care. Branches manage their
own penalty (one cycle when taken, another when the target sits on a
different page than the updated PC).
*/

use super::addressing::AddrMode;
use super::{Cpu, Status};

/// Instruction identity, independent of addressing mode.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Op {
    Adc, And, Asl, Bcc, Bcs, Beq, Bit, Bmi, Bne, Bpl, Brk, Bvc, Bvs, Clc,
    Cld, Cli, Clv, Cmp, Cpx, Cpy, Dec, Dex, Dey, Eor, Inc, Inx, Iny, Jmp,
    Jsr, Lda, Ldx, Ldy, Lsr, Nop, Ora, Pha, Php, Pla, Plp, Rol, Ror, Rti,
    Rts, Sbc, Sec, Sed, Sei, Sta, Stx, Sty, Tax, Tay, Tsx, Txa, Txs, Tya,
}

impl Op {
    /// Mnemonic for the disassembler.
    pub const fn name(self) -> &'static str {
        match self {
            Op::Adc => "ADC", Op::And => "AND", Op::Asl => "ASL", Op::Bcc => "BCC",
            Op::Bcs => "BCS", Op::Beq => "BEQ", Op::Bit => "BIT", Op::Bmi => "BMI",
            Op::Bne => "BNE", Op::Bpl => "BPL", Op::Brk => "BRK", Op::Bvc => "BVC",
            Op::Bvs => "BVS", Op::Clc => "CLC", Op::Cld => "CLD", Op::Cli => "CLI",
            Op::Clv => "CLV", Op::Cmp => "CMP", Op::Cpx => "CPX", Op::Cpy => "CPY",
            Op::Dec => "DEC", Op::Dex => "DEX", Op::Dey => "DEY", Op::Eor => "EOR",
            Op::Inc => "INC", Op::Inx => "INX", Op::Iny => "INY", Op::Jmp => "JMP",
            Op::Jsr => "JSR", Op::Lda => "LDA", Op::Ldx => "LDX", Op::Ldy => "LDY",
            Op::Lsr => "LSR", Op::Nop => "NOP", Op::Ora => "ORA", Op::Pha => "PHA",
            Op::Php => "PHP", Op::Pla => "PLA", Op::Plp => "PLP", Op::Rol => "ROL",
            Op::Ror => "ROR", Op::Rti => "RTI", Op::Rts => "RTS", Op::Sbc => "SBC",
            Op::Sec => "SEC", Op::Sed => "SED", Op::Sei => "SEI", Op::Sta => "STA",
            Op::Stx => "STX", Op::Sty => "STY", Op::Tax => "TAX", Op::Tay => "TAY",
            Op::Tsx => "TSX", Op::Txa => "TXA", Op::Txs => "TXS", Op::Tya => "TYA",
        }
    }
}

/// One decoded opcode: instruction, addressing mode, base cycles.
#[derive(Copy, Clone, Debug)]
pub struct OpEntry {
    pub op: Op,
    pub mode: AddrMode,
    pub cycles: u8,
}

const fn e(op: Op, mode: AddrMode, cycles: u8) -> Option<OpEntry> {
    Some(OpEntry { op, mode, cycles })
}

/// Opcode-indexed decode table. Unassigned slots are the unofficial
/// opcodes this core does not implement.
pub static OPCODE_TABLE: [Option<OpEntry>; 256] = {
    use AddrMode::*;
    let mut t: [Option<OpEntry>; 256] = [None; 256];

    t[0x69] = e(Op::Adc, Immediate, 2);
    t[0x65] = e(Op::Adc, ZeroPage, 3);
    t[0x75] = e(Op::Adc, ZeroPageX, 4);
    t[0x6D] = e(Op::Adc, Absolute, 4);
    t[0x7D] = e(Op::Adc, AbsoluteX, 4);
    t[0x79] = e(Op::Adc, AbsoluteY, 4);
    t[0x61] = e(Op::Adc, IndirectX, 6);
    t[0x71] = e(Op::Adc, IndirectY, 5);

    t[0x29] = e(Op::And, Immediate, 2);
    t[0x25] = e(Op::And, ZeroPage, 3);
    t[0x35] = e(Op::And, ZeroPageX, 4);
    t[0x2D] = e(Op::And, Absolute, 4);
    t[0x3D] = e(Op::And, AbsoluteX, 4);
    t[0x39] = e(Op::And, AbsoluteY, 4);
    t[0x21] = e(Op::And, IndirectX, 6);
    t[0x31] = e(Op::And, IndirectY, 5);

    t[0x0A] = e(Op::Asl, Accumulator, 2);
    t[0x06] = e(Op::Asl, ZeroPage, 5);
    t[0x16] = e(Op::Asl, ZeroPageX, 6);
    t[0x0E] = e(Op::Asl, Absolute, 6);
    t[0x1E] = e(Op::Asl, AbsoluteX, 7);

    t[0x90] = e(Op::Bcc, Relative, 2);
    t[0xB0] = e(Op::Bcs, Relative, 2);
    t[0xF0] = e(Op::Beq, Relative, 2);
    t[0x30] = e(Op::Bmi, Relative, 2);
    t[0xD0] = e(Op::Bne, Relative, 2);
    t[0x10] = e(Op::Bpl, Relative, 2);
    t[0x50] = e(Op::Bvc, Relative, 2);
    t[0x70] = e(Op::Bvs, Relative, 2);

    t[0x24] = e(Op::Bit, ZeroPage, 3);
    t[0x2C] = e(Op::Bit, Absolute, 4);

    t[0x00] = e(Op::Brk, Implied, 7);

    t[0x18] = e(Op::Clc, Implied, 2);
    t[0xD8] = e(Op::Cld, Implied, 2);
    t[0x58] = e(Op::Cli, Implied, 2);
    t[0xB8] = e(Op::Clv, Implied, 2);

    t[0xC9] = e(Op::Cmp, Immediate, 2);
    t[0xC5] = e(Op::Cmp, ZeroPage, 3);
    t[0xD5] = e(Op::Cmp, ZeroPageX, 4);
    t[0xCD] = e(Op::Cmp, Absolute, 4);
    t[0xDD] = e(Op::Cmp, AbsoluteX, 4);
    t[0xD9] = e(Op::Cmp, AbsoluteY, 4);
    t[0xC1] = e(Op::Cmp, IndirectX, 6);
    t[0xD1] = e(Op::Cmp, IndirectY, 5);

    t[0xE0] = e(Op::Cpx, Immediate, 2);
    t[0xE4] = e(Op::Cpx, ZeroPage, 3);
    t[0xEC] = e(Op::Cpx, Absolute, 4);

    t[0xC0] = e(Op::Cpy, Immediate, 2);
    t[0xC4] = e(Op::Cpy, ZeroPage, 3);
    t[0xCC] = e(Op::Cpy, Absolute, 4);

    t[0xC6] = e(Op::Dec, ZeroPage, 5);
    t[0xD6] = e(Op::Dec, ZeroPageX, 6);
    t[0xCE] = e(Op::Dec, Absolute, 6);
    t[0xDE] = e(Op::Dec, AbsoluteX, 7);

    t[0xCA] = e(Op::Dex, Implied, 2);
    t[0x88] = e(Op::Dey, Implied, 2);

    t[0x49] = e(Op::Eor, Immediate, 2);
    t[0x45] = e(Op::Eor, ZeroPage, 3);
    t[0x55] = e(Op::Eor, ZeroPageX, 4);
    t[0x4D] = e(Op::Eor, Absolute, 4);
    t[0x5D] = e(Op::Eor, AbsoluteX, 4);
    t[0x59] = e(Op::Eor, AbsoluteY, 4);
    t[0x41] = e(Op::Eor, IndirectX, 6);
    t[0x51] = e(Op::Eor, IndirectY, 5);

    t[0xE6] = e(Op::Inc, ZeroPage, 5);
    t[0xF6] = e(Op::Inc, ZeroPageX, 6);
    t[0xEE] = e(Op::Inc, Absolute, 6);
    t[0xFE] = e(Op::Inc, AbsoluteX, 7);

    t[0xE8] = e(Op::Inx, Implied, 2);
    t[0xC8] = e(Op::Iny, Implied, 2);

    t[0x4C] = e(Op::Jmp, Absolute, 3);
    t[0x6C] = e(Op::Jmp, Indirect, 5);
    t[0x20] = e(Op::Jsr, Absolute, 6);

    t[0xA9] = e(Op::Lda, Immediate, 2);
    t[0xA5] = e(Op::Lda, ZeroPage, 3);
    t[0xB5] = e(Op::Lda, ZeroPageX, 4);
    t[0xAD] = e(Op::Lda, Absolute, 4);
    t[0xBD] = e(Op::Lda, AbsoluteX, 4);
    t[0xB9] = e(Op::Lda, AbsoluteY, 4);
    t[0xA1] = e(Op::Lda, IndirectX, 6);
    t[0xB1] = e(Op::Lda, IndirectY, 5);

    t[0xA2] = e(Op::Ldx, Immediate, 2);
    t[0xA6] = e(Op::Ldx, ZeroPage, 3);
    t[0xB6] = e(Op::Ldx, ZeroPageY, 4);
    t[0xAE] = e(Op::Ldx, Absolute, 4);
    t[0xBE] = e(Op::Ldx, AbsoluteY, 4);

    t[0xA0] = e(Op::Ldy, Immediate, 2);
    t[0xA4] = e(Op::Ldy, ZeroPage, 3);
    t[0xB4] = e(Op::Ldy, ZeroPageX, 4);
    t[0xAC] = e(Op::Ldy, Absolute, 4);
    t[0xBC] = e(Op::Ldy, AbsoluteX, 4);

    t[0x4A] = e(Op::Lsr, Accumulator, 2);
    t[0x46] = e(Op::Lsr, ZeroPage, 5);
    t[0x56] = e(Op::Lsr, ZeroPageX, 6);
    t[0x4E] = e(Op::Lsr, Absolute, 6);
    t[0x5E] = e(Op::Lsr, AbsoluteX, 7);

    t[0xEA] = e(Op::Nop, Implied, 2);

    t[0x09] = e(Op::Ora, Immediate, 2);
    t[0x05] = e(Op::Ora, ZeroPage, 3);
    t[0x15] = e(Op::Ora, ZeroPageX, 4);
    t[0x0D] = e(Op::Ora, Absolute, 4);
    t[0x1D] = e(Op::Ora, AbsoluteX, 4);
    t[0x19] = e(Op::Ora, AbsoluteY, 4);
    t[0x01] = e(Op::Ora, IndirectX, 6);
    t[0x11] = e(Op::Ora, IndirectY, 5);

    t[0x48] = e(Op::Pha, Implied, 3);
    t[0x08] = e(Op::Php, Implied, 3);
    t[0x68] = e(Op::Pla, Implied, 4);
    t[0x28] = e(Op::Plp, Implied, 4);

    t[0x2A] = e(Op::Rol, Accumulator, 2);
    t[0x26] = e(Op::Rol, ZeroPage, 5);
    t[0x36] = e(Op::Rol, ZeroPageX, 6);
    t[0x2E] = e(Op::Rol, Absolute, 6);
    t[0x3E] = e(Op::Rol, AbsoluteX, 7);

    t[0x6A] = e(Op::Ror, Accumulator, 2);
    t[0x66] = e(Op::Ror, ZeroPage, 5);
    t[0x76] = e(Op::Ror, ZeroPageX, 6);
    t[0x6E] = e(Op::Ror, Absolute, 6);
    t[0x7E] = e(Op::Ror, AbsoluteX, 7);

    t[0x40] = e(Op::Rti, Implied, 6);
    t[0x60] = e(Op::Rts, Implied, 6);

    t[0xE9] = e(Op::Sbc, Immediate, 2);
    t[0xE5] = e(Op::Sbc, ZeroPage, 3);
    t[0xF5] = e(Op::Sbc, ZeroPageX, 4);
    t[0xED] = e(Op::Sbc, Absolute, 4);
    t[0xFD] = e(Op::Sbc, AbsoluteX, 4);
    t[0xF9] = e(Op::Sbc, AbsoluteY, 4);
    t[0xE1] = e(Op::Sbc, IndirectX, 6);
    t[0xF1] = e(Op::Sbc, IndirectY, 5);

    t[0x38] = e(Op::Sec, Implied, 2);
    t[0xF8] = e(Op::Sed, Implied, 2);
    t[0x78] = e(Op::Sei, Implied, 2);

    t[0x85] = e(Op::Sta, ZeroPage, 3);
    t[0x95] = e(Op::Sta, ZeroPageX, 4);
    t[0x8D] = e(Op::Sta, Absolute, 4);
    t[0x9D] = e(Op::Sta, AbsoluteX, 5);
    t[0x99] = e(Op::Sta, AbsoluteY, 5);
    t[0x81] = e(Op::Sta, IndirectX, 6);
    t[0x91] = e(Op::Sta, IndirectY, 6);

    t[0x86] = e(Op::Stx, ZeroPage, 3);
    t[0x96] = e(Op::Stx, ZeroPageY, 4);
    t[0x8E] = e(Op::Stx, Absolute, 4);

    t[0x84] = e(Op::Sty, ZeroPage, 3);
    t[0x94] = e(Op::Sty, ZeroPageX, 4);
    t[0x8C] = e(Op::Sty, Absolute, 4);

    t[0xAA] = e(Op::Tax, Implied, 2);
    t[0xA8] = e(Op::Tay, Implied, 2);
    t[0xBA] = e(Op::Tsx, Implied, 2);
    t[0x8A] = e(Op::Txa, Implied, 2);
    t[0x9A] = e(Op::Txs, Implied, 2);
    t[0x98] = e(Op::Tya, Implied, 2);

    t
};

/// Run one instruction against the CPU. `addr` is the effective address
/// the addressing mode produced; PC has already moved past the operand.
/// Returns whether the instruction pays the page-cross penalty.
pub(super) fn execute(cpu: &mut Cpu, op: Op, addr: u16, mode: AddrMode) -> bool {
    match op {
        Op::Adc => {
            let m = cpu.read(addr);
            let carry = cpu.p.contains(Status::C) as u16;
            let sum = cpu.a as u16 + m as u16 + carry;
            let result = sum as u8;
            cpu.p.set(Status::C, sum > 0xFF);
            cpu.p.set(
                Status::V,
                (cpu.a ^ m) & 0x80 == 0 && (cpu.a ^ result) & 0x80 != 0,
            );
            cpu.a = result;
            cpu.set_zn(result);
            true
        }

        Op::Sbc => {
            let m = cpu.read(addr);
            let borrow = 1 - cpu.p.contains(Status::C) as i16;
            let result = cpu.a.wrapping_sub(m).wrapping_sub(borrow as u8);
            cpu.p.set(Status::C, cpu.a as i16 - m as i16 - borrow >= 0);
            cpu.p.set(
                Status::V,
                (cpu.a ^ m) & 0x80 != 0 && (cpu.a ^ result) & 0x80 != 0,
            );
            cpu.a = result;
            cpu.set_zn(result);
            true
        }

        Op::And => {
            cpu.a &= cpu.read(addr);
            cpu.set_zn(cpu.a);
            true
        }
        Op::Eor => {
            cpu.a ^= cpu.read(addr);
            cpu.set_zn(cpu.a);
            true
        }
        Op::Ora => {
            cpu.a |= cpu.read(addr);
            cpu.set_zn(cpu.a);
            true
        }

        Op::Asl => {
            let value = read_operand(cpu, addr, mode);
            cpu.p.set(Status::C, value & 0x80 != 0);
            let result = value << 1;
            cpu.set_zn(result);
            write_operand(cpu, addr, mode, result);
            false
        }
        Op::Lsr => {
            let value = read_operand(cpu, addr, mode);
            cpu.p.set(Status::C, value & 0x01 != 0);
            let result = value >> 1;
            cpu.set_zn(result);
            write_operand(cpu, addr, mode, result);
            false
        }
        Op::Rol => {
            let value = read_operand(cpu, addr, mode);
            let carry_in = cpu.p.contains(Status::C) as u8;
            cpu.p.set(Status::C, value & 0x80 != 0);
            let result = (value << 1) | carry_in;
            cpu.set_zn(result);
            write_operand(cpu, addr, mode, result);
            false
        }
        Op::Ror => {
            let value = read_operand(cpu, addr, mode);
            let carry_in = (cpu.p.contains(Status::C) as u8) << 7;
            cpu.p.set(Status::C, value & 0x01 != 0);
            let result = (value >> 1) | carry_in;
            cpu.set_zn(result);
            write_operand(cpu, addr, mode, result);
            false
        }

        Op::Bcc => branch_if(cpu, addr, !cpu.p.contains(Status::C)),
        Op::Bcs => branch_if(cpu, addr, cpu.p.contains(Status::C)),
        Op::Bne => branch_if(cpu, addr, !cpu.p.contains(Status::Z)),
        Op::Beq => branch_if(cpu, addr, cpu.p.contains(Status::Z)),
        Op::Bpl => branch_if(cpu, addr, !cpu.p.contains(Status::N)),
        Op::Bmi => branch_if(cpu, addr, cpu.p.contains(Status::N)),
        Op::Bvc => branch_if(cpu, addr, !cpu.p.contains(Status::V)),
        Op::Bvs => branch_if(cpu, addr, cpu.p.contains(Status::V)),

        Op::Bit => {
            let m = cpu.read(addr);
            cpu.p.set(Status::Z, m & cpu.a == 0);
            cpu.p.set(Status::N, m & 0x80 != 0);
            cpu.p.set(Status::V, m & 0x40 != 0);
            false
        }

        Op::Brk => {
            // The byte after BRK is padding; the pushed return address
            // skips it.
            cpu.pc = cpu.pc.wrapping_add(1);
            cpu.p.insert(Status::I);
            cpu.push16(cpu.pc);
            cpu.push((cpu.p | Status::B | Status::U).bits());
            cpu.pc = cpu.read16(super::IRQ_VECTOR);
            false
        }

        Op::Cmp => {
            compare(cpu, cpu.a, addr);
            true
        }
        Op::Cpx => {
            compare(cpu, cpu.x, addr);
            false
        }
        Op::Cpy => {
            compare(cpu, cpu.y, addr);
            false
        }

        Op::Dec => {
            let result = cpu.read(addr).wrapping_sub(1);
            cpu.write(addr, result);
            cpu.set_zn(result);
            false
        }
        Op::Inc => {
            let result = cpu.read(addr).wrapping_add(1);
            cpu.write(addr, result);
            cpu.set_zn(result);
            false
        }
        Op::Dex => {
            cpu.x = cpu.x.wrapping_sub(1);
            cpu.set_zn(cpu.x);
            false
        }
        Op::Dey => {
            cpu.y = cpu.y.wrapping_sub(1);
            cpu.set_zn(cpu.y);
            false
        }
        Op::Inx => {
            cpu.x = cpu.x.wrapping_add(1);
            cpu.set_zn(cpu.x);
            false
        }
        Op::Iny => {
            cpu.y = cpu.y.wrapping_add(1);
            cpu.set_zn(cpu.y);
            false
        }

        Op::Clc => flag(cpu, Status::C, false),
        Op::Sec => flag(cpu, Status::C, true),
        Op::Cld => flag(cpu, Status::D, false),
        Op::Sed => flag(cpu, Status::D, true),
        Op::Cli => flag(cpu, Status::I, false),
        Op::Sei => flag(cpu, Status::I, true),
        Op::Clv => flag(cpu, Status::V, false),

        Op::Jmp => {
            cpu.pc = addr;
            false
        }
        Op::Jsr => {
            // Push the address of the last operand byte; RTS adds one.
            cpu.push16(cpu.pc.wrapping_sub(1));
            cpu.pc = addr;
            false
        }
        Op::Rts => {
            cpu.pc = cpu.pull16().wrapping_add(1);
            false
        }
        Op::Rti => {
            cpu.p = Status::from_pulled(cpu.pull());
            cpu.pc = cpu.pull16();
            false
        }

        Op::Lda => {
            cpu.a = cpu.read(addr);
            cpu.set_zn(cpu.a);
            true
        }
        Op::Ldx => {
            cpu.x = cpu.read(addr);
            cpu.set_zn(cpu.x);
            true
        }
        Op::Ldy => {
            cpu.y = cpu.read(addr);
            cpu.set_zn(cpu.y);
            true
        }

        Op::Sta => {
            cpu.write(addr, cpu.a);
            false
        }
        Op::Stx => {
            cpu.write(addr, cpu.x);
            false
        }
        Op::Sty => {
            cpu.write(addr, cpu.y);
            false
        }

        Op::Pha => {
            cpu.push(cpu.a);
            false
        }
        Op::Php => {
            // Pushed copies always carry bits 4 and 5 set.
            cpu.push((cpu.p | Status::B | Status::U).bits());
            false
        }
        Op::Pla => {
            cpu.a = cpu.pull();
            cpu.set_zn(cpu.a);
            false
        }
        Op::Plp => {
            cpu.p = Status::from_pulled(cpu.pull());
            false
        }

        Op::Tax => {
            cpu.x = cpu.a;
            cpu.set_zn(cpu.x);
            false
        }
        Op::Tay => {
            cpu.y = cpu.a;
            cpu.set_zn(cpu.y);
            false
        }
        Op::Tsx => {
            cpu.x = cpu.sp;
            cpu.set_zn(cpu.x);
            false
        }
        Op::Txa => {
            cpu.a = cpu.x;
            cpu.set_zn(cpu.a);
            false
        }
        Op::Tya => {
            cpu.a = cpu.y;
            cpu.set_zn(cpu.a);
            false
        }
        Op::Txs => {
            // The one transfer that leaves the flags alone.
            cpu.sp = cpu.x;
            false
        }

        Op::Nop => false,
    }
}

/// Shifts and rotates target A in accumulator mode, memory otherwise.
#[inline]
fn read_operand(cpu: &mut Cpu, addr: u16, mode: AddrMode) -> u8 {
    if mode == AddrMode::Accumulator {
        cpu.a
    } else {
        cpu.read(addr)
    }
}

#[inline]
fn write_operand(cpu: &mut Cpu, addr: u16, mode: AddrMode, value: u8) {
    if mode == AddrMode::Accumulator {
        cpu.a = value;
    } else {
        cpu.write(addr, value);
    }
}

fn branch_if(cpu: &mut Cpu, target: u16, condition: bool) -> bool {
    if condition {
        // Taken branches cost a cycle, two when the target is on a
        // different page than the updated PC.
        cpu.cycles_left = cpu.cycles_left.wrapping_add(1);
        if target & 0xFF00 != cpu.pc & 0xFF00 {
            cpu.cycles_left = cpu.cycles_left.wrapping_add(1);
        }
        cpu.pc = target;
    }
    false
}

fn compare(cpu: &mut Cpu, register: u8, addr: u16) {
    let m = cpu.read(addr);
    let diff = register.wrapping_sub(m);
    cpu.p.set(Status::C, register >= m);
    cpu.set_zn(diff);
}

fn flag(cpu: &mut Cpu, bit: Status, on: bool) -> bool {
    cpu.p.set(bit, on);
    false
}
