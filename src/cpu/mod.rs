/*!
6502 CPU core: register file, status flags, stack, the
fetch-decode-execute loop, and interrupt dispatch.

Timing is counted down rather than up: decoding an instruction loads
`cycles_left` with its cost and every `tick` burns one cycle, so the next
fetch happens exactly when the current instruction's budget runs out.
Interrupts are edge-recorded via `schedule_irq`/`schedule_nmi` and
serviced at the next instruction boundary.
*/

use std::rc::Rc;

use bitflags::bitflags;

use crate::bus::Bus;

pub mod addressing;
pub mod disasm;
pub mod instructions;

use instructions::OPCODE_TABLE;

pub const NMI_VECTOR: u16 = 0xFFFA;
pub const RESET_VECTOR: u16 = 0xFFFC;
pub const IRQ_VECTOR: u16 = 0xFFFE;

const STACK_BASE: u16 = 0x0100;

bitflags! {
    /// Processor status register P.
    ///
    /// Bit 5 has no storage on the real chip and always reads back as 1;
    /// this core keeps it set in `p` between instructions.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct Status: u8 {
        const C = 1 << 0; // carry
        const Z = 1 << 1; // zero
        const I = 1 << 2; // interrupt disable
        const D = 1 << 3; // decimal (ignored on the NES)
        const B = 1 << 4; // break marker, only ever set on pushed copies
        const U = 1 << 5; // unused, reads as 1
        const V = 1 << 6; // overflow
        const N = 1 << 7; // negative
    }
}

impl Status {
    /// Interpretation of a byte pulled from the stack: the break marker
    /// is discarded and the unused bit forced on.
    #[inline]
    fn from_pulled(bits: u8) -> Self {
        (Status::from_bits_truncate(bits) - Status::B) | Status::U
    }
}

/// Register snapshot for the debugger.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CpuDebugInfo {
    pub pc: u16,
    pub sp: u8,
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub p: u8,
}

pub struct Cpu {
    pub(in crate::cpu) pc: u16,
    pub(in crate::cpu) sp: u8,
    pub(in crate::cpu) a: u8,
    pub(in crate::cpu) x: u8,
    pub(in crate::cpu) y: u8,
    pub(in crate::cpu) p: Status,

    /// Cycles still owed by the current instruction.
    pub(in crate::cpu) cycles_left: u8,

    pending_irq: bool,
    pending_nmi: bool,

    bus: Rc<Bus>,
}

impl Cpu {
    /// A CPU wired to its bus, in the pre-reset state. `reset` gives it
    /// a meaningful PC once a cartridge is present.
    pub fn new(bus: Rc<Bus>) -> Self {
        Self {
            pc: 0,
            sp: 0xFD,
            a: 0,
            x: 0,
            y: 0,
            p: Status::U,
            cycles_left: 0,
            pending_irq: false,
            pending_nmi: false,
            bus,
        }
    }

    /// Bring the CPU to its power-on state and load PC from the reset
    /// vector.
    pub fn reset(&mut self) {
        self.a = 0;
        self.x = 0;
        self.y = 0;
        self.sp = 0xFD;
        self.p = Status::U;
        self.pending_irq = false;
        self.pending_nmi = false;
        self.pc = self.read16(RESET_VECTOR);
        // The hardware spends the first cycles after reset fetching the
        // vector and settling.
        self.cycles_left = 8;
    }

    /// Advance one clock cycle. A new instruction is fetched only when
    /// the previous one has paid off all its cycles.
    pub fn tick(&mut self) {
        if self.cycles_left == 0 {
            if self.pending_nmi {
                self.pending_nmi = false;
                self.interrupt(NMI_VECTOR);
                return;
            }
            if self.pending_irq {
                self.pending_irq = false;
                if !self.p.contains(Status::I) {
                    self.interrupt(IRQ_VECTOR);
                    return;
                }
            }

            let opcode = self.read(self.pc);
            let Some(entry) = OPCODE_TABLE[opcode as usize] else {
                log::warn!("unknown opcode {opcode:#04x} at {:#06x}", self.pc);
                return;
            };

            let pc = self.pc;
            let (x, y) = (self.x, self.y);
            let bus = self.bus.clone();
            let (addr, page_crossed) =
                entry.mode.resolve(pc, x, y, &mut |address| bus.read(address));

            self.pc = self.pc.wrapping_add(entry.mode.size());
            self.cycles_left = entry.cycles;

            let wants_penalty = instructions::execute(self, entry.op, addr, entry.mode);
            if wants_penalty && page_crossed {
                self.cycles_left += 1;
            }
        }

        self.cycles_left -= 1;
    }

    /// Request a maskable interrupt. Ignored while I is set.
    pub fn schedule_irq(&mut self) {
        if !self.p.contains(Status::I) {
            self.pending_irq = true;
        }
    }

    /// Request a non-maskable interrupt.
    pub fn schedule_nmi(&mut self) {
        self.pending_nmi = true;
    }

    pub fn debug_info(&self) -> CpuDebugInfo {
        CpuDebugInfo {
            pc: self.pc,
            sp: self.sp,
            a: self.a,
            x: self.x,
            y: self.y,
            p: self.p.bits(),
        }
    }

    /// Cycles the current instruction still owes. Zero means the next
    /// tick fetches.
    pub fn remaining_cycles(&self) -> u8 {
        self.cycles_left
    }

    /// Hardware interrupt entry: stack the return state with the break
    /// marker clear, block further IRQs, and chase the vector.
    fn interrupt(&mut self, vector: u16) {
        self.push16(self.pc);
        self.push(((self.p - Status::B) | Status::U).bits());
        self.p.insert(Status::I);
        self.pc = self.read16(vector);
        self.cycles_left = 7;
    }

    // ---- bus access ----

    #[inline]
    pub(in crate::cpu) fn read(&self, addr: u16) -> u8 {
        self.bus.read(addr)
    }

    #[inline]
    pub(in crate::cpu) fn read16(&self, addr: u16) -> u16 {
        self.bus.read16(addr)
    }

    #[inline]
    pub(in crate::cpu) fn write(&self, addr: u16, data: u8) {
        self.bus.write(addr, data);
    }

    // ---- stack, fixed to page $01 ----

    pub(in crate::cpu) fn push(&mut self, data: u8) {
        self.write(STACK_BASE + self.sp as u16, data);
        self.sp = self.sp.wrapping_sub(1);
    }

    /// High byte first, so the pull order restores PC intact.
    pub(in crate::cpu) fn push16(&mut self, data: u16) {
        self.push((data >> 8) as u8);
        self.push(data as u8);
    }

    pub(in crate::cpu) fn pull(&mut self) -> u8 {
        self.sp = self.sp.wrapping_add(1);
        self.read(STACK_BASE + self.sp as u16)
    }

    pub(in crate::cpu) fn pull16(&mut self) -> u16 {
        let low = self.pull() as u16;
        let high = self.pull() as u16;
        (high << 8) | low
    }

    #[inline]
    pub(in crate::cpu) fn set_zn(&mut self, value: u8) {
        self.p.set(Status::Z, value == 0);
        self.p.set(Status::N, value & 0x80 != 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::BusId;
    use crate::cartridge::Cartridge;
    use crate::ram::Ram;
    use crate::test_utils::build_nrom_with_prg;
    use std::cell::RefCell;

    /// CPU bus with RAM and an NROM cartridge holding `program` at $8000.
    fn setup(program: &[u8]) -> (Cpu, Rc<Bus>) {
        setup_with_vectors(program, (0x8000, 0x8000, 0x8000))
    }

    fn setup_with_vectors(program: &[u8], vectors: (u16, u16, u16)) -> (Cpu, Rc<Bus>) {
        let rom = build_nrom_with_prg(program, Some(vectors));
        let cartridge = Rc::new(RefCell::new(Cartridge::new()));
        cartridge.borrow_mut().load(&rom).unwrap();
        let bus = Rc::new(Bus::new(BusId::Cpu));
        bus.connect(cartridge);
        bus.connect(Rc::new(RefCell::new(Ram::new())));
        let mut cpu = Cpu::new(bus.clone());
        cpu.reset();
        cpu.cycles_left = 0; // skip the reset settle time in tests
        (cpu, bus)
    }

    /// Run exactly one instruction, returning how many ticks it took.
    fn step(cpu: &mut Cpu) -> u32 {
        let mut ticks = 0;
        loop {
            cpu.tick();
            ticks += 1;
            if cpu.cycles_left == 0 {
                return ticks;
            }
        }
    }

    #[test]
    fn reset_loads_the_vector_and_settle_time() {
        let rom = build_nrom_with_prg(&[0xEA], Some((0x8123, 0x8000, 0x8000)));
        let cartridge = Rc::new(RefCell::new(Cartridge::new()));
        cartridge.borrow_mut().load(&rom).unwrap();
        let bus = Rc::new(Bus::new(BusId::Cpu));
        bus.connect(cartridge);
        let mut cpu = Cpu::new(bus);
        cpu.reset();

        assert_eq!(cpu.pc, 0x8123);
        assert_eq!(cpu.sp, 0xFD);
        assert_eq!(cpu.p, Status::U);
        assert_eq!(cpu.remaining_cycles(), 8);
    }

    #[test]
    fn lda_then_sta_lands_in_ram() {
        // LDA #$42; STA $02
        let (mut cpu, bus) = setup(&[0xA9, 0x42, 0x85, 0x02]);
        assert_eq!(step(&mut cpu), 2);
        assert_eq!(step(&mut cpu), 3);
        assert_eq!(bus.read(0x0002), 0x42);
        assert_eq!(cpu.a, 0x42);
        assert!(!cpu.p.contains(Status::Z));
        assert!(!cpu.p.contains(Status::N));
    }

    #[test]
    fn adc_overflow_from_7f_to_80() {
        // LDA #$7F; ADC #$01
        let (mut cpu, _bus) = setup(&[0xA9, 0x7F, 0x69, 0x01]);
        step(&mut cpu);
        step(&mut cpu);
        assert_eq!(cpu.a, 0x80);
        assert!(cpu.p.contains(Status::V));
        assert!(cpu.p.contains(Status::N));
        assert!(!cpu.p.contains(Status::C));
        assert!(!cpu.p.contains(Status::Z));
    }

    #[test]
    fn adc_carries_out_and_wraps() {
        // LDA #$FF; ADC #$30
        let (mut cpu, _bus) = setup(&[0xA9, 0xFF, 0x69, 0x30]);
        step(&mut cpu);
        step(&mut cpu);
        assert_eq!(cpu.a, 0x2F);
        assert!(cpu.p.contains(Status::C));
        assert!(!cpu.p.contains(Status::V));
    }

    #[test]
    fn adc_uses_incoming_carry() {
        // SEC; LDA #$10; ADC #$01
        let (mut cpu, _bus) = setup(&[0x38, 0xA9, 0x10, 0x69, 0x01]);
        step(&mut cpu);
        step(&mut cpu);
        step(&mut cpu);
        assert_eq!(cpu.a, 0x12);
    }

    #[test]
    fn sbc_without_borrow() {
        // SEC; LDA #$50; SBC #$20
        let (mut cpu, _bus) = setup(&[0x38, 0xA9, 0x50, 0xE9, 0x20]);
        step(&mut cpu);
        step(&mut cpu);
        step(&mut cpu);
        assert_eq!(cpu.a, 0x30);
        assert!(cpu.p.contains(Status::C)); // no borrow
        assert!(!cpu.p.contains(Status::V));
    }

    #[test]
    fn sbc_borrows_below_zero() {
        // SEC; LDA #$10; SBC #$20
        let (mut cpu, _bus) = setup(&[0x38, 0xA9, 0x10, 0xE9, 0x20]);
        step(&mut cpu);
        step(&mut cpu);
        step(&mut cpu);
        assert_eq!(cpu.a, 0xF0);
        assert!(!cpu.p.contains(Status::C));
        assert!(cpu.p.contains(Status::N));
    }

    #[test]
    fn branch_taken_same_page_costs_three() {
        // Program placed so BEQ sits at $80FE with operand $04:
        // target = $8100 + 4 = $8104, same page as updated PC.
        let mut program = vec![0xEA; 0x0FE];
        program.extend_from_slice(&[0xF0, 0x04]); // BEQ +4 at $80FE
        let (mut cpu, _bus) = setup(&program);
        cpu.pc = 0x80FE;
        cpu.p.insert(Status::Z);
        assert_eq!(step(&mut cpu), 3);
        assert_eq!(cpu.pc, 0x8104);
    }

    #[test]
    fn branch_page_cross_costs_four() {
        // BNE at $8000 jumping backwards across the page boundary.
        let (mut cpu, _bus) = setup(&[0xD0, 0xF0]); // BNE -16 -> $7FF2
        cpu.p.remove(Status::Z);
        assert_eq!(step(&mut cpu), 4);
        assert_eq!(cpu.pc, 0x7FF2);
    }

    #[test]
    fn branch_not_taken_costs_two() {
        let (mut cpu, _bus) = setup(&[0xF0, 0x04, 0xEA]); // BEQ with Z clear
        cpu.p.remove(Status::Z);
        assert_eq!(step(&mut cpu), 2);
        assert_eq!(cpu.pc, 0x8002);
    }

    #[test]
    fn jmp_indirect_honours_the_page_bug() {
        // JMP ($10FF) with $10FF=$80, $1000=$50, $1100=$90 -> $5080.
        let (mut cpu, bus) = setup(&[0x6C, 0xFF, 0x10]);
        bus.write(0x10FF, 0x80);
        bus.write(0x1000, 0x50);
        bus.write(0x1100, 0x90);
        step(&mut cpu);
        assert_eq!(cpu.pc, 0x5080);
    }

    #[test]
    fn page_cross_penalty_applies_to_reads_only() {
        // LDX #$10; LDA $80F5,X crosses into $8105.
        let (mut cpu, _bus) = setup(&[0xA2, 0x10, 0xBD, 0xF5, 0x80]);
        step(&mut cpu);
        assert_eq!(step(&mut cpu), 5); // 4 base + 1 cross

        // STA pays the indexed cycle in its base count instead.
        let (mut cpu, _bus) = setup(&[0xA2, 0x10, 0x9D, 0xF5, 0x10]);
        step(&mut cpu);
        assert_eq!(step(&mut cpu), 5); // always 5, cross or not
    }

    #[test]
    fn jsr_rts_round_trip() {
        // JSR $8010 ... at $8010: RTS
        let mut program = vec![0x20, 0x10, 0x80, 0xEA];
        program.resize(0x10, 0xEA);
        program.push(0x60); // RTS at $8010
        let (mut cpu, bus) = setup(&program);

        assert_eq!(step(&mut cpu), 6);
        assert_eq!(cpu.pc, 0x8010);
        // Return address (last operand byte) is on the stack, high first.
        assert_eq!(bus.read(0x01FD), 0x80);
        assert_eq!(bus.read(0x01FC), 0x02);

        assert_eq!(step(&mut cpu), 6);
        assert_eq!(cpu.pc, 0x8003); // instruction after the JSR
        assert_eq!(cpu.sp, 0xFD);
    }

    #[test]
    fn php_plp_mask_the_break_bits() {
        let (mut cpu, bus) = setup(&[0x08, 0x28]); // PHP; PLP
        cpu.p = Status::U | Status::C | Status::N;
        step(&mut cpu);
        // Pushed copy carries bits 4 and 5.
        assert_eq!(bus.read(0x01FD), (Status::U | Status::B | Status::C | Status::N).bits());
        cpu.p = Status::U;
        step(&mut cpu);
        // Pulled copy drops bit 4, keeps bit 5.
        assert_eq!(cpu.p, Status::U | Status::C | Status::N);
    }

    #[test]
    fn brk_pushes_padded_pc_and_vectors_to_irq() {
        let (mut cpu, bus) = setup_with_vectors(&[0x00, 0xEA], (0x8000, 0x8000, 0x9000));
        assert_eq!(step(&mut cpu), 7);
        assert_eq!(cpu.pc, 0x9000);
        assert!(cpu.p.contains(Status::I));
        // Return address skips the padding byte: $8002.
        assert_eq!(bus.read(0x01FD), 0x80);
        assert_eq!(bus.read(0x01FC), 0x02);
        // Status copy has bits 4 and 5 set.
        let pushed = bus.read(0x01FB);
        assert_eq!(pushed & 0x30, 0x30);
    }

    #[test]
    fn rti_restores_flags_and_pc() {
        let (mut cpu, _bus) = setup(&[0x40]); // RTI
        // Hand-build an interrupt frame: PC $1234, flags C|Z with B set
        // in the pushed copy (must be dropped on pull).
        cpu.push16(0x1234);
        cpu.push((Status::C | Status::Z | Status::B).bits());
        step(&mut cpu);
        assert_eq!(cpu.pc, 0x1234);
        assert_eq!(cpu.p, Status::C | Status::Z | Status::U);
    }

    #[test]
    fn nmi_is_serviced_before_the_next_fetch() {
        let (mut cpu, bus) = setup_with_vectors(&[0xEA, 0xEA], (0x8000, 0x9000, 0x8000));
        cpu.p.insert(Status::C);
        let flags_before = cpu.p;
        cpu.schedule_nmi();
        cpu.tick();

        assert_eq!(cpu.pc, 0x9000);
        assert!(cpu.p.contains(Status::I));
        assert_eq!(cpu.remaining_cycles(), 7);
        // Old PC on the stack...
        assert_eq!(bus.read(0x01FD), 0x80);
        assert_eq!(bus.read(0x01FC), 0x00);
        // ...then the status copy, break marker clear, bit 5 set.
        let pushed = bus.read(0x01FB);
        assert_eq!(pushed & 0x10, 0);
        assert_eq!(pushed & 0x20, 0x20);
        assert_eq!(pushed & 0x01, flags_before.bits() & 0x01);
    }

    #[test]
    fn nmi_waits_for_the_instruction_boundary() {
        let (mut cpu, _bus) = setup_with_vectors(&[0xA9, 0x01, 0xEA], (0x8000, 0x9000, 0x8000));
        cpu.tick(); // LDA starts, one cycle still owed
        cpu.schedule_nmi();
        cpu.tick(); // finishes LDA
        assert_eq!(cpu.a, 0x01);
        assert_ne!(cpu.pc, 0x9000);
        cpu.tick(); // boundary: NMI wins over the next fetch
        assert_eq!(cpu.pc, 0x9000);
    }

    #[test]
    fn irq_respects_the_interrupt_disable_flag() {
        let (mut cpu, _bus) = setup_with_vectors(&[0xEA, 0xEA], (0x8000, 0x8000, 0x9000));
        cpu.p.insert(Status::I);
        cpu.schedule_irq();
        step(&mut cpu);
        assert_ne!(cpu.pc, 0x9000);

        cpu.p.remove(Status::I);
        cpu.schedule_irq();
        cpu.tick();
        assert_eq!(cpu.pc, 0x9000);
    }

    #[test]
    fn unknown_opcode_stalls_without_underflow() {
        let (mut cpu, _bus) = setup(&[0x02, 0xEA]); // unofficial JAM byte
        cpu.tick();
        assert_eq!(cpu.pc, 0x8000);
        assert_eq!(cpu.remaining_cycles(), 0);
        cpu.tick();
        assert_eq!(cpu.pc, 0x8000);
    }

    #[test]
    fn transfers_set_flags_except_txs() {
        // LDX #$00 via LDA/TAX path: LDA #$00; TAX; TXS
        let (mut cpu, _bus) = setup(&[0xA9, 0x00, 0xAA, 0x9A]);
        step(&mut cpu);
        step(&mut cpu); // TAX sets Z
        assert!(cpu.p.contains(Status::Z));
        cpu.p.remove(Status::Z);
        step(&mut cpu); // TXS must not touch flags
        assert_eq!(cpu.sp, 0x00);
        assert!(!cpu.p.contains(Status::Z));
    }

    #[test]
    fn asl_works_on_accumulator_and_memory() {
        // LDA #$81; ASL A -> $02, carry out
        let (mut cpu, bus) = setup(&[0xA9, 0x81, 0x0A, 0x06, 0x10]);
        step(&mut cpu);
        step(&mut cpu);
        assert_eq!(cpu.a, 0x02);
        assert!(cpu.p.contains(Status::C));

        // ASL $10 (read-modify-write in RAM)
        bus.write(0x0010, 0x40);
        assert_eq!(step(&mut cpu), 5);
        assert_eq!(bus.read(0x0010), 0x80);
        assert!(!cpu.p.contains(Status::C));
        assert!(cpu.p.contains(Status::N));
    }

    #[test]
    fn ror_rotates_through_carry() {
        // SEC; LDA #$02; ROR A -> $81, carry clear
        let (mut cpu, _bus) = setup(&[0x38, 0xA9, 0x02, 0x6A]);
        step(&mut cpu);
        step(&mut cpu);
        step(&mut cpu);
        assert_eq!(cpu.a, 0x81);
        assert!(!cpu.p.contains(Status::C));
    }

    #[test]
    fn bit_reflects_operand_bits() {
        let (mut cpu, bus) = setup(&[0xA9, 0x01, 0x24, 0x10]);
        bus.write(0x0010, 0xC0);
        step(&mut cpu);
        step(&mut cpu);
        assert!(cpu.p.contains(Status::Z)); // $01 & $C0 == 0
        assert!(cpu.p.contains(Status::N));
        assert!(cpu.p.contains(Status::V));
    }

    #[test]
    fn compare_sets_carry_on_greater_or_equal() {
        let (mut cpu, _bus) = setup(&[0xA9, 0x40, 0xC9, 0x40, 0xC9, 0x41]);
        step(&mut cpu);
        step(&mut cpu); // CMP #$40: equal
        assert!(cpu.p.contains(Status::C));
        assert!(cpu.p.contains(Status::Z));
        step(&mut cpu); // CMP #$41: less
        assert!(!cpu.p.contains(Status::C));
        assert!(!cpu.p.contains(Status::Z));
        assert!(cpu.p.contains(Status::N));
    }

    #[test]
    fn inc_dec_memory_set_flags_from_result() {
        let (mut cpu, bus) = setup(&[0xE6, 0x10, 0xC6, 0x10, 0xC6, 0x10]);
        bus.write(0x0010, 0xFF);
        step(&mut cpu); // INC: $FF -> $00
        assert_eq!(bus.read(0x0010), 0x00);
        assert!(cpu.p.contains(Status::Z));
        step(&mut cpu); // DEC: $00 -> $FF
        assert_eq!(bus.read(0x0010), 0xFF);
        assert!(cpu.p.contains(Status::N));
        step(&mut cpu); // DEC: $FF -> $FE
        assert_eq!(bus.read(0x0010), 0xFE);
    }

    #[test]
    fn stack_pointer_wraps_but_stays_in_page_one() {
        let (mut cpu, _bus) = setup(&[0xEA]);
        cpu.sp = 0x00;
        cpu.push(0xAB);
        assert_eq!(cpu.sp, 0xFF);
        assert_eq!(cpu.pull(), 0xAB);
        assert_eq!(cpu.sp, 0x00);
    }

    #[test]
    fn pc_advances_by_mode_size_before_the_handler_runs() {
        for (program, expected_pc) in [
            (vec![0xEAu8], 0x8001u16),             // implied
            (vec![0xA9, 0x00], 0x8002),            // immediate
            (vec![0xAD, 0x00, 0x10], 0x8003),      // absolute
        ] {
            let (mut cpu, _bus) = setup(&program);
            step(&mut cpu);
            assert_eq!(cpu.pc, expected_pc);
        }
    }

    #[test]
    fn bit5_survives_every_instruction() {
        let (mut cpu, _bus) = setup(&[0xA9, 0x00, 0x48, 0x28, 0x69, 0x01, 0x00]);
        for _ in 0..4 {
            step(&mut cpu);
            assert!(cpu.p.contains(Status::U), "bit 5 must stay set");
        }
    }
}
