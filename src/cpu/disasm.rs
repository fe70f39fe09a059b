/*!
Instruction decoder for the debugger.

Pure over a read callback so it can run against side-effect-free bus
reads: decoding never disturbs machine state. The index registers from a
CPU snapshot feed the indexed modes so the printed operand matches what
the instruction would actually touch.
*/

use super::addressing::AddrMode;
use super::instructions::OPCODE_TABLE;

/// Textual decode of one instruction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Disassembly {
    pub mnemonic: &'static str,
    pub operand: String,
    pub addressing: &'static str,
    pub size: u8,
}

/// Decode the instruction at `addr`. Returns `None` for bytes that are
/// not official opcodes.
pub fn disassemble(
    addr: u16,
    x: u8,
    y: u8,
    read: &mut dyn FnMut(u16) -> u8,
) -> Option<Disassembly> {
    let opcode = read(addr);
    let entry = OPCODE_TABLE[opcode as usize]?;

    let (effective, _) = entry.mode.resolve(addr, x, y, read);
    // Immediate operands print the byte itself; every other mode prints
    // the effective address.
    let operand = match entry.mode {
        AddrMode::Immediate => entry.mode.format(read(effective) as u16),
        _ => entry.mode.format(effective),
    };

    Some(Disassembly {
        mnemonic: entry.op.name(),
        operand,
        addressing: entry.mode.name(),
        size: entry.mode.size() as u8,
    })
}
