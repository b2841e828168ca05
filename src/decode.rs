//! Instruction decoding
//!
//! [`decode_one`] consumes one instruction from a [`ByteCursor`]: a run of
//! lock/segment-override prefixes, the primary opcode byte, then whatever
//! ModR/M, displacement and immediate bytes that opcode's family calls for.
//! Mnemonics are table-driven throughout; families whose mnemonic lives in
//! the ModR/M reg sub-field (group-1 immediates, shifts, the unary group,
//! inc/dec) index a per-family table with exactly those three bits.

use thiserror::Error;
use tracing::{debug, trace};

use crate::{
    cursor::ByteCursor,
    instruction::Instruction,
    modrm::{Mode, ModRm},
    operand::{RmOperand, Width},
    registers::{Reg, RegisterFile, SegReg},
};

/// Group-1 arithmetic mnemonics, indexed by bits 5:3 of the primary byte or
/// by the ModR/M reg field
pub const GROUP_ONE_MNEMONICS: [&str; 8] =
    ["add", "or", "adc", "sbb", "and", "sub", "xor", "cmp"];

const CONDITIONAL_JUMPS: [&str; 16] = [
    "jo", "jno", "jb", "jnb", "je", "jne", "jbe", "jnbe", "js", "jns", "jp", "jnp", "jl", "jnl",
    "jle", "jnle",
];

const LOOPS: [&str; 4] = ["loopnz", "loopz", "loop", "jcxz"];

const ADJUSTS: [&str; 4] = ["daa", "das", "aaa", "aas"];

const REGISTER_OPS: [&str; 4] = ["inc", "dec", "push", "pop"];

const FLAG_TRANSFERS: [&str; 4] = ["pushf", "popf", "sahf", "lahf"];

const INTERRUPTS: [&str; 4] = ["int3", "int", "into", "iret"];

const FLAG_OPS: [&str; 6] = ["clc", "stc", "cli", "sti", "cld", "std"];

// Sub-opcode tables keyed on the ModR/M reg field; `None` marks encodings
// the 8086 leaves unassigned.
const SHIFT_ROTATE: [Option<&str>; 8] = [
    Some("rol"),
    Some("ror"),
    Some("rcl"),
    Some("rcr"),
    Some("shl"),
    Some("shr"),
    None,
    Some("sar"),
];

const UNARY_GROUP: [Option<&str>; 8] = [
    Some("test"),
    None,
    Some("not"),
    Some("neg"),
    Some("mul"),
    Some("imul"),
    Some("div"),
    Some("idiv"),
];

const INC_DEC_GROUP: [Option<&str>; 8] = [
    Some("inc"),
    Some("dec"),
    Some("call"),
    Some("call far"),
    Some("jmp"),
    Some("jmp far"),
    Some("push"),
    None,
];

/// Decoding failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum DecodeError {
    /// The input ended in the middle of an instruction
    #[error("truncated input at offset {offset}")]
    Truncated {
        /// First out-of-range offset
        offset: usize,
    },

    /// No opcode pattern matched
    #[error("unable to decode byte 0b{byte:08b} at offset {offset}")]
    UndecodableOpcode {
        /// The offending byte
        byte: u8,
        /// Its offset in the input
        offset: usize,
    },
}

/// Result of disassembling a whole image.
///
/// On failure the instructions decoded before the failing byte are kept and
/// `error` carries the reason; the register file always reflects every `mov`
/// simulated up to that point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disassembly {
    /// Decoded records, in input order
    pub instructions: Vec<Instruction>,
    /// Final simulated register state
    pub registers: RegisterFile,
    /// The failure that stopped decoding, if any
    pub error: Option<DecodeError>,
}

/// Disassembles `bytes` from offset 0 until end-of-input or the first
/// decode failure
#[must_use]
pub fn disassemble(bytes: &[u8]) -> Disassembly {
    let mut cursor = ByteCursor::new(bytes);
    let mut registers = RegisterFile::new();
    let mut instructions = Vec::new();

    while !cursor.is_at_end() {
        match decode_one(&mut cursor, &mut registers) {
            Ok(instruction) => {
                trace!(
                    address = instruction.address(),
                    text = instruction.text(),
                    "decoded"
                );
                instructions.push(instruction);
            }
            Err(error) => {
                return Disassembly {
                    instructions,
                    registers,
                    error: Some(error),
                };
            }
        }
    }

    debug!(instructions = instructions.len(), "decode finished");
    Disassembly {
        instructions,
        registers,
        error: None,
    }
}

/// Decodes a single instruction at the cursor's current position.
///
/// Advances the cursor by exactly the instruction's encoded length. `mov`
/// instructions of the simulated forms update `registers` and attach a trace
/// line to the returned record.
pub fn decode_one(
    cursor: &mut ByteCursor<'_>,
    registers: &mut RegisterFile,
) -> Result<Instruction, DecodeError> {
    let mut pending = PendingDecode::begin(cursor, registers)?;
    pending.dispatch()
}

/// Per-instruction decode state: the prefix run already consumed, the record
/// address, and the offset of the primary opcode byte. Populated by the
/// dispatch arm that matches and consumed when the record text is rendered;
/// nothing here outlives the instruction.
struct PendingDecode<'c, 'a> {
    cursor: &'c mut ByteCursor<'a>,
    registers: &'c mut RegisterFile,
    address: usize,
    opcode_offset: usize,
    lock: bool,
    segment: Option<SegReg>,
}

impl<'c, 'a> PendingDecode<'c, 'a> {
    /// Consumes the prefix run. Repeated prefixes overwrite: the last lock
    /// and the last segment override win.
    fn begin(
        cursor: &'c mut ByteCursor<'a>,
        registers: &'c mut RegisterFile,
    ) -> Result<Self, DecodeError> {
        let address = cursor.position();
        let mut lock = false;
        let mut segment = None;

        loop {
            match cursor.peek(0)? {
                0xF0 => {
                    lock = true;
                    cursor.advance(1);
                }
                byte @ (0x26 | 0x2E | 0x36 | 0x3E) => {
                    segment = Some(SegReg::from_bits(byte >> 3));
                    cursor.advance(1);
                }
                _ => break,
            }
        }

        let opcode_offset = cursor.position();
        Ok(Self {
            cursor,
            registers,
            address,
            opcode_offset,
            lock,
            segment,
        })
    }

    fn dispatch(&mut self) -> Result<Instruction, DecodeError> {
        let byte = self.cursor.peek(0)?;
        match byte {
            0x00..=0x3F if byte & 0x06 == 0x06 => self.segment_stack_or_adjust(byte),
            0x00..=0x3F => self.group_one(byte),
            0x40..=0x5F => self.register_op(byte),
            0x70..=0x7F => {
                self.cursor.advance(1);
                self.jump_rel8(CONDITIONAL_JUMPS[(byte & 0x0F) as usize])
            }
            0x80..=0x83 => self.group_one_immediate(byte),
            0x84..=0x87 => self.test_xchg(byte),
            0x88..=0x8B => self.rm_and_reg("mov", Width::from_bit(byte), byte & 0x02 != 0, true),
            0x8C | 0x8E => self.mov_segment(byte),
            0x8D => self.rm_and_reg("lea", Width::Word, true, false),
            0x8F => {
                self.cursor.advance(1);
                let modrm = self.read_modrm()?;
                self.rm_only(modrm, "pop", Width::Word, None)
            }
            0x90..=0x97 => {
                self.cursor.advance(1);
                let reg = Reg::from_bits(byte).word_name();
                Ok(self.capture(format!("xchg ax, {reg}")))
            }
            0x98 | 0x99 => self.simple(if byte & 0x01 != 0 { "cwd" } else { "cbw" }),
            0x9A => self.far_direct("call"),
            0x9B => self.simple("wait"),
            0x9C..=0x9F => self.simple(FLAG_TRANSFERS[(byte & 0x03) as usize]),
            0xA0..=0xA3 => self.mov_accumulator(byte),
            0xA4..=0xA7 | 0xAC..=0xAF => self.string_op(byte),
            0xA8 | 0xA9 => self.immediate_to_accumulator("test", Width::from_bit(byte)),
            0xB0..=0xBF => self.mov_immediate_to_register(byte),
            0xC2 | 0xCA => self.ret_immediate(byte),
            0xC3 => self.simple("ret"),
            0xCB => self.simple("retf"),
            0xC4 | 0xC5 => {
                let mnemonic = if byte & 0x01 != 0 { "lds" } else { "les" };
                self.rm_and_reg(mnemonic, Width::Word, true, false)
            }
            0xC6 | 0xC7 => self.mov_immediate_to_rm(byte),
            0xCC..=0xCF => self.interrupt(byte),
            0xD0..=0xD3 => self.shift(byte),
            0xD4 | 0xD5 => {
                // aam/aad carry a base byte after the opcode
                self.cursor.peek(1)?;
                self.cursor.advance(2);
                let mnemonic = if byte & 0x01 != 0 { "aad" } else { "aam" };
                Ok(self.capture(mnemonic.to_owned()))
            }
            0xD7 => self.simple("xlat"),
            0xE0..=0xE3 => {
                self.cursor.advance(1);
                self.jump_rel8(LOOPS[(byte & 0x03) as usize])
            }
            0xE4..=0xE7 => self.in_out_immediate(byte),
            0xE8 | 0xE9 => self.near_direct(byte),
            0xEA => self.far_direct("jmp"),
            0xEB => {
                self.cursor.advance(1);
                self.jump_rel8("jmp")
            }
            0xEC..=0xEF => self.in_out_dx(byte),
            0xF3 => self.repeat(),
            0xF4 | 0xF5 => self.simple(if byte & 0x01 != 0 { "cmc" } else { "hlt" }),
            0xF6 | 0xF7 => self.unary_group(byte),
            0xF8..=0xFD => self.simple(FLAG_OPS[(byte - 0xF8) as usize]),
            0xFE | 0xFF => self.inc_dec_group(byte),
            _ => Err(self.undecodable(byte)),
        }
    }

    // --- family routines ---

    /// `push`/`pop` with a segment register, or the decimal/ASCII adjust
    /// group; the two share the `xxx110`/`xxx111` low-bit pattern
    fn segment_stack_or_adjust(&mut self, byte: u8) -> Result<Instruction, DecodeError> {
        self.cursor.advance(1);
        if byte < 0x20 {
            let mnemonic = if byte & 0x01 != 0 { "pop" } else { "push" };
            let segment = SegReg::from_bits(byte >> 3);
            Ok(self.capture(format!("{mnemonic} {segment}")))
        } else {
            // 0x27/0x2F/0x37/0x3F; the override encodings were consumed as
            // prefixes before dispatch
            Ok(self.capture(ADJUSTS[(byte >> 3 & 0x03) as usize].to_owned()))
        }
    }

    fn group_one(&mut self, byte: u8) -> Result<Instruction, DecodeError> {
        let mnemonic = GROUP_ONE_MNEMONICS[(byte >> 3 & 0x07) as usize];
        let width = Width::from_bit(byte);
        if byte & 0x04 != 0 {
            self.immediate_to_accumulator(mnemonic, width)
        } else {
            self.rm_and_reg(mnemonic, width, byte & 0x02 != 0, false)
        }
    }

    fn register_op(&mut self, byte: u8) -> Result<Instruction, DecodeError> {
        self.cursor.advance(1);
        let mnemonic = REGISTER_OPS[(byte >> 3 & 0x03) as usize];
        let reg = Reg::from_bits(byte).word_name();
        Ok(self.capture(format!("{mnemonic} {reg}")))
    }

    fn group_one_immediate(&mut self, byte: u8) -> Result<Instruction, DecodeError> {
        let width = Width::from_bit(byte);
        let sign_extend = byte & 0x02 != 0;
        self.cursor.advance(1);
        let modrm = self.read_modrm()?;
        let mnemonic = GROUP_ONE_MNEMONICS[modrm.reg() as usize];
        let rm = self.rm_operand(modrm, width)?;
        let value = self.immediate(width, sign_extend)?;
        let text = if rm.is_memory() {
            format!("{mnemonic} {rm}, {width} {value}")
        } else {
            format!("{mnemonic} {rm}, {value}")
        };
        Ok(self.capture(text))
    }

    fn test_xchg(&mut self, byte: u8) -> Result<Instruction, DecodeError> {
        let mnemonic = if byte & 0x02 != 0 { "xchg" } else { "test" };
        // a locked xchg keeps the memory operand as destination
        let to_reg = !self.lock && byte & 0x02 != 0;
        self.rm_and_reg(mnemonic, Width::from_bit(byte), to_reg, false)
    }

    /// Shared r/m + reg form: group-1 arithmetic, `test`/`xchg`, `mov`,
    /// `lea`, `les`/`lds`. `simulate_mov` turns register-to-register `mov`s
    /// into register-file updates.
    fn rm_and_reg(
        &mut self,
        mnemonic: &str,
        width: Width,
        to_reg: bool,
        simulate_mov: bool,
    ) -> Result<Instruction, DecodeError> {
        self.cursor.advance(1);
        let modrm = self.read_modrm()?;
        let rm = self.rm_operand(modrm, width)?;
        let reg = Reg::from_bits(modrm.reg());

        let reg_text = reg.name(width);
        let (dst, src) = if to_reg {
            (reg_text.to_owned(), rm.to_string())
        } else {
            (rm.to_string(), reg_text.to_owned())
        };

        let trace = if simulate_mov && modrm.mode() == Mode::Reg {
            let rm_reg = Reg::from_bits(modrm.rm());
            let (dst_reg, src_reg) = if to_reg { (reg, rm_reg) } else { (rm_reg, reg) };
            let delta = self.registers.mov_register(dst_reg, src_reg, width);
            Some(format!("mov {dst}, {src} ; {delta}"))
        } else {
            None
        };

        let mut instruction = self.capture(format!("{mnemonic} {dst}, {src}"));
        if let Some(trace) = trace {
            instruction = instruction.with_trace(trace);
        }
        Ok(instruction)
    }

    fn mov_segment(&mut self, byte: u8) -> Result<Instruction, DecodeError> {
        let to_segment = byte & 0x02 != 0;
        self.cursor.advance(1);
        let modrm = self.read_modrm()?;
        let segment = SegReg::from_bits(modrm.reg());
        let rm = self.rm_operand(modrm, Width::Word)?;
        let text = if to_segment {
            format!("mov {segment}, {rm}")
        } else {
            format!("mov {rm}, {segment}")
        };
        Ok(self.capture(text))
    }

    /// Single r/m operand; `count` is the shift-count operand (`1` or `cl`).
    /// Memory operands get a size label, register operands do not.
    fn rm_only(
        &mut self,
        modrm: ModRm,
        mnemonic: &str,
        width: Width,
        count: Option<&str>,
    ) -> Result<Instruction, DecodeError> {
        let rm = self.rm_operand(modrm, width)?;
        let text = match (rm.is_memory(), count) {
            (true, Some(count)) => format!("{mnemonic} {width} {rm}, {count}"),
            (true, None) => format!("{mnemonic} {width} {rm}"),
            (false, Some(count)) => format!("{mnemonic} {rm}, {count}"),
            (false, None) => format!("{mnemonic} {rm}"),
        };
        Ok(self.capture(text))
    }

    fn shift(&mut self, byte: u8) -> Result<Instruction, DecodeError> {
        let width = Width::from_bit(byte);
        let count = if byte & 0x02 != 0 { "cl" } else { "1" };
        self.cursor.advance(1);
        let modrm = self.read_modrm()?;
        let mnemonic = SHIFT_ROTATE[modrm.reg() as usize].ok_or_else(|| self.undecodable(byte))?;
        self.rm_only(modrm, mnemonic, width, Some(count))
    }

    fn unary_group(&mut self, byte: u8) -> Result<Instruction, DecodeError> {
        let width = Width::from_bit(byte);
        self.cursor.advance(1);
        let modrm = self.read_modrm()?;
        if modrm.reg() == 0 {
            // test r/m, imm
            let rm = self.rm_operand(modrm, width)?;
            let value = self.immediate(width, false)?;
            let text = if rm.is_memory() {
                format!("test {rm}, {width} {value}")
            } else {
                format!("test {rm}, {value}")
            };
            return Ok(self.capture(text));
        }
        let mnemonic = UNARY_GROUP[modrm.reg() as usize].ok_or_else(|| self.undecodable(byte))?;
        self.rm_only(modrm, mnemonic, width, None)
    }

    fn inc_dec_group(&mut self, byte: u8) -> Result<Instruction, DecodeError> {
        let width = Width::from_bit(byte);
        self.cursor.advance(1);
        let modrm = self.read_modrm()?;
        let mnemonic = INC_DEC_GROUP[modrm.reg() as usize].ok_or_else(|| self.undecodable(byte))?;
        self.rm_only(modrm, mnemonic, width, None)
    }

    fn mov_immediate_to_rm(&mut self, byte: u8) -> Result<Instruction, DecodeError> {
        let width = Width::from_bit(byte);
        self.cursor.advance(1);
        let modrm = self.read_modrm()?;
        let rm = self.rm_operand(modrm, width)?;
        let value = self.immediate(width, false)?;
        // the size label stays even for a register destination
        Ok(self.capture(format!("mov {rm}, {width} {value}")))
    }

    fn mov_immediate_to_register(&mut self, byte: u8) -> Result<Instruction, DecodeError> {
        let width = Width::from_bit(byte >> 3);
        let reg = Reg::from_bits(byte);
        self.cursor.advance(1);
        let value = self.immediate(width, false)?;
        let name = reg.name(width);
        let delta = self.registers.mov_immediate(reg, width, value);
        let trace = format!("mov {name}, {value} ; {delta}");
        Ok(self
            .capture(format!("mov {name}, {value}"))
            .with_trace(trace))
    }

    fn immediate_to_accumulator(
        &mut self,
        mnemonic: &str,
        width: Width,
    ) -> Result<Instruction, DecodeError> {
        self.cursor.advance(1);
        let value = self.immediate(width, false)?;
        let accumulator = width.accumulator();
        Ok(self.capture(format!("{mnemonic} {accumulator}, {value}")))
    }

    fn mov_accumulator(&mut self, byte: u8) -> Result<Instruction, DecodeError> {
        let width = Width::from_bit(byte);
        let to_memory = byte & 0x02 != 0;
        self.cursor.advance(1);
        let address = self.cursor.peek_u16(0)? as i16;
        self.cursor.advance(2);
        let memory = RmOperand::direct(address, self.segment);
        let accumulator = width.accumulator();
        let text = if to_memory {
            format!("mov {memory}, {accumulator}")
        } else {
            format!("mov {accumulator}, {memory}")
        };
        Ok(self.capture(text))
    }

    fn string_op(&mut self, byte: u8) -> Result<Instruction, DecodeError> {
        self.cursor.advance(1);
        let mnemonic = match byte & 0xFE {
            0xA4 => "movs",
            0xA6 => "cmps",
            0xAC => "lods",
            _ => "scas",
        };
        let suffix = if byte & 0x01 != 0 { "w" } else { "b" };
        Ok(self.capture(format!("{mnemonic}{suffix}")))
    }

    fn repeat(&mut self) -> Result<Instruction, DecodeError> {
        self.cursor.advance(1);
        let byte = self.cursor.peek(0)?;
        let mnemonic = match byte & 0xFE {
            0xA4 => "movs",
            0xA6 => "cmps",
            0xAA => "stos",
            0xAC => "lods",
            0xAE => "scas",
            _ => {
                return Err(DecodeError::UndecodableOpcode {
                    byte,
                    offset: self.cursor.position(),
                })
            }
        };
        self.cursor.advance(1);
        let suffix = if byte & 0x01 != 0 { "w" } else { "b" };
        Ok(self.capture(format!("rep {mnemonic}{suffix}")))
    }

    fn ret_immediate(&mut self, byte: u8) -> Result<Instruction, DecodeError> {
        let mnemonic = if byte & 0x08 != 0 { "retf" } else { "ret" };
        self.cursor.advance(1);
        let value = self.immediate(Width::Word, false)?;
        Ok(self.capture(format!("{mnemonic} {value}")))
    }

    fn interrupt(&mut self, byte: u8) -> Result<Instruction, DecodeError> {
        let mnemonic = INTERRUPTS[(byte & 0x03) as usize];
        self.cursor.advance(1);
        if byte & 0x03 == 1 {
            let value = self.immediate(Width::Byte, false)?;
            Ok(self.capture(format!("{mnemonic} {value}")))
        } else {
            Ok(self.capture(mnemonic.to_owned()))
        }
    }

    fn in_out_immediate(&mut self, byte: u8) -> Result<Instruction, DecodeError> {
        let accumulator = Width::from_bit(byte).accumulator();
        self.cursor.advance(1);
        let port = self.immediate(Width::Byte, false)?;
        let text = if byte & 0x02 != 0 {
            format!("out {port}, {accumulator}")
        } else {
            format!("in {accumulator}, {port}")
        };
        Ok(self.capture(text))
    }

    fn in_out_dx(&mut self, byte: u8) -> Result<Instruction, DecodeError> {
        self.cursor.advance(1);
        let accumulator = Width::from_bit(byte).accumulator();
        let text = if byte & 0x02 != 0 {
            format!("out dx, {accumulator}")
        } else {
            format!("in {accumulator}, dx")
        };
        Ok(self.capture(text))
    }

    /// `call`/`jmp` with a 16-bit displacement relative to the next
    /// instruction; rendered as the absolute target, not a label
    fn near_direct(&mut self, byte: u8) -> Result<Instruction, DecodeError> {
        let mnemonic = if byte & 0x01 != 0 { "jmp" } else { "call" };
        self.cursor.advance(1);
        let displacement = self.cursor.peek_u16(0)? as i16;
        self.cursor.advance(2);
        let target = self.cursor.position() as i32 + i32::from(displacement);
        Ok(self.capture(format!("{mnemonic} {target}")))
    }

    fn far_direct(&mut self, mnemonic: &str) -> Result<Instruction, DecodeError> {
        self.cursor.advance(1);
        let offset = self.cursor.peek_u16(0)?;
        let segment = self.cursor.peek_u16(2)?;
        self.cursor.advance(4);
        Ok(self.capture(format!("{mnemonic} {segment}:{offset}")))
    }

    /// Relative-8 jump; the target is absolute, relative to the byte after
    /// the instruction. Caller has consumed the opcode byte.
    fn jump_rel8(&mut self, mnemonic: &str) -> Result<Instruction, DecodeError> {
        let displacement = self.cursor.peek(0)? as i8;
        self.cursor.advance(1);
        let target = self.cursor.position() as i32 + i32::from(displacement);
        Ok(self.capture(mnemonic.to_owned()).with_jump_target(target))
    }

    fn simple(&mut self, mnemonic: &str) -> Result<Instruction, DecodeError> {
        self.cursor.advance(1);
        Ok(self.capture(mnemonic.to_owned()))
    }

    // --- shared pieces ---

    fn read_modrm(&mut self) -> Result<ModRm, DecodeError> {
        let modrm = ModRm::from(self.cursor.peek(0)?);
        self.cursor.advance(1);
        Ok(modrm)
    }

    /// Consumes the displacement bytes the addressing mode calls for and
    /// builds the operand. 8-bit displacements are sign-extended.
    fn rm_operand(&mut self, modrm: ModRm, width: Width) -> Result<RmOperand, DecodeError> {
        let displacement = match modrm.mode() {
            Mode::MemNoDisp if modrm.rm() == 6 => {
                let direct = self.cursor.peek_u16(0)? as i16;
                self.cursor.advance(2);
                direct
            }
            Mode::MemNoDisp | Mode::Reg => 0,
            Mode::MemDisp8 => {
                let displacement = i16::from(self.cursor.peek(0)? as i8);
                self.cursor.advance(1);
                displacement
            }
            Mode::MemDisp16 => {
                let displacement = self.cursor.peek_u16(0)? as i16;
                self.cursor.advance(2);
                displacement
            }
        };
        Ok(RmOperand::new(modrm, width, self.segment, displacement))
    }

    /// Reads an immediate: one byte for byte width, two for word width, one
    /// sign-extended byte for word width with the S bit set
    fn immediate(&mut self, width: Width, sign_extend: bool) -> Result<u16, DecodeError> {
        match width {
            Width::Word if sign_extend => {
                let byte = self.cursor.peek(0)?;
                self.cursor.advance(1);
                Ok(byte as i8 as i16 as u16)
            }
            Width::Word => {
                let word = self.cursor.peek_u16(0)?;
                self.cursor.advance(2);
                Ok(word)
            }
            Width::Byte => {
                let byte = self.cursor.peek(0)?;
                self.cursor.advance(1);
                Ok(u16::from(byte))
            }
        }
    }

    /// Renders the record, prepending the lock prefix. Prefix state dies
    /// with the instruction.
    fn capture(&self, text: String) -> Instruction {
        let text = if self.lock {
            format!("lock {text}")
        } else {
            text
        };
        Instruction::new(self.address, text)
    }

    const fn undecodable(&self, byte: u8) -> DecodeError {
        DecodeError::UndecodableOpcode {
            byte,
            offset: self.opcode_offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{decode_one, disassemble, DecodeError};
    use crate::{cursor::ByteCursor, registers::RegisterFile};

    fn text_of(bytes: &[u8]) -> String {
        let mut cursor = ByteCursor::new(bytes);
        let mut registers = RegisterFile::new();
        decode_one(&mut cursor, &mut registers)
            .expect("decodable")
            .text()
            .to_owned()
    }

    #[test]
    fn advances_by_the_encoded_length() -> Result<(), DecodeError> {
        // prefix + opcode + modrm + disp16
        let bytes = [0x26, 0x88, 0x87, 0x10, 0x00, 0x90];
        let mut cursor = ByteCursor::new(&bytes);
        let mut registers = RegisterFile::new();
        let instruction = decode_one(&mut cursor, &mut registers)?;
        assert_eq!(instruction.address(), 0);
        assert_eq!(instruction.text(), "mov [es:bx + 16], al");
        assert_eq!(cursor.position(), 5);
        Ok(())
    }

    #[test]
    fn prefixes_do_not_leak() -> Result<(), DecodeError> {
        let bytes = [0x26, 0xA1, 0x10, 0x00, 0xA1, 0x10, 0x00];
        let mut cursor = ByteCursor::new(&bytes);
        let mut registers = RegisterFile::new();
        assert_eq!(
            decode_one(&mut cursor, &mut registers)?.text(),
            "mov ax, [es:16]"
        );
        assert_eq!(
            decode_one(&mut cursor, &mut registers)?.text(),
            "mov ax, [16]"
        );
        Ok(())
    }

    #[test]
    fn repeated_overrides_last_wins() {
        assert_eq!(text_of(&[0x26, 0x3E, 0xA1, 0x10, 0x00]), "mov ax, [ds:16]");
    }

    #[test]
    fn undecodable_byte_reports_its_offset() {
        let disassembly = disassemble(&[0x89, 0xD9, 0x60]);
        assert_eq!(disassembly.instructions.len(), 1);
        assert_eq!(
            disassembly.error,
            Some(DecodeError::UndecodableOpcode {
                byte: 0x60,
                offset: 2
            })
        );
    }

    #[test]
    fn truncated_modrm() {
        let disassembly = disassemble(&[0x89]);
        assert_eq!(disassembly.error, Some(DecodeError::Truncated { offset: 1 }));
    }

    #[test]
    fn error_display() {
        let error = DecodeError::UndecodableOpcode {
            byte: 0x66,
            offset: 5,
        };
        assert_eq!(
            error.to_string(),
            "unable to decode byte 0b01100110 at offset 5"
        );
        let error = DecodeError::Truncated { offset: 3 };
        assert_eq!(error.to_string(), "truncated input at offset 3");
    }
}
