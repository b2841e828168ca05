//! 8086 register definitions and the simulated register file
//!
//! Register names follow the Intel 8086 family: a 3-bit code selects one of
//! eight word registers, or one of eight byte half-registers when the operand
//! width is byte. A byte code addresses word slot `code & 3`; bit 2 of the
//! code selects the high half.

use core::fmt;
use std::fmt::Display;

use crate::operand::Width;

/// Number of general-purpose word registers
pub const NUMBER_OF_REGISTERS: usize = 8;

/// Word register names, indexed by 3-bit code
pub const WORD_REGISTER_NAMES: [&str; NUMBER_OF_REGISTERS] =
    ["ax", "cx", "dx", "bx", "sp", "bp", "si", "di"];

/// Byte register names, indexed by 3-bit code
pub const BYTE_REGISTER_NAMES: [&str; NUMBER_OF_REGISTERS] =
    ["al", "cl", "dl", "bl", "ah", "ch", "dh", "bh"];

/// Accumulator
pub const AX: Reg = Reg(0);
/// Count register
pub const CX: Reg = Reg(1);
/// Data register
pub const DX: Reg = Reg(2);
/// Base register
pub const BX: Reg = Reg(3);
/// Stack pointer
pub const SP: Reg = Reg(4);
/// Base pointer
pub const BP: Reg = Reg(5);
/// Source index
pub const SI: Reg = Reg(6);
/// Destination index
pub const DI: Reg = Reg(7);

/// A 3-bit general-purpose register code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Reg(u8);

impl Reg {
    /// Creates a `Reg` from the low three bits of `bits`
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & 0x07)
    }

    /// The raw 3-bit code
    #[must_use]
    pub const fn code(self) -> u8 {
        self.0
    }

    /// Name under the given operand width
    #[must_use]
    pub const fn name(self, width: Width) -> &'static str {
        match width {
            Width::Byte => BYTE_REGISTER_NAMES[self.0 as usize],
            Width::Word => WORD_REGISTER_NAMES[self.0 as usize],
        }
    }

    /// Word register name, ignoring any byte interpretation
    #[must_use]
    pub const fn word_name(self) -> &'static str {
        WORD_REGISTER_NAMES[self.0 as usize]
    }

    /// Index of the word register this code addresses under `width`
    #[must_use]
    pub const fn word_slot(self, width: Width) -> usize {
        match width {
            Width::Byte => (self.0 & 0x03) as usize,
            Width::Word => self.0 as usize,
        }
    }

    /// True when a byte interpretation addresses the high half (ah/ch/dh/bh)
    #[must_use]
    pub const fn is_high_half(self) -> bool {
        self.0 & 0x04 != 0
    }
}

/// Segment register, from a 2-bit code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SegReg(u8);

/// Extra segment
pub const ES: SegReg = SegReg(0);
/// Code segment
pub const CS: SegReg = SegReg(1);
/// Stack segment
pub const SS: SegReg = SegReg(2);
/// Data segment
pub const DS: SegReg = SegReg(3);

const SEGMENT_NAMES: [&str; 4] = ["es", "cs", "ss", "ds"];

impl SegReg {
    /// Creates a `SegReg` from the low two bits of `bits`
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & 0x03)
    }
}

impl Display for SegReg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(SEGMENT_NAMES[self.0 as usize])
    }
}

/// One simulated `mov` write: the affected word register, its value before,
/// and its value after
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovDelta {
    /// Word register name of the affected slot
    pub register: &'static str,
    /// Word value before the write
    pub previous: u16,
    /// Word value after the write
    pub current: u16,
}

impl Display for MovDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:0x{:x}->0x{:x}",
            self.register, self.previous, self.current
        )
    }
}

/// The eight general-purpose word registers, zero-initialized.
///
/// Only `mov reg, imm` and `mov reg, reg` are replayed against this state;
/// every other instruction leaves it untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RegisterFile {
    values: [u16; NUMBER_OF_REGISTERS],
}

impl RegisterFile {
    /// Creates a zeroed register file
    #[must_use]
    pub const fn new() -> Self {
        Self {
            values: [0; NUMBER_OF_REGISTERS],
        }
    }

    /// Word value of the register at `slot`
    #[must_use]
    pub const fn get(&self, slot: usize) -> u16 {
        self.values[slot]
    }

    /// Word register names paired with their current values, in code order
    pub fn word_registers(&self) -> impl Iterator<Item = (&'static str, u16)> + '_ {
        WORD_REGISTER_NAMES.into_iter().zip(self.values)
    }

    /// Applies `mov reg, imm`
    pub fn mov_immediate(&mut self, reg: Reg, width: Width, value: u16) -> MovDelta {
        self.write(reg, width, value)
    }

    /// Applies `mov dst, src` where both operands are registers.
    ///
    /// The source value is read by the same half/full indexing rule used for
    /// the write, so a high-half source like `ch` reads the high byte of `cx`.
    pub fn mov_register(&mut self, dst: Reg, src: Reg, width: Width) -> MovDelta {
        let value = self.read(src, width);
        self.write(dst, width, value)
    }

    fn read(&self, reg: Reg, width: Width) -> u16 {
        let value = self.values[reg.word_slot(width)];
        match width {
            Width::Word => value,
            Width::Byte if reg.is_high_half() => value >> 8,
            Width::Byte => value & 0x00FF,
        }
    }

    fn write(&mut self, reg: Reg, width: Width, value: u16) -> MovDelta {
        let slot = reg.word_slot(width);
        let previous = self.values[slot];
        self.values[slot] = match width {
            Width::Word => value,
            Width::Byte if reg.is_high_half() => value << 8 | previous & 0x00FF,
            Width::Byte => value & 0x00FF | previous & 0xFF00,
        };
        MovDelta {
            register: WORD_REGISTER_NAMES[slot],
            previous,
            current: self.values[slot],
        }
    }
}

#[test]
fn byte_writes_preserve_the_other_half() {
    let mut registers = RegisterFile::new();
    registers.mov_immediate(AX, Width::Word, 0x1234);

    let delta = registers.mov_immediate(Reg::from_bits(0), Width::Byte, 0xCC);
    assert_eq!(
        delta,
        MovDelta {
            register: "ax",
            previous: 0x1234,
            current: 0x12CC,
        }
    );

    let delta = registers.mov_immediate(Reg::from_bits(4), Width::Byte, 0xEE);
    assert_eq!(registers.get(0), 0xEECC);
    assert_eq!(delta.register, "ax");
}

#[test]
fn register_to_register_reads_the_selected_half() {
    let mut registers = RegisterFile::new();
    registers.mov_immediate(CX, Width::Word, 0xABCD);

    // mov bl, ch: source is the high half of cx
    let delta = registers.mov_register(Reg::from_bits(3), Reg::from_bits(5), Width::Byte);
    assert_eq!(delta.register, "bx");
    assert_eq!(delta.current, 0x00AB);

    // mov dh, cl: destination is the high half of dx
    let delta = registers.mov_register(Reg::from_bits(6), Reg::from_bits(1), Width::Byte);
    assert_eq!(delta.register, "dx");
    assert_eq!(delta.current, 0xCD00);
}

#[test]
fn delta_display() {
    let delta = MovDelta {
        register: "cx",
        previous: 0,
        current: 0x0C,
    };
    assert_eq!(delta.to_string(), "cx:0x0->0xc");
}

#[test]
fn register_names() {
    assert_eq!(AX.name(Width::Word), "ax");
    assert_eq!(AX.name(Width::Byte), "al");
    assert_eq!(SP.name(Width::Byte), "ah");
    assert_eq!(DI.word_name(), "di");
    assert_eq!(DS.to_string(), "ds");
}
