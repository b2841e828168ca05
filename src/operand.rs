//! Operand width and effective-address rendering
//!
//! [`RmOperand`] is the only place operand text is constructed: given the
//! ModR/M mode, r/m field, width, optional segment override and the assembled
//! displacement, its `Display` impl produces the canonical bracketed form.

use core::fmt;
use std::fmt::Display;

use crate::{
    modrm::{Mode, ModRm},
    registers::{Reg, SegReg},
};

/// Effective-address base expressions, indexed by the 3-bit r/m field
pub const EFFECTIVE_ADDRESS_BASES: [&str; 8] = [
    "bx + si",
    "bx + di",
    "bp + si",
    "bp + di",
    "si",
    "di",
    "bp",
    "bx",
];

/// Operand width, from the W bit of the primary opcode byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Width {
    /// 8-bit operand
    Byte,
    /// 16-bit operand
    Word,
}

impl Width {
    /// Width selected by the low bit of `bit`
    #[must_use]
    pub const fn from_bit(bit: u8) -> Self {
        if bit & 0x01 != 0 {
            Self::Word
        } else {
            Self::Byte
        }
    }

    /// Accumulator name for this width
    #[must_use]
    pub const fn accumulator(self) -> &'static str {
        match self {
            Self::Byte => "al",
            Self::Word => "ax",
        }
    }
}

impl Display for Width {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Byte => "byte",
            Self::Word => "word",
        })
    }
}

/// A decoded r/m operand, ready for rendering.
///
/// The displacement is already assembled: 8-bit displacements arrive
/// sign-extended and 16-bit displacements are interpreted as signed
/// little-endian quantities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RmOperand {
    mode: Mode,
    rm: u8,
    width: Width,
    segment: Option<SegReg>,
    displacement: i16,
}

impl RmOperand {
    /// Builds the operand for a decoded ModR/M byte
    #[must_use]
    pub const fn new(
        modrm: ModRm,
        width: Width,
        segment: Option<SegReg>,
        displacement: i16,
    ) -> Self {
        Self {
            mode: modrm.mode(),
            rm: modrm.rm(),
            width,
            segment,
            displacement,
        }
    }

    /// Builds a direct-address memory operand (`[disp]`), as used by the
    /// accumulator load/store encodings
    #[must_use]
    pub const fn direct(displacement: i16, segment: Option<SegReg>) -> Self {
        Self {
            mode: Mode::MemNoDisp,
            rm: 6,
            width: Width::Word,
            segment,
            displacement,
        }
    }

    /// True for memory operands; false when the r/m field names a register
    #[must_use]
    pub fn is_memory(&self) -> bool {
        self.mode != Mode::Reg
    }
}

impl Display for RmOperand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.mode == Mode::Reg {
            return f.write_str(Reg::from_bits(self.rm).name(self.width));
        }

        f.write_str("[")?;
        if let Some(segment) = self.segment {
            write!(f, "{segment}:")?;
        }
        if self.mode == Mode::MemNoDisp && self.rm == 6 {
            write!(f, "{}", self.displacement)?;
        } else {
            f.write_str(EFFECTIVE_ADDRESS_BASES[self.rm as usize])?;
            if self.displacement != 0 {
                write!(f, " + {}", self.displacement)?;
            }
        }
        f.write_str("]")
    }
}
