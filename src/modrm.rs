//! ModR/M byte fields

/// Addressing mode, taken from the top two bits of the ModR/M byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Memory operand without displacement (r/m = 6 is a direct address)
    MemNoDisp,
    /// Memory operand with a sign-extended 8-bit displacement
    MemDisp8,
    /// Memory operand with a 16-bit displacement
    MemDisp16,
    /// Register operand
    Reg,
}

impl Mode {
    pub(crate) const fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0 => Self::MemNoDisp,
            1 => Self::MemDisp8,
            2 => Self::MemDisp16,
            _ => Self::Reg,
        }
    }
}

/// A ModR/M byte: 2-bit mode, 3-bit reg field, 3-bit r/m field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModRm(u8);

impl ModRm {
    /// Addressing mode (bits 7:6)
    #[must_use]
    pub const fn mode(self) -> Mode {
        Mode::from_bits(self.0 >> 6)
    }

    /// Register or sub-opcode field (bits 5:3)
    #[must_use]
    pub const fn reg(self) -> u8 {
        self.0 >> 3 & 0x07
    }

    /// R/M field (bits 2:0)
    #[must_use]
    pub const fn rm(self) -> u8 {
        self.0 & 0x07
    }
}

impl From<u8> for ModRm {
    fn from(byte: u8) -> Self {
        Self(byte)
    }
}

#[test]
fn field_extraction() {
    let modrm = ModRm::from(0xD9);
    assert_eq!(modrm.mode(), Mode::Reg);
    assert_eq!(modrm.reg(), 0b011);
    assert_eq!(modrm.rm(), 0b001);

    let modrm = ModRm::from(0x47);
    assert_eq!(modrm.mode(), Mode::MemDisp8);
    assert_eq!(modrm.reg(), 0b000);
    assert_eq!(modrm.rm(), 0b111);
}

#[test]
fn all_modes() {
    assert_eq!(ModRm::from(0x06).mode(), Mode::MemNoDisp);
    assert_eq!(ModRm::from(0x46).mode(), Mode::MemDisp8);
    assert_eq!(ModRm::from(0x86).mode(), Mode::MemDisp16);
    assert_eq!(ModRm::from(0xC6).mode(), Mode::Reg);
}
