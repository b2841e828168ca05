//! Captured instruction records

use core::fmt;
use std::fmt::Display;

/// One decoded instruction.
///
/// Records are append-only: the decoder captures them in input order and they
/// are never mutated afterwards. The text is the complete assembly line
/// (prefixes included) without a trailing newline; jump records carry the
/// absolute target instead of a textual operand, which the emitter renders as
/// ` label_<target>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    address: usize,
    text: String,
    jump_target: Option<i32>,
    trace: Option<String>,
}

impl Instruction {
    pub(crate) fn new(address: usize, text: String) -> Self {
        Self {
            address,
            text,
            jump_target: None,
            trace: None,
        }
    }

    pub(crate) fn with_jump_target(mut self, target: i32) -> Self {
        self.jump_target = Some(target);
        self
    }

    pub(crate) fn with_trace(mut self, trace: String) -> Self {
        self.trace = Some(trace);
        self
    }

    /// Offset of the instruction's first byte (prefixes included)
    #[must_use]
    pub const fn address(&self) -> usize {
        self.address
    }

    /// Rendered assembly text
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// True for short jumps carrying a label target
    #[must_use]
    pub const fn is_jump(&self) -> bool {
        self.jump_target.is_some()
    }

    /// Absolute jump target, when this record is a short jump
    #[must_use]
    pub const fn jump_target(&self) -> Option<i32> {
        self.jump_target
    }

    /// Simulator trace line, when this instruction updated a register
    #[must_use]
    pub fn trace(&self) -> Option<&str> {
        self.trace.as_deref()
    }
}

impl Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
