//! Text emission
//!
//! Renders a [`Disassembly`] in the canonical layout: the `bits 16` banner,
//! instructions interleaved with their labels and simulator trace lines, any
//! leftover labels, then the final register dump.

use std::io::{self, Write};

use crate::{decode::Disassembly, labels::Labels};

/// Writes the full decoded stream to `out`
pub fn emit<W: Write>(out: &mut W, disassembly: &Disassembly) -> io::Result<()> {
    writeln!(out, "bits 16")?;

    let mut labels = Labels::new(&disassembly.instructions);
    for instruction in &disassembly.instructions {
        while let Some(target) = labels.due(instruction.address() as i32) {
            writeln!(out, "label_{target}:")?;
        }
        match instruction.jump_target() {
            Some(target) => writeln!(out, "{instruction} label_{target}")?,
            None => writeln!(out, "{instruction}")?,
        }
        if let Some(trace) = instruction.trace() {
            writeln!(out, "{trace}")?;
        }
    }
    while let Some(target) = labels.remaining() {
        writeln!(out, "label_{target}:")?;
    }

    writeln!(out)?;
    writeln!(out, "Final registers:")?;
    for (name, value) in disassembly.registers.word_registers() {
        writeln!(out, "{name}: 0x{value:04x} ({value})")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::emit;
    use crate::decode::disassemble;

    fn emitted(bytes: &[u8]) -> String {
        let mut out = Vec::new();
        emit(&mut out, &disassemble(bytes)).expect("write to vec");
        String::from_utf8(out).expect("utf-8")
    }

    #[test]
    fn banner_labels_and_register_dump() {
        let output = emitted(&[0x75, 0x02, 0xEB, 0xFC]);
        assert_eq!(
            output,
            "bits 16\n\
             label_0:\n\
             jne label_4\n\
             jmp label_0\n\
             label_4:\n\
             \n\
             Final registers:\n\
             ax: 0x0000 (0)\n\
             cx: 0x0000 (0)\n\
             dx: 0x0000 (0)\n\
             bx: 0x0000 (0)\n\
             sp: 0x0000 (0)\n\
             bp: 0x0000 (0)\n\
             si: 0x0000 (0)\n\
             di: 0x0000 (0)\n"
        );
    }

    #[test]
    fn trace_lines_follow_their_instruction() {
        let output = emitted(&[0xB1, 0x0C]);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "bits 16");
        assert_eq!(lines[1], "mov cl, 12");
        assert_eq!(lines[2], "mov cl, 12 ; cx:0x0->0xc");
        assert!(lines.contains(&"cx: 0x000c (12)"));
    }
}
