use dis86::{
    cursor::ByteCursor,
    decode::{decode_one, disassemble, DecodeError},
    emit::emit,
    instruction::Instruction,
    registers::RegisterFile,
};

/// Decodes exactly one instruction from the start of `bytes`
#[allow(dead_code)]
pub fn decode(bytes: &[u8]) -> Result<Instruction, DecodeError> {
    let mut cursor = ByteCursor::new(bytes);
    let mut registers = RegisterFile::new();
    decode_one(&mut cursor, &mut registers)
}

/// Rendered text of the first instruction in `bytes`
#[allow(dead_code)]
pub fn text(bytes: &[u8]) -> String {
    decode(bytes)
        .expect("decodable instruction")
        .text()
        .to_owned()
}

/// Full emitted output for `bytes`
#[allow(dead_code)]
pub fn emitted(bytes: &[u8]) -> String {
    let mut out = Vec::new();
    emit(&mut out, &disassemble(bytes)).expect("write to vec");
    String::from_utf8(out).expect("utf-8 output")
}
