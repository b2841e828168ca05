#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod cursor;
pub mod decode;
pub mod emit;
pub mod instruction;
pub mod labels;
pub mod modrm;
pub mod operand;
pub mod registers;
