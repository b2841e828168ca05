//! Bounded view over the input byte stream

use crate::decode::DecodeError;

/// Read cursor over the raw machine-code image.
///
/// Tracks an absolute position; every read past the end of the image fails
/// with [`DecodeError::Truncated`] carrying the out-of-range offset.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> ByteCursor<'a> {
    /// Creates a cursor positioned at the start of `bytes`
    #[must_use]
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    /// Byte at `position() + k`, without advancing
    pub fn peek(&self, k: usize) -> Result<u8, DecodeError> {
        let offset = self.position + k;
        self.bytes
            .get(offset)
            .copied()
            .ok_or(DecodeError::Truncated { offset })
    }

    /// Little-endian word at `position() + k`, without advancing
    pub fn peek_u16(&self, k: usize) -> Result<u16, DecodeError> {
        Ok(u16::from_le_bytes([self.peek(k)?, self.peek(k + 1)?]))
    }

    /// Moves the position forward by `n` bytes
    pub fn advance(&mut self, n: usize) {
        self.position += n;
    }

    /// Current absolute offset into the image
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// True once every input byte has been consumed
    #[must_use]
    pub const fn is_at_end(&self) -> bool {
        self.position >= self.bytes.len()
    }
}

#[test]
fn peek_and_advance() -> Result<(), DecodeError> {
    let mut cursor = ByteCursor::new(&[0x89, 0xD9, 0x10]);
    assert_eq!(cursor.peek(0)?, 0x89);
    assert_eq!(cursor.peek(2)?, 0x10);
    assert_eq!(cursor.peek_u16(1)?, 0x10D9);
    cursor.advance(2);
    assert_eq!(cursor.position(), 2);
    assert_eq!(cursor.peek(0)?, 0x10);
    cursor.advance(1);
    assert!(cursor.is_at_end());
    Ok(())
}

#[test]
fn peek_past_end_is_truncated() {
    let cursor = ByteCursor::new(&[0xB1]);
    assert_eq!(cursor.peek(1), Err(DecodeError::Truncated { offset: 1 }));
    assert_eq!(
        cursor.peek_u16(0),
        Err(DecodeError::Truncated { offset: 1 })
    );
}
