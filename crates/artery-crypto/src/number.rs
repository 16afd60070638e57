//! Fixed-width big-endian codec for 256-bit numbers.

use k256::elliptic_curve::bigint::Encoding;

use crate::error::CodecError;
use crate::types::{Number, BLOCK_SIZE};

/// Interpret 32 bytes as a big-endian number.
pub fn number_from_bytes(bytes: [u8; BLOCK_SIZE]) -> Number {
    Number::from_be_bytes(bytes)
}

/// Serialize a number to exactly 32 big-endian bytes.
pub fn number_to_bytes(n: &Number) -> [u8; BLOCK_SIZE] {
    n.to_be_bytes()
}

/// Interpret up to 32 bytes as a big-endian number, left-padding with zeros.
pub fn number_from_be_slice(bytes: &[u8]) -> Result<Number, CodecError> {
    if bytes.len() > BLOCK_SIZE {
        return Err(CodecError::InvalidLength {
            expected: BLOCK_SIZE,
            got: bytes.len(),
        });
    }
    let mut buf = [0u8; BLOCK_SIZE];
    buf[BLOCK_SIZE - bytes.len()..].copy_from_slice(bytes);
    Ok(number_from_bytes(buf))
}

/// Least significant byte.
pub fn low_byte(n: &Number) -> u8 {
    number_to_bytes(n)[BLOCK_SIZE - 1]
}

/// Test bit `index` (0 = least significant).
pub fn is_bit_set(n: &Number, index: usize) -> bool {
    if index >= BLOCK_SIZE * 8 {
        return false;
    }
    let bytes = number_to_bytes(n);
    bytes[BLOCK_SIZE - 1 - index / 8] & (1 << (index % 8)) != 0
}

/// Copy of `n` with bit `index` set. Indices past 255 are ignored.
pub fn with_bit_set(n: &Number, index: usize) -> Number {
    if index >= BLOCK_SIZE * 8 {
        return *n;
    }
    let mut bytes = number_to_bytes(n);
    bytes[BLOCK_SIZE - 1 - index / 8] |= 1 << (index % 8);
    number_from_bytes(bytes)
}
