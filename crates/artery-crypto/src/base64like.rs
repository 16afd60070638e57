//! Base64 alphabet codec that works directly on the 256-bit number stream.
//!
//! The numbers are treated as one big-endian bitstream, regrouped into 6-bit
//! symbols, and padded with `=` by the usual base64 tail rules. The result is
//! byte-for-byte the standard padded base64 of the concatenated 32-byte blocks.

use crate::error::CodecError;
use crate::number::{number_from_bytes, number_to_bytes};
use crate::types::{Number, BLOCK_SIZE};

const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

fn sextet(c: u8) -> Option<u8> {
    match c {
        b'A'..=b'Z' => Some(c - b'A'),
        b'a'..=b'z' => Some(c - b'a' + 26),
        b'0'..=b'9' => Some(c - b'0' + 52),
        b'+' => Some(62),
        b'/' => Some(63),
        _ => None,
    }
}

/// Incremental encoder: push numbers one at a time, then `finish`.
#[derive(Debug, Default)]
pub struct MessageEncoder {
    output: String,
    carry: u32,
    carry_bits: u32,
}

impl MessageEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one 256-bit block to the stream.
    pub fn push(&mut self, n: &Number) {
        for byte in number_to_bytes(n) {
            self.carry = (self.carry << 8) | byte as u32;
            self.carry_bits += 8;
            while self.carry_bits >= 6 {
                self.carry_bits -= 6;
                let index = (self.carry >> self.carry_bits) & 0x3f;
                self.output.push(ALPHABET[index as usize] as char);
            }
            self.carry &= (1 << self.carry_bits) - 1;
        }
    }

    /// Flush the trailing bits and padding.
    pub fn finish(mut self) -> String {
        match self.carry_bits {
            2 => {
                let index = (self.carry << 4) & 0x3f;
                self.output.push(ALPHABET[index as usize] as char);
                self.output.push_str("==");
            }
            4 => {
                let index = (self.carry << 2) & 0x3f;
                self.output.push(ALPHABET[index as usize] as char);
                self.output.push('=');
            }
            _ => {}
        }
        self.output
    }
}

/// Encode a number sequence as a base64-like message.
pub fn numbers_to_message(numbers: &[Number]) -> String {
    let mut encoder = MessageEncoder::new();
    for n in numbers {
        encoder.push(n);
    }
    encoder.finish()
}

/// Decode a base64-like message back into whole 256-bit numbers.
pub fn message_to_numbers(message: &str) -> Result<Vec<Number>, CodecError> {
    let symbols = message.trim_end_matches('=');
    let mut numbers = Vec::with_capacity(symbols.len() * 6 / (BLOCK_SIZE * 8) + 1);
    let mut block = [0u8; BLOCK_SIZE];
    let mut filled = 0usize;
    let mut carry = 0u32;
    let mut carry_bits = 0u32;

    for (pos, c) in symbols.bytes().enumerate() {
        let value = sextet(c).ok_or_else(|| {
            CodecError::InvalidEncoding(format!(
                "invalid character {:?} at position {}",
                c as char, pos
            ))
        })?;
        carry = (carry << 6) | value as u32;
        carry_bits += 6;
        if carry_bits >= 8 {
            carry_bits -= 8;
            block[filled] = (carry >> carry_bits) as u8;
            carry &= (1 << carry_bits) - 1;
            filled += 1;
            if filled == BLOCK_SIZE {
                numbers.push(number_from_bytes(block));
                filled = 0;
            }
        }
    }

    if filled != 0 {
        return Err(CodecError::InvalidEncoding(format!(
            "trailing {} bytes do not form a whole block",
            filled
        )));
    }

    Ok(numbers)
}
