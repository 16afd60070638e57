//! Byte string ⇄ numeric block envelope.
//!
//! Format: [version=1:1B][length:2B BE][payload][CSPRNG pad to a multiple of 32B]
//! Split into 32-byte big-endian numbers; produces ceil((3 + n) / 32) of them.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::CodecError;
use crate::number::{number_from_bytes, number_to_bytes};
use crate::random::fill_random;
use crate::types::{
    Number, BLOCK_SIZE, ENVELOPE_HEADER_SIZE, MAX_MESSAGE_LENGTH, PROTOCOL_VERSION,
};

/// Encode bytes into envelope numbers.
pub fn bytes_to_numbers(bytes: &[u8]) -> Result<Vec<Number>, CodecError> {
    let n = bytes.len();
    if n > MAX_MESSAGE_LENGTH {
        return Err(CodecError::OversizedInput {
            len: n,
            max: MAX_MESSAGE_LENGTH,
        });
    }

    let total = ENVELOPE_HEADER_SIZE + n;
    let mut framed = Vec::with_capacity(total.div_ceil(BLOCK_SIZE) * BLOCK_SIZE);
    framed.push(PROTOCOL_VERSION);
    framed.extend_from_slice(&(n as u16).to_be_bytes());
    framed.extend_from_slice(bytes);

    let tail = framed.len() % BLOCK_SIZE;
    if tail != 0 {
        let start = framed.len();
        framed.resize(start + BLOCK_SIZE - tail, 0);
        fill_random(&mut framed[start..])?;
    }

    Ok(framed
        .chunks_exact(BLOCK_SIZE)
        .map(|chunk| {
            let mut block = [0u8; BLOCK_SIZE];
            block.copy_from_slice(chunk);
            number_from_bytes(block)
        })
        .collect())
}

/// Decode envelope numbers back into the original bytes.
pub fn numbers_to_bytes(numbers: &[Number]) -> Result<Vec<u8>, CodecError> {
    let first = numbers.first().ok_or(CodecError::EmptyInput)?;
    let head = number_to_bytes(first);

    let version = head[0];
    if version != PROTOCOL_VERSION {
        return Err(CodecError::UnsupportedProtocolVersion(version));
    }

    let declared = u16::from_be_bytes([head[1], head[2]]) as usize;
    let capacity = numbers.len() * BLOCK_SIZE;
    let needed = ENVELOPE_HEADER_SIZE + declared;
    if capacity < needed || capacity - needed >= BLOCK_SIZE {
        return Err(CodecError::LengthMismatch {
            declared,
            blocks: numbers.len(),
        });
    }

    let mut framed = Vec::with_capacity(capacity);
    for n in numbers {
        framed.extend_from_slice(&number_to_bytes(n));
    }
    framed.truncate(needed);
    Ok(framed.split_off(ENVELOPE_HEADER_SIZE))
}

/// Encode a value as JSON and then as envelope numbers.
pub fn object_to_numbers<T: Serialize>(value: &T) -> Result<Vec<Number>, CodecError> {
    let json = serde_json::to_vec(value)?;
    bytes_to_numbers(&json)
}

/// Decode envelope numbers carrying a JSON value.
pub fn numbers_to_object<T: DeserializeOwned>(numbers: &[Number]) -> Result<T, CodecError> {
    let json = numbers_to_bytes(numbers)?;
    Ok(serde_json::from_slice(&json)?)
}
