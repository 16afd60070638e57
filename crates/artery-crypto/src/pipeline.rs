//! Composed secp256k1 message encryption.
//!
//! Encode: bytes → envelope numbers → raw points → masked points → bitmap + x → base64-like
//! Decode: base64-like → bitmap + x → masked points → raw points → envelope numbers → bytes

use k256::{PublicKey, SecretKey};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::base64like::{message_to_numbers, numbers_to_message};
use crate::cipher::{decrypt_points, encrypt_points};
use crate::error::CodecError;
use crate::message::{bytes_to_numbers, numbers_to_bytes, numbers_to_object, object_to_numbers};
use crate::points::{numbers_to_raw_points, raw_points_to_numbers};
use crate::serializer::{crypto_points_to_numbers, numbers_to_crypto_points};
use crate::types::Number;

fn encode_numbers(public_key: &PublicKey, numbers: &[Number]) -> Result<String, CodecError> {
    let raw = numbers_to_raw_points(numbers);
    tracing::trace!(numbers = numbers.len(), points = raw.len(), "mapped numbers to points");
    let masked = encrypt_points(public_key, &raw)?;
    let serialized = crypto_points_to_numbers(&masked)?;
    Ok(numbers_to_message(&serialized))
}

fn decode_numbers(secret_key: &SecretKey, message: &str) -> Result<Vec<Number>, CodecError> {
    let serialized = message_to_numbers(message)?;
    let masked = numbers_to_crypto_points(&serialized)?;
    let raw = decrypt_points(secret_key, &masked)?;
    tracing::trace!(points = raw.len(), "unmasked points");
    raw_points_to_numbers(&raw)
}

/// Encrypt a byte string for `public_key` into a base64-like message.
pub fn encode_buffer(public_key: &PublicKey, data: &[u8]) -> Result<String, CodecError> {
    let numbers = bytes_to_numbers(data)?;
    encode_numbers(public_key, &numbers)
}

/// Decrypt a message produced by [`encode_buffer`].
pub fn decode_buffer(secret_key: &SecretKey, message: &str) -> Result<Vec<u8>, CodecError> {
    let numbers = decode_numbers(secret_key, message)?;
    numbers_to_bytes(&numbers)
}

/// Encrypt a serializable value (as JSON) for `public_key`.
pub fn encode_object<T: Serialize>(public_key: &PublicKey, value: &T) -> Result<String, CodecError> {
    let numbers = object_to_numbers(value)?;
    encode_numbers(public_key, &numbers)
}

/// Decrypt a message produced by [`encode_object`].
pub fn decode_object<T: DeserializeOwned>(
    secret_key: &SecretKey,
    message: &str,
) -> Result<T, CodecError> {
    let numbers = decode_numbers(secret_key, message)?;
    numbers_to_object(&numbers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cipher::generate_keypair;
    use crate::random::random_bytes;
    use serde::Deserialize;

    #[test]
    fn buffer_round_trip() {
        let secret = generate_keypair().unwrap();
        for len in [0usize, 1, 29, 64, 500] {
            let data = random_bytes(len).unwrap();
            let message = encode_buffer(&secret.public_key(), &data).unwrap();
            assert_eq!(decode_buffer(&secret, &message).unwrap(), data, "len {}", len);
        }
    }

    #[test]
    fn message_is_base64() {
        let secret = generate_keypair().unwrap();
        let message = encode_buffer(&secret.public_key(), b"hello").unwrap();
        assert!(message
            .bytes()
            .all(|c| c.is_ascii_alphanumeric() || c == b'+' || c == b'/' || c == b'='));
    }

    #[test]
    fn zero_blocks_round_trip() {
        // 32 aligned zero bytes produce a zero number, which escapes through decoys
        let secret = generate_keypair().unwrap();
        let mut data = vec![0x11u8; 29];
        data.extend_from_slice(&[0u8; 32]);
        let message = encode_buffer(&secret.public_key(), &data).unwrap();
        assert_eq!(decode_buffer(&secret, &message).unwrap(), data);
    }

    #[test]
    fn zero_filled_buffers_round_trip() {
        let secret = generate_keypair().unwrap();
        for len in [96, 128, 512] {
            let data = vec![0u8; len];
            let message = encode_buffer(&secret.public_key(), &data).unwrap();
            assert_eq!(decode_buffer(&secret, &message).unwrap(), data);
        }
    }

    #[test]
    fn wrong_key_fails_or_garbles() {
        let secret = generate_keypair().unwrap();
        let other = generate_keypair().unwrap();
        let data = b"for the right recipient only".to_vec();
        let message = encode_buffer(&secret.public_key(), &data).unwrap();
        if let Ok(decoded) = decode_buffer(&other, &message) {
            assert_ne!(decoded, data);
        }
    }

    #[test]
    fn oversized_payload_exceeds_point_budget() {
        let secret = generate_keypair().unwrap();
        let data = vec![0x42u8; 9000];
        assert!(matches!(
            encode_buffer(&secret.public_key(), &data),
            Err(CodecError::TooManyPoints { .. })
        ));
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Contact {
        name: String,
        address: String,
        tags: Vec<String>,
    }

    #[test]
    fn object_round_trip() {
        let secret = generate_keypair().unwrap();
        let contact = Contact {
            name: "alice".to_string(),
            address: "0x4b00a7cd".to_string(),
            tags: vec!["friend".to_string()],
        };
        let message = encode_object(&secret.public_key(), &contact).unwrap();
        let decoded: Contact = decode_object(&secret, &message).unwrap();
        assert_eq!(decoded, contact);
    }
}
