//! secp256k1 block schemes.
//!
//! Secp256:          payload = seal([salt_len:1][salt][plaintext])
//! Secp256XChaCha20: payload = [params_len:2 BE][seal(params)][XChaCha20(key, nonce, salt ‖ plaintext)]
//!                   params  = [salt_len:1][salt][key:32][nonce:24]
//!
//! `seal` is the point-encoding pipeline, stored as the raw bytes behind its
//! base64-like text. Salts are 16..=31 random bytes; key and nonce are fresh
//! for every call. The hybrid salt travels twice, and decryption checks that
//! both copies agree.

use artery_crypto::{decode_buffer, encode_buffer, fill_random};
use base64ct::{Base64, Encoding};
use k256::{PublicKey, SecretKey};
use zeroize::Zeroize;

use crate::block::StorageBlock;
use crate::error::BlockError;
use crate::stream::apply_xchacha20;
use crate::types::{
    EncryptionMethod, MIN_SALT_LENGTH, PARAMS_LENGTH_PREFIX, SALT_LENGTH_SPREAD,
    STREAM_KEY_LENGTH, XCHACHA20_NONCE_LENGTH,
};

fn random_salt_length() -> Result<usize, BlockError> {
    let mut b = [0u8; 1];
    fill_random(&mut b)?;
    Ok(MIN_SALT_LENGTH + b[0] as usize % SALT_LENGTH_SPREAD)
}

fn seal(public_key: &PublicKey, plain: &[u8]) -> Result<Vec<u8>, BlockError> {
    let message = encode_buffer(public_key, plain)?;
    Base64::decode_vec(&message).map_err(|e| BlockError::Base64Decode(e.to_string()))
}

fn open(secret_key: &SecretKey, sealed: &[u8]) -> Result<Vec<u8>, BlockError> {
    let message = Base64::encode_string(sealed);
    Ok(decode_buffer(secret_key, &message)?)
}

/// `[salt_len][salt]` followed by `tail` bytes of room.
fn salted_prefix(tail: usize) -> Result<Vec<u8>, BlockError> {
    let salt_len = random_salt_length()?;
    let mut buf = vec![0u8; 1 + salt_len];
    buf[0] = salt_len as u8;
    fill_random(&mut buf[1..])?;
    buf.reserve(tail);
    Ok(buf)
}

impl StorageBlock {
    /// Encrypt the payload for `public_key` with the point-encoding pipeline.
    pub fn encrypt_secp256(&mut self, public_key: &PublicKey) -> Result<(), BlockError> {
        let data = self.payload()?;
        let mut framed = salted_prefix(data.len())?;
        framed.extend_from_slice(data);

        let sealed = seal(public_key, &framed);
        framed.zeroize();
        let sealed = sealed?;

        tracing::debug!(plain = self.payload_len(), sealed = sealed.len(), "secp256 block payload");
        self.replace_payload(sealed);
        self.set_encryption(EncryptionMethod::Secp256);
        Ok(())
    }

    /// Inverse of [`StorageBlock::encrypt_secp256`]. The tag is left unchanged.
    pub fn decrypt_secp256(&mut self, secret_key: &SecretKey) -> Result<(), BlockError> {
        let mut opened = open(secret_key, self.payload()?)?;
        let salt_len = opened
            .first()
            .copied()
            .ok_or_else(|| BlockError::Truncated("empty secp256 plaintext".to_string()))?
            as usize;
        if opened.len() < 1 + salt_len {
            opened.zeroize();
            return Err(BlockError::Truncated(format!(
                "salt of {} bytes exceeds plaintext",
                salt_len
            )));
        }

        let plain = opened.split_off(1 + salt_len);
        opened.zeroize();
        self.replace_payload(plain);
        Ok(())
    }

    /// Hybrid: XChaCha20 for the payload, the point pipeline for salt, key and nonce.
    pub fn encrypt_secp256_xchacha20(&mut self, public_key: &PublicKey) -> Result<(), BlockError> {
        let data = self.payload()?;

        let mut params = salted_prefix(STREAM_KEY_LENGTH + XCHACHA20_NONCE_LENGTH)?;
        let salt_end = params.len();
        params.resize(salt_end + STREAM_KEY_LENGTH + XCHACHA20_NONCE_LENGTH, 0);
        if let Err(e) = fill_random(&mut params[salt_end..]) {
            params.zeroize();
            return Err(e.into());
        }

        let (key, nonce) = params[salt_end..].split_at(STREAM_KEY_LENGTH);
        let mut bulk = Vec::with_capacity(salt_end - 1 + data.len());
        bulk.extend_from_slice(&params[1..salt_end]);
        bulk.extend_from_slice(data);
        let streamed = apply_xchacha20(&mut bulk, key, false, nonce);

        let sealed = streamed.and_then(|()| seal(public_key, &params));
        params.zeroize();
        let sealed = sealed?;

        // At most 257 numbers of 32 bytes, well inside u16
        let mut payload = Vec::with_capacity(PARAMS_LENGTH_PREFIX + sealed.len() + bulk.len());
        payload.extend_from_slice(&(sealed.len() as u16).to_be_bytes());
        payload.extend_from_slice(&sealed);
        payload.extend_from_slice(&bulk);

        tracing::debug!(
            plain = self.payload_len(),
            params = sealed.len(),
            bulk = bulk.len(),
            "secp256+xchacha20 block payload"
        );
        self.replace_payload(payload);
        self.set_encryption(EncryptionMethod::Secp256XChaCha20);
        Ok(())
    }

    /// Inverse of [`StorageBlock::encrypt_secp256_xchacha20`]. The tag is left unchanged.
    pub fn decrypt_secp256_xchacha20(&mut self, secret_key: &SecretKey) -> Result<(), BlockError> {
        let payload = self.payload()?;
        if payload.len() < PARAMS_LENGTH_PREFIX {
            return Err(BlockError::Truncated("missing parameter length".to_string()));
        }
        let params_len = u16::from_be_bytes([payload[0], payload[1]]) as usize;
        let body = &payload[PARAMS_LENGTH_PREFIX..];
        if body.len() < params_len {
            return Err(BlockError::Truncated(format!(
                "declared {} parameter bytes, got {}",
                params_len,
                body.len()
            )));
        }
        let (sealed, bulk) = body.split_at(params_len);

        let mut params = open(secret_key, sealed)?;
        let salt_len = params.first().copied().unwrap_or_default() as usize;
        let key_start = 1 + salt_len;
        let nonce_start = key_start + STREAM_KEY_LENGTH;
        let params_end = nonce_start + XCHACHA20_NONCE_LENGTH;
        if params.len() < params_end {
            params.zeroize();
            return Err(BlockError::Truncated(format!(
                "parameters need {} bytes, got {}",
                params_end,
                params.len()
            )));
        }

        if bulk.len() < salt_len {
            params.zeroize();
            return Err(BlockError::Truncated(format!(
                "salt of {} bytes exceeds ciphertext",
                salt_len
            )));
        }

        let mut plain = bulk.to_vec();
        let streamed = apply_xchacha20(
            &mut plain,
            &params[key_start..nonce_start],
            false,
            &params[nonce_start..params_end],
        );
        let salt_matches = plain[..salt_len] == params[1..key_start];
        params.zeroize();
        streamed?;
        if !salt_matches {
            return Err(BlockError::SaltMismatch);
        }

        plain.drain(..salt_len);
        self.replace_payload(plain);
        Ok(())
    }
}
