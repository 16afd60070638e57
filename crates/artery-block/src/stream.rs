//! Keystream XOR for Salsa20 and XChaCha20 block payloads.
//!
//! Keys are either raw 32-byte keys or SHA-256 of arbitrary key material.
//! Encryption and decryption are the same operation.

use chacha20::XChaCha20;
use salsa20::cipher::{KeyIvInit, StreamCipher};
use salsa20::Salsa20;
use sha2::{Digest, Sha256};
use zeroize::Zeroize;

use crate::block::StorageBlock;
use crate::error::BlockError;
use crate::types::{
    EncryptionMethod, SALSA20_NONCE_LENGTH, STREAM_KEY_LENGTH, XCHACHA20_NONCE_LENGTH,
};

fn resolve_key(key: &[u8], hash_key: bool) -> Result<[u8; STREAM_KEY_LENGTH], BlockError> {
    if hash_key {
        return Ok(Sha256::digest(key).into());
    }
    key.try_into().map_err(|_| BlockError::InvalidKeyLength {
        expected: STREAM_KEY_LENGTH,
        got: key.len(),
    })
}

fn check_nonce(nonce: &[u8], expected: usize) -> Result<(), BlockError> {
    if nonce.is_empty() {
        return Err(BlockError::MissingNonce);
    }
    if nonce.len() != expected {
        return Err(BlockError::InvalidNonceLength {
            expected,
            got: nonce.len(),
        });
    }
    Ok(())
}

fn apply<C: KeyIvInit + StreamCipher>(
    data: &mut [u8],
    key: &[u8],
    hash_key: bool,
    nonce: &[u8],
    nonce_len: usize,
) -> Result<(), BlockError> {
    check_nonce(nonce, nonce_len)?;
    let mut key = resolve_key(key, hash_key)?;
    let cipher = C::new_from_slices(&key, nonce);
    key.zeroize();
    let mut cipher = cipher.map_err(|_| BlockError::InvalidNonceLength {
        expected: nonce_len,
        got: nonce.len(),
    })?;
    cipher.apply_keystream(data);
    Ok(())
}

/// XOR `data` with the Salsa20 keystream (8-byte nonce).
pub fn apply_salsa20(
    data: &mut [u8],
    key: &[u8],
    hash_key: bool,
    nonce: &[u8],
) -> Result<(), BlockError> {
    apply::<Salsa20>(data, key, hash_key, nonce, SALSA20_NONCE_LENGTH)
}

/// XOR `data` with the XChaCha20 keystream (24-byte nonce).
pub fn apply_xchacha20(
    data: &mut [u8],
    key: &[u8],
    hash_key: bool,
    nonce: &[u8],
) -> Result<(), BlockError> {
    apply::<XChaCha20>(data, key, hash_key, nonce, XCHACHA20_NONCE_LENGTH)
}

impl StorageBlock {
    /// Salsa20 the payload in place and tag it as Salsa20.
    pub fn xor_salsa20(
        &mut self,
        key: &[u8],
        hash_key: bool,
        nonce: &[u8],
    ) -> Result<(), BlockError> {
        apply_salsa20(self.payload_mut()?, key, hash_key, nonce)?;
        self.set_encryption(EncryptionMethod::Salsa20);
        tracing::debug!(len = self.payload_len(), hash_key, "salsa20 block payload");
        Ok(())
    }

    pub fn encrypt_salsa20(
        &mut self,
        key: &[u8],
        hash_key: bool,
        nonce: &[u8],
    ) -> Result<(), BlockError> {
        self.xor_salsa20(key, hash_key, nonce)
    }

    pub fn decrypt_salsa20(
        &mut self,
        key: &[u8],
        hash_key: bool,
        nonce: &[u8],
    ) -> Result<(), BlockError> {
        self.xor_salsa20(key, hash_key, nonce)
    }

    /// Salsa20 under the internal test tag.
    pub fn encrypt_internal(
        &mut self,
        key: &[u8],
        hash_key: bool,
        nonce: &[u8],
    ) -> Result<(), BlockError> {
        apply_salsa20(self.payload_mut()?, key, hash_key, nonce)?;
        self.set_encryption(EncryptionMethod::Internal);
        Ok(())
    }

    pub fn decrypt_internal(
        &mut self,
        key: &[u8],
        hash_key: bool,
        nonce: &[u8],
    ) -> Result<(), BlockError> {
        apply_salsa20(self.payload_mut()?, key, hash_key, nonce)
    }

    /// XChaCha20 the payload in place and tag it as XChaCha20.
    pub fn xor_xchacha20(
        &mut self,
        key: &[u8],
        hash_key: bool,
        nonce: &[u8],
    ) -> Result<(), BlockError> {
        apply_xchacha20(self.payload_mut()?, key, hash_key, nonce)?;
        self.set_encryption(EncryptionMethod::XChaCha20);
        tracing::debug!(len = self.payload_len(), hash_key, "xchacha20 block payload");
        Ok(())
    }
}
