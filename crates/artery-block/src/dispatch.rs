//! Tag-driven encrypt/decrypt entry points.

use k256::{PublicKey, SecretKey};

use crate::block::StorageBlock;
use crate::error::BlockError;
use crate::types::EncryptionMethod;

/// Key material for a block transform.
#[derive(Debug, Clone, Copy)]
pub enum BlockKey<'a> {
    /// Salsa20 / XChaCha20 / internal. `hash_key` replaces `key` with its SHA-256.
    Stream {
        key: &'a [u8],
        hash_key: bool,
        nonce: &'a [u8],
    },
    /// Recipient key for the secp256k1 schemes.
    Public(&'a PublicKey),
    /// Own key for opening the secp256k1 schemes.
    Secret(&'a SecretKey),
}

impl<'a> BlockKey<'a> {
    fn stream(self) -> Result<(&'a [u8], bool, &'a [u8]), BlockError> {
        match self {
            Self::Stream {
                key,
                hash_key,
                nonce,
            } => Ok((key, hash_key, nonce)),
            _ => Err(BlockError::KeyMismatch("stream key")),
        }
    }

    fn public(self) -> Result<&'a PublicKey, BlockError> {
        match self {
            Self::Public(key) => Ok(key),
            _ => Err(BlockError::KeyMismatch("public key")),
        }
    }

    fn secret(self) -> Result<&'a SecretKey, BlockError> {
        match self {
            Self::Secret(key) => Ok(key),
            _ => Err(BlockError::KeyMismatch("secret key")),
        }
    }
}

impl StorageBlock {
    /// Encrypt the payload with `method`. Raw leaves the block untouched.
    pub fn encrypt(
        &mut self,
        method: EncryptionMethod,
        key: BlockKey<'_>,
    ) -> Result<(), BlockError> {
        match method {
            EncryptionMethod::Raw => Ok(()),
            EncryptionMethod::Internal => {
                let (key, hash_key, nonce) = key.stream()?;
                self.encrypt_internal(key, hash_key, nonce)
            }
            EncryptionMethod::Salsa20 => {
                let (key, hash_key, nonce) = key.stream()?;
                self.xor_salsa20(key, hash_key, nonce)
            }
            EncryptionMethod::XChaCha20 => {
                let (key, hash_key, nonce) = key.stream()?;
                self.xor_xchacha20(key, hash_key, nonce)
            }
            EncryptionMethod::Secp256 => self.encrypt_secp256(key.public()?),
            EncryptionMethod::Secp256XChaCha20 => self.encrypt_secp256_xchacha20(key.public()?),
            EncryptionMethod::Secp256XChaCha20Poly1305 | EncryptionMethod::Unknown(_) => {
                Err(BlockError::UnsupportedEncryptionMethod(method.as_byte()))
            }
        }
    }

    /// Decrypt the payload according to the header's encryption tag.
    ///
    /// The tag is not reset, and the signature is not checked; call
    /// [`StorageBlock::verify_sign`] afterwards.
    pub fn decrypt(&mut self, key: BlockKey<'_>) -> Result<(), BlockError> {
        let method = self.encryption();
        tracing::debug!(method = method.as_byte(), len = self.payload_len(), "decrypting block");
        match method {
            EncryptionMethod::Raw => Ok(()),
            EncryptionMethod::Internal => {
                let (key, hash_key, nonce) = key.stream()?;
                self.decrypt_internal(key, hash_key, nonce)
            }
            EncryptionMethod::Salsa20 => {
                let (key, hash_key, nonce) = key.stream()?;
                self.decrypt_salsa20(key, hash_key, nonce)
            }
            EncryptionMethod::XChaCha20 => {
                let (key, hash_key, nonce) = key.stream()?;
                self.xor_xchacha20(key, hash_key, nonce)
            }
            EncryptionMethod::Secp256 => self.decrypt_secp256(key.secret()?),
            EncryptionMethod::Secp256XChaCha20 => self.decrypt_secp256_xchacha20(key.secret()?),
            EncryptionMethod::Secp256XChaCha20Poly1305 | EncryptionMethod::Unknown(_) => {
                Err(BlockError::UnsupportedEncryptionMethod(method.as_byte()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use artery_crypto::generate_keypair;

    const STREAM: BlockKey<'static> = BlockKey::Stream {
        key: b"shared passphrase",
        hash_key: true,
        nonce: &[0x11; 24],
    };

    const SALSA: BlockKey<'static> = BlockKey::Stream {
        key: &[0x22; 32],
        hash_key: false,
        nonce: &[0x33; 8],
    };

    #[test]
    fn stream_methods_round_trip() {
        for (method, key) in [
            (EncryptionMethod::Internal, SALSA),
            (EncryptionMethod::Salsa20, SALSA),
            (EncryptionMethod::XChaCha20, STREAM),
        ] {
            let mut block = StorageBlock::from_data(b"dispatch me");
            block.encrypt(method, key).unwrap();
            assert_eq!(block.encryption(), method);
            block.decrypt(key).unwrap();
            assert_eq!(block.data().unwrap(), b"dispatch me", "{:?}", method);
            assert!(block.verify_sign().is_ok());
        }
    }

    #[test]
    fn secp_methods_round_trip() {
        let secret = generate_keypair().unwrap();
        let public = secret.public_key();
        for method in [EncryptionMethod::Secp256, EncryptionMethod::Secp256XChaCha20] {
            let mut block = StorageBlock::from_data(b"asymmetric dispatch");
            block.encrypt(method, BlockKey::Public(&public)).unwrap();
            assert_eq!(block.encryption(), method);
            block.decrypt(BlockKey::Secret(&secret)).unwrap();
            assert_eq!(block.data().unwrap(), b"asymmetric dispatch");
            assert!(block.verify_sign().is_ok());
        }
    }

    #[test]
    fn raw_is_noop() {
        let mut block = StorageBlock::from_data(b"plain");
        block.encrypt(EncryptionMethod::Raw, SALSA).unwrap();
        block.decrypt(SALSA).unwrap();
        assert_eq!(block.data().unwrap(), b"plain");
        assert_eq!(block.encryption(), EncryptionMethod::Raw);
    }

    #[test]
    fn reserved_and_unknown_methods_fail() {
        let mut block = StorageBlock::from_data(b"x");
        assert!(matches!(
            block.encrypt(EncryptionMethod::Secp256XChaCha20Poly1305, SALSA),
            Err(BlockError::UnsupportedEncryptionMethod(6))
        ));

        block.set_encryption(EncryptionMethod::Unknown(0x20));
        assert!(matches!(
            block.decrypt(SALSA),
            Err(BlockError::UnsupportedEncryptionMethod(0x20))
        ));
    }

    #[test]
    fn wrong_key_kind_fails() {
        let secret = generate_keypair().unwrap();
        let mut block = StorageBlock::from_data(b"x");
        assert!(matches!(
            block.encrypt(EncryptionMethod::Secp256, SALSA),
            Err(BlockError::KeyMismatch("public key"))
        ));
        assert!(matches!(
            block.encrypt(EncryptionMethod::Salsa20, BlockKey::Secret(&secret)),
            Err(BlockError::KeyMismatch("stream key"))
        ));

        block.set_encryption(EncryptionMethod::Secp256XChaCha20);
        assert!(matches!(
            block.decrypt(BlockKey::Public(&secret.public_key())),
            Err(BlockError::KeyMismatch("secret key"))
        ));
    }
}
