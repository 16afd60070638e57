use artery_crypto::CodecError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BlockError {
    #[error("Nonce is required")]
    MissingNonce,

    #[error("Invalid nonce length: expected {expected} bytes, got {got}")]
    InvalidNonceLength { expected: usize, got: usize },

    #[error("Invalid key length: expected {expected} bytes, got {got}")]
    InvalidKeyLength { expected: usize, got: usize },

    #[error("Block has no payload")]
    MissingData,

    #[error("Truncated block: {0}")]
    Truncated(String),

    #[error("Salt does not match encryption parameters")]
    SaltMismatch,

    #[error("Signature does not match payload")]
    SignatureMismatch,

    #[error("Encryption method not implemented: {0}")]
    UnsupportedEncryptionMethod(u8),

    #[error("Wrong key kind: {0} required")]
    KeyMismatch(&'static str),

    #[error("Base64 decode error: {0}")]
    Base64Decode(String),

    #[error("Payload too large: {len} bytes, max {max}")]
    PayloadTooLarge { len: usize, max: usize },

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),
}
