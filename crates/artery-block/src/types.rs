//! Block header layout and protocol constants.
//!
//! Wire format:
//! [version:1][type:1][encryption:1][length:4 BE][signature:32][reserved:1][payload]

/// Serialized header size in bytes.
pub const HEADER_SIZE: usize = 40;

/// Current header format version.
pub const HEADER_VERSION: u8 = 0x01;

/// Offset of the big-endian payload length.
pub const LENGTH_OFFSET: usize = 3;

/// Offset of the SHA-256 payload signature.
pub const SIGNATURE_OFFSET: usize = 7;

/// SHA-256 digest length.
pub const SIGNATURE_LENGTH: usize = 32;

/// Stream cipher key length (Salsa20 and XChaCha20).
pub const STREAM_KEY_LENGTH: usize = 32;

/// Salsa20 nonce length.
pub const SALSA20_NONCE_LENGTH: usize = 8;

/// XChaCha20 nonce length.
pub const XCHACHA20_NONCE_LENGTH: usize = 24;

/// Shortest random salt prepended before secp encryption.
pub const MIN_SALT_LENGTH: usize = 16;

/// Number of distinct salt lengths: salts are 16..=31 bytes.
pub const SALT_LENGTH_SPREAD: usize = 16;

/// Width of the hybrid parameter blob length prefix (u16 BE).
pub const PARAMS_LENGTH_PREFIX: usize = 2;

/// What a block holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlockType {
    #[default]
    Index,
    Data,
    ChatData,
    ChatContacts,
    /// Tag not known to this version, kept as read.
    Other(u8),
}

impl BlockType {
    pub fn as_byte(self) -> u8 {
        match self {
            Self::Index => 0x01,
            Self::Data => 0x02,
            Self::ChatData => 0x03,
            Self::ChatContacts => 0x04,
            Self::Other(b) => b,
        }
    }
}

impl From<u8> for BlockType {
    fn from(b: u8) -> Self {
        match b {
            0x01 => Self::Index,
            0x02 => Self::Data,
            0x03 => Self::ChatData,
            0x04 => Self::ChatContacts,
            other => Self::Other(other),
        }
    }
}

/// Payload encryption tag stored in header byte 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EncryptionMethod {
    #[default]
    Raw,
    /// Salsa20 under a different tag, used for testing.
    Internal,
    Salsa20,
    Secp256,
    XChaCha20,
    Secp256XChaCha20,
    /// Reserved; no implementation.
    Secp256XChaCha20Poly1305,
    Unknown(u8),
}

impl EncryptionMethod {
    pub fn as_byte(self) -> u8 {
        match self {
            Self::Raw => 0x00,
            Self::Internal => 0x01,
            Self::Salsa20 => 0x02,
            Self::Secp256 => 0x03,
            Self::XChaCha20 => 0x04,
            Self::Secp256XChaCha20 => 0x05,
            Self::Secp256XChaCha20Poly1305 => 0x06,
            Self::Unknown(b) => b,
        }
    }
}

impl From<u8> for EncryptionMethod {
    fn from(b: u8) -> Self {
        match b {
            0x00 => Self::Raw,
            0x01 => Self::Internal,
            0x02 => Self::Salsa20,
            0x03 => Self::Secp256,
            0x04 => Self::XChaCha20,
            0x05 => Self::Secp256XChaCha20,
            0x06 => Self::Secp256XChaCha20Poly1305,
            other => Self::Unknown(other),
        }
    }
}
