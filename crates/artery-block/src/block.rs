//! StorageBlock container: fixed 40-byte header followed by the payload.
//!
//! Format: [version:1][type:1][encryption:1][length:4 BE][signature:32][reserved:1][payload]
//!
//! The signature is SHA-256 of the plaintext payload. It is computed before
//! encryption and checked after decryption.

use base64ct::{Base64, Encoding};
use serde::de::{self, Deserializer};
use serde::ser::{self, Serializer};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::BlockError;
use crate::types::{
    BlockType, EncryptionMethod, HEADER_SIZE, HEADER_VERSION, LENGTH_OFFSET, SIGNATURE_LENGTH,
    SIGNATURE_OFFSET,
};

/// One storage unit: header fields plus an optional payload.
///
/// Encrypt/decrypt methods transform the payload in place and, on encrypt,
/// record the method in the header. Decrypt leaves the tag as it was, so read
/// [`StorageBlock::encryption`] before decrypting when it matters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageBlock {
    version: u8,
    block_type: BlockType,
    encryption: EncryptionMethod,
    signature: Option<[u8; SIGNATURE_LENGTH]>,
    data: Option<Vec<u8>>,
}

impl Default for StorageBlock {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageBlock {
    /// Empty block: version 1, index type, raw encryption, no payload.
    pub fn new() -> Self {
        Self {
            version: HEADER_VERSION,
            block_type: BlockType::default(),
            encryption: EncryptionMethod::default(),
            signature: None,
            data: None,
        }
    }

    /// New block holding `data`, already signed.
    pub fn from_data(data: &[u8]) -> Self {
        let mut block = Self::new();
        block.set_data(data, true);
        block
    }

    /// Replace the payload, optionally recomputing the signature.
    pub fn set_data(&mut self, data: &[u8], sign: bool) {
        self.data = Some(data.to_vec());
        if sign {
            self.calc_sign();
        }
    }

    pub fn data(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }

    /// Take the payload out of the block.
    pub fn into_data(self) -> Option<Vec<u8>> {
        self.data
    }

    pub fn signature(&self) -> Option<&[u8; SIGNATURE_LENGTH]> {
        self.signature.as_ref()
    }

    /// Sign the current payload. A missing payload signs as empty.
    pub fn calc_sign(&mut self) {
        let digest = Sha256::digest(self.data.as_deref().unwrap_or_default());
        self.signature = Some(digest.into());
    }

    /// True when a signature is present and matches SHA-256 of the payload.
    pub fn is_sign_valid(&self) -> bool {
        match (&self.signature, &self.data) {
            (Some(signature), Some(data)) => {
                let digest: [u8; SIGNATURE_LENGTH] = Sha256::digest(data).into();
                digest == *signature
            }
            _ => false,
        }
    }

    /// Like [`StorageBlock::is_sign_valid`], as a `Result`.
    pub fn verify_sign(&self) -> Result<(), BlockError> {
        if self.is_sign_valid() {
            return Ok(());
        }
        tracing::warn!(
            encryption = self.encryption.as_byte(),
            len = self.payload_len(),
            "block signature mismatch"
        );
        Err(BlockError::SignatureMismatch)
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn set_version(&mut self, version: u8) {
        self.version = version;
    }

    pub fn block_type(&self) -> BlockType {
        self.block_type
    }

    pub fn set_block_type(&mut self, block_type: BlockType) {
        self.block_type = block_type;
    }

    pub fn encryption(&self) -> EncryptionMethod {
        self.encryption
    }

    pub fn set_encryption(&mut self, encryption: EncryptionMethod) {
        self.encryption = encryption;
    }

    /// Payload length in bytes (0 when unset).
    pub fn payload_len(&self) -> usize {
        self.data.as_ref().map_or(0, Vec::len)
    }

    pub(crate) fn payload(&self) -> Result<&[u8], BlockError> {
        self.data.as_deref().ok_or(BlockError::MissingData)
    }

    pub(crate) fn payload_mut(&mut self) -> Result<&mut [u8], BlockError> {
        self.data.as_deref_mut().ok_or(BlockError::MissingData)
    }

    pub(crate) fn replace_payload(&mut self, data: Vec<u8>) {
        self.data = Some(data);
    }

    /// Serialize header and payload to the wire layout.
    ///
    /// Fails with `PayloadTooLarge` when the payload length does not fit the
    /// 32-bit length field.
    pub fn to_bytes(&self) -> Result<Vec<u8>, BlockError> {
        let data = self.data.as_deref().unwrap_or_default();
        let length = encode_length(data.len())?;
        let mut buf = vec![0u8; HEADER_SIZE + data.len()];

        buf[0] = self.version;
        buf[1] = self.block_type.as_byte();
        buf[2] = self.encryption.as_byte();
        buf[LENGTH_OFFSET..SIGNATURE_OFFSET].copy_from_slice(&length);
        if let Some(signature) = &self.signature {
            buf[SIGNATURE_OFFSET..SIGNATURE_OFFSET + SIGNATURE_LENGTH].copy_from_slice(signature);
        }
        buf[HEADER_SIZE..].copy_from_slice(data);
        Ok(buf)
    }

    /// Parse the wire layout. Bytes past the declared length are ignored.
    ///
    /// A zero declared length yields a block with neither payload nor signature.
    pub fn from_bytes(buf: &[u8]) -> Result<Self, BlockError> {
        if buf.len() < HEADER_SIZE {
            return Err(BlockError::Truncated(format!(
                "header needs {} bytes, got {}",
                HEADER_SIZE,
                buf.len()
            )));
        }

        let mut length_bytes = [0u8; 4];
        length_bytes.copy_from_slice(&buf[LENGTH_OFFSET..SIGNATURE_OFFSET]);
        let length = u32::from_be_bytes(length_bytes) as usize;

        let body = &buf[HEADER_SIZE..];
        if body.len() < length {
            return Err(BlockError::Truncated(format!(
                "declared {} payload bytes, got {}",
                length,
                body.len()
            )));
        }

        let mut block = Self {
            version: buf[0],
            block_type: BlockType::from(buf[1]),
            encryption: EncryptionMethod::from(buf[2]),
            signature: None,
            data: None,
        };

        if length > 0 {
            let mut signature = [0u8; SIGNATURE_LENGTH];
            signature.copy_from_slice(&buf[SIGNATURE_OFFSET..SIGNATURE_OFFSET + SIGNATURE_LENGTH]);
            block.signature = Some(signature);
            block.data = Some(body[..length].to_vec());
        }

        tracing::debug!(
            version = block.version,
            block_type = block.block_type.as_byte(),
            encryption = block.encryption.as_byte(),
            len = length,
            "parsed block"
        );
        Ok(block)
    }

    /// Standard padded base64 of [`StorageBlock::to_bytes`].
    pub fn to_base64(&self) -> Result<String, BlockError> {
        Ok(Base64::encode_string(&self.to_bytes()?))
    }

    pub fn from_base64(encoded: &str) -> Result<Self, BlockError> {
        let buf = Base64::decode_vec(encoded).map_err(|e| BlockError::Base64Decode(e.to_string()))?;
        Self::from_bytes(&buf)
    }
}

/// Big-endian length field for a payload of `len` bytes.
fn encode_length(len: usize) -> Result<[u8; 4], BlockError> {
    u32::try_from(len)
        .map(u32::to_be_bytes)
        .map_err(|_| BlockError::PayloadTooLarge {
            len,
            max: u32::MAX as usize,
        })
}

impl Serialize for StorageBlock {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let encoded = self.to_base64().map_err(ser::Error::custom)?;
        serializer.serialize_str(&encoded)
    }
}

impl<'de> Deserialize<'de> for StorageBlock {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        Self::from_base64(&encoded).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_block_defaults() {
        let block = StorageBlock::new();
        assert_eq!(block.version(), 1);
        assert_eq!(block.block_type(), BlockType::Index);
        assert_eq!(block.encryption(), EncryptionMethod::Raw);
        assert!(block.data().is_none());
        assert!(block.signature().is_none());
        assert!(!block.is_sign_valid());
    }

    #[test]
    fn header_layout() {
        let mut block = StorageBlock::from_data(b"abc");
        block.set_block_type(BlockType::ChatContacts);
        block.set_encryption(EncryptionMethod::XChaCha20);
        let buf = block.to_bytes().unwrap();

        assert_eq!(buf.len(), HEADER_SIZE + 3);
        assert_eq!(&buf[..7], &[1, 4, 4, 0, 0, 0, 3]);
        assert_eq!(
            hex::encode(&buf[7..39]),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(buf[39], 0);
        assert_eq!(&buf[40..], b"abc");
    }

    #[test]
    fn length_field_covers_u32_range() {
        assert_eq!(encode_length(0).unwrap(), [0, 0, 0, 0]);
        assert_eq!(encode_length(u32::MAX as usize).unwrap(), [0xff; 4]);
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn length_field_rejects_oversized_payload() {
        let len = u32::MAX as usize + 1;
        assert!(matches!(
            encode_length(len),
            Err(BlockError::PayloadTooLarge { len: got, .. }) if got == len
        ));
    }

    #[test]
    fn empty_block_serializes_header_only() {
        let buf = StorageBlock::new().to_bytes().unwrap();
        assert_eq!(buf.len(), HEADER_SIZE);
        assert_eq!(&buf[..3], &[1, 1, 0]);
        assert!(buf[3..].iter().all(|b| *b == 0));
    }

    #[test]
    fn bytes_round_trip() {
        let mut block = StorageBlock::from_data(&[9u8; 100]);
        block.set_block_type(BlockType::Data);
        let parsed = StorageBlock::from_bytes(&block.to_bytes().unwrap()).unwrap();
        assert_eq!(parsed, block);
        assert!(parsed.is_sign_valid());
    }

    #[test]
    fn base64_round_trip() {
        let block = StorageBlock::from_data(b"over the wire");
        let parsed = StorageBlock::from_base64(&block.to_base64().unwrap()).unwrap();
        assert_eq!(parsed, block);
    }

    #[test]
    fn unknown_tags_are_preserved() {
        let mut buf = StorageBlock::from_data(b"x").to_bytes().unwrap();
        buf[1] = 0x7f;
        buf[2] = 0x42;
        let parsed = StorageBlock::from_bytes(&buf).unwrap();
        assert_eq!(parsed.block_type(), BlockType::Other(0x7f));
        assert_eq!(parsed.encryption(), EncryptionMethod::Unknown(0x42));
        assert_eq!(parsed.to_bytes().unwrap(), buf);
    }

    #[test]
    fn zero_length_drops_signature() {
        let mut buf = StorageBlock::from_data(b"").to_bytes().unwrap();
        assert_eq!(buf.len(), HEADER_SIZE);
        buf[SIGNATURE_OFFSET] = 0xff;
        let parsed = StorageBlock::from_bytes(&buf).unwrap();
        assert!(parsed.data().is_none());
        assert!(parsed.signature().is_none());
    }

    #[test]
    fn trailing_bytes_ignored() {
        let block = StorageBlock::from_data(b"data");
        let mut buf = block.to_bytes().unwrap();
        buf.extend_from_slice(b"junk");
        assert_eq!(StorageBlock::from_bytes(&buf).unwrap(), block);
    }

    #[test]
    fn rejects_short_header() {
        assert!(matches!(
            StorageBlock::from_bytes(&[1u8; HEADER_SIZE - 1]),
            Err(BlockError::Truncated(_))
        ));
    }

    #[test]
    fn rejects_short_payload() {
        let mut buf = StorageBlock::from_data(b"0123456789").to_bytes().unwrap();
        buf.truncate(buf.len() - 1);
        assert!(matches!(
            StorageBlock::from_bytes(&buf),
            Err(BlockError::Truncated(_))
        ));
    }

    #[test]
    fn rejects_bad_base64() {
        assert!(matches!(
            StorageBlock::from_base64("not base64!"),
            Err(BlockError::Base64Decode(_))
        ));
    }

    #[test]
    fn detects_payload_change() {
        let mut block = StorageBlock::from_data(b"signed");
        block.set_data(b"changed", false);
        assert!(!block.is_sign_valid());
        assert!(matches!(block.verify_sign(), Err(BlockError::SignatureMismatch)));
        block.calc_sign();
        assert!(block.verify_sign().is_ok());
    }

    #[test]
    fn serde_uses_base64_string() {
        let block = StorageBlock::from_data(b"json");
        let json = serde_json::to_string(&block).unwrap();
        assert_eq!(json, format!("\"{}\"", block.to_base64().unwrap()));
        let parsed: StorageBlock = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, block);
    }
}
