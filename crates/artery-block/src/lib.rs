//! StorageBlock wire format with stream, secp256k1 point, and hybrid payload encryption.

pub mod block;
pub mod dispatch;
pub mod error;
pub mod secp;
pub mod stream;
pub mod types;

pub use block::StorageBlock;
pub use dispatch::BlockKey;
pub use error::BlockError;
pub use stream::{apply_salsa20, apply_xchacha20};
pub use types::{BlockType, EncryptionMethod, HEADER_SIZE, HEADER_VERSION};
