//! secp256k1 point packing, ephemeral-key point masking, and a base64-like message codec.

pub mod base64like;
pub mod cipher;
pub mod error;
pub mod message;
pub mod number;
pub mod pipeline;
pub mod points;
pub mod random;
pub mod serializer;
pub mod types;

pub use base64like::{message_to_numbers, numbers_to_message, MessageEncoder};
pub use cipher::{decrypt_points, encrypt_points, generate_keypair, random_ephemeral_scalar};
pub use error::CodecError;
pub use message::{bytes_to_numbers, numbers_to_bytes, numbers_to_object, object_to_numbers};
pub use number::{number_from_be_slice, number_from_bytes, number_to_bytes};
pub use pipeline::{decode_buffer, decode_object, encode_buffer, encode_object};
pub use points::{excluded_points, numbers_to_raw_points, point_from_x, raw_points_to_numbers};
pub use random::{fill_random, random_array, random_bytes};
pub use serializer::{crypto_points_to_numbers, numbers_to_crypto_points};
pub use types::{
    Number, BLOCK_SIZE, CURVE_ORDER, FIELD_PRIME, MAX_MESSAGE_LENGTH, MAX_SERIALIZED_POINTS,
    PROTOCOL_VERSION,
};

pub use k256::{AffinePoint, PublicKey, SecretKey};
