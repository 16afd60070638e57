use k256::elliptic_curve::bigint::U256;

/// A 256-bit unsigned integer: the unit between byte, point and text forms.
pub type Number = U256;

/// Envelope protocol version, stored in the top byte of the first number.
///
/// Envelope: [version=1:1B][length:2B BE][payload][random pad to 32B]
pub const PROTOCOL_VERSION: u8 = 1;

/// Size of one numeric block in bytes.
pub const BLOCK_SIZE: usize = 32;

/// Envelope header size in bytes (version + 16-bit length).
pub const ENVELOPE_HEADER_SIZE: usize = 3;

/// Largest plaintext accepted by the envelope codec (60 KiB).
pub const MAX_MESSAGE_LENGTH: usize = 60 * 1024;

/// Width of the parity bitmap, which bounds the serialized point count.
pub const MAX_SERIALIZED_POINTS: usize = 256;

/// Upper bound on decoy points emitted for a single number.
///
/// Each decoy consumes two bits; after 128 of them the remaining quotient is 0.
pub const MAX_DECOYS_PER_NUMBER: usize = 128;

/// Closing values tried after a decoy run whose quotient reached 0.
pub const MAX_CLOSING_CANDIDATES: u64 = 16;

/// Rejection-sampling cap for the ephemeral scalar.
pub const MAX_SCALAR_DRAWS: usize = 1024;

/// secp256k1 field prime p.
pub const FIELD_PRIME: Number =
    U256::from_be_hex("FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEFFFFFC2F");

/// secp256k1 group order n.
pub const CURVE_ORDER: Number =
    U256::from_be_hex("FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141");
