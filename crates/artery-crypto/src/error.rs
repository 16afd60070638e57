use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Data is too long: {len} bytes exceeds limit of {max}")]
    OversizedInput { len: usize, max: usize },

    #[error("Protocol version is not supported: {0}")]
    UnsupportedProtocolVersion(u8),

    #[error("Length mismatch: declared {declared} bytes cannot be carried by {blocks} blocks")]
    LengthMismatch { declared: usize, blocks: usize },

    #[error("Non-empty input expected")]
    EmptyInput,

    #[error("Invalid point: {0}")]
    InvalidPoint(String),

    #[error("Too many points: {count} exceeds bitmap capacity of {max}")]
    TooManyPoints { count: usize, max: usize },

    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),

    #[error("Invalid length: expected at most {expected} bytes, got {got}")]
    InvalidLength { expected: usize, got: usize },

    #[error("Random scalar rejection sampling exhausted")]
    RandomnessExhausted,

    #[error("Random number generation failed: {0}")]
    RngFailed(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
