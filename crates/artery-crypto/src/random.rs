//! OS CSPRNG helpers. Salts, pads, keys and ephemeral scalars all come from here.

use crate::error::CodecError;

/// Fill `buf` from the OS CSPRNG.
pub fn fill_random(buf: &mut [u8]) -> Result<(), CodecError> {
    getrandom::getrandom(buf).map_err(|e| CodecError::RngFailed(e.to_string()))
}

/// Generate `len` random bytes.
pub fn random_bytes(len: usize) -> Result<Vec<u8>, CodecError> {
    let mut buf = vec![0u8; len];
    fill_random(&mut buf)?;
    Ok(buf)
}

/// Generate a random fixed-size array.
pub fn random_array<const N: usize>() -> Result<[u8; N], CodecError> {
    let mut buf = [0u8; N];
    fill_random(&mut buf)?;
    Ok(buf)
}
