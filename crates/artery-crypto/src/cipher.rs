//! Ephemeral-key additive masking over secp256k1 points.
//!
//! Encrypt: draw r in [2, n), output [G·r, P_0 + Q·r, P_1 + Q·r, ...] for public key Q.
//! Decrypt: with private scalar d, P_i = C_i - (G·r)·d.
//!
//! This masks points only; integrity comes from the enclosing block signature.

use k256::elliptic_curve::PrimeField;
use k256::{AffinePoint, FieldBytes, ProjectivePoint, PublicKey, Scalar, SecretKey};
use zeroize::Zeroize;

use crate::error::CodecError;
use crate::number::number_from_bytes;
use crate::random::fill_random;
use crate::types::{Number, BLOCK_SIZE, CURVE_ORDER, MAX_SCALAR_DRAWS};

/// Draw a uniformly random scalar in [2, n) by rejection sampling.
pub fn random_ephemeral_scalar() -> Result<Scalar, CodecError> {
    let lower = Number::from_u8(2);
    let mut bytes = [0u8; BLOCK_SIZE];

    for _ in 0..MAX_SCALAR_DRAWS {
        fill_random(&mut bytes)?;
        let candidate = number_from_bytes(bytes);
        if candidate < lower || candidate >= CURVE_ORDER {
            continue;
        }
        let scalar: Option<Scalar> = Scalar::from_repr(FieldBytes::from(bytes)).into();
        bytes.zeroize();
        if let Some(scalar) = scalar {
            return Ok(scalar);
        }
    }

    bytes.zeroize();
    Err(CodecError::RandomnessExhausted)
}

/// Generate a new secp256k1 private key from the OS CSPRNG.
pub fn generate_keypair() -> Result<SecretKey, CodecError> {
    let mut bytes = [0u8; BLOCK_SIZE];
    for _ in 0..MAX_SCALAR_DRAWS {
        fill_random(&mut bytes)?;
        let key = SecretKey::from_bytes(&FieldBytes::from(bytes));
        bytes.zeroize();
        if let Ok(key) = key {
            return Ok(key);
        }
    }
    Err(CodecError::RandomnessExhausted)
}

/// Mask `points` for the holder of `public_key`. The ephemeral point comes first.
pub fn encrypt_points(
    public_key: &PublicKey,
    points: &[AffinePoint],
) -> Result<Vec<AffinePoint>, CodecError> {
    let r = random_ephemeral_scalar()?;
    let mask = public_key.to_projective() * r;

    let mut out = Vec::with_capacity(points.len() + 1);
    out.push((ProjectivePoint::GENERATOR * r).to_affine());
    out.extend(
        points
            .iter()
            .map(|p| (ProjectivePoint::from(*p) + mask).to_affine()),
    );
    Ok(out)
}

/// Remove the mask from `points` using `secret_key`. Drops the ephemeral point.
pub fn decrypt_points(
    secret_key: &SecretKey,
    points: &[AffinePoint],
) -> Result<Vec<AffinePoint>, CodecError> {
    let (ephemeral, masked) = points.split_first().ok_or(CodecError::EmptyInput)?;
    let d = secret_key.to_nonzero_scalar();
    let unmask = -(ProjectivePoint::from(*ephemeral) * *d);

    Ok(masked
        .iter()
        .map(|p| (ProjectivePoint::from(*p) + unmask).to_affine())
        .collect())
}
