//! Curve points ⇄ [parity bitmap, x_0, x_1, ...].
//!
//! Bit i of the bitmap is the y parity of point i, so at most 256 points fit.
//! Bits past the last point must be clear.
//! The identity is written as x = 0 with a clear bit; no secp256k1 point has x = 0.

use k256::AffinePoint;

use crate::error::CodecError;
use crate::number::{is_bit_set, with_bit_set};
use crate::points::{point_coordinates, point_from_x};
use crate::types::{Number, MAX_SERIALIZED_POINTS};

/// Serialize points as a parity bitmap followed by x-coordinates.
pub fn crypto_points_to_numbers(points: &[AffinePoint]) -> Result<Vec<Number>, CodecError> {
    if points.len() > MAX_SERIALIZED_POINTS {
        return Err(CodecError::TooManyPoints {
            count: points.len(),
            max: MAX_SERIALIZED_POINTS,
        });
    }

    let mut parity = Number::ZERO;
    let mut out = Vec::with_capacity(points.len() + 1);
    out.push(Number::ZERO);

    for (i, point) in points.iter().enumerate() {
        if *point == AffinePoint::IDENTITY {
            out.push(Number::ZERO);
            continue;
        }
        let (x, y_odd) = point_coordinates(point);
        if y_odd {
            parity = with_bit_set(&parity, i);
        }
        out.push(x);
    }

    out[0] = parity;
    Ok(out)
}

/// Recover points from a parity bitmap followed by x-coordinates.
pub fn numbers_to_crypto_points(numbers: &[Number]) -> Result<Vec<AffinePoint>, CodecError> {
    let (parity, xs) = numbers.split_first().ok_or(CodecError::EmptyInput)?;
    if xs.len() > MAX_SERIALIZED_POINTS {
        return Err(CodecError::TooManyPoints {
            count: xs.len(),
            max: MAX_SERIALIZED_POINTS,
        });
    }
    if xs.len() < MAX_SERIALIZED_POINTS && parity.shr_vartime(xs.len()) != Number::ZERO {
        return Err(CodecError::InvalidEncoding(
            "parity bits set past the last point".to_string(),
        ));
    }

    xs.iter()
        .enumerate()
        .map(|(i, x)| {
            let y_odd = is_bit_set(parity, i);
            if *x == Number::ZERO && !y_odd {
                return Ok(AffinePoint::IDENTITY);
            }
            point_from_x(x, y_odd).ok_or_else(|| {
                CodecError::InvalidPoint(format!("x-coordinate #{} is not on secp256k1", i))
            })
        })
        .collect()
}
