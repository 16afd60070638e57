//! Numbers ⇄ secp256k1 points with decoy escape points.
//!
//! A number `h <= p` maps to the point with `x = h >> 1` and y parity `h & 1`.
//! When no such point exists, or it is one of the four excluded points, the
//! encoder emits `EXCLUDED[h mod 4]` and continues with `h div 4`. The decoder
//! folds runs of excluded points back into a multiplier and offset.
//!
//! Numbers 0 and 1 have x = 0, which is not on the curve, so their quotient
//! chain never closes on its own. Once the quotient is 0 after `k` decoys, any
//! regular value `v` that is a multiple of 2^(256 - 2k) closes the chain: the
//! decoder scales it by 4^k, which is 0 mod 2^256. The smallest such `v` wins.
//! After 128 decoys the step is 1 and the filler value 2 always qualifies.

use std::sync::OnceLock;

use k256::elliptic_curve::point::{AffineCoordinates, DecompressPoint};
use k256::elliptic_curve::sec1::FromEncodedPoint;
use k256::elliptic_curve::subtle::Choice;
use k256::{AffinePoint, EncodedPoint, FieldBytes};

use crate::error::CodecError;
use crate::number::{low_byte, number_from_bytes, number_to_bytes, with_bit_set};
use crate::types::{
    Number, BLOCK_SIZE, FIELD_PRIME, MAX_CLOSING_CANDIDATES, MAX_DECOYS_PER_NUMBER,
};

/// Number of excluded points; also the decoy radix.
pub const EXCLUDED_POINT_COUNT: usize = 4;

/// Affine coordinates of the excluded points. Protocol constant.
const EXCLUDED_POINT_COORDINATES: [(Number, Number); EXCLUDED_POINT_COUNT] = [
    (
        Number::from_be_hex("4B00A7CDA85AF529C338774B867B45549A387C0A3AB5425DF5D681E45EFA40DC"),
        Number::from_be_hex("39B37BCD6E6A18C830BFB35C6E4443EC1E1612AC606D8693F9976DA4EDAC15D6"),
    ),
    (
        Number::from_be_hex("AB9CE1FFCDE3127A0A2C5D4761B11FE50BCC78C2EC16394E45840D0D965A4A5E"),
        Number::from_be_hex("125EABF10341CE55960085B1562440E228CC118389FFE5F94F492C4D0C468D2C"),
    ),
    (
        Number::from_be_hex("E88A7AD83A5E0F6F40324F832A7E254C3695736B88629E41822872F3EC2BC205"),
        Number::from_be_hex("0A695849FB08C31350D5D895D3E05E9260791EF946EDC35C02B206AF9F449F75"),
    ),
    (
        Number::from_be_hex("4287A463E892D53863F40859502F615BCCB34349196D33BE60746991258A0A70"),
        Number::from_be_hex("7462F523C6DA4B4E95703B47199B51493B0558F8EF33329BEFA762550AF5657C"),
    ),
];

/// Value whose point closes a fully folded decoy chain (x = 1, even y).
const FILLER_VALUE: u8 = 2;

struct ProtocolPoints {
    excluded: [AffinePoint; EXCLUDED_POINT_COUNT],
    filler: AffinePoint,
}

static PROTOCOL_POINTS: OnceLock<ProtocolPoints> = OnceLock::new();

fn protocol_points() -> &'static ProtocolPoints {
    PROTOCOL_POINTS.get_or_init(|| {
        let excluded = EXCLUDED_POINT_COORDINATES.map(|(x, y)| {
            let encoded = EncodedPoint::from_affine_coordinates(
                &FieldBytes::from(number_to_bytes(&x)),
                &FieldBytes::from(number_to_bytes(&y)),
                false,
            );
            Option::<AffinePoint>::from(AffinePoint::from_encoded_point(&encoded))
                .expect("excluded point constant is on secp256k1")
        });
        let filler = point_from_x(&Number::from_u8(FILLER_VALUE >> 1), false)
            .expect("x = 1 is on secp256k1");
        ProtocolPoints { excluded, filler }
    })
}

/// The four excluded (decoy) points, in protocol order.
pub fn excluded_points() -> &'static [AffinePoint; EXCLUDED_POINT_COUNT] {
    &protocol_points().excluded
}

/// Index of `point` in the excluded point table.
pub fn excluded_index(point: &AffinePoint) -> Option<usize> {
    excluded_points().iter().position(|e| e == point)
}

/// Recover the curve point with the given x-coordinate and y parity.
pub fn point_from_x(x: &Number, y_odd: bool) -> Option<AffinePoint> {
    let bytes = FieldBytes::from(number_to_bytes(x));
    Option::from(AffinePoint::decompress(&bytes, Choice::from(y_odd as u8)))
}

/// x-coordinate and y parity of a non-identity point.
pub fn point_coordinates(point: &AffinePoint) -> (Number, bool) {
    let mut x = [0u8; BLOCK_SIZE];
    x.copy_from_slice(&point.x());
    (number_from_bytes(x), bool::from(point.y_is_odd()))
}

/// Direct (non-decoy) point for `n`, if there is one.
fn regular_point(n: &Number) -> Option<AffinePoint> {
    if *n > FIELD_PRIME {
        return None;
    }
    let x = n.shr_vartime(1);
    let y_odd = low_byte(n) & 1 == 1;
    point_from_x(&x, y_odd).filter(|p| excluded_index(p).is_none())
}

/// Regular point closing a run of `decoys` decoys whose quotient is 0.
///
/// Candidates are `m * 2^(256 - 2 * decoys)` for `m = 1, 2, ...`.
fn closing_point(decoys: usize) -> Option<AffinePoint> {
    let shift = BLOCK_SIZE * 8 - 2 * decoys;
    (1..=MAX_CLOSING_CANDIDATES).find_map(|m| {
        let factor = Number::from_u64(m);
        let value = factor.shl_vartime(shift);
        if value.shr_vartime(shift) != factor {
            return None;
        }
        regular_point(&value)
    })
}

/// Map numbers to curve points. Every 256-bit value has a representation.
pub fn numbers_to_raw_points(numbers: &[Number]) -> Vec<AffinePoint> {
    let points = protocol_points();
    let mut out = Vec::with_capacity(numbers.len() + numbers.len() / 2);

    for number in numbers {
        let mut head = *number;
        let mut decoys = 0;
        loop {
            if let Some(point) = regular_point(&head) {
                out.push(point);
                break;
            }
            if decoys > 0 && head == Number::ZERO {
                if let Some(point) = closing_point(decoys) {
                    out.push(point);
                    break;
                }
            }
            if decoys == MAX_DECOYS_PER_NUMBER {
                out.push(points.filler);
                break;
            }
            let remainder = (low_byte(&head) as usize) % EXCLUDED_POINT_COUNT;
            out.push(points.excluded[remainder]);
            head = head.shr_vartime(2);
            decoys += 1;
        }
    }

    out
}

/// Inverse of [`numbers_to_raw_points`]. Arithmetic is modulo 2^256.
pub fn raw_points_to_numbers(points: &[AffinePoint]) -> Result<Vec<Number>, CodecError> {
    let radix = Number::from_u8(EXCLUDED_POINT_COUNT as u8);
    let mut numbers = Vec::with_capacity(points.len());
    let mut multiplier = Number::ONE;
    let mut offset = Number::ZERO;
    let mut pending_decoys = 0usize;

    for point in points {
        if let Some(index) = excluded_index(point) {
            offset = offset.wrapping_add(&multiplier.wrapping_mul(&Number::from_u8(index as u8)));
            multiplier = multiplier.wrapping_mul(&radix);
            pending_decoys += 1;
            continue;
        }
        if *point == AffinePoint::IDENTITY {
            return Err(CodecError::InvalidPoint(
                "identity cannot carry a number".to_string(),
            ));
        }

        let (x, y_odd) = point_coordinates(point);
        let mut n = x.shl_vartime(1);
        if y_odd {
            n = with_bit_set(&n, 0);
        }
        numbers.push(n.wrapping_mul(&multiplier).wrapping_add(&offset));
        multiplier = Number::ONE;
        offset = Number::ZERO;
        pending_decoys = 0;
    }

    if pending_decoys != 0 {
        return Err(CodecError::InvalidEncoding(format!(
            "{} trailing decoy points without a closing point",
            pending_decoys
        )));
    }

    Ok(numbers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::random_array;
    use k256::elliptic_curve::sec1::ToEncodedPoint;

    fn random_number() -> Number {
        number_from_bytes(random_array().unwrap())
    }

    fn round_trip(numbers: &[Number]) {
        let points = numbers_to_raw_points(numbers);
        assert!(points.len() >= numbers.len());
        assert_eq!(raw_points_to_numbers(&points).unwrap(), numbers);
    }

    #[test]
    fn random_numbers_round_trip() {
        let numbers: Vec<Number> = (0..64).map(|_| random_number()).collect();
        round_trip(&numbers);
    }

    #[test]
    fn boundary_values_round_trip() {
        let numbers = vec![
            Number::ZERO,
            Number::ONE,
            Number::from_u8(2),
            Number::from_u8(3),
            FIELD_PRIME.wrapping_sub(&Number::ONE),
            FIELD_PRIME,
            FIELD_PRIME.wrapping_add(&Number::ONE),
            Number::MAX,
        ];
        for n in &numbers {
            round_trip(&[*n]);
        }
        round_trip(&numbers);
    }

    #[test]
    fn small_numbers_close_after_few_decoys() {
        for (n, first_decoy) in [(0u8, 0usize), (1, 1)] {
            let points = numbers_to_raw_points(&[Number::from_u8(n)]);
            assert!(points.len() <= 4, "{} expanded to {} points", n, points.len());
            assert_eq!(excluded_index(&points[0]), Some(first_decoy));
            assert_eq!(excluded_index(points.last().unwrap()), None);
            round_trip(&[Number::from_u8(n)]);
        }
        // x = 2 exists on the curve
        assert_eq!(numbers_to_raw_points(&[Number::from_u8(4)]).len(), 1);
    }

    #[test]
    fn closing_values_vanish_in_reverse_fold() {
        let radix = Number::from_u8(EXCLUDED_POINT_COUNT as u8);
        let mut scale = Number::ONE;
        for decoys in 1..=8 {
            scale = scale.wrapping_mul(&radix);
            let Some(point) = closing_point(decoys) else {
                continue;
            };
            let (x, y_odd) = point_coordinates(&point);
            assert!(!y_odd);
            assert_eq!(x.shl_vartime(1).wrapping_mul(&scale), Number::ZERO);
        }
    }

    #[test]
    fn full_decoy_run_closes_with_filler() {
        assert_eq!(closing_point(MAX_DECOYS_PER_NUMBER), Some(protocol_points().filler));
    }

    #[test]
    fn zero_blocks_stay_within_point_budget() {
        let numbers = vec![Number::ZERO; 8];
        let points = numbers_to_raw_points(&numbers);
        assert!(points.len() <= 4 * numbers.len());
        assert_eq!(raw_points_to_numbers(&points).unwrap(), numbers);
    }

    #[test]
    fn valid_number_maps_to_single_point() {
        // x = 1 exists on the curve
        let points = numbers_to_raw_points(&[Number::from_u8(3)]);
        assert_eq!(points.len(), 1);
        let (x, y_odd) = point_coordinates(&points[0]);
        assert_eq!(x, Number::ONE);
        assert!(y_odd);
    }

    #[test]
    fn above_prime_uses_decoys() {
        let points = numbers_to_raw_points(&[Number::MAX]);
        assert!(points.len() > 1);
        // MAX mod 4 == 3
        assert_eq!(excluded_index(&points[0]), Some(3));
    }

    #[test]
    fn excluded_point_collisions_round_trip() {
        // (x << 1 | y_odd) of excluded points 0 and 3, which are reachable from valid input
        let colliding = [
            Number::from_be_hex("96014F9B50B5EA538670EE970CF68AA93470F814756A84BBEBAD03C8BDF481B8"),
            Number::from_be_hex("850F48C7D125AA70C7E810B2A05EC2B79966869232DA677CC0E8D3224B1414E0"),
        ];
        for n in &colliding {
            let (x, y_odd) = (n.shr_vartime(1), low_byte(n) & 1 == 1);
            let direct = point_from_x(&x, y_odd).unwrap();
            assert!(excluded_index(&direct).is_some());

            let points = numbers_to_raw_points(&[*n]);
            assert!(points.len() > 1, "collision must escape through a decoy");
            round_trip(&[*n]);
        }
    }

    #[test]
    fn excluded_points_are_stable() {
        let compressed: Vec<String> = excluded_points()
            .iter()
            .map(|p| hex::encode(p.to_encoded_point(true).as_bytes()))
            .collect();
        assert_eq!(
            compressed,
            vec![
                "024b00a7cda85af529c338774b867b45549a387c0a3ab5425df5d681e45efa40dc",
                "02ab9ce1ffcde3127a0a2c5d4761b11fe50bcc78c2ec16394e45840d0d965a4a5e",
                "03e88a7ad83a5e0f6f40324f832a7e254c3695736b88629e41822872f3ec2bc205",
                "024287a463e892d53863f40859502f615bccb34349196d33be60746991258a0a70",
            ]
        );
    }

    #[test]
    fn regular_points_never_excluded() {
        let mut numbers: Vec<Number> = (0u64..512).map(Number::from_u64).collect();
        numbers.extend((0..256).map(|_| random_number()));
        for n in &numbers {
            if let Some(point) = regular_point(n) {
                assert!(excluded_index(&point).is_none());
            }
        }
    }

    #[test]
    fn x_zero_is_not_on_curve() {
        assert!(point_from_x(&Number::ZERO, false).is_none());
        assert!(point_from_x(&Number::ZERO, true).is_none());
    }

    #[test]
    fn decode_rejects_identity() {
        assert!(matches!(
            raw_points_to_numbers(&[AffinePoint::IDENTITY]),
            Err(CodecError::InvalidPoint(_))
        ));
    }

    #[test]
    fn decode_rejects_trailing_decoys() {
        let excluded = excluded_points();
        assert!(matches!(
            raw_points_to_numbers(&[excluded[1], excluded[2]]),
            Err(CodecError::InvalidEncoding(_))
        ));
    }

    #[test]
    fn empty_sequence() {
        assert!(numbers_to_raw_points(&[]).is_empty());
        assert!(raw_points_to_numbers(&[]).unwrap().is_empty());
    }
}
