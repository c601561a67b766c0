// DFP Harness - Decimal Floating-Point Smoke Harness
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::DecimalError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Significant decimal digits in a decimal128 coefficient.
pub const PRECISION: u32 = 34;
pub const MIN_EXPONENT: i32 = -6176;
pub const MAX_EXPONENT: i32 = 6111;
pub const MAX_COEFFICIENT: u128 = pow10(PRECISION) - 1;

const EXPONENT_BIAS: i32 = 6176;
const MAX_PAYLOAD: u128 = pow10(PRECISION - 1) - 1;

const SIGN_MASK: u128 = 1 << 127;
// G0..G1 both set: either the large-coefficient form or a special value.
const STEERING_MASK: u128 = 0b11 << 125;
const INFINITY_MASK: u128 = 0b11110 << 122;
const NAN_MASK: u128 = 0b11111 << 122;
const SIGNALING_MASK: u128 = 0b111111 << 121;
const COEFFICIENT_MASK: u128 = (1 << 113) - 1;
const PAYLOAD_MASK: u128 = (1 << 110) - 1;
const EXPONENT_FIELD: u128 = 0x3FFF;
const EXPONENT_SHIFT: u32 = 113;
const LARGE_EXPONENT_SHIFT: u32 = 111;

pub(crate) const fn pow10(n: u32) -> u128 {
    10u128.pow(n)
}

pub(crate) fn digit_count(value: u128) -> u32 {
    if value == 0 {
        0
    } else {
        value.ilog10() + 1
    }
}

/// Sign, coefficient and quantum exponent of a finite value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Parts {
    pub negative: bool,
    pub coefficient: u128,
    pub exponent: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Unpacked {
    Finite(Parts),
    Infinite {
        negative: bool,
    },
    Nan {
        negative: bool,
        signaling: bool,
        payload: u128,
    },
}

/// A decimal128 value in BID encoding.
///
/// Equality and ordering are numeric: `1.0 == 1.00`, `+0 == -0`, and NaN
/// compares unequal to everything. Use [`Bid128::to_bits`] to compare encodings.
#[derive(Clone, Copy)]
pub struct Bid128(u128);

impl Bid128 {
    pub const ZERO: Bid128 = Bid128((EXPONENT_BIAS as u128) << EXPONENT_SHIFT);
    pub const INFINITY: Bid128 = Bid128(INFINITY_MASK);
    pub const NEG_INFINITY: Bid128 = Bid128(SIGN_MASK | INFINITY_MASK);
    pub const NAN: Bid128 = Bid128(NAN_MASK);
    /// Largest finite value, `9.999…9E+6144` with 34 nines.
    pub const MAX: Bid128 = Bid128(
        (((MAX_EXPONENT + EXPONENT_BIAS) as u128) << EXPONENT_SHIFT) | MAX_COEFFICIENT,
    );

    pub const fn from_bits(bits: u128) -> Self {
        Bid128(bits)
    }

    pub const fn to_bits(self) -> u128 {
        self.0
    }

    /// Builds a finite value from its sign, coefficient and quantum exponent.
    pub fn from_parts(negative: bool, coefficient: u128, exponent: i32) -> Result<Self, DecimalError> {
        if coefficient > MAX_COEFFICIENT {
            return Err(DecimalError::CoefficientOutOfRange(coefficient));
        }
        if !(MIN_EXPONENT..=MAX_EXPONENT).contains(&exponent) {
            return Err(DecimalError::ExponentOutOfRange(exponent));
        }
        Ok(Self::finite(negative, coefficient, exponent))
    }

    /// Sign, coefficient and exponent for finite values, `None` otherwise.
    pub fn to_parts(self) -> Option<(bool, u128, i32)> {
        match self.unpack() {
            Unpacked::Finite(p) => Some((p.negative, p.coefficient, p.exponent)),
            _ => None,
        }
    }

    pub(crate) fn finite(negative: bool, coefficient: u128, exponent: i32) -> Self {
        debug_assert!(coefficient <= MAX_COEFFICIENT);
        debug_assert!((MIN_EXPONENT..=MAX_EXPONENT).contains(&exponent));
        let biased = (exponent + EXPONENT_BIAS) as u128;
        Bid128(sign_bit(negative) | (biased << EXPONENT_SHIFT) | coefficient)
    }

    pub(crate) fn infinity(negative: bool) -> Self {
        Bid128(sign_bit(negative) | INFINITY_MASK)
    }

    pub(crate) fn nan(negative: bool, signaling: bool, payload: u128) -> Self {
        let kind = if signaling { SIGNALING_MASK } else { NAN_MASK };
        let payload = if payload > MAX_PAYLOAD { 0 } else { payload };
        Bid128(sign_bit(negative) | kind | payload)
    }

    pub(crate) fn unpack(self) -> Unpacked {
        let bits = self.0;
        let negative = bits & SIGN_MASK != 0;

        if bits & NAN_MASK == NAN_MASK {
            let payload = bits & PAYLOAD_MASK;
            return Unpacked::Nan {
                negative,
                signaling: bits & SIGNALING_MASK == SIGNALING_MASK,
                payload: if payload > MAX_PAYLOAD { 0 } else { payload },
            };
        }
        if bits & NAN_MASK == INFINITY_MASK {
            return Unpacked::Infinite { negative };
        }

        let (biased, coefficient) = if bits & STEERING_MASK == STEERING_MASK {
            // The implied coefficient is at least 2^113, past 10^34 - 1.
            (((bits >> LARGE_EXPONENT_SHIFT) & EXPONENT_FIELD) as i32, 0)
        } else {
            let coefficient = bits & COEFFICIENT_MASK;
            (
                ((bits >> EXPONENT_SHIFT) & EXPONENT_FIELD) as i32,
                if coefficient > MAX_COEFFICIENT { 0 } else { coefficient },
            )
        };

        Unpacked::Finite(Parts {
            negative,
            coefficient,
            exponent: (biased - EXPONENT_BIAS).clamp(MIN_EXPONENT, MAX_EXPONENT),
        })
    }

    /// Quiet NaN with the same sign and payload; other values pass through.
    pub(crate) fn quieted(self) -> Self {
        match self.unpack() {
            Unpacked::Nan {
                negative, payload, ..
            } => Self::nan(negative, false, payload),
            _ => self,
        }
    }

    pub fn is_nan(self) -> bool {
        self.0 & NAN_MASK == NAN_MASK
    }

    pub fn is_signaling_nan(self) -> bool {
        self.0 & SIGNALING_MASK == SIGNALING_MASK
    }

    pub fn is_infinite(self) -> bool {
        self.0 & NAN_MASK == INFINITY_MASK
    }

    pub fn is_finite(self) -> bool {
        !self.is_nan() && !self.is_infinite()
    }

    pub fn is_zero(self) -> bool {
        matches!(self.unpack(), Unpacked::Finite(p) if p.coefficient == 0)
    }

    pub fn is_sign_negative(self) -> bool {
        self.0 & SIGN_MASK != 0
    }

    pub fn abs(self) -> Self {
        Bid128(self.0 & !SIGN_MASK)
    }
}

fn sign_bit(negative: bool) -> u128 {
    if negative {
        SIGN_MASK
    } else {
        0
    }
}

impl Default for Bid128 {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Debug for Bid128 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Bid128")
            .field(&format_args!("{}", self))
            .finish()
    }
}

impl From<i64> for Bid128 {
    fn from(value: i64) -> Self {
        Self::finite(value < 0, value.unsigned_abs() as u128, 0)
    }
}

impl From<u32> for Bid128 {
    fn from(value: u32) -> Self {
        Self::finite(false, value as u128, 0)
    }
}

impl Serialize for Bid128 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Bid128 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Bid128::from_str(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_encoding() {
        assert_eq!(Bid128::ZERO.to_bits(), 0x3040_0000_0000_0000_0000_0000_0000_0000);
        assert_eq!(Bid128::ZERO.to_parts(), Some((false, 0, 0)));
    }

    #[test]
    fn test_one_encoding_matches_ieee_layout() {
        let one = Bid128::from(1i64);
        assert_eq!(one.to_bits(), 0x3040_0000_0000_0000_0000_0000_0000_0001);
    }

    #[test]
    fn test_negative_sign_bit() {
        let v = Bid128::from(-7i64);
        assert!(v.is_sign_negative());
        assert_eq!(v.to_parts(), Some((true, 7, 0)));
        assert_eq!(v.abs().to_parts(), Some((false, 7, 0)));
    }

    #[test]
    fn test_special_values_classify() {
        assert!(Bid128::INFINITY.is_infinite());
        assert!(!Bid128::INFINITY.is_nan());
        assert!(Bid128::NEG_INFINITY.is_sign_negative());
        assert!(Bid128::NAN.is_nan());
        assert!(!Bid128::NAN.is_signaling_nan());
        assert!(Bid128::nan(false, true, 0).is_signaling_nan());
        assert!(Bid128::MAX.is_finite());
        assert_eq!(Bid128::MAX.to_parts(), Some((false, MAX_COEFFICIENT, MAX_EXPONENT)));
    }

    #[test]
    fn test_from_parts_rejects_out_of_range() {
        assert_eq!(
            Bid128::from_parts(false, MAX_COEFFICIENT + 1, 0).unwrap_err(),
            DecimalError::CoefficientOutOfRange(MAX_COEFFICIENT + 1)
        );
        assert_eq!(
            Bid128::from_parts(false, 1, MAX_EXPONENT + 1).unwrap_err(),
            DecimalError::ExponentOutOfRange(MAX_EXPONENT + 1)
        );
        assert!(Bid128::from_parts(true, 5, MIN_EXPONENT).is_ok());
    }

    #[test]
    fn test_non_canonical_coefficient_decodes_as_zero() {
        let biased = (EXPONENT_BIAS as u128) << EXPONENT_SHIFT;
        let v = Bid128::from_bits(biased | (MAX_COEFFICIENT + 1));
        assert!(v.is_zero());

        // Large-coefficient form is never canonical for decimal128.
        let large = Bid128::from_bits(STEERING_MASK | ((EXPONENT_BIAS as u128) << LARGE_EXPONENT_SHIFT));
        assert_eq!(large.to_parts(), Some((false, 0, 0)));
    }

    #[test]
    fn test_quieted_keeps_payload() {
        let snan = Bid128::nan(true, true, 42);
        let q = snan.quieted();
        assert!(q.is_nan());
        assert!(!q.is_signaling_nan());
        assert!(q.is_sign_negative());
        assert_eq!(
            q.unpack(),
            Unpacked::Nan {
                negative: true,
                signaling: false,
                payload: 42
            }
        );
    }

    #[test]
    fn test_digit_count() {
        assert_eq!(digit_count(0), 0);
        assert_eq!(digit_count(9), 1);
        assert_eq!(digit_count(10), 2);
        assert_eq!(digit_count(MAX_COEFFICIENT), PRECISION);
        assert_eq!(digit_count(u128::MAX), 39);
    }
}
