// DFP Harness - Decimal Floating-Point Smoke Harness
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::bid128::{digit_count, pow10, Bid128, Parts, Unpacked, PRECISION};
use crate::{Context, StatusFlags};
use std::cmp::Ordering;
use std::ops::{Add, Neg, Sub};

/// Digits the larger-exponent operand is scaled to before alignment. Leaves
/// headroom in a u128 for the sum and at least two guard digits.
const WORKING_DIGITS: u32 = 37;

impl Context {
    pub fn add(&mut self, lhs: Bid128, rhs: Bid128) -> Bid128 {
        match (lhs.unpack(), rhs.unpack()) {
            (Unpacked::Nan { .. }, _) | (_, Unpacked::Nan { .. }) => self.propagate_nan(lhs, rhs),
            (Unpacked::Infinite { negative: a }, Unpacked::Infinite { negative: b }) => {
                if a == b {
                    Bid128::infinity(a)
                } else {
                    self.raise(StatusFlags::INVALID);
                    Bid128::NAN
                }
            }
            (Unpacked::Infinite { negative }, Unpacked::Finite(_))
            | (Unpacked::Finite(_), Unpacked::Infinite { negative }) => Bid128::infinity(negative),
            (Unpacked::Finite(a), Unpacked::Finite(b)) => self.add_finite(a, b),
        }
    }

    pub fn sub(&mut self, lhs: Bid128, rhs: Bid128) -> Bid128 {
        let rhs = if rhs.is_nan() { rhs } else { -rhs };
        self.add(lhs, rhs)
    }

    fn propagate_nan(&mut self, lhs: Bid128, rhs: Bid128) -> Bid128 {
        if lhs.is_signaling_nan() || rhs.is_signaling_nan() {
            self.raise(StatusFlags::INVALID);
        }
        let source = if lhs.is_nan() { lhs } else { rhs };
        source.quieted()
    }

    fn add_finite(&mut self, a: Parts, b: Parts) -> Bid128 {
        let (hi, lo) = if a.exponent >= b.exponent { (a, b) } else { (b, a) };
        let shift = (hi.exponent - lo.exponent) as u32;

        if hi.coefficient == 0 && lo.coefficient == 0 {
            let negative = if a.negative == b.negative {
                a.negative
            } else {
                self.cancellation_sign()
            };
            return Bid128::finite(negative, 0, lo.exponent);
        }
        if hi.coefficient == 0 {
            return Bid128::finite(lo.negative, lo.coefficient, lo.exponent);
        }
        if lo.coefficient == 0 {
            // Move toward the zero's exponent as far as the coefficient allows.
            let lift = shift.min(PRECISION - digit_count(hi.coefficient));
            return Bid128::finite(
                hi.negative,
                hi.coefficient * pow10(lift),
                hi.exponent - lift as i32,
            );
        }

        let hi_digits = digit_count(hi.coefficient);
        let (big, small, exponent, sticky) = if hi_digits + shift <= WORKING_DIGITS {
            (hi.coefficient * pow10(shift), lo.coefficient, lo.exponent, false)
        } else {
            let lift = WORKING_DIGITS - hi_digits;
            let fall = shift - lift;
            let (small, sticky) = if fall > 38 {
                (0, true)
            } else {
                let divisor = pow10(fall);
                (lo.coefficient / divisor, lo.coefficient % divisor != 0)
            };
            (hi.coefficient * pow10(lift), small, hi.exponent - lift as i32, sticky)
        };

        if hi.negative == lo.negative {
            return self.finish(hi.negative, big + small, exponent, sticky);
        }
        if sticky {
            // The discarded tail belongs to `small`, so borrow a unit for it.
            return self.finish(hi.negative, big - small - 1, exponent, true);
        }
        match big.cmp(&small) {
            Ordering::Equal => Bid128::finite(self.cancellation_sign(), 0, exponent),
            Ordering::Greater => self.finish(hi.negative, big - small, exponent, false),
            Ordering::Less => self.finish(lo.negative, small - big, exponent, false),
        }
    }
}

impl Add for Bid128 {
    type Output = Bid128;

    fn add(self, rhs: Bid128) -> Bid128 {
        Context::default().add(self, rhs)
    }
}

impl Sub for Bid128 {
    type Output = Bid128;

    fn sub(self, rhs: Bid128) -> Bid128 {
        Context::default().sub(self, rhs)
    }
}

impl Neg for Bid128 {
    type Output = Bid128;

    fn neg(self) -> Bid128 {
        Bid128::from_bits(self.to_bits() ^ (1 << 127))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RoundingMode, MAX_EXPONENT, MIN_EXPONENT};

    fn dec(s: &str) -> Bid128 {
        s.parse().unwrap()
    }

    fn parts(v: Bid128) -> (bool, u128, i32) {
        v.to_parts().unwrap()
    }

    #[test]
    fn test_add_fixed_literals() {
        let mut ctx = Context::default();
        let sum = ctx.add(dec("123.456"), dec("78.9"));
        assert_eq!(parts(sum), (false, 202_356, -3));
        assert!(ctx.flags().is_empty());
    }

    #[test]
    fn test_add_uses_smaller_exponent_when_exact() {
        let sum = dec("1.0") + dec("2.00");
        assert_eq!(parts(sum), (false, 300, -2));
    }

    #[test]
    fn test_sub_crossing_zero() {
        let diff = dec("1.5") - dec("4");
        assert_eq!(parts(diff), (true, 25, -1));
    }

    #[test]
    fn test_exact_cancellation_sign() {
        let mut ctx = Context::default();
        let zero = ctx.add(dec("3.14"), dec("-3.14"));
        assert!(zero.is_zero());
        assert!(!zero.is_sign_negative());

        let mut ctx = Context::new(RoundingMode::Downward);
        let zero = ctx.add(dec("3.14"), dec("-3.14"));
        assert!(zero.is_zero());
        assert!(zero.is_sign_negative());
    }

    #[test]
    fn test_signed_zero_sum() {
        let sum = dec("-0") + dec("-0.00");
        assert_eq!(parts(sum), (true, 0, -2));
        let sum = dec("-0") + dec("0");
        assert!(!sum.is_sign_negative());
    }

    #[test]
    fn test_zero_operand_pulls_exponent_down() {
        let sum = dec("5E+3") + dec("0.00");
        assert_eq!(parts(sum), (false, 500_000, -2));
        let sum = dec("0E+10") + dec("7");
        assert_eq!(parts(sum), (false, 7, 0));
    }

    #[test]
    fn test_add_far_apart_rounds_with_sticky() {
        let mut ctx = Context::default();
        // 1E+40 + 1 keeps 34 digits of the big operand; the 1 is below half an ulp.
        let sum = ctx.add(dec("1E+40"), dec("1"));
        assert_eq!(parts(sum), (false, pow10(33), 7));
        assert_eq!(ctx.flags(), StatusFlags::INEXACT);

        let mut ctx = Context::new(RoundingMode::Upward);
        let sum = ctx.add(dec("1E+40"), dec("1"));
        assert_eq!(parts(sum), (false, pow10(33) + 1, 7));
    }

    #[test]
    fn test_sub_far_apart_borrows() {
        let mut ctx = Context::new(RoundingMode::TowardZero);
        let diff = ctx.sub(dec("1E+40"), dec("1"));
        assert_eq!(parts(diff), (false, pow10(34) - 1, 6));
        assert_eq!(ctx.flags(), StatusFlags::INEXACT);

        let mut ctx = Context::default();
        let diff = ctx.sub(dec("1E+40"), dec("1"));
        assert_eq!(parts(diff), (false, pow10(33), 7));
    }

    #[test]
    fn test_add_rounds_34_digit_operands() {
        let max = "9999999999999999999999999999999999";
        let mut ctx = Context::default();
        let sum = ctx.add(dec(max), dec("1"));
        assert_eq!(parts(sum), (false, pow10(33), 1));
        assert!(ctx.flags().is_empty());

        let mut ctx = Context::default();
        let sum = ctx.add(dec(max), dec("0.6"));
        assert_eq!(parts(sum), (false, pow10(33), 1));
        assert_eq!(ctx.flags(), StatusFlags::INEXACT);
    }

    #[test]
    fn test_add_overflow() {
        let mut ctx = Context::default();
        let sum = ctx.add(Bid128::MAX, Bid128::MAX);
        assert!(sum.is_infinite());
        assert_eq!(ctx.flags(), StatusFlags::OVERFLOW | StatusFlags::INEXACT);

        let mut ctx = Context::new(RoundingMode::TowardZero);
        let sum = ctx.add(Bid128::MAX, Bid128::MAX);
        assert_eq!(parts(sum), parts(Bid128::MAX));
    }

    #[test]
    fn test_add_subnormal_is_exact() {
        let tiny = Bid128::from_parts(false, 1, MIN_EXPONENT).unwrap();
        let mut ctx = Context::default();
        let sum = ctx.add(tiny, tiny);
        assert_eq!(parts(sum), (false, 2, MIN_EXPONENT));
        assert!(ctx.flags().is_empty());
    }

    #[test]
    fn test_infinities() {
        let mut ctx = Context::default();
        assert!(ctx.add(Bid128::INFINITY, dec("1")).is_infinite());
        let r = ctx.add(dec("-5"), Bid128::NEG_INFINITY);
        assert!(r.is_infinite() && r.is_sign_negative());
        assert!(ctx.flags().is_empty());

        let r = ctx.add(Bid128::INFINITY, Bid128::NEG_INFINITY);
        assert!(r.is_nan());
        assert_eq!(ctx.flags(), StatusFlags::INVALID);
    }

    #[test]
    fn test_nan_propagation() {
        let mut ctx = Context::default();
        let r = ctx.add(dec("NaN7"), dec("1"));
        assert!(r.is_nan());
        assert_eq!(r.to_string(), "NaN7");
        assert!(ctx.flags().is_empty());

        let r = ctx.sub(dec("1"), dec("-sNaN3"));
        assert!(r.is_nan() && !r.is_signaling_nan());
        assert_eq!(r.to_string(), "-NaN3");
        assert_eq!(ctx.flags(), StatusFlags::INVALID);
    }

    #[test]
    fn test_neg_flips_sign_only() {
        let v = -dec("2.50");
        assert_eq!(parts(v), (true, 250, -2));
        assert_eq!(parts(-v), (false, 250, -2));
    }

    #[test]
    fn test_large_exponent_gap_with_clamp() {
        let big = Bid128::from_parts(false, 1, MAX_EXPONENT).unwrap();
        let sum = big + Bid128::from_parts(false, 1, MIN_EXPONENT).unwrap();
        assert_eq!(parts(sum), (false, pow10(33), MAX_EXPONENT - 33));
    }
}
