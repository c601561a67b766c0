// DFP Harness - Decimal Floating-Point Smoke Harness
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::bid128::{digit_count, pow10, Bid128, Parts, Unpacked};
use std::cmp::Ordering;

impl PartialEq for Bid128 {
    fn eq(&self, other: &Self) -> bool {
        self.partial_cmp(other) == Some(Ordering::Equal)
    }
}

impl PartialOrd for Bid128 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self.unpack(), other.unpack()) {
            (Unpacked::Nan { .. }, _) | (_, Unpacked::Nan { .. }) => None,
            (Unpacked::Infinite { negative: a }, Unpacked::Infinite { negative: b }) => {
                Some(b.cmp(&a))
            }
            (Unpacked::Infinite { negative }, Unpacked::Finite(_)) => Some(if negative {
                Ordering::Less
            } else {
                Ordering::Greater
            }),
            (Unpacked::Finite(_), Unpacked::Infinite { negative }) => Some(if negative {
                Ordering::Greater
            } else {
                Ordering::Less
            }),
            (Unpacked::Finite(a), Unpacked::Finite(b)) => Some(compare_finite(a, b)),
        }
    }
}

fn compare_finite(a: Parts, b: Parts) -> Ordering {
    if a.coefficient == 0 && b.coefficient == 0 {
        return Ordering::Equal;
    }
    let a_negative = a.negative && a.coefficient != 0;
    let b_negative = b.negative && b.coefficient != 0;
    if a_negative != b_negative {
        return if a_negative {
            Ordering::Less
        } else {
            Ordering::Greater
        };
    }
    let magnitude = compare_magnitude(a, b);
    if a_negative {
        magnitude.reverse()
    } else {
        magnitude
    }
}

fn compare_magnitude(a: Parts, b: Parts) -> Ordering {
    match (a.coefficient == 0, b.coefficient == 0) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        (false, false) => {}
    }

    let a_adjusted = a.exponent + digit_count(a.coefficient) as i32;
    let b_adjusted = b.exponent + digit_count(b.coefficient) as i32;
    if a_adjusted != b_adjusted {
        return a_adjusted.cmp(&b_adjusted);
    }

    // Same leading-digit position, so the exponents differ by at most 33.
    if a.exponent >= b.exponent {
        let scaled = a.coefficient * pow10((a.exponent - b.exponent) as u32);
        scaled.cmp(&b.coefficient)
    } else {
        let scaled = b.coefficient * pow10((b.exponent - a.exponent) as u32);
        a.coefficient.cmp(&scaled)
    }
}
