// DFP Harness - Decimal Floating-Point Smoke Harness
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::bid128::{digit_count, pow10, Bid128, MAX_COEFFICIENT, MAX_EXPONENT, MIN_EXPONENT, PRECISION};
use crate::DecimalError;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMode {
    /// Round half to even.
    #[default]
    NearestEven,
    /// Round half away from zero.
    NearestAway,
    TowardZero,
    /// Toward positive infinity.
    Upward,
    /// Toward negative infinity.
    Downward,
}

impl FromStr for RoundingMode {
    type Err = DecimalError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let v = value.trim().to_ascii_lowercase().replace('-', "_");
        match v.as_str() {
            "nearest_even" | "half_even" | "rne" => Ok(Self::NearestEven),
            "nearest_away" | "half_away" | "rna" => Ok(Self::NearestAway),
            "toward_zero" | "truncate" | "rz" => Ok(Self::TowardZero),
            "upward" | "ceiling" | "ru" => Ok(Self::Upward),
            "downward" | "floor" | "rd" => Ok(Self::Downward),
            _ => Err(DecimalError::UnknownRoundingMode(value.to_string())),
        }
    }
}

impl fmt::Display for RoundingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NearestEven => "nearest_even",
            Self::NearestAway => "nearest_away",
            Self::TowardZero => "toward_zero",
            Self::Upward => "upward",
            Self::Downward => "downward",
        })
    }
}

bitflags! {
    /// Exception flags raised by decimal operations. Bit values follow the
    /// x87-style layout used by BID libraries.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct StatusFlags: u8 {
        const INVALID = 0x01;
        const OVERFLOW = 0x08;
        const UNDERFLOW = 0x10;
        const INEXACT = 0x20;
    }
}

/// Where the discarded digits sit relative to half a unit in the last place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Remainder {
    Zero,
    BelowHalf,
    Half,
    AboveHalf,
}

/// Rounding mode plus sticky status flags for a sequence of operations.
#[derive(Debug, Clone, Default)]
pub struct Context {
    rounding: RoundingMode,
    flags: StatusFlags,
}

impl Context {
    pub fn new(rounding: RoundingMode) -> Self {
        Self {
            rounding,
            flags: StatusFlags::empty(),
        }
    }

    pub fn rounding(&self) -> RoundingMode {
        self.rounding
    }

    pub fn set_rounding(&mut self, rounding: RoundingMode) {
        self.rounding = rounding;
    }

    pub fn flags(&self) -> StatusFlags {
        self.flags
    }

    /// Returns the accumulated flags and clears them.
    pub fn take_flags(&mut self) -> StatusFlags {
        std::mem::take(&mut self.flags)
    }

    pub fn clear_flags(&mut self) {
        self.flags = StatusFlags::empty();
    }

    pub(crate) fn raise(&mut self, flags: StatusFlags) {
        self.flags |= flags;
    }

    /// Rounds `coefficient × 10^exponent` into a decimal128 value.
    ///
    /// `sticky` marks nonzero digits already discarded below the coefficient;
    /// callers only set it when at least one more digit will be dropped here.
    pub(crate) fn finish(
        &mut self,
        negative: bool,
        coefficient: u128,
        exponent: i32,
        sticky: bool,
    ) -> Bid128 {
        if coefficient == 0 && !sticky {
            return Bid128::finite(negative, 0, exponent.clamp(MIN_EXPONENT, MAX_EXPONENT));
        }

        let mut coefficient = coefficient;
        let mut exponent = exponent;
        let mut drop = (digit_count(coefficient) as i32 - PRECISION as i32).max(0);
        let tiny = exponent + drop < MIN_EXPONENT;
        if tiny {
            drop = MIN_EXPONENT - exponent;
        }

        if drop > 0 || sticky {
            let (quotient, remainder) = split(coefficient, drop as u32, sticky);
            coefficient = quotient;
            if self.rounds_away(negative, quotient, remainder) {
                coefficient += 1;
            }
            exponent += drop;
            if coefficient > MAX_COEFFICIENT {
                coefficient /= 10;
                exponent += 1;
            }
            if remainder != Remainder::Zero {
                self.raise(StatusFlags::INEXACT);
                if tiny {
                    self.raise(StatusFlags::UNDERFLOW);
                }
            }
        }

        if exponent > MAX_EXPONENT {
            let excess = exponent - MAX_EXPONENT;
            let room = PRECISION as i32 - digit_count(coefficient) as i32;
            if coefficient == 0 {
                exponent = MAX_EXPONENT;
            } else if excess <= room {
                coefficient *= pow10(excess as u32);
                exponent = MAX_EXPONENT;
            } else {
                self.raise(StatusFlags::OVERFLOW | StatusFlags::INEXACT);
                return self.overflow_result(negative);
            }
        }

        Bid128::finite(negative, coefficient, exponent)
    }

    fn rounds_away(&self, negative: bool, quotient: u128, remainder: Remainder) -> bool {
        if remainder == Remainder::Zero {
            return false;
        }
        match self.rounding {
            RoundingMode::NearestEven => {
                remainder == Remainder::AboveHalf
                    || (remainder == Remainder::Half && quotient & 1 == 1)
            }
            RoundingMode::NearestAway => {
                matches!(remainder, Remainder::Half | Remainder::AboveHalf)
            }
            RoundingMode::TowardZero => false,
            RoundingMode::Upward => !negative,
            RoundingMode::Downward => negative,
        }
    }

    fn overflow_result(&self, negative: bool) -> Bid128 {
        let to_infinity = match self.rounding {
            RoundingMode::NearestEven | RoundingMode::NearestAway => true,
            RoundingMode::TowardZero => false,
            RoundingMode::Upward => !negative,
            RoundingMode::Downward => negative,
        };
        if to_infinity {
            Bid128::infinity(negative)
        } else {
            Bid128::finite(negative, MAX_COEFFICIENT, MAX_EXPONENT)
        }
    }

    /// Sign of an exact zero produced by adding operands of opposite sign.
    pub(crate) fn cancellation_sign(&self) -> bool {
        self.rounding == RoundingMode::Downward
    }
}

/// Drops the lowest `drop` digits of `coefficient`.
fn split(coefficient: u128, drop: u32, sticky: bool) -> (u128, Remainder) {
    if drop == 0 {
        let remainder = if sticky {
            Remainder::BelowHalf
        } else {
            Remainder::Zero
        };
        return (coefficient, remainder);
    }
    // u128 holds at most 39 digits, always below 5 × 10^38.
    if drop > 38 {
        let remainder = if coefficient == 0 && !sticky {
            Remainder::Zero
        } else {
            Remainder::BelowHalf
        };
        return (0, remainder);
    }

    let divisor = pow10(drop);
    let quotient = coefficient / divisor;
    let rest = coefficient % divisor;
    let half = 5 * pow10(drop - 1);
    let remainder = match rest.cmp(&half) {
        std::cmp::Ordering::Less if rest == 0 && !sticky => Remainder::Zero,
        std::cmp::Ordering::Less => Remainder::BelowHalf,
        std::cmp::Ordering::Equal if sticky => Remainder::AboveHalf,
        std::cmp::Ordering::Equal => Remainder::Half,
        std::cmp::Ordering::Greater => Remainder::AboveHalf,
    };
    (quotient, remainder)
}
