// DFP Harness - Decimal Floating-Point Smoke Harness
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecimalError {
    #[error("malformed decimal literal '{0}'")]
    Malformed(String),
    #[error("coefficient {0} does not fit in 34 decimal digits")]
    CoefficientOutOfRange(u128),
    #[error("exponent {0} outside the decimal128 range -6176..=6111")]
    ExponentOutOfRange(i32),
    #[error(
        "unsupported rounding mode '{0}'; supported: nearest_even, nearest_away, toward_zero, upward, downward"
    )]
    UnknownRoundingMode(String),
}
