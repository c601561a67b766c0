// DFP Harness - Decimal Floating-Point Smoke Harness
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::bid128::{Bid128, PRECISION};
use crate::{Context, DecimalError};
use std::str::FromStr;

/// Significant digits kept while scanning; the rest only feed the sticky bit.
const SCAN_DIGITS: u32 = 38;
/// Final scales beyond this already overflow or underflow every coefficient.
const EXPONENT_LIMIT: i64 = 1_000_000;

impl Context {
    /// Parses a decimal literal, rounding to 34 digits under this context.
    ///
    /// Accepts `[+-]digits[.digits][(e|E)[+-]digits]`, `Inf`, `Infinity`,
    /// `NaN[payload]` and `sNaN[payload]`, case-insensitively for the words.
    pub fn parse(&mut self, literal: &str) -> Result<Bid128, DecimalError> {
        let malformed = || DecimalError::Malformed(literal.to_string());
        let text = literal.trim();
        let (negative, body) = split_sign(text);
        if body.is_empty() {
            return Err(malformed());
        }

        let lower = body.to_ascii_lowercase();
        if lower == "inf" || lower == "infinity" {
            return Ok(Bid128::infinity(negative));
        }
        if let Some(payload) = lower.strip_prefix("snan") {
            return parse_nan(negative, true, payload).ok_or_else(malformed);
        }
        if let Some(payload) = lower.strip_prefix("nan") {
            return parse_nan(negative, false, payload).ok_or_else(malformed);
        }

        let (mantissa, exponent_text) = match body.find(|c: char| c == 'e' || c == 'E') {
            Some(i) => (&body[..i], Some(&body[i + 1..])),
            None => (body, None),
        };

        let mut coefficient: u128 = 0;
        let mut kept = 0u32;
        let mut dropped: i64 = 0;
        let mut fraction_digits: i64 = 0;
        let mut sticky = false;
        let mut seen_digit = false;
        let mut seen_point = false;

        for b in mantissa.bytes() {
            match b {
                b'0'..=b'9' => {
                    seen_digit = true;
                    if seen_point {
                        fraction_digits += 1;
                    }
                    let digit = (b - b'0') as u128;
                    if kept == 0 && digit == 0 {
                        continue;
                    }
                    if kept < SCAN_DIGITS {
                        coefficient = coefficient * 10 + digit;
                        kept += 1;
                    } else {
                        dropped += 1;
                        sticky |= digit != 0;
                    }
                }
                b'.' if !seen_point => seen_point = true,
                _ => return Err(malformed()),
            }
        }
        if !seen_digit {
            return Err(malformed());
        }

        let mut exponent: i64 = 0;
        if let Some(text) = exponent_text {
            let (exponent_negative, digits) = split_sign(text);
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(malformed());
            }
            for b in digits.bytes() {
                exponent = exponent
                    .saturating_mul(10)
                    .saturating_add((b - b'0') as i64);
            }
            if exponent_negative {
                exponent = -exponent;
            }
        }

        // Clamp only the combined scale: digit counts can offset a huge exponent.
        let exponent = exponent
            .saturating_sub(fraction_digits)
            .saturating_add(dropped)
            .clamp(-EXPONENT_LIMIT, EXPONENT_LIMIT) as i32;
        Ok(self.finish(negative, coefficient, exponent, sticky))
    }
}

fn split_sign(text: &str) -> (bool, &str) {
    if let Some(rest) = text.strip_prefix('-') {
        (true, rest)
    } else if let Some(rest) = text.strip_prefix('+') {
        (false, rest)
    } else {
        (false, text)
    }
}

fn parse_nan(negative: bool, signaling: bool, payload: &str) -> Option<Bid128> {
    if !payload.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let significant = payload.trim_start_matches('0');
    // Payloads wider than 33 digits are non-canonical and collapse to zero.
    let payload = if significant.is_empty() || significant.len() > (PRECISION - 1) as usize {
        0
    } else {
        significant.parse::<u128>().ok()?
    };
    Some(Bid128::nan(negative, signaling, payload))
}

impl FromStr for Bid128 {
    type Err = DecimalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Context::default().parse(s)
    }
}
