// DFP Harness - Decimal Floating-Point Smoke Harness
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::bid128::{Bid128, Parts, Unpacked};
use std::fmt::{self, Write};

impl Bid128 {
    /// Raw `±<coefficient>E±<exponent>` form, e.g. `+202356E-3`.
    pub fn to_bid_string(&self) -> String {
        let sign = if self.is_sign_negative() { '-' } else { '+' };
        match self.unpack() {
            Unpacked::Finite(p) => format!("{}{}E{:+}", sign, p.coefficient, p.exponent),
            Unpacked::Infinite { .. } => format!("{}Inf", sign),
            Unpacked::Nan { signaling: true, .. } => format!("{}SNaN", sign),
            Unpacked::Nan { .. } => format!("{}NaN", sign),
        }
    }
}

/// Scientific-string conversion: plain notation while the exponent is not
/// positive and the adjusted exponent is at least -6, `d.dddE±n` otherwise.
impl fmt::Display for Bid128 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.unpack() {
            Unpacked::Finite(parts) => f.pad(&scientific(parts)),
            Unpacked::Infinite { negative } => f.pad(if negative { "-Infinity" } else { "Infinity" }),
            Unpacked::Nan {
                negative,
                signaling,
                payload,
            } => {
                let mut out = String::new();
                if negative {
                    out.push('-');
                }
                out.push_str(if signaling { "sNaN" } else { "NaN" });
                if payload != 0 {
                    let _ = write!(out, "{}", payload);
                }
                f.pad(&out)
            }
        }
    }
}

fn scientific(parts: Parts) -> String {
    let digits = parts.coefficient.to_string();
    let exponent = parts.exponent as i64;
    let adjusted = exponent + digits.len() as i64 - 1;

    let mut out = String::with_capacity(digits.len() + 12);
    if parts.negative {
        out.push('-');
    }

    if exponent <= 0 && adjusted >= -6 {
        let point = digits.len() as i64 + exponent;
        if exponent == 0 {
            out.push_str(&digits);
        } else if point > 0 {
            let (int, frac) = digits.split_at(point as usize);
            out.push_str(int);
            out.push('.');
            out.push_str(frac);
        } else {
            out.push_str("0.");
            for _ in 0..-point {
                out.push('0');
            }
            out.push_str(&digits);
        }
    } else {
        let (lead, rest) = digits.split_at(1);
        out.push_str(lead);
        if !rest.is_empty() {
            out.push('.');
            out.push_str(rest);
        }
        let _ = write!(out, "E{:+}", adjusted);
    }
    out
}
