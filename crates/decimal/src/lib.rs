// DFP Harness - Decimal Floating-Point Smoke Harness
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! 128-bit decimal floating point.
//!
//! [`Bid128`] holds an IEEE 754-2008 decimal128 value in its binary integer
//! decimal encoding: 34 significant digits and a quantum exponent in
//! `-6176..=6111`. Arithmetic goes through a [`Context`], which carries the
//! rounding mode and accumulates [`StatusFlags`].
//!
//! ```
//! use dfp_decimal::{Bid128, Context};
//!
//! let mut ctx = Context::default();
//! let a = ctx.parse("123.456").unwrap();
//! let b = ctx.parse("78.9").unwrap();
//! let sum = ctx.add(a, b);
//! assert_eq!(sum.to_string(), "202.356");
//! assert!(ctx.flags().is_empty());
//! ```

mod arith;
mod bid128;
mod cmp;
mod context;
mod error;
mod format;
mod parse;

pub use bid128::{Bid128, MAX_COEFFICIENT, MAX_EXPONENT, MIN_EXPONENT, PRECISION};
pub use context::{Context, RoundingMode, StatusFlags};
pub use error::DecimalError;
