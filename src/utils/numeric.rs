//! Rounding and fixed-point helpers
//!
//! Valuations are rounded exactly once, at the output boundary. Aggregates
//! and ledger balances are accumulated as integers (hundredths of a unit for
//! amounts, millionths for the treasury) so that sums are exact and
//! independent of summation order.

/// Decimal places of a valuation amount
pub const AMOUNT_DECIMALS: i32 = 2;

/// Decimal places of an estimated cost
pub const COST_DECIMALS: i32 = 6;

/// Millionths per unit, the treasury's fixed-point scale
pub const MICROS_PER_UNIT: f64 = 1_000_000.0;
const HUNDREDTHS_PER_UNIT: f64 = 100.0;

/// Round half away from zero to `decimals` places
///
/// Values too large to scale are already integral and returned as is.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    let scaled = value * factor;
    if scaled.is_finite() {
        scaled.round() / factor
    } else {
        value
    }
}

pub fn round_amount(value: f64) -> f64 {
    round_to(value, AMOUNT_DECIMALS)
}

pub fn round_cost(value: f64) -> f64 {
    round_to(value, COST_DECIMALS)
}

/// Finite, non-negative view of a value; anything else becomes zero
pub fn non_negative_or_zero(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Non-negative view of a result that saturates instead of collapsing
///
/// Like [`non_negative_or_zero`] except `+∞` becomes `f64::MAX`.
pub fn clamp_non_negative(value: f64) -> f64 {
    if value == f64::INFINITY {
        f64::MAX
    } else {
        non_negative_or_zero(value)
    }
}

/// Convert an amount to whole hundredths (saturating, NaN → 0)
///
/// Widened to `i128` so that summing any realistic number of saturated
/// amounts cannot overflow.
pub fn to_hundredths(value: f64) -> i128 {
    (value * HUNDREDTHS_PER_UNIT).round() as i128
}

pub fn from_hundredths(hundredths: i128) -> f64 {
    hundredths as f64 / HUNDREDTHS_PER_UNIT
}

/// Convert an amount to whole millionths (saturating, NaN → 0)
pub fn to_micros(value: f64) -> i64 {
    (value * MICROS_PER_UNIT).round() as i64
}

pub fn from_micros(micros: impl Into<i128>) -> f64 {
    micros.into() as f64 / MICROS_PER_UNIT
}
