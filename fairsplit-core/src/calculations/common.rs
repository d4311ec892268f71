//! Common utility functions for tax calculations.
//!
//! This module provides the rounding helpers shared by the estimator and the
//! apportioner. Every helper rounds half away from zero.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a decimal value to `dp` decimal places, half away from zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use fairsplit_core::calculations::common::round_dp;
///
/// assert_eq!(round_dp(dec!(0.57142857), 4), dec!(0.5714));
/// assert_eq!(round_dp(dec!(0.00005), 4), dec!(0.0001));
/// assert_eq!(round_dp(dec!(-0.00005), 4), dec!(-0.0001));
/// ```
pub fn round_dp(
    value: Decimal,
    dp: u32,
) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds a monetary amount to cents.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use fairsplit_core::calculations::common::round_cents;
///
/// assert_eq!(round_cents(dec!(7837.142857)), dec!(7837.14));
/// assert_eq!(round_cents(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_cents(dec!(-69.145)), dec!(-69.15)); // Away from zero
/// ```
pub fn round_cents(value: Decimal) -> Decimal {
    round_dp(value, 2)
}

/// Rounds a monetary amount to whole currency units.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use fairsplit_core::calculations::common::round_whole;
///
/// assert_eq!(round_whole(dec!(1527.12)), dec!(1527));
/// assert_eq!(round_whole(dec!(83.5)), dec!(84));
/// ```
pub fn round_whole(value: Decimal) -> Decimal {
    round_dp(value, 0)
}
