//! Common utility functions for pricing calculations.
//!
//! Shared helpers used by the row calculator, the price solver and the
//! portfolio summary: rounding, clamping and percentage shares.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// Values at exactly 0.005 are rounded away from zero, the usual convention
/// for BRL amounts.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use pricing_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46)); // Away from zero
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    round_half_up_dp(value, 2)
}

/// Half-up rounding to an arbitrary number of decimal places.
///
/// Negotiated prices are reported with four places.
///
/// ```
/// use rust_decimal_macros::dec;
/// use pricing_core::calculations::common::round_half_up_dp;
///
/// assert_eq!(round_half_up_dp(dec!(81.644215), 4), dec!(81.6442));
/// ```
pub fn round_half_up_dp(
    value: Decimal,
    dp: u32,
) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Returns the maximum of two decimal values.
///
/// ```
/// use rust_decimal_macros::dec;
/// use pricing_core::calculations::common::max;
///
/// assert_eq!(max(dec!(-90.00), dec!(0)), dec!(0));
/// assert_eq!(max(dec!(90.00), dec!(0)), dec!(90.00));
/// ```
pub fn max(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a > b { a } else { b }
}

/// `part / base × 100`, or zero when `base` is not positive.
///
/// ```
/// use rust_decimal_macros::dec;
/// use pricing_core::calculations::common::percent_of;
///
/// assert_eq!(percent_of(dec!(25), dec!(200)), dec!(12.5));
/// assert_eq!(percent_of(dec!(25), dec!(0)), dec!(0));
/// ```
pub fn percent_of(
    part: Decimal,
    base: Decimal,
) -> Decimal {
    if base > Decimal::ZERO {
        part / base * Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    }
}

/// [`percent_of`] that returns `None` instead of overflowing.
pub fn checked_percent_of(
    part: Decimal,
    base: Decimal,
) -> Option<Decimal> {
    if base > Decimal::ZERO {
        part.checked_div(base)?.checked_mul(Decimal::ONE_HUNDRED)
    } else {
        Some(Decimal::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    // =========================================================================
    // round_half_up tests
    // =========================================================================

    #[test]
    fn round_half_up_rounds_down_below_midpoint() {
        let result = round_half_up(dec!(123.454));

        assert_eq!(result, dec!(123.45));
    }

    #[test]
    fn round_half_up_rounds_up_at_midpoint() {
        let result = round_half_up(dec!(123.455));

        assert_eq!(result, dec!(123.46));
    }

    #[test]
    fn round_half_up_handles_negative_values() {
        let result = round_half_up(dec!(-240.805));

        assert_eq!(result, dec!(-240.81));
    }

    #[test]
    fn round_half_up_handles_long_quotients() {
        // 32 / 1.34, the net profit of a small profitable row
        let result = round_half_up(dec!(32) / dec!(1.34));

        assert_eq!(result, dec!(23.88));
    }

    #[test]
    fn round_half_up_dp_keeps_four_places() {
        let result = round_half_up_dp(dec!(0.00005), 4);

        assert_eq!(result, dec!(0.0001));
    }

    // =========================================================================
    // max tests
    // =========================================================================

    #[test]
    fn max_returns_larger_value() {
        assert_eq!(max(dec!(100.00), dec!(200.00)), dec!(200.00));
    }

    #[test]
    fn max_clamps_negative_to_zero() {
        assert_eq!(max(dec!(-0.01), Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn max_handles_equal_values() {
        assert_eq!(max(dec!(150.00), dec!(150.00)), dec!(150.00));
    }

    // =========================================================================
    // percent_of tests
    // =========================================================================

    #[test]
    fn percent_of_scales_by_one_hundred() {
        assert_eq!(percent_of(dec!(90), dec!(1000)), dec!(9));
    }

    #[test]
    fn percent_of_keeps_sign_of_part() {
        assert_eq!(percent_of(dec!(-50), dec!(200)), dec!(-25));
    }

    #[test]
    fn percent_of_guards_zero_and_negative_base() {
        assert_eq!(percent_of(dec!(10), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(percent_of(dec!(10), dec!(-5)), Decimal::ZERO);
    }

    #[test]
    fn checked_percent_of_matches_and_detects_overflow() {
        assert_eq!(checked_percent_of(dec!(90), dec!(1000)), Some(dec!(9)));
        assert_eq!(checked_percent_of(dec!(10), Decimal::ZERO), Some(Decimal::ZERO));
        assert_eq!(checked_percent_of(Decimal::MAX, dec!(0.5)), None);
    }
}
