//! Common utility functions for pricing calculations.
//!
//! Shared rounding, formatting and ratio helpers used by the pricing
//! calculator and the exporters.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// Values at exactly 0.005 are rounded away from zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use budget_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(828.931084)), dec!(828.93));
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46)); // Away from zero
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Formats a value with exactly two decimal places, rounding half-up first.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use budget_core::calculations::common::format_two_places;
///
/// assert_eq!(format_two_places(dec!(10000)), "10000.00");
/// assert_eq!(format_two_places(dec!(795.77384)), "795.77");
/// assert_eq!(format_two_places(dec!(-0.001)), "0.00");
/// ```
pub fn format_two_places(value: Decimal) -> String {
    let mut rounded = round_half_up(value);
    if rounded.is_zero() {
        rounded.set_sign_positive(true);
    }
    rounded.rescale(2);
    rounded.to_string()
}

/// Computes `part / whole × 100`.
///
/// Returns `None` when the percentage is undefined: `whole` is zero, or so
/// close to zero that the ratio does not fit in a [`Decimal`].
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use budget_core::calculations::common::percent_of;
///
/// assert_eq!(percent_of(dec!(25), dec!(200)), Some(dec!(12.5)));
/// assert_eq!(percent_of(dec!(25), dec!(0)), None);
/// ```
pub fn percent_of(
    part: Decimal,
    whole: Decimal,
) -> Option<Decimal> {
    if whole.is_zero() {
        return None;
    }
    part.checked_div(whole)?.checked_mul(Decimal::ONE_HUNDRED)
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
        let result = round_half_up(dec!(-123.455));

        assert_eq!(result, dec!(-123.46));
    }

    #[test]
    fn round_half_up_handles_long_fractions() {
        let result = round_half_up(dec!(828.9310843373493975903614458));

        assert_eq!(result, dec!(828.93));
    }

    // =========================================================================
    // format_two_places tests
    // =========================================================================

    #[test]
    fn format_two_places_pads_whole_numbers() {
        assert_eq!(format_two_places(dec!(15000)), "15000.00");
    }

    #[test]
    fn format_two_places_pads_single_fraction_digit() {
        assert_eq!(format_two_places(dec!(1320.0)), "1320.00");
    }

    #[test]
    fn format_two_places_rounds_half_up() {
        assert_eq!(format_two_places(dec!(17.735)), "17.74");
    }

    #[test]
    fn format_two_places_handles_zero() {
        assert_eq!(format_two_places(Decimal::ZERO), "0.00");
    }

    #[test]
    fn format_two_places_handles_negative_values() {
        assert_eq!(format_two_places(dec!(-42.5)), "-42.50");
    }

    // =========================================================================
    // percent_of tests
    // =========================================================================

    #[test]
    fn percent_of_computes_ratio() {
        assert_eq!(percent_of(dec!(1), dec!(4)), Some(dec!(25)));
    }

    #[test]
    fn percent_of_zero_whole_is_undefined() {
        assert_eq!(percent_of(dec!(10), Decimal::ZERO), None);
    }

    #[test]
    fn percent_of_vanishing_whole_is_undefined() {
        // -654.63 / 7.96e-26 fits, but × 100 does not
        let result = percent_of(dec!(-654.63), dec!(0.0000000000000000000000000796));

        assert_eq!(result, None);
    }

    #[test]
    fn percent_of_negative_part() {
        assert_eq!(percent_of(dec!(-50), dec!(200)), Some(dec!(-25)));
    }
}
