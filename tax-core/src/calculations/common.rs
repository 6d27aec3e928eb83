//! Presentation helpers for monetary figures.
//!
//! Calculations keep full decimal precision; rounding to cents happens only
//! when a figure is shown to a user.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds to two decimal places, midpoint away from zero.
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(1000.002)), dec!(1000.00));
/// assert_eq!(round_half_up(dec!(9144.375)), dec!(9144.38));
/// assert_eq!(round_half_up(dec!(-0.005)), dec!(-0.01));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Formats an amount rounded to cents with comma thousands separators,
/// e.g. `1234567.891` becomes `"1,234,567.89"`.
pub fn format_amount(value: Decimal) -> String {
    let rounded = round_half_up(value);
    let text = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}{grouped}.{frac_part}")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn round_half_up_rounds_down_below_midpoint() {
        assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
    }

    #[test]
    fn round_half_up_rounds_up_at_midpoint() {
        assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
    }

    #[test]
    fn round_half_up_handles_negative_values() {
        assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46));
    }

    #[test]
    fn round_half_up_handles_large_values() {
        assert_eq!(round_half_up(dec!(999999.999)), dec!(1000000.00));
    }

    #[test]
    fn format_amount_groups_thousands() {
        assert_eq!(format_amount(dec!(1234567.891)), "1,234,567.89");
        assert_eq!(format_amount(dec!(100000)), "100,000.00");
        assert_eq!(format_amount(dec!(23000)), "23,000.00");
    }

    #[test]
    fn format_amount_small_values() {
        assert_eq!(format_amount(dec!(0)), "0.00");
        assert_eq!(format_amount(dec!(7.5)), "7.50");
        assert_eq!(format_amount(dec!(999.999)), "1,000.00");
    }

    #[test]
    fn format_amount_negative_values() {
        assert_eq!(format_amount(dec!(-11500)), "-11,500.00");
        assert_eq!(format_amount(dec!(-0.001)), "0.00");
    }
}
