//! Progressive (marginal-rate) income tax calculation.
//!
//! Each bracket taxes only the slice of income that falls between its floor
//! and ceiling. The calculator walks the brackets in the order it is given,
//! so callers are responsible for supplying an ascending, contiguous table
//! (see [`crate::models::validate_schedule`]). Unordered or overlapping input
//! produces a deterministic but order-dependent result.
//!
//! # Boundary rule
//!
//! A bracket applies only when income is *strictly greater* than its floor.
//! Income that lands exactly on a boundary is taxed entirely by the lower
//! bracket; the next bracket is recorded as skipped.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::TaxBracket;
//! use tax_core::calculations::compute_tax;
//!
//! let brackets = vec![
//!     TaxBracket::new("XX", dec!(0), Some(dec!(10000)), dec!(10)),
//!     TaxBracket::new("XX", dec!(10000), Some(dec!(50000)), dec!(20)),
//!     TaxBracket::new("XX", dec!(50000), None, dec!(30)),
//! ];
//!
//! let result = compute_tax(dec!(60000), &brackets);
//!
//! assert_eq!(result.total_tax, dec!(12000));
//! assert_eq!(result.breakdown.len(), 3);
//! assert!(result.breakdown.iter().all(|c| !c.was_skipped));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::TaxBracket;

/// How a single bracket contributed to the total.
///
/// Serialized with the field names the salary front-end reads from the
/// `debug` array, and with plain JSON numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketContribution {
    #[serde(rename = "min", with = "rust_decimal::serde::float")]
    pub min_income: Decimal,

    /// `None` for the unbounded top bracket.
    #[serde(rename = "max", with = "rust_decimal::serde::float_option")]
    pub max_income: Option<Decimal>,

    #[serde(rename = "rate", with = "rust_decimal::serde::float")]
    pub rate_percent: Decimal,

    /// The income level this bracket was applied up to; `None` when skipped.
    #[serde(rename = "upper", with = "rust_decimal::serde::float_option")]
    pub taxed_up_to: Option<Decimal>,

    #[serde(rename = "taxable", with = "rust_decimal::serde::float")]
    pub taxable_amount: Decimal,

    #[serde(rename = "bracketTax", with = "rust_decimal::serde::float")]
    pub bracket_tax: Decimal,

    #[serde(rename = "runningTax", with = "rust_decimal::serde::float")]
    pub running_total_tax: Decimal,

    #[serde(rename = "skipped")]
    pub was_skipped: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxComputationResult {
    pub total_tax: Decimal,
    pub breakdown: Vec<BracketContribution>,
}

impl TaxComputationResult {
    /// Rate of the highest bracket the income actually reached.
    pub fn marginal_rate(&self) -> Option<Decimal> {
        self.breakdown
            .iter()
            .rev()
            .find(|c| !c.was_skipped)
            .map(|c| c.rate_percent)
    }

    /// Total tax as a percentage of `income`; zero for non-positive income.
    pub fn effective_rate(
        &self,
        income: Decimal,
    ) -> Decimal {
        if income <= Decimal::ZERO {
            Decimal::ZERO
        } else {
            (self.total_tax / income).saturating_mul(Decimal::ONE_HUNDRED)
        }
    }
}

/// Computes progressive tax on `income` over `brackets`, in the given order.
///
/// Never fails: zero or negative income skips every bracket and yields zero
/// tax, and a malformed bracket whose ceiling is not above its floor simply
/// contributes nothing. Amounts that would leave the `Decimal` range clamp to
/// its bounds instead of panicking.
pub fn compute_tax(
    income: Decimal,
    brackets: &[TaxBracket],
) -> TaxComputationResult {
    let (total_tax, breakdown) = brackets.iter().fold(
        (Decimal::ZERO, Vec::with_capacity(brackets.len())),
        |(running_total_tax, mut breakdown), bracket| {
            let contribution = contribution(income, bracket, running_total_tax);
            let running_total_tax = contribution.running_total_tax;
            breakdown.push(contribution);
            (running_total_tax, breakdown)
        },
    );

    TaxComputationResult {
        total_tax,
        breakdown,
    }
}

fn contribution(
    income: Decimal,
    bracket: &TaxBracket,
    running_total_tax: Decimal,
) -> BracketContribution {
    let min = bracket.min_income;

    if income <= min {
        return BracketContribution {
            min_income: min,
            max_income: bracket.max_income,
            rate_percent: bracket.rate_percent,
            taxed_up_to: None,
            taxable_amount: Decimal::ZERO,
            bracket_tax: Decimal::ZERO,
            running_total_tax,
            was_skipped: true,
        };
    }

    let upper = match bracket.max_income {
        Some(max) => income.min(max),
        None => income,
    };
    let taxable_amount = upper.saturating_sub(min);
    let bracket_tax = if taxable_amount > Decimal::ZERO {
        // scale the rate first so a 0-100 rate cannot overflow the product
        taxable_amount.saturating_mul(bracket.rate_percent / Decimal::ONE_HUNDRED)
    } else {
        Decimal::ZERO
    };

    BracketContribution {
        min_income: min,
        max_income: bracket.max_income,
        rate_percent: bracket.rate_percent,
        taxed_up_to: Some(upper),
        taxable_amount,
        bracket_tax,
        running_total_tax: running_total_tax.saturating_add(bracket_tax),
        was_skipped: false,
    }
}
