use rust_decimal::Decimal;
use tax_core::{Expense, ExpenseCategory, ExpensePeriod};
use thiserror::Error;

/// Error returned when a command-line amount cannot be parsed.
#[derive(Debug, Error)]
pub enum ParseAmountError {
    #[error("amount is empty")]
    Empty,

    #[error("invalid amount '{input}': {source}")]
    Invalid {
        input: String,
        #[source]
        source: rust_decimal::Error,
    },
}

#[derive(Debug, Error)]
pub enum ParseExpenseError {
    #[error("expense '{0}' must look like category=amount[/monthly|/annual]")]
    Malformed(String),

    #[error("unknown expense category '{0}'")]
    UnknownCategory(String),

    #[error("unknown expense period '{0}' (expected monthly or annual)")]
    UnknownPeriod(String),

    #[error(transparent)]
    Amount(#[from] ParseAmountError),
}

/// Normalizes input for decimal parsing: trims whitespace and removes commas
/// (thousands separator).
fn normalize_decimal_input(s: &str) -> String {
    s.trim().replace(',', "")
}

/// Parses an amount such as `"1,234.56"`.
pub fn parse_decimal(s: &str) -> Result<Decimal, ParseAmountError> {
    let normalized = normalize_decimal_input(s);
    if normalized.is_empty() {
        return Err(ParseAmountError::Empty);
    }
    normalized.parse().map_err(|source| {
        tracing::warn!(input = %s, "invalid amount: {}", source);
        ParseAmountError::Invalid {
            input: s.to_string(),
            source,
        }
    })
}

/// Parses `--expense` values: `houseRent=1,500`, `travel=3000/annual`.
/// The period defaults to monthly.
pub fn parse_expense(s: &str) -> Result<Expense, ParseExpenseError> {
    let (category, rest) = s
        .split_once('=')
        .ok_or_else(|| ParseExpenseError::Malformed(s.to_string()))?;

    let category = ExpenseCategory::parse(category.trim())
        .ok_or_else(|| ParseExpenseError::UnknownCategory(category.trim().to_string()))?;

    let (amount, period) = match rest.split_once('/') {
        Some((amount, period)) => {
            let period = ExpensePeriod::parse(period)
                .ok_or_else(|| ParseExpenseError::UnknownPeriod(period.trim().to_string()))?;
            (amount, period)
        }
        None => (rest, ExpensePeriod::default()),
    };

    Ok(Expense {
        category,
        amount: parse_decimal(amount)?,
        period,
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn parse_decimal_accepts_comma_thousands_separator() {
        assert_eq!(parse_decimal("1,234.56").unwrap(), dec!(1234.56));
        assert_eq!(parse_decimal("1,200,000").unwrap(), dec!(1200000));
    }

    #[test]
    fn parse_decimal_trims_whitespace() {
        assert_eq!(parse_decimal("  85000  ").unwrap(), dec!(85000));
    }

    #[test]
    fn parse_decimal_rejects_empty_and_garbage() {
        assert!(matches!(parse_decimal("   "), Err(ParseAmountError::Empty)));
        assert!(matches!(
            parse_decimal("ten thousand"),
            Err(ParseAmountError::Invalid { .. })
        ));
    }

    #[test]
    fn parse_expense_defaults_to_monthly() {
        let expense = parse_expense("houseRent=1,500").unwrap();

        assert_eq!(
            expense,
            Expense {
                category: ExpenseCategory::HouseRent,
                amount: dec!(1500),
                period: ExpensePeriod::Monthly,
            }
        );
        assert_eq!(expense.annual_amount(), dec!(18000));
    }

    #[test]
    fn parse_expense_with_period() {
        let expense = parse_expense("medical-insurance=2400/annual").unwrap();

        assert_eq!(expense.category, ExpenseCategory::MedicalInsurance);
        assert_eq!(expense.period, ExpensePeriod::Annual);
        assert_eq!(expense.annual_amount(), dec!(2400));
    }

    #[test]
    fn parse_expense_errors() {
        assert!(matches!(
            parse_expense("rent 1500"),
            Err(ParseExpenseError::Malformed(s)) if s == "rent 1500"
        ));
        assert!(matches!(
            parse_expense("yacht=100"),
            Err(ParseExpenseError::UnknownCategory(s)) if s == "yacht"
        ));
        assert!(matches!(
            parse_expense("food=100/weekly"),
            Err(ParseExpenseError::UnknownPeriod(s)) if s == "weekly"
        ));
        assert!(matches!(
            parse_expense("food="),
            Err(ParseExpenseError::Amount(ParseAmountError::Empty))
        ));
    }
}
