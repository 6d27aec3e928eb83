//! Plain-text rendering of a calculation for the `calculate` command.

use std::fmt;

use rust_decimal::Decimal;
use tax_core::calculations::common::format_amount;
use tax_core::{Country, ExpenseSheet, NetSavings, TaxComputationResult};

pub struct TaxReport<'a> {
    pub country: &'a Country,
    pub income: Decimal,
    pub result: &'a TaxComputationResult,
    pub expenses: &'a ExpenseSheet,
    pub savings: &'a NetSavings,
}

impl fmt::Display for TaxReport<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let currency = self.country.currency.as_str();

        writeln!(
            f,
            "{} {} ({})",
            self.country.flag_emoji(),
            self.country.name,
            self.country.code
        )?;
        writeln!(f, "Gross income: {} {currency}", format_amount(self.income))?;
        writeln!(f)?;
        writeln!(
            f,
            "{:>15}  {:>15}  {:>7}  {:>15}  {:>15}",
            "From", "To", "Rate", "Taxable", "Tax"
        )?;
        for c in &self.result.breakdown {
            let to = c.max_income.map_or_else(|| "and above".to_string(), format_amount);
            if c.was_skipped {
                writeln!(
                    f,
                    "{:>15}  {:>15}  {:>6}%  {:>15}  {:>15}",
                    format_amount(c.min_income),
                    to,
                    c.rate_percent.normalize(),
                    "-",
                    "-"
                )?;
            } else {
                writeln!(
                    f,
                    "{:>15}  {:>15}  {:>6}%  {:>15}  {:>15}",
                    format_amount(c.min_income),
                    to,
                    c.rate_percent.normalize(),
                    format_amount(c.taxable_amount),
                    format_amount(c.bracket_tax)
                )?;
            }
        }
        writeln!(f)?;
        writeln!(f, "Total tax:        {} {currency}", format_amount(self.result.total_tax))?;
        writeln!(
            f,
            "Effective rate:   {}%",
            format_amount(self.result.effective_rate(self.income))
        )?;
        if let Some(marginal) = self.result.marginal_rate() {
            writeln!(f, "Marginal rate:    {}%", marginal.normalize())?;
        }
        writeln!(
            f,
            "Income after tax: {} {currency}",
            format_amount(self.savings.income_after_tax)
        )?;

        if !self.expenses.is_empty() {
            writeln!(f)?;
            writeln!(
                f,
                "Lifestyle:        {} {currency}/yr",
                format_amount(self.expenses.annual_lifestyle_total())
            )?;
            writeln!(
                f,
                "Surprises:        {} {currency}/yr",
                format_amount(self.expenses.annual_surprises_total())
            )?;
        }
        let label = if self.savings.is_shortfall() {
            "Shortfall:"
        } else {
            "Net savings:"
        };
        write!(
            f,
            "{label:<18}{} {currency}",
            format_amount(self.savings.net_savings)
        )
    }
}

/// One line per country: flag, code, name and currency.
pub fn country_listing(countries: &[Country]) -> String {
    countries
        .iter()
        .map(|c| format!("{} {}  {} ({})", c.flag_emoji(), c.code, c.name, c.currency))
        .collect::<Vec<_>>()
        .join("\n")
}
