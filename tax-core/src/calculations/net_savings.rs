//! What is left of a salary once income tax and recurring expenses are paid.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::progressive::TaxComputationResult;
use crate::models::ExpenseSheet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetSavings {
    pub gross_income: Decimal,
    pub total_tax: Decimal,
    /// Gross income minus tax.
    pub income_after_tax: Decimal,
    pub annual_expenses: Decimal,
    /// Income after tax minus annual expenses. Negative when expenses exceed
    /// what the salary leaves after tax.
    pub net_savings: Decimal,
}

impl NetSavings {
    pub fn is_shortfall(&self) -> bool {
        self.net_savings < Decimal::ZERO
    }
}

/// `income - tax - expenses`, with expenses annualized. Results beyond the
/// `Decimal` range clamp to its bounds.
pub fn net_savings(
    gross_income: Decimal,
    tax: &TaxComputationResult,
    expenses: &ExpenseSheet,
) -> NetSavings {
    let income_after_tax = gross_income.saturating_sub(tax.total_tax);
    let annual_expenses = expenses.annual_total();

    NetSavings {
        gross_income,
        total_tax: tax.total_tax,
        income_after_tax,
        annual_expenses,
        net_savings: income_after_tax.saturating_sub(annual_expenses),
    }
}
