use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

const MONTHS_PER_YEAR: Decimal = Decimal::from_parts(12, 0, 0, false, 0);

/// Recurring expense categories, grouped the way the salary form groups them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExpenseCategory {
    // Lifestyle
    HouseRent,
    Food,
    Entertainment,
    Travel,
    Shopping,
    Other,
    // Surprises
    MedicalExpenses,
    MedicalInsurance,
    SurprisesOther,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 9] = [
        Self::HouseRent,
        Self::Food,
        Self::Entertainment,
        Self::Travel,
        Self::Shopping,
        Self::Other,
        Self::MedicalExpenses,
        Self::MedicalInsurance,
        Self::SurprisesOther,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HouseRent => "houseRent",
            Self::Food => "food",
            Self::Entertainment => "entertainment",
            Self::Travel => "travel",
            Self::Shopping => "shopping",
            Self::Other => "other",
            Self::MedicalExpenses => "medicalExpenses",
            Self::MedicalInsurance => "medicalInsurance",
            Self::SurprisesOther => "surprisesOther",
        }
    }

    /// Accepts the camelCase keys used by the form as well as kebab/snake case.
    pub fn parse(s: &str) -> Option<Self> {
        let key: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .flat_map(char::to_lowercase)
            .collect();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str().to_ascii_lowercase() == key)
    }

    pub fn is_surprise(&self) -> bool {
        matches!(
            self,
            Self::MedicalExpenses | Self::MedicalInsurance | Self::SurprisesOther
        )
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpensePeriod {
    #[default]
    Monthly,
    Annual,
}

impl ExpensePeriod {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monthly" | "month" | "mo" => Some(Self::Monthly),
            "annual" | "annually" | "yearly" | "year" | "yr" => Some(Self::Annual),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub category: ExpenseCategory,
    pub amount: Decimal,
    #[serde(default)]
    pub period: ExpensePeriod,
}

impl Expense {
    pub fn annual_amount(&self) -> Decimal {
        match self.period {
            ExpensePeriod::Monthly => self.amount.saturating_mul(MONTHS_PER_YEAR),
            ExpensePeriod::Annual => self.amount,
        }
    }
}

/// The user's recurring expenses. Categories may repeat; every entry counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseSheet {
    pub expenses: Vec<Expense>,
}

impl ExpenseSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(
        &mut self,
        category: ExpenseCategory,
        amount: Decimal,
        period: ExpensePeriod,
    ) {
        self.expenses.push(Expense {
            category,
            amount,
            period,
        });
    }

    pub fn annual_total(&self) -> Decimal {
        self.expenses
            .iter()
            .fold(Decimal::ZERO, |total, e| total.saturating_add(e.annual_amount()))
    }

    pub fn annual_lifestyle_total(&self) -> Decimal {
        self.expenses
            .iter()
            .filter(|e| !e.category.is_surprise())
            .fold(Decimal::ZERO, |total, e| total.saturating_add(e.annual_amount()))
    }

    pub fn annual_surprises_total(&self) -> Decimal {
        self.expenses
            .iter()
            .filter(|e| e.category.is_surprise())
            .fold(Decimal::ZERO, |total, e| total.saturating_add(e.annual_amount()))
    }

    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty()
    }
}
