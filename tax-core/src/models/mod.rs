mod country;
mod expenses;
mod tax_bracket;

pub use country::{Country, flag_emoji};
pub use expenses::{Expense, ExpenseCategory, ExpensePeriod, ExpenseSheet};
pub use tax_bracket::{ScheduleError, TaxBracket, validate_schedule};
