pub mod month_key;
pub mod recurring_expense;
pub mod recurring_expense_type;
pub mod transaction;
