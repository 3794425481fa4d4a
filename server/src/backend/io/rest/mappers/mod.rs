pub mod recurring_expense_mapper;
pub mod transaction_mapper;
