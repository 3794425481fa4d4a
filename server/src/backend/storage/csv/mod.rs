//! File-backed storage: YAML for definitions and types, CSV for the ledger.

pub mod connection;
pub mod recurring_expense_repository;
pub mod recurring_expense_type_repository;
pub mod transaction_repository;

#[cfg(test)]
pub mod test_utils;

pub use connection::CsvConnection;
pub use recurring_expense_repository::RecurringExpenseRepository;
pub use recurring_expense_type_repository::RecurringExpenseTypeRepository;
pub use transaction_repository::TransactionRepository;
