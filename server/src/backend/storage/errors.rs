//! Storage-level failures the domain layer reacts to.

use crate::backend::domain::models::month_key::MonthKey;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum StorageError {
    /// A transaction was already generated for this expense and month
    #[error("A transaction was already generated for recurring expense {expense_id} in {month}")]
    DuplicateGeneratedTransaction { expense_id: String, month: MonthKey },
    #[error("Duplicate id: {0}")]
    DuplicateId(String),
    #[error("Record not found: {0}")]
    NotFound(String),
}
