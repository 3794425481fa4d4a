//! # Storage Traits
//!
//! This module defines the storage abstraction traits that allow different
//! storage backends to be used interchangeably in the domain layer.

use anyhow::Result;
use async_trait::async_trait;

use crate::backend::domain::models::{
    month_key::MonthKey, recurring_expense::RecurringExpense,
    recurring_expense_type::RecurringExpenseType, transaction::Transaction,
};

/// Trait defining the interface for recurring expense storage operations
#[async_trait]
pub trait RecurringExpenseStorage: Send + Sync {
    /// List all recurring expenses owned by a user, in creation order
    async fn list_recurring_expenses(&self, user_id: &str) -> Result<Vec<RecurringExpense>>;

    /// Retrieve a specific recurring expense by ID
    async fn get_recurring_expense(
        &self,
        user_id: &str,
        expense_id: &str,
    ) -> Result<Option<RecurringExpense>>;

    /// Store a new recurring expense
    async fn store_recurring_expense(&self, expense: &RecurringExpense) -> Result<()>;

    /// Replace an existing recurring expense
    async fn update_recurring_expense(&self, expense: &RecurringExpense) -> Result<()>;

    /// Advance the processing watermark of an expense.
    ///
    /// The stored watermark never moves backwards: if it is already at or past
    /// `month` the call leaves it unchanged. Returns the expense as stored.
    async fn update_last_processed_month(
        &self,
        user_id: &str,
        expense_id: &str,
        month: MonthKey,
    ) -> Result<RecurringExpense>;

    /// Delete a recurring expense
    /// Returns true if the expense was found and deleted, false otherwise
    async fn delete_recurring_expense(&self, user_id: &str, expense_id: &str) -> Result<bool>;
}

/// Trait defining the interface for recurring expense type storage operations
#[async_trait]
pub trait RecurringExpenseTypeStorage: Send + Sync {
    /// List the system-wide types plus the ones owned by `user_id`
    async fn list_recurring_expense_types(&self, user_id: &str) -> Result<Vec<RecurringExpenseType>>;

    async fn get_recurring_expense_type(&self, type_id: &str) -> Result<Option<RecurringExpenseType>>;

    async fn store_recurring_expense_type(&self, expense_type: &RecurringExpenseType) -> Result<()>;

    /// Returns true if the type was found and deleted
    async fn delete_recurring_expense_type(&self, type_id: &str) -> Result<bool>;
}

/// Trait defining the interface for transaction storage operations
#[async_trait]
pub trait TransactionStorage: Send + Sync {
    /// Store a new transaction.
    ///
    /// Generated transactions are unique per (recurring expense, month): storing
    /// a second one fails with [`StorageError::DuplicateGeneratedTransaction`].
    ///
    /// [`StorageError::DuplicateGeneratedTransaction`]: super::StorageError::DuplicateGeneratedTransaction
    async fn store_transaction(&self, transaction: &Transaction) -> Result<()>;

    /// Find the transaction generated for an expense in a given month
    async fn find_generated_transaction(
        &self,
        user_id: &str,
        expense_id: &str,
        month: MonthKey,
    ) -> Result<Option<Transaction>>;

    /// List all transactions for a user ordered by date descending (most recent first)
    async fn list_transactions(&self, user_id: &str) -> Result<Vec<Transaction>>;

    /// Delete multiple transactions
    /// Returns the IDs that were actually deleted
    async fn delete_transactions(&self, user_id: &str, transaction_ids: &[String]) -> Result<Vec<String>>;
}

/// Trait defining the interface for storage connections
///
/// This trait abstracts away the specific connection type and provides factory
/// methods for creating repositories, so the domain layer can work with any
/// storage backend without knowing the implementation details.
pub trait Connection: Send + Sync + Clone + 'static {
    type RecurringExpenseRepository: RecurringExpenseStorage + Clone + 'static;
    type RecurringExpenseTypeRepository: RecurringExpenseTypeStorage + Clone + 'static;
    type TransactionRepository: TransactionStorage + Clone + 'static;

    fn create_recurring_expense_repository(&self) -> Self::RecurringExpenseRepository;

    fn create_recurring_expense_type_repository(&self) -> Self::RecurringExpenseTypeRepository;

    fn create_transaction_repository(&self) -> Self::TransactionRepository;
}
