/// Test utilities module for automatic cleanup and consistent test infrastructure
///
/// This module provides RAII-based cleanup that guarantees test data is removed
/// even if tests panic or fail.
use anyhow::Result;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use super::connection::CsvConnection;
use super::recurring_expense_repository::RecurringExpenseRepository;
use super::recurring_expense_type_repository::RecurringExpenseTypeRepository;
use super::transaction_repository::TransactionRepository;
use crate::backend::domain::models::recurring_expense::RecurringExpense;

/// RAII Test Environment that automatically cleans up on drop
pub struct TestEnvironment {
    /// The temporary directory - kept alive to prevent auto-cleanup until drop
    _temp_dir: TempDir,
    pub connection: CsvConnection,
    pub base_path: PathBuf,
}

impl TestEnvironment {
    pub async fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let base_path = temp_dir.path().to_path_buf();
        let connection = CsvConnection::new(&base_path)?;

        Ok(TestEnvironment {
            _temp_dir: temp_dir,
            connection,
            base_path,
        })
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_path
    }
}

/// Repository Test Helper with automatic cleanup
pub struct RepositoryTestHelper {
    pub env: TestEnvironment,
    pub recurring_expense_repo: RecurringExpenseRepository,
    pub recurring_expense_type_repo: RecurringExpenseTypeRepository,
    pub transaction_repo: TransactionRepository,
}

impl RepositoryTestHelper {
    pub async fn new() -> Result<Self> {
        let env = TestEnvironment::new().await?;

        let recurring_expense_repo = RecurringExpenseRepository::new(env.connection.clone());
        let recurring_expense_type_repo = RecurringExpenseTypeRepository::new(env.connection.clone());
        let transaction_repo = TransactionRepository::new(env.connection.clone());

        Ok(RepositoryTestHelper {
            env,
            recurring_expense_repo,
            recurring_expense_type_repo,
            transaction_repo,
        })
    }
}

/// A monthly 1000.00 expense due on the 15th, active since 2024-01-01
pub fn sample_expense(user_id: &str, id: &str) -> RecurringExpense {
    RecurringExpense {
        id: id.to_string(),
        user_id: user_id.to_string(),
        type_id: None,
        description: Some("Mortgage".to_string()),
        amount: 1000.0,
        day_of_month: 15,
        start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        end_date: None,
        is_active: true,
        last_processed_month: None,
        category_id: Some("housing".to_string()),
        created_at: "2024-01-01T00:00:00+00:00".to_string(),
        updated_at: "2024-01-01T00:00:00+00:00".to_string(),
    }
}
