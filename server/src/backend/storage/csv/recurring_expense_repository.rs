//! # Recurring Expense Repository
//!
//! Stores each user's recurring expense definitions in
//! `users/{user_directory}/recurring_expenses.yaml`.
//!
//! Every mutation holds the connection lock for its whole read-modify-write
//! cycle and replaces the file atomically.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::{debug, info};
use std::fs;

use super::connection::CsvConnection;
use crate::backend::domain::models::{month_key::MonthKey, recurring_expense::RecurringExpense};
use crate::backend::storage::{errors::StorageError, traits::RecurringExpenseStorage};

#[derive(Clone)]
pub struct RecurringExpenseRepository {
    connection: CsvConnection,
}

impl RecurringExpenseRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn read_expenses(&self, user_id: &str) -> Result<Vec<RecurringExpense>> {
        let path = self.connection.recurring_expenses_file_path(user_id);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let yaml_content = fs::read_to_string(&path)?;
        if yaml_content.trim().is_empty() {
            return Ok(Vec::new());
        }
        let expenses: Vec<RecurringExpense> = serde_yaml::from_str(&yaml_content)
            .map_err(|e| anyhow!("Failed to parse {}: {}", path.display(), e))?;
        Ok(expenses)
    }

    fn write_expenses(&self, user_id: &str, expenses: &[RecurringExpense]) -> Result<()> {
        self.connection.ensure_user_directory(user_id)?;
        let path = self.connection.recurring_expenses_file_path(user_id);
        let yaml_content = serde_yaml::to_string(expenses)?;
        CsvConnection::write_atomic(&path, yaml_content.as_bytes())?;
        debug!("Wrote {} recurring expenses to {:?}", expenses.len(), path);
        Ok(())
    }
}

#[async_trait]
impl RecurringExpenseStorage for RecurringExpenseRepository {
    async fn list_recurring_expenses(&self, user_id: &str) -> Result<Vec<RecurringExpense>> {
        let _guard = self.connection.lock().await;
        self.read_expenses(user_id)
    }

    async fn get_recurring_expense(
        &self,
        user_id: &str,
        expense_id: &str,
    ) -> Result<Option<RecurringExpense>> {
        let _guard = self.connection.lock().await;
        Ok(self
            .read_expenses(user_id)?
            .into_iter()
            .find(|e| e.id == expense_id))
    }

    async fn store_recurring_expense(&self, expense: &RecurringExpense) -> Result<()> {
        let _guard = self.connection.lock().await;
        let mut expenses = self.read_expenses(&expense.user_id)?;
        if expenses.iter().any(|e| e.id == expense.id) {
            return Err(StorageError::DuplicateId(expense.id.clone()).into());
        }
        expenses.push(expense.clone());
        self.write_expenses(&expense.user_id, &expenses)?;
        info!("Stored recurring expense {} for user {}", expense.id, expense.user_id);
        Ok(())
    }

    async fn update_recurring_expense(&self, expense: &RecurringExpense) -> Result<()> {
        let _guard = self.connection.lock().await;
        let mut expenses = self.read_expenses(&expense.user_id)?;
        let existing = expenses
            .iter_mut()
            .find(|e| e.id == expense.id)
            .ok_or_else(|| StorageError::NotFound(expense.id.clone()))?;
        *existing = expense.clone();
        self.write_expenses(&expense.user_id, &expenses)?;
        info!("Updated recurring expense {}", expense.id);
        Ok(())
    }

    async fn update_last_processed_month(
        &self,
        user_id: &str,
        expense_id: &str,
        month: MonthKey,
    ) -> Result<RecurringExpense> {
        let _guard = self.connection.lock().await;
        let mut expenses = self.read_expenses(user_id)?;
        let existing = expenses
            .iter_mut()
            .find(|e| e.id == expense_id)
            .ok_or_else(|| StorageError::NotFound(expense_id.to_string()))?;

        if existing.last_processed_month.map_or(true, |current| current < month) {
            existing.last_processed_month = Some(month);
            let updated = existing.clone();
            self.write_expenses(user_id, &expenses)?;
            debug!("Advanced watermark of {} to {}", expense_id, month);
            Ok(updated)
        } else {
            Ok(existing.clone())
        }
    }

    async fn delete_recurring_expense(&self, user_id: &str, expense_id: &str) -> Result<bool> {
        let _guard = self.connection.lock().await;
        let mut expenses = self.read_expenses(user_id)?;
        let before = expenses.len();
        expenses.retain(|e| e.id != expense_id);
        if expenses.len() == before {
            return Ok(false);
        }
        self.write_expenses(user_id, &expenses)?;
        info!("Deleted recurring expense {} for user {}", expense_id, user_id);
        Ok(true)
    }
}
