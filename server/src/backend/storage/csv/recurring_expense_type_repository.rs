//! # Recurring Expense Type Repository
//!
//! All types, system-wide and user-owned, live in one
//! `recurring_expense_types.yaml` at the root of the data directory.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::info;
use std::fs;

use super::connection::CsvConnection;
use crate::backend::domain::models::recurring_expense_type::RecurringExpenseType;
use crate::backend::storage::{errors::StorageError, traits::RecurringExpenseTypeStorage};

#[derive(Clone)]
pub struct RecurringExpenseTypeRepository {
    connection: CsvConnection,
}

impl RecurringExpenseTypeRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn read_types(&self) -> Result<Vec<RecurringExpenseType>> {
        let path = self.connection.recurring_expense_types_file_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let yaml_content = fs::read_to_string(&path)?;
        if yaml_content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_yaml::from_str(&yaml_content)
            .map_err(|e| anyhow!("Failed to parse {}: {}", path.display(), e))
    }

    fn write_types(&self, types: &[RecurringExpenseType]) -> Result<()> {
        let path = self.connection.recurring_expense_types_file_path();
        let yaml_content = serde_yaml::to_string(types)?;
        CsvConnection::write_atomic(&path, yaml_content.as_bytes())
    }
}

#[async_trait]
impl RecurringExpenseTypeStorage for RecurringExpenseTypeRepository {
    async fn list_recurring_expense_types(&self, user_id: &str) -> Result<Vec<RecurringExpenseType>> {
        let _guard = self.connection.lock().await;
        Ok(self
            .read_types()?
            .into_iter()
            .filter(|t| t.is_visible_to(user_id))
            .collect())
    }

    async fn get_recurring_expense_type(&self, type_id: &str) -> Result<Option<RecurringExpenseType>> {
        let _guard = self.connection.lock().await;
        Ok(self.read_types()?.into_iter().find(|t| t.id == type_id))
    }

    async fn store_recurring_expense_type(&self, expense_type: &RecurringExpenseType) -> Result<()> {
        let _guard = self.connection.lock().await;
        let mut types = self.read_types()?;
        if types.iter().any(|t| t.id == expense_type.id) {
            return Err(StorageError::DuplicateId(expense_type.id.clone()).into());
        }
        types.push(expense_type.clone());
        self.write_types(&types)?;
        info!("Stored recurring expense type '{}' ({})", expense_type.name, expense_type.id);
        Ok(())
    }

    async fn delete_recurring_expense_type(&self, type_id: &str) -> Result<bool> {
        let _guard = self.connection.lock().await;
        let mut types = self.read_types()?;
        let before = types.len();
        types.retain(|t| t.id != type_id);
        if types.len() == before {
            return Ok(false);
        }
        self.write_types(&types)?;
        info!("Deleted recurring expense type {}", type_id);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::storage::csv::test_utils::RepositoryTestHelper;

    fn expense_type(id: &str, user_id: Option<&str>, name: &str) -> RecurringExpenseType {
        RecurringExpenseType {
            id: id.to_string(),
            user_id: user_id.map(str::to_string),
            name: name.to_string(),
            created_at: "2024-01-01T00:00:00Z".to_string(),
        }
    }

    #[tokio::test]
    async fn test_list_includes_system_and_own_types_only() {
        let helper = RepositoryTestHelper::new().await.unwrap();
        let repo = &helper.recurring_expense_type_repo;

        repo.store_recurring_expense_type(&expense_type("t1", None, "Mortgage"))
            .await
            .unwrap();
        repo.store_recurring_expense_type(&expense_type("t2", Some("alice"), "Gym"))
            .await
            .unwrap();
        repo.store_recurring_expense_type(&expense_type("t3", Some("bob"), "Parking"))
            .await
            .unwrap();

        let alice: Vec<String> = repo
            .list_recurring_expense_types("alice")
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(alice, vec!["t1", "t2"]);

        let bob: Vec<String> = repo
            .list_recurring_expense_types("bob")
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(bob, vec!["t1", "t3"]);
    }

    #[tokio::test]
    async fn test_get_and_delete() {
        let helper = RepositoryTestHelper::new().await.unwrap();
        let repo = &helper.recurring_expense_type_repo;
        let gym = expense_type("t2", Some("alice"), "Gym");
        repo.store_recurring_expense_type(&gym).await.unwrap();

        assert_eq!(repo.get_recurring_expense_type("t2").await.unwrap(), Some(gym));
        assert!(repo.delete_recurring_expense_type("t2").await.unwrap());
        assert!(!repo.delete_recurring_expense_type("t2").await.unwrap());
        assert_eq!(repo.get_recurring_expense_type("t2").await.unwrap(), None);
    }
}
