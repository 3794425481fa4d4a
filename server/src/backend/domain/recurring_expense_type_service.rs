//! Recurring expense type labels.
use anyhow::Result;
use chrono::Utc;
use log::info;

use crate::backend::domain::{
    errors::RecurringExpenseError,
    models::recurring_expense_type::RecurringExpenseType,
};
use crate::backend::storage::{Connection, RecurringExpenseStorage, RecurringExpenseTypeStorage};

pub const MAX_TYPE_NAME_LENGTH: usize = 64;

/// Labels every installation starts with
pub const SYSTEM_TYPE_NAMES: [&str; 6] = [
    "Mortgage",
    "Rent",
    "Subscription",
    "Utilities",
    "Insurance",
    "Loan",
];

#[derive(Clone)]
pub struct RecurringExpenseTypeService<C: Connection> {
    type_repository: C::RecurringExpenseTypeRepository,
    expense_repository: C::RecurringExpenseRepository,
}

impl<C: Connection> RecurringExpenseTypeService<C> {
    pub fn new(connection: &C) -> Self {
        Self {
            type_repository: connection.create_recurring_expense_type_repository(),
            expense_repository: connection.create_recurring_expense_repository(),
        }
    }

    /// Store any missing system-wide types. Returns how many were added.
    pub async fn ensure_system_types(&self) -> Result<usize> {
        let mut added = 0;
        for name in SYSTEM_TYPE_NAMES {
            let id = format!("type::system::{}", name.to_lowercase());
            if self.type_repository.get_recurring_expense_type(&id).await?.is_none() {
                self.type_repository
                    .store_recurring_expense_type(&RecurringExpenseType {
                        id,
                        user_id: None,
                        name: name.to_string(),
                        created_at: Utc::now().to_rfc3339(),
                    })
                    .await?;
                added += 1;
            }
        }
        if added > 0 {
            info!("Seeded {} system recurring expense types", added);
        }
        Ok(added)
    }

    /// System-wide types plus the user's own, ordered by name
    pub async fn list_types(&self, user_id: &str) -> Result<Vec<RecurringExpenseType>> {
        let mut types = self.type_repository.list_recurring_expense_types(user_id).await?;
        types.sort_by_key(|t| t.name.to_lowercase());
        Ok(types)
    }

    pub async fn create_type(&self, user_id: &str, name: &str) -> Result<RecurringExpenseType> {
        let name = name.trim();
        if name.is_empty() || name.chars().count() > MAX_TYPE_NAME_LENGTH {
            return Err(RecurringExpenseError::InvalidTypeName {
                max: MAX_TYPE_NAME_LENGTH,
            }
            .into());
        }

        let existing = self.type_repository.list_recurring_expense_types(user_id).await?;
        let lowered = name.to_lowercase();
        if existing.iter().any(|t| t.name.to_lowercase() == lowered) {
            return Err(RecurringExpenseError::DuplicateTypeName(name.to_string()).into());
        }

        let expense_type = RecurringExpenseType {
            id: RecurringExpenseType::generate_id(),
            user_id: Some(user_id.to_string()),
            name: name.to_string(),
            created_at: Utc::now().to_rfc3339(),
        };
        self.type_repository
            .store_recurring_expense_type(&expense_type)
            .await?;
        info!("Created recurring expense type '{}' for user {}", name, user_id);
        Ok(expense_type)
    }

    /// Delete one of the user's own types, detaching it from their expenses first.
    ///
    /// Returns the number of expenses that were detached.
    pub async fn delete_type(&self, user_id: &str, type_id: &str) -> Result<usize> {
        let expense_type = self
            .type_repository
            .get_recurring_expense_type(type_id)
            .await?
            .filter(|t| t.is_visible_to(user_id))
            .ok_or_else(|| RecurringExpenseError::not_found("Recurring expense type", type_id))?;
        if expense_type.is_system() {
            return Err(RecurringExpenseError::SystemTypeReadOnly.into());
        }

        let mut detached = 0;
        for mut expense in self.expense_repository.list_recurring_expenses(user_id).await? {
            if expense.type_id.as_deref() == Some(type_id) {
                expense.type_id = None;
                expense.updated_at = Utc::now().to_rfc3339();
                self.expense_repository.update_recurring_expense(&expense).await?;
                detached += 1;
            }
        }

        self.type_repository.delete_recurring_expense_type(type_id).await?;
        info!(
            "Deleted recurring expense type {} for user {} ({} expenses detached)",
            type_id, user_id, detached
        );
        Ok(detached)
    }
}
