//! Domain model for a recurring expense type label.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringExpenseType {
    pub id: String,
    pub user_id: Option<String>, // None = system-wide
    pub name: String,
    pub created_at: String,
}

impl RecurringExpenseType {
    pub fn generate_id() -> String {
        format!("type::{}", uuid::Uuid::new_v4().simple())
    }

    pub fn is_system(&self) -> bool {
        self.user_id.is_none()
    }

    /// System-wide types are visible to everyone, user types only to their owner
    pub fn is_visible_to(&self, user_id: &str) -> bool {
        self.user_id.as_deref().map_or(true, |owner| owner == user_id)
    }
}
