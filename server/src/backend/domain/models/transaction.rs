//! Domain model for a ledger transaction.
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use super::month_key::MonthKey;

/// Comment prefix marking transactions generated from recurring expenses
pub const RECURRING_COMMENT_TAG: &str = "[recurring]";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub user_id: String,
    pub date: NaiveDate,
    pub amount: f64,
    pub category_id: Option<String>,
    pub comment: String,
    pub recurring_expense_id: Option<String>,
    pub generated_month: Option<MonthKey>,
    pub created_at: String,
}

impl Transaction {
    /// Generate a unique transaction ID based on amount and current timestamp.
    /// Format: <type>-<timestamp_ms>-<random_suffix>
    /// Example: ex-1625846400123-af3c
    pub fn generate_id(amount: f64) -> String {
        let tx_type = if amount >= 0.0 { "in" } else { "ex" };
        let timestamp_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        format!("{}-{}-{}", tx_type, timestamp_ms, &suffix[..4])
    }

    /// Uniqueness key for generated transactions: one per expense per month
    pub fn generated_key(&self) -> Option<(&str, MonthKey)> {
        match (&self.recurring_expense_id, self.generated_month) {
            (Some(expense_id), Some(month)) => Some((expense_id.as_str(), month)),
            _ => None,
        }
    }

    pub fn is_generated(&self) -> bool {
        self.generated_key().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_id_prefix() {
        assert!(Transaction::generate_id(-10.0).starts_with("ex-"));
        assert!(Transaction::generate_id(10.0).starts_with("in-"));
        assert_ne!(Transaction::generate_id(1.0), Transaction::generate_id(1.0));
    }
}
