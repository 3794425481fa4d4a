//! Domain model for a recurring expense definition.
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::month_key::MonthKey;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringExpense {
    pub id: String,
    pub user_id: String,
    pub type_id: Option<String>,
    pub description: Option<String>,
    pub amount: f64,
    pub day_of_month: u8, // 1-31, clamped to the month's length when resolving due dates
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub is_active: bool,
    pub last_processed_month: Option<MonthKey>,
    pub category_id: Option<String>,
    pub created_at: String, // RFC 3339 timestamp
    pub updated_at: String, // RFC 3339 timestamp
}

impl RecurringExpense {
    /// Generate a recurring expense ID based on user ID and a random component
    pub fn generate_id(user_id: &str) -> String {
        format!("recurring::{}::{}", user_id, uuid::Uuid::new_v4().simple())
    }

    /// Validate day of month value
    pub fn is_valid_day_of_month(day: u8) -> bool {
        (1..=31).contains(&day)
    }

    /// Whether the expense's date window covers `date` (both ends inclusive)
    pub fn is_in_effect_on(&self, date: NaiveDate) -> bool {
        date >= self.start_date && self.end_date.map_or(true, |end| date <= end)
    }
}
