use serde::{Deserialize, Serialize};

/// A recurring expense definition as exposed over the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringExpense {
    pub id: String,
    pub user_id: String,
    /// Optional link to a recurring expense type (e.g. "Mortgage")
    pub type_id: Option<String>,
    pub description: Option<String>,
    /// Positive amount in the user's base currency
    pub amount: f64,
    /// Day of the month the expense falls due (1-31, clamped to month length)
    pub day_of_month: u8,
    /// First day the expense has effect (YYYY-MM-DD)
    pub start_date: String,
    /// Last day the expense has effect (YYYY-MM-DD), open-ended when absent
    pub end_date: Option<String>,
    pub is_active: bool,
    /// Last month a transaction was generated for (YYYY-MM)
    pub last_processed_month: Option<String>,
    pub category_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// A label for recurring expenses, either owned by a user or system-wide
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringExpenseType {
    pub id: String,
    /// None for system-wide types
    pub user_id: Option<String>,
    pub name: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub user_id: String,
    /// Calendar date of the transaction (YYYY-MM-DD)
    pub date: String,
    /// Signed amount (negative for expenses)
    pub amount: f64,
    pub category_id: Option<String>,
    pub comment: String,
    /// Set when the transaction was generated from a recurring expense
    pub recurring_expense_id: Option<String>,
    /// Month the transaction was generated for (YYYY-MM)
    pub generated_month: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateRecurringExpenseRequest {
    pub type_id: Option<String>,
    pub description: Option<String>,
    pub amount: f64,
    pub day_of_month: u8,
    pub start_date: String,
    pub end_date: Option<String>,
    /// Defaults to true
    pub is_active: Option<bool>,
    pub category_id: Option<String>,
}

/// Partial update; absent fields are left unchanged.
///
/// `end_date`, `category_id`, `type_id` and `description` accept an explicit
/// `null` to clear the value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateRecurringExpenseRequest {
    pub amount: Option<f64>,
    pub day_of_month: Option<u8>,
    pub start_date: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub end_date: Option<Option<String>>,
    pub is_active: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub category_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub type_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub description: Option<Option<String>>,
}

/// Distinguishes a missing field (None) from an explicit null (Some(None))
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringExpenseListResponse {
    pub recurring_expenses: Vec<RecurringExpense>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringExpenseResponse {
    pub recurring_expense: RecurringExpense,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteRecurringExpenseResponse {
    pub deleted: bool,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingRecurringExpensesResponse {
    /// Month being evaluated (YYYY-MM)
    pub month: String,
    pub pending: Vec<PendingRecurringExpense>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingRecurringExpense {
    pub recurring_expense: RecurringExpense,
    /// Date the generated transaction will carry (YYYY-MM-DD)
    pub due_date: String,
}

/// Outcome of processing a single recurring expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExpenseOutcome {
    Created { transaction_id: String },
    AlreadyGenerated { transaction_id: String },
    /// Transaction stored, but the expense was not marked as processed
    CreatedUnstamped { transaction_id: String, reason: String },
    Skipped,
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseProcessingResult {
    pub expense_id: String,
    pub outcome: ExpenseOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessRecurringExpensesResponse {
    pub month: String,
    pub created: usize,
    pub failed: usize,
    pub results: Vec<ExpenseProcessingResult>,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringExpenseSummaryResponse {
    pub month: String,
    pub active_count: usize,
    pub pending_count: usize,
    /// Sum of the amounts of all expenses in effect this month
    pub monthly_total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringExpenseTypeListResponse {
    pub types: Vec<RecurringExpenseType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateRecurringExpenseTypeRequest {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteRecurringExpenseTypeResponse {
    /// Number of recurring expenses the type was detached from
    pub detached_count: usize,
    pub success_message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionListRequest {
    /// Maximum number of transactions to return
    pub limit: Option<u32>,
    /// Inclusive start date (YYYY-MM-DD)
    pub start_date: Option<String>,
    /// Inclusive end date (YYYY-MM-DD)
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionListResponse {
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTransactionRequest {
    /// Transaction date (YYYY-MM-DD), defaults to today
    pub date: Option<String>,
    /// Signed amount (negative for expenses)
    pub amount: f64,
    pub category_id: Option<String>,
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteTransactionsRequest {
    pub transaction_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteTransactionsResponse {
    pub deleted_count: usize,
    pub not_found_ids: Vec<String>,
    pub success_message: String,
}
