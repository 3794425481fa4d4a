//! Domain-level command and query types
//! These structs are used by services inside the domain layer and are **not**
//! exposed over the public API. The REST layer is responsible for mapping the
//! public DTOs defined in the `shared` crate to these internal types.

pub mod recurring_expenses {
    use chrono::NaiveDate;

    use crate::backend::domain::models::{month_key::MonthKey, recurring_expense::RecurringExpense};

    /// Input for creating a new recurring expense.
    #[derive(Debug, Clone)]
    pub struct CreateRecurringExpenseCommand {
        pub type_id: Option<String>,
        pub description: Option<String>,
        pub amount: f64,
        pub day_of_month: u8,
        pub start_date: NaiveDate,
        pub end_date: Option<NaiveDate>,
        pub is_active: bool,
        pub category_id: Option<String>,
    }

    /// Partial update; `None` leaves a field unchanged, `Some(None)` clears it.
    #[derive(Debug, Clone, Default)]
    pub struct UpdateRecurringExpenseCommand {
        pub amount: Option<f64>,
        pub day_of_month: Option<u8>,
        pub start_date: Option<NaiveDate>,
        pub end_date: Option<Option<NaiveDate>>,
        pub is_active: Option<bool>,
        pub category_id: Option<Option<String>>,
        pub type_id: Option<Option<String>>,
        pub description: Option<Option<String>>,
    }

    /// An expense awaiting its transaction for `month`.
    #[derive(Debug, Clone, PartialEq)]
    pub struct PendingExpense {
        pub expense: RecurringExpense,
        pub due_date: NaiveDate,
    }

    /// Result of evaluating which expenses are pending.
    #[derive(Debug, Clone)]
    pub struct PendingExpensesResult {
        pub month: MonthKey,
        pub pending: Vec<PendingExpense>,
    }

    /// Totals over the expenses in effect for a month.
    #[derive(Debug, Clone, PartialEq)]
    pub struct MonthlySummary {
        pub month: MonthKey,
        pub active_count: usize,
        pub pending_count: usize,
        pub monthly_total: f64,
    }
}

pub mod processing {
    use crate::backend::domain::models::month_key::MonthKey;

    /// What happened to one expense during a processing run.
    #[derive(Debug, Clone, PartialEq)]
    pub enum Outcome {
        /// A transaction was created and the watermark advanced
        Created { transaction_id: String },
        /// A transaction for this month already existed; the watermark was advanced
        AlreadyGenerated { transaction_id: String },
        /// The transaction was created but the watermark write failed; the next
        /// run stamps it through the `AlreadyGenerated` path
        CreatedUnstamped { transaction_id: String, reason: String },
        /// Another run processed the expense first, or it stopped being pending
        Skipped,
        Failed { reason: String },
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct ExpenseOutcome {
        pub expense_id: String,
        pub outcome: Outcome,
    }

    /// Batch result of one processing run.
    #[derive(Debug, Clone, PartialEq)]
    pub struct ProcessingReport {
        pub month: MonthKey,
        pub outcomes: Vec<ExpenseOutcome>,
    }

    impl ProcessingReport {
        pub fn new(month: MonthKey) -> Self {
            Self {
                month,
                outcomes: Vec::new(),
            }
        }

        pub fn record(&mut self, expense_id: impl Into<String>, outcome: Outcome) {
            self.outcomes.push(ExpenseOutcome {
                expense_id: expense_id.into(),
                outcome,
            });
        }

        /// Number of transactions this run actually created
        pub fn created(&self) -> usize {
            self.count(|o| matches!(o, Outcome::Created { .. } | Outcome::CreatedUnstamped { .. }))
        }

        /// Expenses that hit an error, including ones whose transaction was stored
        pub fn failed(&self) -> usize {
            self.count(|o| matches!(o, Outcome::Failed { .. } | Outcome::CreatedUnstamped { .. }))
        }

        pub fn skipped(&self) -> usize {
            self.count(|o| matches!(o, Outcome::Skipped | Outcome::AlreadyGenerated { .. }))
        }

        pub fn created_transaction_ids(&self) -> Vec<&str> {
            self.outcomes
                .iter()
                .filter_map(|o| match &o.outcome {
                    Outcome::Created { transaction_id }
                    | Outcome::CreatedUnstamped { transaction_id, .. } => Some(transaction_id.as_str()),
                    _ => None,
                })
                .collect()
        }

        fn count(&self, predicate: impl Fn(&Outcome) -> bool) -> usize {
            self.outcomes.iter().filter(|o| predicate(&o.outcome)).count()
        }

        pub fn summary_message(&self) -> String {
            if self.outcomes.is_empty() {
                return "No recurring expenses were due".to_string();
            }
            let mut message = match self.created() {
                1 => "1 transaction created".to_string(),
                n => format!("{} transactions created", n),
            };
            if self.failed() > 0 {
                message.push_str(&format!(", {} failed", self.failed()));
            }
            message
        }
    }
}

pub mod transactions {
    use chrono::NaiveDate;

    /// Input for creating a manual transaction.
    #[derive(Debug, Clone)]
    pub struct CreateTransactionCommand {
        pub date: Option<NaiveDate>,
        pub amount: f64,
        pub category_id: Option<String>,
        pub comment: String,
    }

    /// Query parameters for listing transactions.
    #[derive(Debug, Clone, Default)]
    pub struct TransactionListQuery {
        pub limit: Option<u32>,
        pub start_date: Option<NaiveDate>,
        pub end_date: Option<NaiveDate>,
    }

    /// Result of deleting transactions.
    #[derive(Debug, Clone)]
    pub struct DeleteTransactionsResult {
        pub deleted_count: usize,
        pub not_found_ids: Vec<String>,
        pub success_message: String,
    }
}
