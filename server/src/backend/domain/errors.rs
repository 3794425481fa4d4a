//! Typed failure modes of the domain services.
//!
//! Services return `anyhow::Result`; callers that need to branch on the kind of
//! failure (the REST layer mapping to status codes, mostly) downcast to
//! [`RecurringExpenseError`].

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum RecurringExpenseError {
    #[error("Amount must be a positive number no larger than {max}")]
    InvalidAmount { max: f64 },
    #[error("Transaction amount must be a non-zero number")]
    InvalidTransactionAmount,
    #[error("Invalid day of month: {0}. Must be 1-31")]
    InvalidDayOfMonth(u8),
    #[error("End date {end} is before start date {start}")]
    InvalidDateRange { start: String, end: String },
    #[error("Invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("Text must be at most {max} characters")]
    TextTooLong { max: usize },
    #[error("Type name must be between 1 and {max} characters")]
    InvalidTypeName { max: usize },
    #[error("A type named '{0}' already exists")]
    DuplicateTypeName(String),
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
    #[error("System-wide types cannot be modified")]
    SystemTypeReadOnly,
}

impl RecurringExpenseError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn is_validation(&self) -> bool {
        !matches!(self, Self::NotFound { .. } | Self::SystemTypeReadOnly)
    }
}
