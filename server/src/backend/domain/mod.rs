//! # Domain Module
//!
//! Contains all business logic for the recurring expense tracker.
//!
//! This module encapsulates the rules for deciding when a recurring expense is
//! due, materializing it into the ledger exactly once per month, and keeping
//! the definitions and their labels consistent. It operates independently of
//! the HTTP layer and of any specific storage mechanism.
//!
//! ## Module Organization
//!
//! - **schedule**: Pure due-date evaluation (pending predicate, month keys, clamping)
//! - **recurring_expense_scheduler**: Processing runs that create transactions and advance watermarks
//! - **recurring_expense_service**: Definition CRUD, validation, and monthly summary
//! - **recurring_expense_type_service**: Type labels, system-wide seeding, cascading detach
//! - **transaction_service**: Ledger listing, manual entries, deletion
//! - **context**: Injected user and clock
//!
//! ## Business Rules
//!
//! - An expense is pending when it is active, started, not ended, and has not
//!   been processed for the current month
//! - Due dates clamp `day_of_month` to the month's length
//! - At most one generated transaction exists per expense per month
//! - The `last_processed_month` watermark never moves backwards

pub mod commands;
pub mod context;
pub mod errors;
pub mod models;
pub mod recurring_expense_scheduler;
pub mod recurring_expense_service;
pub mod recurring_expense_type_service;
pub mod schedule;
pub mod transaction_service;

pub use context::{Clock, FixedClock, SystemClock, UserContext};
pub use errors::RecurringExpenseError;
pub use recurring_expense_scheduler::RecurringExpenseScheduler;
pub use recurring_expense_service::RecurringExpenseService;
pub use recurring_expense_type_service::RecurringExpenseTypeService;
pub use transaction_service::TransactionService;
