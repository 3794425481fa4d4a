//! # Storage Module
//!
//! Handles all data persistence for the recurring expense tracker.
//!
//! The domain layer only sees the traits in [`traits`]; the CSV/YAML
//! implementation in [`csv`] can be swapped for another backend without
//! touching the services.
//!
//! ## Guarantees
//!
//! - Every file write replaces the target atomically (temp file + rename)
//! - Read-modify-write cycles are serialized per connection
//! - Generated transactions are unique per (recurring expense, month)

pub mod csv;
pub mod errors;
pub mod traits;

pub use self::csv::CsvConnection;
pub use errors::StorageError;
pub use traits::{Connection, RecurringExpenseStorage, RecurringExpenseTypeStorage, TransactionStorage};
