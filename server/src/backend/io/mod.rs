//! # IO Module
//!
//! Adapter layer between HTTP clients and the domain logic.
//!
//! Requests arrive as JSON DTOs from the `shared` crate, are mapped to domain
//! commands, and domain results are mapped back. Services are injected through
//! Axum state.
//!
//! ## Supported Operations
//!
//! - **/api/recurring-expenses**: definitions, pending evaluation, processing runs, summary
//! - **/api/recurring-expense-types**: type labels
//! - **/api/transactions**: the ledger

pub mod rest;
