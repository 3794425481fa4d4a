//! Recurring expense tracker backend.
//!
//! Users define expenses that repeat on a fixed day each month. The scheduler
//! turns every due expense into exactly one ledger transaction per month.

pub mod backend;
pub mod config;
