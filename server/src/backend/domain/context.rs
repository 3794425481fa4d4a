//! Explicit request context passed into the services.
//!
//! The current user and the current date are supplied by the caller instead of
//! being looked up from ambient state, so that due-date evaluation is
//! deterministic under test.

use chrono::{Local, NaiveDate};
use std::sync::Arc;

use super::models::month_key::MonthKey;

/// Source of "today"
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Wall clock in the server's local timezone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock pinned to one date
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Who is asking, and when
#[derive(Debug, Clone, PartialEq)]
pub struct UserContext {
    pub user_id: String,
    pub today: NaiveDate,
}

impl UserContext {
    pub fn new(user_id: impl Into<String>, today: NaiveDate) -> Self {
        Self {
            user_id: user_id.into(),
            today,
        }
    }

    pub fn from_clock(user_id: impl Into<String>, clock: &Arc<dyn Clock>) -> Self {
        Self::new(user_id, clock.today())
    }

    pub fn current_month(&self) -> MonthKey {
        MonthKey::from_date(self.today)
    }
}
