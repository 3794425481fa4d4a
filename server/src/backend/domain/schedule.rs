//! Due-date evaluation for recurring expenses.
//!
//! Everything here is a pure function of the expense definitions and the
//! caller-supplied `today`; no storage or wall clock is consulted.

use chrono::NaiveDate;

use super::models::{month_key::MonthKey, recurring_expense::RecurringExpense};

/// The "YYYY-MM" month containing `today`
pub fn current_month_key(today: NaiveDate) -> MonthKey {
    MonthKey::from_date(today)
}

/// Due date of an expense within `month`.
///
/// `day_of_month` is clamped to the month's length, so an expense configured
/// for the 31st falls on the last day of shorter months.
pub fn due_date(day_of_month: u8, month: MonthKey) -> NaiveDate {
    month.day_clamped(u32::from(day_of_month))
}

/// Date of the transaction an expense generates for `month`.
///
/// The clamped due date, kept inside the expense's `start_date..=end_date`
/// window: a first month that starts after the due day books on `start_date`,
/// a last month that ends before it books on `end_date`.
pub fn transaction_date(expense: &RecurringExpense, month: MonthKey) -> NaiveDate {
    let due = due_date(expense.day_of_month, month).max(expense.start_date);
    match expense.end_date {
        Some(end) => due.min(end),
        None => due,
    }
}

/// Whether `expense` still needs a transaction for the month containing `today`
pub fn is_pending(expense: &RecurringExpense, today: NaiveDate) -> bool {
    if !expense.is_active {
        return false;
    }
    if !expense.is_in_effect_on(today) {
        return false;
    }
    match expense.last_processed_month {
        Some(processed) => processed < current_month_key(today),
        None => true,
    }
}

/// Filter `expenses` down to the ones pending for `today`, preserving order
pub fn compute_pending_expenses(
    expenses: &[RecurringExpense],
    today: NaiveDate,
) -> Vec<RecurringExpense> {
    expenses
        .iter()
        .filter(|expense| is_pending(expense, today))
        .cloned()
        .collect()
}
