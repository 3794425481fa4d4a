//! Materializes due recurring expenses into ledger transactions.
//!
//! A processing run evaluates the user's definitions against `today`, and for
//! every pending expense creates one transaction dated at the expense's due
//! date in the current month, then advances the expense's
//! `last_processed_month` watermark. Each expense is handled independently: a
//! failure is recorded in the [`ProcessingReport`] and the run moves on.
//!
//! Overlapping runs are safe. The watermark is re-read right before acting,
//! an existing generated transaction for the month is reused instead of
//! duplicated, and the ledger itself rejects a second generated transaction
//! for the same (expense, month). The watermark is only written after the
//! transaction exists, so a run interrupted in between is repaired by the next
//! one without creating a duplicate.

use anyhow::{Context, Result};
use chrono::Utc;
use log::{debug, error, info, warn};
use std::collections::HashMap;

use crate::backend::domain::{
    commands::{
        processing::{Outcome, ProcessingReport},
        recurring_expenses::{PendingExpense, PendingExpensesResult},
    },
    context::UserContext,
    models::{
        month_key::MonthKey,
        recurring_expense::RecurringExpense,
        transaction::{Transaction, RECURRING_COMMENT_TAG},
    },
    schedule,
};
use crate::backend::storage::{
    Connection, RecurringExpenseStorage, RecurringExpenseTypeStorage, StorageError,
    TransactionStorage,
};

#[derive(Clone)]
pub struct RecurringExpenseScheduler<C: Connection> {
    expense_repository: C::RecurringExpenseRepository,
    type_repository: C::RecurringExpenseTypeRepository,
    transaction_repository: C::TransactionRepository,
}

impl<C: Connection> RecurringExpenseScheduler<C> {
    pub fn new(connection: &C) -> Self {
        Self {
            expense_repository: connection.create_recurring_expense_repository(),
            type_repository: connection.create_recurring_expense_type_repository(),
            transaction_repository: connection.create_transaction_repository(),
        }
    }

    /// Pending expenses for the current month with their due dates; no side effects
    pub async fn compute_pending_expenses(&self, ctx: &UserContext) -> Result<PendingExpensesResult> {
        let month = ctx.current_month();
        let expenses = self
            .expense_repository
            .list_recurring_expenses(&ctx.user_id)
            .await
            .context("Failed to load recurring expenses")?;

        let pending = schedule::compute_pending_expenses(&expenses, ctx.today)
            .into_iter()
            .map(|expense| PendingExpense {
                due_date: schedule::transaction_date(&expense, month),
                expense,
            })
            .collect();

        Ok(PendingExpensesResult { month, pending })
    }

    /// Create this month's transaction for every pending expense of the user.
    ///
    /// Only a failure to load the definitions fails the whole call; per-expense
    /// failures are reported as [`Outcome::Failed`], or as
    /// [`Outcome::CreatedUnstamped`] when only the watermark write failed.
    pub async fn process_recurring_expenses(&self, ctx: &UserContext) -> Result<ProcessingReport> {
        let month = ctx.current_month();
        let mut report = ProcessingReport::new(month);

        let expenses = self
            .expense_repository
            .list_recurring_expenses(&ctx.user_id)
            .await
            .context("Failed to load recurring expenses")?;
        let pending = schedule::compute_pending_expenses(&expenses, ctx.today);

        if pending.is_empty() {
            debug!("No pending recurring expenses for user {} in {}", ctx.user_id, month);
            return Ok(report);
        }

        info!(
            "Processing {} pending recurring expenses for user {} in {}",
            pending.len(),
            ctx.user_id,
            month
        );

        let type_names = self.type_names(&ctx.user_id).await;

        for expense in pending {
            let outcome = match self.process_expense(ctx, &expense, month, &type_names).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(
                        "Failed to process recurring expense {} for {}: {:#}",
                        expense.id, month, e
                    );
                    Outcome::Failed {
                        reason: format!("{:#}", e),
                    }
                }
            };
            report.record(expense.id, outcome);
        }

        info!(
            "Recurring expense run for user {} in {}: {} created, {} skipped, {} failed",
            ctx.user_id,
            month,
            report.created(),
            report.skipped(),
            report.failed()
        );

        Ok(report)
    }

    async fn process_expense(
        &self,
        ctx: &UserContext,
        expense: &RecurringExpense,
        month: MonthKey,
        type_names: &HashMap<String, String>,
    ) -> Result<Outcome> {
        // The watermark may have moved since the list was read.
        let current = match self
            .expense_repository
            .get_recurring_expense(&ctx.user_id, &expense.id)
            .await?
        {
            Some(current) => current,
            None => {
                debug!("Recurring expense {} was deleted during the run", expense.id);
                return Ok(Outcome::Skipped);
            }
        };
        if !schedule::is_pending(&current, ctx.today) {
            debug!("Recurring expense {} no longer pending for {}", current.id, month);
            return Ok(Outcome::Skipped);
        }

        if let Some(existing) = self
            .transaction_repository
            .find_generated_transaction(&ctx.user_id, &current.id, month)
            .await?
        {
            warn!(
                "Transaction {} already generated for {} in {}; advancing watermark",
                existing.id, current.id, month
            );
            self.advance_watermark(ctx, &current.id, month).await?;
            return Ok(Outcome::AlreadyGenerated {
                transaction_id: existing.id,
            });
        }

        let transaction = Self::build_transaction(&current, month, type_names);
        if let Err(e) = self.transaction_repository.store_transaction(&transaction).await {
            return match e.downcast_ref::<StorageError>() {
                Some(StorageError::DuplicateGeneratedTransaction { .. }) => {
                    let existing = self
                        .transaction_repository
                        .find_generated_transaction(&ctx.user_id, &current.id, month)
                        .await?;
                    self.advance_watermark(ctx, &current.id, month).await?;
                    Ok(Outcome::AlreadyGenerated {
                        transaction_id: existing.map(|t| t.id).unwrap_or_default(),
                    })
                }
                _ => Err(e),
            };
        }

        if let Err(e) = self.advance_watermark(ctx, &current.id, month).await {
            error!(
                "Transaction {} was created but the watermark of {} was not updated: {:#}",
                transaction.id, current.id, e
            );
            return Ok(Outcome::CreatedUnstamped {
                transaction_id: transaction.id,
                reason: format!("{:#}", e),
            });
        }

        info!(
            "Generated transaction {} for recurring expense {} ({:.2} on {})",
            transaction.id, current.id, transaction.amount, transaction.date
        );

        Ok(Outcome::Created {
            transaction_id: transaction.id,
        })
    }

    async fn advance_watermark(&self, ctx: &UserContext, expense_id: &str, month: MonthKey) -> Result<()> {
        self.expense_repository
            .update_last_processed_month(&ctx.user_id, expense_id, month)
            .await?;
        Ok(())
    }

    fn build_transaction(
        expense: &RecurringExpense,
        month: MonthKey,
        type_names: &HashMap<String, String>,
    ) -> Transaction {
        let label = expense
            .description
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .or_else(|| {
                expense
                    .type_id
                    .as_ref()
                    .and_then(|id| type_names.get(id))
                    .map(String::as_str)
            })
            .unwrap_or("Recurring expense");
        let amount = -expense.amount;

        Transaction {
            id: Transaction::generate_id(amount),
            user_id: expense.user_id.clone(),
            date: schedule::transaction_date(expense, month),
            amount,
            category_id: expense.category_id.clone(),
            comment: format!("{} {}", RECURRING_COMMENT_TAG, label),
            recurring_expense_id: Some(expense.id.clone()),
            generated_month: Some(month),
            created_at: Utc::now().to_rfc3339(),
        }
    }

    /// Type labels only decorate the comment, so a failed lookup is not fatal.
    async fn type_names(&self, user_id: &str) -> HashMap<String, String> {
        match self.type_repository.list_recurring_expense_types(user_id).await {
            Ok(types) => types.into_iter().map(|t| (t.id, t.name)).collect(),
            Err(e) => {
                warn!("Could not load recurring expense types for {}: {}", user_id, e);
                HashMap::new()
            }
        }
    }
}
