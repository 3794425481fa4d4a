//! Transaction ledger domain logic.
use anyhow::Result;
use chrono::Utc;
use log::info;

use crate::backend::domain::{
    commands::transactions::{CreateTransactionCommand, DeleteTransactionsResult, TransactionListQuery},
    context::UserContext,
    errors::RecurringExpenseError,
    models::transaction::Transaction,
    recurring_expense_service::{normalize_id, MAX_TEXT_LENGTH},
};
use crate::backend::storage::{Connection, TransactionStorage};

#[derive(Clone)]
pub struct TransactionService<C: Connection> {
    transaction_repository: C::TransactionRepository,
}

impl<C: Connection> TransactionService<C> {
    pub fn new(connection: &C) -> Self {
        Self {
            transaction_repository: connection.create_transaction_repository(),
        }
    }

    /// Transactions newest first, optionally bounded by an inclusive date range
    pub async fn list_transactions(
        &self,
        user_id: &str,
        query: TransactionListQuery,
    ) -> Result<Vec<Transaction>> {
        let mut transactions: Vec<Transaction> = self
            .transaction_repository
            .list_transactions(user_id)
            .await?
            .into_iter()
            .filter(|t| query.start_date.map_or(true, |start| t.date >= start))
            .filter(|t| query.end_date.map_or(true, |end| t.date <= end))
            .collect();

        if let Some(limit) = query.limit {
            transactions.truncate(limit as usize);
        }
        Ok(transactions)
    }

    /// Record a manual transaction; the date defaults to today
    pub async fn create_transaction(
        &self,
        ctx: &UserContext,
        command: CreateTransactionCommand,
    ) -> Result<Transaction> {
        if !command.amount.is_finite() || command.amount == 0.0 {
            return Err(RecurringExpenseError::InvalidTransactionAmount.into());
        }
        let comment = command.comment.trim().to_string();
        if comment.chars().count() > MAX_TEXT_LENGTH {
            return Err(RecurringExpenseError::TextTooLong { max: MAX_TEXT_LENGTH }.into());
        }

        let transaction = Transaction {
            id: Transaction::generate_id(command.amount),
            user_id: ctx.user_id.clone(),
            date: command.date.unwrap_or(ctx.today),
            amount: command.amount,
            category_id: normalize_id(command.category_id),
            comment,
            recurring_expense_id: None,
            generated_month: None,
            created_at: Utc::now().to_rfc3339(),
        };

        self.transaction_repository.store_transaction(&transaction).await?;
        Ok(transaction)
    }

    pub async fn delete_transactions(
        &self,
        user_id: &str,
        transaction_ids: &[String],
    ) -> Result<DeleteTransactionsResult> {
        let deleted = self
            .transaction_repository
            .delete_transactions(user_id, transaction_ids)
            .await?;
        let not_found_ids: Vec<String> = transaction_ids
            .iter()
            .filter(|id| !deleted.contains(id))
            .cloned()
            .collect();

        let success_message = match deleted.len() {
            0 => "No transactions were deleted".to_string(),
            1 => "1 transaction deleted successfully".to_string(),
            n => format!("{} transactions deleted successfully", n),
        };
        info!("{} for user {}", success_message, user_id);

        Ok(DeleteTransactionsResult {
            deleted_count: deleted.len(),
            not_found_ids,
            success_message,
        })
    }
}
