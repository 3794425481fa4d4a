//! # CSV Transaction Repository
//!
//! Each user's ledger is one `transactions.csv`. Generated transactions carry
//! their recurring expense ID and month; storing a second transaction for the
//! same pair is rejected while the connection lock is held, which makes the
//! check-and-insert atomic for every writer sharing the connection.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use csv::{Reader, StringRecord, Writer};
use log::{debug, info, warn};
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter};

use super::connection::CsvConnection;
use crate::backend::domain::models::{month_key::MonthKey, transaction::Transaction};
use crate::backend::storage::{errors::StorageError, traits::TransactionStorage};

const HEADER: [&str; 9] = [
    "id",
    "user_id",
    "date",
    "amount",
    "category_id",
    "comment",
    "recurring_expense_id",
    "generated_month",
    "created_at",
];

#[derive(Clone)]
pub struct TransactionRepository {
    connection: CsvConnection,
}

fn optional(field: &str) -> Option<String> {
    if field.is_empty() {
        None
    } else {
        Some(field.to_string())
    }
}

fn parse_record(record: &StringRecord) -> Result<Transaction> {
    let field = |i: usize| record.get(i).unwrap_or("");

    let date = NaiveDate::parse_from_str(field(2), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}' in transaction {}", field(2), field(0)))?;
    let amount = field(3)
        .parse::<f64>()
        .with_context(|| format!("Invalid amount '{}' in transaction {}", field(3), field(0)))?;
    let generated_month = match optional(field(7)) {
        Some(month) => Some(month.parse::<MonthKey>()?),
        None => None,
    };

    Ok(Transaction {
        id: field(0).to_string(),
        user_id: field(1).to_string(),
        date,
        amount,
        category_id: optional(field(4)),
        comment: field(5).to_string(),
        recurring_expense_id: optional(field(6)),
        generated_month,
        created_at: field(8).to_string(),
    })
}

impl TransactionRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    /// Read all transactions for a user from their CSV file, in file order
    fn read_transactions(&self, user_id: &str) -> Result<Vec<Transaction>> {
        let file_path = self.connection.transactions_file_path(user_id);
        if !file_path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&file_path)?;
        let mut csv_reader = Reader::from_reader(BufReader::new(file));

        let mut transactions = Vec::new();
        for result in csv_reader.records() {
            let record = result?;
            let transaction = parse_record(&record)
                .with_context(|| format!("Corrupt ledger {}", file_path.display()))?;
            transactions.push(transaction);
        }

        Ok(transactions)
    }

    /// Write all transactions for a user to their CSV file
    fn write_transactions(&self, user_id: &str, transactions: &[Transaction]) -> Result<()> {
        self.connection.ensure_user_directory(user_id)?;
        let file_path = self.connection.transactions_file_path(user_id);
        let temp_path = file_path.with_extension("tmp");

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)?;

            let mut csv_writer = Writer::from_writer(BufWriter::new(file));
            csv_writer.write_record(HEADER)?;

            for transaction in transactions {
                let date = transaction.date.format("%Y-%m-%d").to_string();
                let amount = transaction.amount.to_string();
                let generated_month = transaction
                    .generated_month
                    .map(|m| m.to_string())
                    .unwrap_or_default();
                csv_writer.write_record([
                    transaction.id.as_str(),
                    transaction.user_id.as_str(),
                    date.as_str(),
                    amount.as_str(),
                    transaction.category_id.as_deref().unwrap_or(""),
                    transaction.comment.as_str(),
                    transaction.recurring_expense_id.as_deref().unwrap_or(""),
                    generated_month.as_str(),
                    transaction.created_at.as_str(),
                ])?;
            }

            csv_writer.flush()?;
        }

        std::fs::rename(&temp_path, &file_path)?;
        debug!("Wrote {} transactions to {:?}", transactions.len(), file_path);
        Ok(())
    }
}

#[async_trait]
impl TransactionStorage for TransactionRepository {
    async fn store_transaction(&self, transaction: &Transaction) -> Result<()> {
        let _guard = self.connection.lock().await;
        let mut transactions = self.read_transactions(&transaction.user_id)?;

        if transactions.iter().any(|t| t.id == transaction.id) {
            return Err(StorageError::DuplicateId(transaction.id.clone()).into());
        }

        if let Some((expense_id, month)) = transaction.generated_key() {
            if transactions
                .iter()
                .any(|t| t.generated_key() == Some((expense_id, month)))
            {
                warn!(
                    "Rejected duplicate generated transaction for expense {} in {}",
                    expense_id, month
                );
                return Err(StorageError::DuplicateGeneratedTransaction {
                    expense_id: expense_id.to_string(),
                    month,
                }
                .into());
            }
        }

        transactions.push(transaction.clone());
        self.write_transactions(&transaction.user_id, &transactions)?;
        info!(
            "Stored transaction {} for user {} ({:.2} on {})",
            transaction.id, transaction.user_id, transaction.amount, transaction.date
        );
        Ok(())
    }

    async fn find_generated_transaction(
        &self,
        user_id: &str,
        expense_id: &str,
        month: MonthKey,
    ) -> Result<Option<Transaction>> {
        let _guard = self.connection.lock().await;
        Ok(self
            .read_transactions(user_id)?
            .into_iter()
            .find(|t| t.generated_key() == Some((expense_id, month))))
    }

    async fn list_transactions(&self, user_id: &str) -> Result<Vec<Transaction>> {
        let _guard = self.connection.lock().await;
        let mut transactions = self.read_transactions(user_id)?;
        // Newest first; same-day entries in reverse insertion order.
        transactions.sort_by(|a, b| a.date.cmp(&b.date));
        transactions.reverse();
        Ok(transactions)
    }

    async fn delete_transactions(&self, user_id: &str, transaction_ids: &[String]) -> Result<Vec<String>> {
        let _guard = self.connection.lock().await;
        let mut transactions = self.read_transactions(user_id)?;

        let mut deleted = Vec::new();
        transactions.retain(|t| {
            if transaction_ids.contains(&t.id) {
                deleted.push(t.id.clone());
                false
            } else {
                true
            }
        });

        if !deleted.is_empty() {
            self.write_transactions(user_id, &transactions)?;
            info!("Deleted {} transactions for user {}", deleted.len(), user_id);
        }

        Ok(deleted)
    }
}
