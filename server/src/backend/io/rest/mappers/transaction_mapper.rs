//! Mappers for converting between transaction domain models and shared DTOs.

use anyhow::Result;

use super::recurring_expense_mapper::parse_date;
use crate::backend::domain::commands::{
    processing::{Outcome, ProcessingReport},
    transactions::{CreateTransactionCommand, TransactionListQuery},
};
use crate::backend::domain::models::transaction::Transaction as DomainTransaction;
use shared::{
    CreateTransactionRequest, ExpenseOutcome, ExpenseProcessingResult,
    ProcessRecurringExpensesResponse, Transaction as SharedTransaction, TransactionListRequest,
};

pub struct TransactionMapper;

impl TransactionMapper {
    pub fn to_dto(domain: DomainTransaction) -> SharedTransaction {
        SharedTransaction {
            id: domain.id,
            user_id: domain.user_id,
            date: domain.date.format("%Y-%m-%d").to_string(),
            amount: domain.amount,
            category_id: domain.category_id,
            comment: domain.comment,
            recurring_expense_id: domain.recurring_expense_id,
            generated_month: domain.generated_month.map(|m| m.to_string()),
            created_at: domain.created_at,
        }
    }

    pub fn to_list_query(dto: TransactionListRequest) -> Result<TransactionListQuery> {
        Ok(TransactionListQuery {
            limit: dto.limit,
            start_date: dto.start_date.as_deref().map(parse_date).transpose()?,
            end_date: dto.end_date.as_deref().map(parse_date).transpose()?,
        })
    }

    pub fn to_create_command(dto: CreateTransactionRequest) -> Result<CreateTransactionCommand> {
        Ok(CreateTransactionCommand {
            date: dto.date.as_deref().map(parse_date).transpose()?,
            amount: dto.amount,
            category_id: dto.category_id,
            comment: dto.comment,
        })
    }

    pub fn to_process_response(report: ProcessingReport) -> ProcessRecurringExpensesResponse {
        let success_message = report.summary_message();
        let created = report.created();
        let failed = report.failed();
        ProcessRecurringExpensesResponse {
            month: report.month.to_string(),
            created,
            failed,
            results: report
                .outcomes
                .into_iter()
                .map(|o| ExpenseProcessingResult {
                    expense_id: o.expense_id,
                    outcome: match o.outcome {
                        Outcome::Created { transaction_id } => ExpenseOutcome::Created { transaction_id },
                        Outcome::AlreadyGenerated { transaction_id } => {
                            ExpenseOutcome::AlreadyGenerated { transaction_id }
                        }
                        Outcome::CreatedUnstamped { transaction_id, reason } => {
                            ExpenseOutcome::CreatedUnstamped { transaction_id, reason }
                        }
                        Outcome::Skipped => ExpenseOutcome::Skipped,
                        Outcome::Failed { reason } => ExpenseOutcome::Failed { reason },
                    },
                })
                .collect(),
            success_message,
        }
    }
}
