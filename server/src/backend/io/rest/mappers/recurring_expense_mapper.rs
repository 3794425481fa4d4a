//! Mappers for converting between recurring expense domain models and shared DTOs.

use anyhow::Result;
use chrono::NaiveDate;

use crate::backend::domain::commands::recurring_expenses::{
    CreateRecurringExpenseCommand, MonthlySummary, PendingExpense, PendingExpensesResult,
    UpdateRecurringExpenseCommand,
};
use crate::backend::domain::errors::RecurringExpenseError;
use crate::backend::domain::models::{
    recurring_expense::RecurringExpense as DomainRecurringExpense,
    recurring_expense_type::RecurringExpenseType as DomainRecurringExpenseType,
};
use shared::{
    CreateRecurringExpenseRequest, PendingRecurringExpense, PendingRecurringExpensesResponse,
    RecurringExpense as SharedRecurringExpense, RecurringExpenseSummaryResponse,
    RecurringExpenseType as SharedRecurringExpenseType, UpdateRecurringExpenseRequest,
};

pub struct RecurringExpenseMapper;

/// Parse a YYYY-MM-DD date from a request
pub fn parse_date(value: &str) -> Result<NaiveDate, RecurringExpenseError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| RecurringExpenseError::InvalidDate(value.to_string()))
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

impl RecurringExpenseMapper {
    pub fn to_dto(domain: DomainRecurringExpense) -> SharedRecurringExpense {
        SharedRecurringExpense {
            id: domain.id,
            user_id: domain.user_id,
            type_id: domain.type_id,
            description: domain.description,
            amount: domain.amount,
            day_of_month: domain.day_of_month,
            start_date: format_date(domain.start_date),
            end_date: domain.end_date.map(format_date),
            is_active: domain.is_active,
            last_processed_month: domain.last_processed_month.map(|m| m.to_string()),
            category_id: domain.category_id,
            created_at: domain.created_at,
            updated_at: domain.updated_at,
        }
    }

    pub fn to_create_command(dto: CreateRecurringExpenseRequest) -> Result<CreateRecurringExpenseCommand> {
        Ok(CreateRecurringExpenseCommand {
            type_id: dto.type_id,
            description: dto.description,
            amount: dto.amount,
            day_of_month: dto.day_of_month,
            start_date: parse_date(&dto.start_date)?,
            end_date: dto.end_date.as_deref().map(parse_date).transpose()?,
            is_active: dto.is_active.unwrap_or(true),
            category_id: dto.category_id,
        })
    }

    pub fn to_update_command(dto: UpdateRecurringExpenseRequest) -> Result<UpdateRecurringExpenseCommand> {
        let end_date = match dto.end_date {
            Some(Some(end)) => Some(Some(parse_date(&end)?)),
            Some(None) => Some(None),
            None => None,
        };
        Ok(UpdateRecurringExpenseCommand {
            amount: dto.amount,
            day_of_month: dto.day_of_month,
            start_date: dto.start_date.as_deref().map(parse_date).transpose()?,
            end_date,
            is_active: dto.is_active,
            category_id: dto.category_id,
            type_id: dto.type_id,
            description: dto.description,
        })
    }

    pub fn to_pending_response(result: PendingExpensesResult) -> PendingRecurringExpensesResponse {
        PendingRecurringExpensesResponse {
            month: result.month.to_string(),
            pending: result
                .pending
                .into_iter()
                .map(|PendingExpense { expense, due_date }| PendingRecurringExpense {
                    recurring_expense: Self::to_dto(expense),
                    due_date: format_date(due_date),
                })
                .collect(),
        }
    }

    pub fn to_summary_response(summary: MonthlySummary) -> RecurringExpenseSummaryResponse {
        RecurringExpenseSummaryResponse {
            month: summary.month.to_string(),
            active_count: summary.active_count,
            pending_count: summary.pending_count,
            monthly_total: summary.monthly_total,
        }
    }

    pub fn type_to_dto(domain: DomainRecurringExpenseType) -> SharedRecurringExpenseType {
        SharedRecurringExpenseType {
            id: domain.id,
            user_id: domain.user_id,
            name: domain.name,
            created_at: domain.created_at,
        }
    }
}
