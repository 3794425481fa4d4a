//! Recurring expense definitions: validation and CRUD.
use anyhow::Result;
use chrono::{NaiveDate, Utc};
use log::{info, warn};

use crate::backend::domain::{
    commands::recurring_expenses::{
        CreateRecurringExpenseCommand, MonthlySummary, UpdateRecurringExpenseCommand,
    },
    context::UserContext,
    errors::RecurringExpenseError,
    models::recurring_expense::RecurringExpense,
    schedule,
};
use crate::backend::storage::{Connection, RecurringExpenseStorage, RecurringExpenseTypeStorage};

pub const MAX_AMOUNT: f64 = 1_000_000.0;
pub const MAX_TEXT_LENGTH: usize = 256;

/// Service for managing recurring expense definitions
#[derive(Clone)]
pub struct RecurringExpenseService<C: Connection> {
    expense_repository: C::RecurringExpenseRepository,
    type_repository: C::RecurringExpenseTypeRepository,
}

impl<C: Connection> RecurringExpenseService<C> {
    pub fn new(connection: &C) -> Self {
        Self {
            expense_repository: connection.create_recurring_expense_repository(),
            type_repository: connection.create_recurring_expense_type_repository(),
        }
    }

    pub async fn list_recurring_expenses(&self, user_id: &str) -> Result<Vec<RecurringExpense>> {
        let expenses = self.expense_repository.list_recurring_expenses(user_id).await?;
        info!("Found {} recurring expenses for user {}", expenses.len(), user_id);
        Ok(expenses)
    }

    pub async fn get_recurring_expense(&self, user_id: &str, expense_id: &str) -> Result<RecurringExpense> {
        self.expense_repository
            .get_recurring_expense(user_id, expense_id)
            .await?
            .ok_or_else(|| RecurringExpenseError::not_found("Recurring expense", expense_id).into())
    }

    pub async fn create_recurring_expense(
        &self,
        user_id: &str,
        command: CreateRecurringExpenseCommand,
    ) -> Result<RecurringExpense> {
        info!("Creating recurring expense for user {}: {:?}", user_id, command);

        validate_amount(command.amount)?;
        validate_day_of_month(command.day_of_month)?;
        validate_date_range(command.start_date, command.end_date)?;
        let description = normalize_text(command.description)?;
        let category_id = normalize_id(command.category_id);
        let type_id = normalize_id(command.type_id);
        if let Some(type_id) = &type_id {
            self.ensure_type_visible(user_id, type_id).await?;
        }

        let now = Utc::now().to_rfc3339();
        let expense = RecurringExpense {
            id: RecurringExpense::generate_id(user_id),
            user_id: user_id.to_string(),
            type_id,
            description,
            amount: command.amount,
            day_of_month: command.day_of_month,
            start_date: command.start_date,
            end_date: command.end_date,
            is_active: command.is_active,
            last_processed_month: None,
            category_id,
            created_at: now.clone(),
            updated_at: now,
        };

        self.expense_repository.store_recurring_expense(&expense).await?;
        info!(
            "Created recurring expense {}: {:.2} on day {} from {}",
            expense.id, expense.amount, expense.day_of_month, expense.start_date
        );
        Ok(expense)
    }

    /// Apply a partial update. The processing watermark is never touched here.
    pub async fn update_recurring_expense(
        &self,
        user_id: &str,
        expense_id: &str,
        command: UpdateRecurringExpenseCommand,
    ) -> Result<RecurringExpense> {
        info!("Updating recurring expense {}: {:?}", expense_id, command);
        let mut expense = self.get_recurring_expense(user_id, expense_id).await?;

        if let Some(amount) = command.amount {
            validate_amount(amount)?;
            expense.amount = amount;
        }
        if let Some(day) = command.day_of_month {
            validate_day_of_month(day)?;
            expense.day_of_month = day;
        }
        if let Some(start_date) = command.start_date {
            expense.start_date = start_date;
        }
        if let Some(end_date) = command.end_date {
            expense.end_date = end_date;
        }
        validate_date_range(expense.start_date, expense.end_date)?;
        if let Some(is_active) = command.is_active {
            expense.is_active = is_active;
        }
        if let Some(category_id) = command.category_id {
            expense.category_id = normalize_id(category_id);
        }
        if let Some(description) = command.description {
            expense.description = normalize_text(description)?;
        }
        if let Some(type_id) = command.type_id {
            let type_id = normalize_id(type_id);
            if let Some(id) = &type_id {
                self.ensure_type_visible(user_id, id).await?;
            }
            expense.type_id = type_id;
        }
        expense.updated_at = Utc::now().to_rfc3339();

        self.expense_repository.update_recurring_expense(&expense).await?;
        info!("Updated recurring expense {}", expense.id);
        Ok(expense)
    }

    /// Delete a definition. Transactions it already generated stay in the ledger.
    pub async fn delete_recurring_expense(&self, user_id: &str, expense_id: &str) -> Result<bool> {
        let deleted = self
            .expense_repository
            .delete_recurring_expense(user_id, expense_id)
            .await?;
        if !deleted {
            warn!("No recurring expense {} found to delete for user {}", expense_id, user_id);
        }
        Ok(deleted)
    }

    /// Totals over the active expenses whose date window covers today
    pub async fn monthly_summary(&self, ctx: &UserContext) -> Result<MonthlySummary> {
        let expenses = self.expense_repository.list_recurring_expenses(&ctx.user_id).await?;
        let in_effect: Vec<&RecurringExpense> = expenses
            .iter()
            .filter(|e| e.is_active && e.is_in_effect_on(ctx.today))
            .collect();

        Ok(MonthlySummary {
            month: ctx.current_month(),
            active_count: in_effect.len(),
            pending_count: in_effect
                .iter()
                .filter(|e| schedule::is_pending(e, ctx.today))
                .count(),
            monthly_total: in_effect.iter().map(|e| e.amount).sum(),
        })
    }

    async fn ensure_type_visible(&self, user_id: &str, type_id: &str) -> Result<()> {
        match self.type_repository.get_recurring_expense_type(type_id).await? {
            Some(t) if t.is_visible_to(user_id) => Ok(()),
            _ => Err(RecurringExpenseError::not_found("Recurring expense type", type_id).into()),
        }
    }
}

fn validate_amount(amount: f64) -> Result<(), RecurringExpenseError> {
    if amount.is_finite() && amount > 0.0 && amount <= MAX_AMOUNT {
        Ok(())
    } else {
        Err(RecurringExpenseError::InvalidAmount { max: MAX_AMOUNT })
    }
}

fn validate_day_of_month(day: u8) -> Result<(), RecurringExpenseError> {
    if RecurringExpense::is_valid_day_of_month(day) {
        Ok(())
    } else {
        Err(RecurringExpenseError::InvalidDayOfMonth(day))
    }
}

fn validate_date_range(start: NaiveDate, end: Option<NaiveDate>) -> Result<(), RecurringExpenseError> {
    match end {
        Some(end) if end < start => Err(RecurringExpenseError::InvalidDateRange {
            start: start.to_string(),
            end: end.to_string(),
        }),
        _ => Ok(()),
    }
}

/// Trim free text; blank becomes None
pub(crate) fn normalize_text(text: Option<String>) -> Result<Option<String>, RecurringExpenseError> {
    match text.map(|t| t.trim().to_string()) {
        Some(t) if t.is_empty() => Ok(None),
        Some(t) if t.chars().count() > MAX_TEXT_LENGTH => Err(RecurringExpenseError::TextTooLong {
            max: MAX_TEXT_LENGTH,
        }),
        other => Ok(other),
    }
}

pub(crate) fn normalize_id(id: Option<String>) -> Option<String> {
    id.map(|i| i.trim().to_string()).filter(|i| !i.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::models::recurring_expense_type::RecurringExpenseType;
    use crate::backend::storage::csv::{test_utils::TestEnvironment, CsvConnection};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    async fn setup() -> (TestEnvironment, RecurringExpenseService<CsvConnection>) {
        let env = TestEnvironment::new().await.unwrap();
        let service = RecurringExpenseService::new(&env.connection);
        (env, service)
    }

    fn create_command() -> CreateRecurringExpenseCommand {
        CreateRecurringExpenseCommand {
            type_id: None,
            description: Some("  Rent ".to_string()),
            amount: 850.0,
            day_of_month: 1,
            start_date: date("2024-01-01"),
            end_date: None,
            is_active: true,
            category_id: Some("housing".to_string()),
        }
    }

    fn validation_error(err: anyhow::Error) -> RecurringExpenseError {
        err.downcast::<RecurringExpenseError>().expect("expected a domain error")
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let (_env, service) = setup().await;
        let created = service
            .create_recurring_expense("alice", create_command())
            .await
            .unwrap();

        assert!(created.id.starts_with("recurring::alice::"));
        assert_eq!(created.description.as_deref(), Some("Rent"));
        assert_eq!(created.last_processed_month, None);

        let fetched = service.get_recurring_expense("alice", &created.id).await.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(service.list_recurring_expenses("alice").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_validation() {
        let (_env, service) = setup().await;

        for amount in [0.0, -5.0, f64::NAN, f64::INFINITY, 2_000_000.0] {
            let mut command = create_command();
            command.amount = amount;
            let err = service.create_recurring_expense("alice", command).await.unwrap_err();
            assert!(matches!(validation_error(err), RecurringExpenseError::InvalidAmount { .. }));
        }

        for day in [0, 32] {
            let mut command = create_command();
            command.day_of_month = day;
            let err = service.create_recurring_expense("alice", command).await.unwrap_err();
            assert_eq!(validation_error(err), RecurringExpenseError::InvalidDayOfMonth(day));
        }

        let mut command = create_command();
        command.end_date = Some(date("2023-12-31"));
        let err = service.create_recurring_expense("alice", command).await.unwrap_err();
        assert!(matches!(validation_error(err), RecurringExpenseError::InvalidDateRange { .. }));

        let mut command = create_command();
        command.description = Some("x".repeat(MAX_TEXT_LENGTH + 1));
        let err = service.create_recurring_expense("alice", command).await.unwrap_err();
        assert!(matches!(validation_error(err), RecurringExpenseError::TextTooLong { .. }));

        let mut command = create_command();
        command.type_id = Some("type::missing".to_string());
        let err = service.create_recurring_expense("alice", command).await.unwrap_err();
        assert!(matches!(validation_error(err), RecurringExpenseError::NotFound { .. }));

        assert!(service.list_recurring_expenses("alice").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_type_must_be_visible_to_user() {
        let (env, service) = setup().await;
        let types = env.connection.create_recurring_expense_type_repository();
        types
            .store_recurring_expense_type(&RecurringExpenseType {
                id: "type::bob".to_string(),
                user_id: Some("bob".to_string()),
                name: "Bob's".to_string(),
                created_at: "2024-01-01T00:00:00Z".to_string(),
            })
            .await
            .unwrap();

        let mut command = create_command();
        command.type_id = Some("type::bob".to_string());
        assert!(service.create_recurring_expense("alice", command.clone()).await.is_err());
        assert!(service.create_recurring_expense("bob", command).await.is_ok());
    }

    #[tokio::test]
    async fn test_partial_update_keeps_watermark() {
        let (env, service) = setup().await;
        let created = service
            .create_recurring_expense("alice", create_command())
            .await
            .unwrap();
        env.connection
            .create_recurring_expense_repository()
            .update_last_processed_month("alice", &created.id, "2024-05".parse().unwrap())
            .await
            .unwrap();

        let updated = service
            .update_recurring_expense(
                "alice",
                &created.id,
                UpdateRecurringExpenseCommand {
                    amount: Some(900.0),
                    day_of_month: Some(31),
                    end_date: Some(Some(date("2024-12-31"))),
                    category_id: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.amount, 900.0);
        assert_eq!(updated.day_of_month, 31);
        assert_eq!(updated.end_date, Some(date("2024-12-31")));
        assert_eq!(updated.category_id, None);
        assert_eq!(updated.description.as_deref(), Some("Rent"));
        assert_eq!(updated.last_processed_month, Some("2024-05".parse().unwrap()));

        let cleared = service
            .update_recurring_expense(
                "alice",
                &created.id,
                UpdateRecurringExpenseCommand {
                    end_date: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(cleared.end_date, None);
    }

    #[tokio::test]
    async fn test_update_rejects_start_after_existing_end() {
        let (_env, service) = setup().await;
        let mut command = create_command();
        command.end_date = Some(date("2024-06-30"));
        let created = service.create_recurring_expense("alice", command).await.unwrap();

        let err = service
            .update_recurring_expense(
                "alice",
                &created.id,
                UpdateRecurringExpenseCommand {
                    start_date: Some(date("2024-07-01")),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(validation_error(err), RecurringExpenseError::InvalidDateRange { .. }));
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_expense() {
        let (_env, service) = setup().await;
        let err = service
            .update_recurring_expense("alice", "nope", UpdateRecurringExpenseCommand::default())
            .await
            .unwrap_err();
        assert!(matches!(validation_error(err), RecurringExpenseError::NotFound { .. }));
        assert!(!service.delete_recurring_expense("alice", "nope").await.unwrap());
    }

    #[tokio::test]
    async fn test_expenses_are_scoped_per_user() {
        let (_env, service) = setup().await;
        let created = service
            .create_recurring_expense("alice", create_command())
            .await
            .unwrap();
        assert!(service.get_recurring_expense("bob", &created.id).await.is_err());
        assert!(!service.delete_recurring_expense("bob", &created.id).await.unwrap());
        assert!(service.delete_recurring_expense("alice", &created.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_monthly_summary() {
        let (env, service) = setup().await;
        let rent = service
            .create_recurring_expense("alice", create_command())
            .await
            .unwrap();

        let mut gym = create_command();
        gym.amount = 40.0;
        service.create_recurring_expense("alice", gym).await.unwrap();

        let mut paused = create_command();
        paused.amount = 10.0;
        paused.is_active = false;
        service.create_recurring_expense("alice", paused).await.unwrap();

        let mut finished = create_command();
        finished.amount = 5.0;
        finished.end_date = Some(date("2024-03-31"));
        service.create_recurring_expense("alice", finished).await.unwrap();

        env.connection
            .create_recurring_expense_repository()
            .update_last_processed_month("alice", &rent.id, "2024-06".parse().unwrap())
            .await
            .unwrap();

        let summary = service
            .monthly_summary(&UserContext::new("alice", date("2024-06-10")))
            .await
            .unwrap();
        assert_eq!(summary.month.to_string(), "2024-06");
        assert_eq!(summary.active_count, 2);
        assert_eq!(summary.pending_count, 1);
        assert_eq!(summary.monthly_total, 890.0);
    }
}
