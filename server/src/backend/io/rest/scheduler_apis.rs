//! # REST API for the Recurring Expense Scheduler
//!
//! Pending evaluation, processing runs, and the monthly summary. These share
//! the `/recurring-expenses` prefix with the CRUD endpoints.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use log::info;

use crate::backend::io::rest::mappers::{
    recurring_expense_mapper::RecurringExpenseMapper, transaction_mapper::TransactionMapper,
};
use crate::backend::io::rest::{error_response, CurrentUser};
use crate::backend::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/pending", get(get_pending_recurring_expenses))
        .route("/process", post(process_recurring_expenses))
        .route("/summary", get(get_recurring_expense_summary))
}

/// Expenses due this month that have no transaction yet. Read-only.
pub async fn get_pending_recurring_expenses(
    State(state): State<AppState>,
    user: CurrentUser,
) -> impl IntoResponse {
    let ctx = user.context(&state);
    info!("GET /api/recurring-expenses/pending for user {} on {}", ctx.user_id, ctx.today);

    match state.scheduler.compute_pending_expenses(&ctx).await {
        Ok(result) => {
            (StatusCode::OK, Json(RecurringExpenseMapper::to_pending_response(result))).into_response()
        }
        Err(e) => error_response("compute pending recurring expenses", e),
    }
}

/// Materialize this month's transactions for every pending expense
pub async fn process_recurring_expenses(
    State(state): State<AppState>,
    user: CurrentUser,
) -> impl IntoResponse {
    let ctx = user.context(&state);
    info!("POST /api/recurring-expenses/process for user {}", ctx.user_id);

    match state.scheduler.process_recurring_expenses(&ctx).await {
        Ok(report) => (StatusCode::OK, Json(TransactionMapper::to_process_response(report))).into_response(),
        Err(e) => error_response("process recurring expenses", e),
    }
}

pub async fn get_recurring_expense_summary(
    State(state): State<AppState>,
    user: CurrentUser,
) -> impl IntoResponse {
    let ctx = user.context(&state);
    info!("GET /api/recurring-expenses/summary for user {}", ctx.user_id);

    match state.recurring_expense_service.monthly_summary(&ctx).await {
        Ok(summary) => {
            (StatusCode::OK, Json(RecurringExpenseMapper::to_summary_response(summary))).into_response()
        }
        Err(e) => error_response("summarize recurring expenses", e),
    }
}

#[cfg(test)]
mod tests {
    use crate::backend::io::rest::test_support::TestApp;
    use axum::http::StatusCode;
    use serde_json::json;
    use shared::{
        ExpenseOutcome, PendingRecurringExpensesResponse, ProcessRecurringExpensesResponse,
        RecurringExpenseResponse, RecurringExpenseSummaryResponse, TransactionListResponse,
    };

    async fn create(app: &TestApp, amount: f64, day: u8, start: &str) -> String {
        let body = json!({
            "description": "Rent",
            "amount": amount,
            "day_of_month": day,
            "start_date": start,
        });
        let (status, created): (_, RecurringExpenseResponse) = app
            .send_json("POST", "/api/recurring-expenses", None, Some(body))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        created.recurring_expense.id
    }

    #[tokio::test]
    async fn test_pending_process_and_reprocess() {
        let app = TestApp::new("2024-03-20").await;
        let id = create(&app, 1000.0, 15, "2024-01-01").await;

        let (status, pending): (_, PendingRecurringExpensesResponse) = app
            .send_json("GET", "/api/recurring-expenses/pending", None, None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(pending.month, "2024-03");
        assert_eq!(pending.pending.len(), 1);
        assert_eq!(pending.pending[0].due_date, "2024-03-15");

        let (status, first): (_, ProcessRecurringExpensesResponse) = app
            .send_json("POST", "/api/recurring-expenses/process", None, None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first.created, 1);
        assert_eq!(first.failed, 0);
        assert_eq!(first.results[0].expense_id, id);
        assert!(matches!(first.results[0].outcome, ExpenseOutcome::Created { .. }));

        let (_, second): (_, ProcessRecurringExpensesResponse) = app
            .send_json("POST", "/api/recurring-expenses/process", None, None)
            .await;
        assert_eq!(second.created, 0);
        assert!(second.results.is_empty());

        let (_, pending): (_, PendingRecurringExpensesResponse) = app
            .send_json("GET", "/api/recurring-expenses/pending", None, None)
            .await;
        assert!(pending.pending.is_empty());

        let (_, ledger): (_, TransactionListResponse) =
            app.send_json("GET", "/api/transactions", None, None).await;
        assert_eq!(ledger.transactions.len(), 1);
        let transaction = &ledger.transactions[0];
        assert_eq!(transaction.amount, -1000.0);
        assert_eq!(transaction.date, "2024-03-15");
        assert_eq!(transaction.generated_month.as_deref(), Some("2024-03"));
        assert_eq!(transaction.recurring_expense_id.as_deref(), Some(id.as_str()));
    }

    #[tokio::test]
    async fn test_summary_counts_in_effect_expenses() {
        let app = TestApp::new("2024-03-20").await;
        create(&app, 1000.0, 15, "2024-01-01").await;
        create(&app, 50.5, 1, "2024-02-01").await;
        create(&app, 75.0, 1, "2024-04-01").await;

        let (status, summary): (_, RecurringExpenseSummaryResponse) = app
            .send_json("GET", "/api/recurring-expenses/summary", None, None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(summary.month, "2024-03");
        assert_eq!(summary.active_count, 2);
        assert_eq!(summary.pending_count, 2);
        assert_eq!(summary.monthly_total, 1050.5);
    }
}
