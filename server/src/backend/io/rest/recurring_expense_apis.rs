//! # REST API for Recurring Expenses
//!
//! CRUD endpoints for recurring expense definitions.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use log::info;

use crate::backend::io::rest::mappers::recurring_expense_mapper::RecurringExpenseMapper;
use crate::backend::io::rest::{error_response, CurrentUser};
use crate::backend::AppState;
use shared::{
    CreateRecurringExpenseRequest, DeleteRecurringExpenseResponse, RecurringExpenseListResponse,
    RecurringExpenseResponse, UpdateRecurringExpenseRequest,
};

/// Create a router for recurring expense related APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_recurring_expenses).post(create_recurring_expense))
        .route(
            "/:id",
            get(get_recurring_expense)
                .put(update_recurring_expense)
                .delete(delete_recurring_expense),
        )
}

pub async fn list_recurring_expenses(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> impl IntoResponse {
    info!("GET /api/recurring-expenses for user {}", user_id);

    match state.recurring_expense_service.list_recurring_expenses(&user_id).await {
        Ok(expenses) => {
            let response = RecurringExpenseListResponse {
                recurring_expenses: expenses.into_iter().map(RecurringExpenseMapper::to_dto).collect(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response("list recurring expenses", e),
    }
}

pub async fn get_recurring_expense(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/recurring-expenses/{}", id);

    match state.recurring_expense_service.get_recurring_expense(&user_id, &id).await {
        Ok(expense) => (StatusCode::OK, Json(RecurringExpenseMapper::to_dto(expense))).into_response(),
        Err(e) => error_response("get recurring expense", e),
    }
}

pub async fn create_recurring_expense(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(request): Json<CreateRecurringExpenseRequest>,
) -> impl IntoResponse {
    info!("POST /api/recurring-expenses - request: {:?}", request);

    let command = match RecurringExpenseMapper::to_create_command(request) {
        Ok(command) => command,
        Err(e) => return error_response("create recurring expense", e),
    };

    match state
        .recurring_expense_service
        .create_recurring_expense(&user_id, command)
        .await
    {
        Ok(expense) => {
            let response = RecurringExpenseResponse {
                recurring_expense: RecurringExpenseMapper::to_dto(expense),
                success_message: "Recurring expense created successfully".to_string(),
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => error_response("create recurring expense", e),
    }
}

pub async fn update_recurring_expense(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<UpdateRecurringExpenseRequest>,
) -> impl IntoResponse {
    info!("PUT /api/recurring-expenses/{} - request: {:?}", id, request);

    let command = match RecurringExpenseMapper::to_update_command(request) {
        Ok(command) => command,
        Err(e) => return error_response("update recurring expense", e),
    };

    match state
        .recurring_expense_service
        .update_recurring_expense(&user_id, &id, command)
        .await
    {
        Ok(expense) => {
            let response = RecurringExpenseResponse {
                recurring_expense: RecurringExpenseMapper::to_dto(expense),
                success_message: "Recurring expense updated successfully".to_string(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response("update recurring expense", e),
    }
}

pub async fn delete_recurring_expense(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/recurring-expenses/{}", id);

    match state.recurring_expense_service.delete_recurring_expense(&user_id, &id).await {
        Ok(deleted) => {
            let success_message = if deleted {
                "Recurring expense deleted successfully".to_string()
            } else {
                format!("No recurring expense with id {}", id)
            };
            let response = DeleteRecurringExpenseResponse {
                deleted,
                success_message,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response("delete recurring expense", e),
    }
}
