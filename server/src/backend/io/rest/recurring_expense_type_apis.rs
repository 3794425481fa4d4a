//! # REST API for Recurring Expense Types

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{delete, get},
    Router,
};
use log::info;

use crate::backend::io::rest::mappers::recurring_expense_mapper::RecurringExpenseMapper;
use crate::backend::io::rest::{error_response, CurrentUser};
use crate::backend::AppState;
use shared::{
    CreateRecurringExpenseTypeRequest, DeleteRecurringExpenseTypeResponse, RecurringExpenseTypeListResponse,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_recurring_expense_types).post(create_recurring_expense_type))
        .route("/:id", delete(delete_recurring_expense_type))
}

/// System-wide types plus the caller's own
pub async fn list_recurring_expense_types(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> impl IntoResponse {
    info!("GET /api/recurring-expense-types for user {}", user_id);

    match state.recurring_expense_type_service.list_types(&user_id).await {
        Ok(types) => {
            let response = RecurringExpenseTypeListResponse {
                types: types.into_iter().map(RecurringExpenseMapper::type_to_dto).collect(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response("list recurring expense types", e),
    }
}

pub async fn create_recurring_expense_type(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(request): Json<CreateRecurringExpenseTypeRequest>,
) -> impl IntoResponse {
    info!("POST /api/recurring-expense-types - name: {}", request.name);

    match state
        .recurring_expense_type_service
        .create_type(&user_id, &request.name)
        .await
    {
        Ok(created) => (StatusCode::CREATED, Json(RecurringExpenseMapper::type_to_dto(created))).into_response(),
        Err(e) => error_response("create recurring expense type", e),
    }
}

pub async fn delete_recurring_expense_type(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/recurring-expense-types/{}", id);

    match state.recurring_expense_type_service.delete_type(&user_id, &id).await {
        Ok(detached_count) => {
            let response = DeleteRecurringExpenseTypeResponse {
                detached_count,
                success_message: format!(
                    "Recurring expense type deleted; {} recurring expense(s) detached",
                    detached_count
                ),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response("delete recurring expense type", e),
    }
}
