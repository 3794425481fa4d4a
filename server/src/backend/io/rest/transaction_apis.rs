//! # REST API for the Transaction Ledger
//!
//! Lists the ledger (generated and manual entries alike), records manual
//! transactions, and deletes transactions by id.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use log::info;

use crate::backend::io::rest::mappers::transaction_mapper::TransactionMapper;
use crate::backend::io::rest::{error_response, CurrentUser};
use crate::backend::AppState;
use shared::{
    CreateTransactionRequest, DeleteTransactionsRequest, DeleteTransactionsResponse, TransactionListRequest,
    TransactionListResponse,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_transactions).post(create_transaction))
        .route("/delete", post(delete_transactions))
}

pub async fn list_transactions(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Query(request): Query<TransactionListRequest>,
) -> impl IntoResponse {
    info!("GET /api/transactions - request: {:?}", request);

    let query = match TransactionMapper::to_list_query(request) {
        Ok(query) => query,
        Err(e) => return error_response("list transactions", e),
    };

    match state.transaction_service.list_transactions(&user_id, query).await {
        Ok(transactions) => {
            let response = TransactionListResponse {
                transactions: transactions.into_iter().map(TransactionMapper::to_dto).collect(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response("list transactions", e),
    }
}

pub async fn create_transaction(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<CreateTransactionRequest>,
) -> impl IntoResponse {
    info!("POST /api/transactions - request: {:?}", request);

    let command = match TransactionMapper::to_create_command(request) {
        Ok(command) => command,
        Err(e) => return error_response("create transaction", e),
    };

    let ctx = user.context(&state);
    match state.transaction_service.create_transaction(&ctx, command).await {
        Ok(transaction) => (StatusCode::CREATED, Json(TransactionMapper::to_dto(transaction))).into_response(),
        Err(e) => error_response("create transaction", e),
    }
}

pub async fn delete_transactions(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(request): Json<DeleteTransactionsRequest>,
) -> impl IntoResponse {
    info!("POST /api/transactions/delete - {} ids", request.transaction_ids.len());

    match state
        .transaction_service
        .delete_transactions(&user_id, &request.transaction_ids)
        .await
    {
        Ok(result) => {
            let response = DeleteTransactionsResponse {
                deleted_count: result.deleted_count,
                not_found_ids: result.not_found_ids,
                success_message: result.success_message,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response("delete transactions", e),
    }
}
