//! # REST API Interface Layer
//!
//! HTTP endpoints for recurring expenses, their types, and the ledger.
//! This layer handles:
//! - JSON request/response serialization
//! - Resolving the calling user from the `x-user-id` header
//! - Translating domain errors to HTTP status codes
//!
//! Handlers hold no business logic; they map DTOs to domain commands and back.

pub mod mappers;
pub mod recurring_expense_apis;
pub mod recurring_expense_type_apis;
pub mod scheduler_apis;
pub mod transaction_apis;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
};
use log::error;

use crate::backend::domain::{errors::RecurringExpenseError, UserContext};
use crate::backend::AppState;

/// Header carrying the caller's user id
pub const USER_ID_HEADER: &str = "x-user-id";

/// The user a request acts on behalf of.
///
/// Falls back to the configured default user when the header is absent.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentUser(pub String);

impl CurrentUser {
    /// Bind the user to today's date from the application clock
    pub fn context(&self, state: &AppState) -> UserContext {
        UserContext::from_clock(self.0.clone(), &state.clock)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match parts.headers.get(USER_ID_HEADER) {
            None => Ok(CurrentUser(state.default_user_id.clone())),
            Some(value) => {
                let user_id = value
                    .to_str()
                    .map(str::trim)
                    .map_err(|_| (StatusCode::BAD_REQUEST, "Invalid x-user-id header"))?;
                if user_id.is_empty() {
                    return Err((StatusCode::BAD_REQUEST, "Empty x-user-id header"));
                }
                Ok(CurrentUser(user_id.to_string()))
            }
        }
    }
}

/// Status code for a failed domain operation
pub fn status_for(error: &anyhow::Error) -> StatusCode {
    match error.downcast_ref::<RecurringExpenseError>() {
        Some(RecurringExpenseError::NotFound { .. }) => StatusCode::NOT_FOUND,
        Some(RecurringExpenseError::SystemTypeReadOnly) => StatusCode::FORBIDDEN,
        Some(e) if e.is_validation() => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Log the failure and convert it to a response.
///
/// Server errors hide their details from the client.
pub fn error_response(action: &str, error: anyhow::Error) -> Response {
    let status = status_for(&error);
    error!("Failed to {}: {:#}", action, error);
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        (status, format!("Failed to {}", action)).into_response()
    } else {
        (status, error.to_string()).into_response()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        Router,
    };
    use chrono::NaiveDate;
    use serde::de::DeserializeOwned;
    use tower::ServiceExt;

    use crate::backend::domain::FixedClock;
    use crate::backend::storage::csv::test_utils::TestEnvironment;
    use crate::backend::{create_router, AppState};

    pub struct TestApp {
        pub env: TestEnvironment,
        pub state: AppState,
        pub router: Router,
    }

    impl TestApp {
        pub async fn new(today: &str) -> Self {
            let env = TestEnvironment::new().await.unwrap();
            let today = NaiveDate::parse_from_str(today, "%Y-%m-%d").unwrap();
            let state = AppState::new(env.connection.clone(), Arc::new(FixedClock(today)), "local");
            state.recurring_expense_type_service.ensure_system_types().await.unwrap();
            let router = create_router(state.clone(), "http://localhost:8080").unwrap();
            Self { env, state, router }
        }

        pub async fn send(
            &self,
            method: &str,
            uri: &str,
            user: Option<&str>,
            body: Option<serde_json::Value>,
        ) -> (StatusCode, Vec<u8>) {
            let mut builder = Request::builder().method(method).uri(uri);
            if let Some(user) = user {
                builder = builder.header(super::USER_ID_HEADER, user);
            }
            let request = match body {
                Some(json) => builder
                    .header("content-type", "application/json")
                    .body(Body::from(json.to_string()))
                    .unwrap(),
                None => builder.body(Body::empty()).unwrap(),
            };
            let response = self.router.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            (status, bytes.to_vec())
        }

        pub async fn send_json<T: DeserializeOwned>(
            &self,
            method: &str,
            uri: &str,
            user: Option<&str>,
            body: Option<serde_json::Value>,
        ) -> (StatusCode, T) {
            let (status, bytes) = self.send(method, uri, user, body).await;
            let parsed = serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                panic!("unexpected body ({}): {} {}", status, e, String::from_utf8_lossy(&bytes))
            });
            (status, parsed)
        }
    }
}
