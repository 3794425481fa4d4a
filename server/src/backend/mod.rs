//! # Backend Module
//!
//! Contains all non-UI logic for the recurring expense tracker.
//!
//! This module serves as the orchestration layer that brings together:
//! - **Domain**: Scheduling rules and services for recurring expenses
//! - **Storage**: File-based persistence (YAML definitions, CSV ledger)
//! - **IO**: REST interface exposing the services over HTTP
//!
//! ## Architecture
//!
//! ```text
//! IO Layer (REST API, handlers)
//!     ↓
//! Domain Layer (scheduler, services)
//!     ↓
//! Storage Layer (CSV/YAML files)
//! ```

pub mod domain;
pub mod io;
pub mod storage;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    http::{HeaderValue, Method},
    Router,
};
use log::{error, info};
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};

use crate::backend::domain::{
    commands::processing::ProcessingReport, Clock, RecurringExpenseScheduler, RecurringExpenseService,
    RecurringExpenseTypeService, SystemClock, TransactionService, UserContext,
};
use crate::backend::io::rest;
use crate::backend::storage::CsvConnection;
use crate::config::AppConfig;

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub recurring_expense_service: RecurringExpenseService<CsvConnection>,
    pub recurring_expense_type_service: RecurringExpenseTypeService<CsvConnection>,
    pub scheduler: RecurringExpenseScheduler<CsvConnection>,
    pub transaction_service: TransactionService<CsvConnection>,
    pub clock: Arc<dyn Clock>,
    /// Acting user when a request carries no user header
    pub default_user_id: String,
}

impl AppState {
    pub fn new(connection: CsvConnection, clock: Arc<dyn Clock>, default_user_id: impl Into<String>) -> Self {
        Self {
            recurring_expense_service: RecurringExpenseService::new(&connection),
            recurring_expense_type_service: RecurringExpenseTypeService::new(&connection),
            scheduler: RecurringExpenseScheduler::new(&connection),
            transaction_service: TransactionService::new(&connection),
            clock,
            default_user_id: default_user_id.into(),
        }
    }

    /// Context for the default user as of the application clock's today
    pub fn default_user_context(&self) -> UserContext {
        UserContext::from_clock(self.default_user_id.clone(), &self.clock)
    }
}

/// Initialize the backend with all required services
pub async fn initialize_backend(config: &AppConfig) -> Result<AppState> {
    info!("Setting up storage in {}", config.data_directory.display());
    let connection = CsvConnection::new(&config.data_directory)?;

    info!("Setting up domain model");
    let app_state = AppState::new(connection, Arc::new(SystemClock), config.default_user_id.clone());

    let seeded = app_state
        .recurring_expense_type_service
        .ensure_system_types()
        .await
        .context("Failed to seed system recurring expense types")?;
    if seeded > 0 {
        info!("Seeded {} system recurring expense types", seeded);
    }

    Ok(app_state)
}

/// Run the scheduler once for the default user
pub async fn process_default_user(app_state: &AppState) -> Result<ProcessingReport> {
    let ctx = app_state.default_user_context();
    let report = app_state.scheduler.process_recurring_expenses(&ctx).await?;
    info!("Recurring expense check for {}: {}", ctx.user_id, report.summary_message());
    Ok(report)
}

/// Re-run the scheduler for the default user every `interval`.
///
/// The first tick fires after one full interval; failures are logged and the
/// loop keeps going.
pub fn spawn_recheck(app_state: AppState, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if let Err(e) = process_default_user(&app_state).await {
                error!("Periodic recurring expense check failed: {:#}", e);
            }
        }
    })
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState, cors_origin: &str) -> Result<Router> {
    let origin = cors_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("Invalid CORS origin: {}", cors_origin))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    let api_routes = Router::new()
        .nest(
            "/recurring-expenses",
            rest::recurring_expense_apis::router().merge(rest::scheduler_apis::router()),
        )
        .nest("/recurring-expense-types", rest::recurring_expense_type_apis::router())
        .nest("/transactions", rest::transaction_apis::router());

    Ok(Router::new()
        .nest("/api", api_routes)
        .layer(cors)
        .with_state(app_state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::FixedClock;
    use crate::backend::storage::csv::test_utils::{sample_expense, TestEnvironment};
    use crate::backend::storage::{Connection, RecurringExpenseStorage};
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_process_default_user() {
        let env = TestEnvironment::new().await.unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 3, 20).unwrap();
        let state = AppState::new(env.connection.clone(), Arc::new(FixedClock(today)), "local");
        state
            .recurring_expense_service
            .create_recurring_expense(
                "local",
                crate::backend::domain::commands::recurring_expenses::CreateRecurringExpenseCommand {
                    type_id: None,
                    description: Some("Rent".to_string()),
                    amount: 900.0,
                    day_of_month: 1,
                    start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                    end_date: None,
                    is_active: true,
                    category_id: None,
                },
            )
            .await
            .unwrap();
        // Someone else's expense is not touched by the default-user check.
        env.connection
            .create_recurring_expense_repository()
            .store_recurring_expense(&sample_expense("other", "recurring::other::1"))
            .await
            .unwrap();

        let report = process_default_user(&state).await.unwrap();
        assert_eq!(report.created(), 1);
        assert_eq!(process_default_user(&state).await.unwrap().created(), 0);
    }

    #[tokio::test]
    async fn test_create_router_rejects_bad_origin() {
        let env = TestEnvironment::new().await.unwrap();
        let state = AppState::new(env.connection.clone(), Arc::new(SystemClock), "local");
        assert!(create_router(state, "bad\norigin").is_err());
    }
}
