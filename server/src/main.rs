use anyhow::Result;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use recurring_expense_server::backend::{create_router, initialize_backend, process_default_user, spawn_recheck};
use recurring_expense_server::config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging; RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env()?;
    info!("Starting recurring expense tracker with {:?}", config);

    let app_state = initialize_backend(&config).await?;

    // Catch up on anything that came due while the server was down
    if let Err(e) = process_default_user(&app_state).await {
        error!("Start-up recurring expense check failed: {:#}", e);
    }

    match config.recheck_interval {
        Some(interval) => {
            info!("Re-checking recurring expenses every {}s", interval.as_secs());
            spawn_recheck(app_state.clone(), interval);
        }
        None => info!("Periodic recurring expense check disabled"),
    }

    let app = create_router(app_state, &config.cors_origin)?;

    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;
    info!("Listening on {}", config.bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
