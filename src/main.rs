//! catalog-sync — catalog synchronization engine
//!
//! Long-running service that:
//! - Receives signed product webhooks from the upstream commerce platform
//! - Reconciles the internal catalog (products, images, cost/list price)
//! - Runs an operator-triggered full cost re-sync across all mapped products

mod api;
mod config;
mod db;
mod error;
mod shopify;
mod state;
mod sync;

use config::Config;
use state::AppState;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "catalog_sync=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;

    tracing::info!("Starting catalog-sync (env: {})", config.environment);

    let state = AppState::new(&config).await?;

    let app = api::create_router(state);

    let addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("catalog-sync listening on {addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
