//! API routes for catalog-sync

pub mod health;
pub mod sync;
pub mod webhook;

use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Create the combined router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        // Signed webhook path (raw body, HMAC verified)
        .route("/webhooks/products", post(webhook::handle_webhook))
        // Internal trigger path (bearer token, never signature-verified)
        .route("/internal/sync-costs", post(sync::trigger_cost_sync))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
