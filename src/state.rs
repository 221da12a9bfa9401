//! Application state for catalog-sync

use std::time::Duration;

use sqlx::PgPool;

use crate::config::Config;
use crate::shopify::ShopifyClient;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool
    pub pool: PgPool,
    /// Upstream Admin API client
    pub shopify: ShopifyClient,
    /// Shared secret for webhook signature verification
    pub webhook_secret: String,
    /// Bearer token for the internal full-sync trigger
    pub sync_trigger_token: String,
    /// Upper bound on a full cost sync run
    pub sync_deadline: Duration,
}

impl AppState {
    /// Create a new AppState
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let pool = PgPool::connect(&config.database_url).await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self {
            pool,
            shopify: ShopifyClient::new(&config.shop_domain, &config.api_access_token),
            webhook_secret: config.webhook_secret.clone(),
            sync_trigger_token: config.sync_trigger_token.clone(),
            sync_deadline: Duration::from_secs(config.sync_deadline_secs),
        })
    }
}
