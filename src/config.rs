//! Engine configuration
//!
//! All secrets and connection details are read once at startup and injected
//! into [`crate::state::AppState`]; nothing reads the process environment at
//! call sites.

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL
    pub database_url: String,
    /// HTTP port
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// Shared secret the upstream platform signs webhook bodies with
    pub webhook_secret: String,
    /// Upstream shop domain, e.g. "acme-outfitters.myshopify.com"
    pub shop_domain: String,
    /// Static access token for the upstream Admin API
    pub api_access_token: String,
    /// Bearer token required by the internal full-sync trigger endpoint
    pub sync_trigger_token: String,
    /// Upper bound on a full cost sync run, in seconds
    pub sync_deadline_secs: u64,
}

impl Config {
    /// Require a secret env var: must be set and non-empty in non-development environments.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        Ok(Self {
            database_url: std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?,
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            webhook_secret: Self::require_secret("WEBHOOK_SECRET", &environment)?,
            shop_domain: std::env::var("SHOP_DOMAIN").map_err(|_| "SHOP_DOMAIN must be set")?,
            api_access_token: Self::require_secret("API_ACCESS_TOKEN", &environment)?,
            sync_trigger_token: Self::require_secret("SYNC_TRIGGER_TOKEN", &environment)?,
            sync_deadline_secs: std::env::var("SYNC_DEADLINE_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(900),
            environment,
        })
    }
}
