use std::env;
use std::time::Duration;

/// Service configuration pulled from the environment, with defaults that work
/// for local development.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub bind_addr: String,
    pub database_url: String,
    pub catalog_base_url: String,
    pub catalog_retries: u32,
    pub catalog_backoff: Duration,
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        let catalog_retries = env::var("CATALOG_RETRIES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3);

        let backoff_ms = env::var("CATALOG_BACKOFF_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(250);

        Self {
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://./data/pickem.db".to_string()),
            catalog_base_url: env::var("CATALOG_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            catalog_retries,
            catalog_backoff: Duration::from_millis(backoff_ms),
        }
    }
}
