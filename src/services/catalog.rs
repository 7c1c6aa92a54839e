use std::time::Duration;

use reqwest::Client;
use tracing::info;

use crate::config::ServiceConfig;
use crate::db::with_retry;
use crate::dto::game_dto::CatalogGame;
use crate::error::ApiError;

/// Read-only client for the external game schedule/results feed. Transport
/// failures get a bounded retry with doubling backoff; what comes back is
/// applied to the games table by the week sync route.
#[derive(Clone)]
pub struct CatalogClient {
    client: Client,
    base_url: String,
    attempts: u32,
    backoff: Duration,
}

impl CatalogClient {
    pub fn new(config: &ServiceConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.catalog_base_url.trim_end_matches('/').to_string(),
            attempts: config.catalog_retries.max(1),
            backoff: config.catalog_backoff,
        }
    }

    pub async fn fetch_week(
        &self,
        sport: &str,
        week_number: i64,
    ) -> Result<Vec<CatalogGame>, ApiError> {
        let url = format!("{}/sports/{}/weeks/{}/games", self.base_url, sport, week_number);
        info!("Fetching catalog games from {}", url);

        let games = with_retry("game catalog fetch", self.attempts, self.backoff, || {
            let client = self.client.clone();
            let url = url.clone();
            async move {
                client
                    .get(&url)
                    .send()
                    .await?
                    .error_for_status()?
                    .json::<Vec<CatalogGame>>()
                    .await
            }
        })
        .await?;

        info!("Catalog returned {} games for week {}.", games.len(), week_number);
        Ok(games)
    }
}
