use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A game as persisted for one week. `winner == None` means pending while
/// `resolved` is false, and a void result (postponement/tie) once `resolved`
/// is true.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Game {
    pub id: String,
    pub week_id: i64,
    pub home_team: String,
    pub away_team: String,
    pub commence_time: DateTime<Utc>,
    pub spread: Option<f64>,
    pub winner: Option<String>,
    pub resolved: bool,
}

/// The shape the external game catalog feed returns per game. `completed`
/// is optional in the feed; absent, a game counts as resolved once a winner
/// is present.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CatalogGame {
    pub id: String,
    pub home_team: String,
    pub away_team: String,
    pub commence_time: DateTime<Utc>,
    #[serde(default)]
    pub spread: Option<f64>,
    #[serde(default)]
    pub winner: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
}

impl CatalogGame {
    pub fn is_resolved(&self) -> bool {
        self.completed.unwrap_or(self.winner.is_some())
    }
}
