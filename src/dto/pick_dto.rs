use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An immutable prediction keyed by (member, game). Resubmitting before the
/// week locks overwrites the row in place; after lock the write path rejects.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Pick {
    pub id: i64,
    pub week_id: i64,
    pub member_id: i64,
    pub game_id: String,
    pub selected_team: String,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitPick {
    pub week_id: i64,
    pub member_id: i64,
    pub game_id: String,
    pub selected_team: String,
}

#[derive(Serialize)]
pub struct PickUpdate {
    pub r#type: String,
    pub pick: Pick,
}
