use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::dto::game_dto::Game;
use crate::dto::pick_dto::Pick;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Week {
    pub id: i64,
    pub pool_id: i64,
    pub week_number: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateWeek {
    pub pool_id: i64,
    pub week_number: i64,
}

#[derive(Debug, Deserialize)]
pub struct SyncWeek {
    pub sport: String,
    pub user_id: String,
}

/// Picks of one pool member, included in a week view only when the
/// visibility gate allows the requester to see them.
#[derive(Serialize)]
pub struct MemberPicks {
    pub member_id: i64,
    pub user_id: String,
    pub picks: Vec<Pick>,
}

#[derive(Serialize)]
pub struct WeekView {
    pub week_id: i64,
    pub pool_id: i64,
    pub week_number: i64,
    pub locked: bool,
    pub locks_at: Option<DateTime<Utc>>,
    pub games: Vec<Game>,
    pub own_picks: Vec<Pick>,
    pub member_picks: Vec<MemberPicks>,
}

#[derive(Serialize)]
pub struct WeekUpdate {
    pub r#type: String,
    pub week_id: i64,
    pub games: Vec<Game>,
}
