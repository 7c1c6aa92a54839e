use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::dto::member_dto::Member;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum PickType {
    StraightUp,
    AgainstSpread,
    Confidence,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Pool {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub invite_code: String,
    pub pick_type: PickType,
    pub max_members: i64,
    pub include_playoffs: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePool {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub pick_type: PickType,
    pub max_members: i64,
    #[serde(default)]
    pub include_playoffs: bool,
    pub owner_user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct JoinPool {
    pub invite_code: String,
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct DeletePool {
    pub user_id: String,
}

#[derive(Serialize)]
pub struct PoolView {
    pub pool: Pool,
    pub members: Vec<Member>,
}
