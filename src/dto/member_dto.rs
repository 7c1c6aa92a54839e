use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum Role {
    Owner,
    Member,
}

/// One row per (pool, user). A pool has exactly one Owner at all times;
/// ownership transfer swaps both roles in a single transaction.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Member {
    pub id: i64,
    pub pool_id: i64,
    pub user_id: String,
    pub role: Role,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct TransferOwnership {
    pub from_user_id: String,
    pub to_user_id: String,
}
