use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use sqlx::SqlitePool;
use tokio::sync::broadcast;
use tracing::info;

use crate::dto::game_dto::Game;
use crate::dto::member_dto::Member;
use crate::dto::pick_dto::{Pick, SubmitPick};
use crate::dto::week_dto::Week;
use crate::error::ApiError;
use crate::services::lock;
use crate::services::websocket::send_pick_update;

/// The pick write path. Validation order is fixed: unknown game, then wrong
/// team, then lock state. The lock is re-derived from the server clock inside
/// the same transaction as the upsert, so a submission racing the boundary is
/// either fully accepted or fully rejected and a too-late pick can never be
/// durably persisted.
pub async fn submit_pick_internal(pool: &SqlitePool, payload: SubmitPick) -> Result<Pick, ApiError> {
    let mut txn = crate::db::begin_immediate(pool).await?;

    let week = sqlx::query_as::<_, Week>("SELECT * FROM weeks WHERE id = ?")
        .bind(payload.week_id)
        .fetch_optional(&mut *txn)
        .await?
        .ok_or(ApiError::WeekNotFound)?;

    // The submitting member must belong to the week's pool.
    sqlx::query_as::<_, Member>("SELECT * FROM members WHERE id = ? AND pool_id = ?")
        .bind(payload.member_id)
        .bind(week.pool_id)
        .fetch_optional(&mut *txn)
        .await?
        .ok_or(ApiError::MemberNotFound)?;

    let games = sqlx::query_as::<_, Game>("SELECT * FROM games WHERE week_id = ?")
        .bind(payload.week_id)
        .fetch_all(&mut *txn)
        .await?;

    let game = games
        .iter()
        .find(|g| g.id == payload.game_id)
        .ok_or(ApiError::InvalidGame)?;

    if payload.selected_team != game.home_team && payload.selected_team != game.away_team {
        return Err(ApiError::InvalidTeam);
    }

    // Server clock, taken at the instant of the durable write. Never trust a
    // timestamp the caller observed earlier.
    let now = Utc::now();
    if let Some(boundary) = lock::lock_boundary(&games) {
        if now >= boundary {
            return Err(ApiError::WeekLocked { locks_at: boundary });
        }
    }

    // Upsert keyed by (member, game): resubmitting before lock overwrites.
    let pick = sqlx::query_as::<_, Pick>(
        r#"
        INSERT INTO picks (week_id, member_id, game_id, selected_team, submitted_at)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT(member_id, game_id) DO UPDATE SET
            selected_team = excluded.selected_team,
            submitted_at = excluded.submitted_at
        RETURNING *
        "#,
    )
    .bind(payload.week_id)
    .bind(payload.member_id)
    .bind(&payload.game_id)
    .bind(&payload.selected_team)
    .bind(now)
    .fetch_one(&mut *txn)
    .await?;

    txn.commit().await?;
    Ok(pick)
}

pub async fn submit_pick(
    Extension(pool): Extension<SqlitePool>,
    Extension(tx): Extension<broadcast::Sender<String>>,
    Json(payload): Json<SubmitPick>,
) -> Result<impl IntoResponse, ApiError> {
    info!(
        "Member {} picking {} for game {}.",
        payload.member_id, payload.selected_team, payload.game_id
    );

    let pick = submit_pick_internal(&pool, payload).await?;
    send_pick_update(&tx, &pick).await;
    Ok((StatusCode::OK, Json(pick)))
}
