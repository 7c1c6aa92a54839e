use std::collections::HashSet;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use sqlx::SqlitePool;
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::dto::game_dto::{CatalogGame, Game};
use crate::dto::member_dto::{Member, Role};
use crate::dto::pick_dto::Pick;
use crate::dto::week_dto::{CreateWeek, MemberPicks, SyncWeek, Week, WeekView};
use crate::error::ApiError;
use crate::services::catalog::CatalogClient;
use crate::services::lock;
use crate::services::visibility;
use crate::services::websocket::send_week_update;

pub async fn create_week_internal(pool: &SqlitePool, payload: CreateWeek) -> Result<Week, ApiError> {
    sqlx::query_scalar::<_, i64>("SELECT id FROM pools WHERE id = ?")
        .bind(payload.pool_id)
        .fetch_optional(pool)
        .await?
        .ok_or(ApiError::PoolNotFound)?;

    let existing: Option<i64> =
        sqlx::query_scalar("SELECT id FROM weeks WHERE pool_id = ? AND week_number = ?")
            .bind(payload.pool_id)
            .bind(payload.week_number)
            .fetch_optional(pool)
            .await?;
    if existing.is_some() {
        return Err(ApiError::DuplicateWeek {
            week_number: payload.week_number,
        });
    }

    let week = sqlx::query_as::<_, Week>(
        "INSERT INTO weeks (pool_id, week_number) VALUES (?, ?) RETURNING *",
    )
    .bind(payload.pool_id)
    .bind(payload.week_number)
    .fetch_one(pool)
    .await?;

    Ok(week)
}

/// Applies one catalog snapshot to a week's games: upsert by catalog id,
/// drop games no longer scheduled. A resolved game never flips back to
/// unresolved, whatever the feed says later.
pub async fn apply_catalog_games(
    pool: &SqlitePool,
    week_id: i64,
    games: &[CatalogGame],
) -> Result<(), ApiError> {
    // An empty snapshot for a week that has games is an upstream fault, not
    // a schedule. Applying it would delete every game and, since lock state
    // is derived, silently reopen a locked week whose picks were already
    // pool-visible. Keep what we have.
    if games.is_empty() {
        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM games WHERE week_id = ?")
            .bind(week_id)
            .fetch_one(pool)
            .await?;
        if existing > 0 {
            warn!(
                "Catalog returned no games for week {}; keeping the existing {}.",
                week_id, existing
            );
            return Ok(());
        }
    }

    let mut txn = crate::db::begin_immediate(pool).await?;

    for game in games {
        sqlx::query(
            r#"
            INSERT INTO games (id, week_id, home_team, away_team, commence_time, spread, winner, resolved)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(week_id, id) DO UPDATE SET
                home_team = excluded.home_team,
                away_team = excluded.away_team,
                commence_time = excluded.commence_time,
                spread = excluded.spread,
                winner = COALESCE(excluded.winner, games.winner),
                resolved = MAX(games.resolved, excluded.resolved)
            "#,
        )
        .bind(&game.id)
        .bind(week_id)
        .bind(&game.home_team)
        .bind(&game.away_team)
        .bind(game.commence_time)
        .bind(game.spread)
        .bind(&game.winner)
        .bind(game.is_resolved())
        .execute(&mut *txn)
        .await?;
    }

    // Schedule corrections: games gone from the feed are removed. Picks that
    // referenced them stay as rows and fall out of grading instead.
    let kept: HashSet<&str> = games.iter().map(|g| g.id.as_str()).collect();
    let current: Vec<String> =
        sqlx::query_scalar("SELECT id FROM games WHERE week_id = ?")
            .bind(week_id)
            .fetch_all(&mut *txn)
            .await?;

    for stale in current.iter().filter(|id| !kept.contains(id.as_str())) {
        let orphaned: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM picks WHERE week_id = ? AND game_id = ?",
        )
        .bind(week_id)
        .bind(stale)
        .fetch_one(&mut *txn)
        .await?;
        if orphaned > 0 {
            warn!(
                "Game {} left the catalog for week {}; {} picks now orphaned.",
                stale, week_id, orphaned
            );
        }

        sqlx::query("DELETE FROM games WHERE week_id = ? AND id = ?")
            .bind(week_id)
            .bind(stale)
            .execute(&mut *txn)
            .await?;
    }

    txn.commit().await?;
    Ok(())
}

/// Assembles a week for one requesting member: games, lock state with its
/// boundary, own picks, and other members' picks where the visibility gate
/// allows. One server-clock reading feeds both lock state and the gate.
pub async fn get_week_view_internal(
    pool: &SqlitePool,
    week_id: i64,
    requester_member_id: i64,
) -> Result<WeekView, ApiError> {
    let week = sqlx::query_as::<_, Week>("SELECT * FROM weeks WHERE id = ?")
        .bind(week_id)
        .fetch_optional(pool)
        .await?
        .ok_or(ApiError::WeekNotFound)?;

    let requester = sqlx::query_as::<_, Member>(
        "SELECT * FROM members WHERE id = ? AND pool_id = ?",
    )
    .bind(requester_member_id)
    .bind(week.pool_id)
    .fetch_optional(pool)
    .await?
    .ok_or(ApiError::MemberNotFound)?;

    let games = sqlx::query_as::<_, Game>(
        "SELECT * FROM games WHERE week_id = ? ORDER BY commence_time, id",
    )
    .bind(week_id)
    .fetch_all(pool)
    .await?;

    let members = sqlx::query_as::<_, Member>(
        "SELECT * FROM members WHERE pool_id = ? ORDER BY joined_at, id",
    )
    .bind(week.pool_id)
    .fetch_all(pool)
    .await?;

    let picks = sqlx::query_as::<_, Pick>("SELECT * FROM picks WHERE week_id = ?")
        .bind(week_id)
        .fetch_all(pool)
        .await?;

    let now = Utc::now();
    let locks_at = lock::lock_boundary(&games);
    let locked = lock::is_locked(&games, now);

    let mut own_picks = Vec::new();
    let mut member_picks = Vec::new();
    for member in &members {
        let theirs: Vec<Pick> = picks
            .iter()
            .filter(|p| p.member_id == member.id)
            .cloned()
            .collect();

        if member.id == requester.id {
            own_picks = theirs;
        } else if visibility::can_view_picks(requester.id, member.id, requester.role, &games, now) {
            member_picks.push(MemberPicks {
                member_id: member.id,
                user_id: member.user_id.clone(),
                picks: theirs,
            });
        }
    }

    Ok(WeekView {
        week_id: week.id,
        pool_id: week.pool_id,
        week_number: week.week_number,
        locked,
        locks_at,
        games,
        own_picks,
        member_picks,
    })
}

pub async fn create_week(
    Extension(pool): Extension<SqlitePool>,
    Json(payload): Json<CreateWeek>,
) -> Result<impl IntoResponse, ApiError> {
    info!("Creating week {} for pool {}.", payload.week_number, payload.pool_id);
    let week = create_week_internal(&pool, payload).await?;
    Ok((StatusCode::CREATED, Json(week)))
}

/// Owner-only pull of the week's schedule and results from the game catalog.
pub async fn sync_week(
    Extension(pool): Extension<SqlitePool>,
    Extension(tx): Extension<broadcast::Sender<String>>,
    Extension(catalog): Extension<CatalogClient>,
    Path(week_id): Path<i64>,
    Json(payload): Json<SyncWeek>,
) -> Result<impl IntoResponse, ApiError> {
    let week = sqlx::query_as::<_, Week>("SELECT * FROM weeks WHERE id = ?")
        .bind(week_id)
        .fetch_optional(&pool)
        .await?
        .ok_or(ApiError::WeekNotFound)?;

    let requester = sqlx::query_as::<_, Member>(
        "SELECT * FROM members WHERE pool_id = ? AND user_id = ?",
    )
    .bind(week.pool_id)
    .bind(&payload.user_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(ApiError::MemberNotFound)?;

    if requester.role != Role::Owner {
        return Err(ApiError::NotOwner);
    }

    let games = catalog.fetch_week(&payload.sport, week.week_number).await?;
    apply_catalog_games(&pool, week_id, &games).await?;

    send_week_update(&pool, &tx, week_id).await;
    Ok((
        StatusCode::OK,
        format!("Synced {} games for week {}.", games.len(), week.week_number),
    ))
}

#[derive(Deserialize)]
pub struct WeekViewQuery {
    pub requester_id: i64,
}

pub async fn get_week_view(
    Extension(pool): Extension<SqlitePool>,
    Path(week_id): Path<i64>,
    Query(query): Query<WeekViewQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let view = get_week_view_internal(&pool, week_id, query.requester_id).await?;
    Ok((StatusCode::OK, Json(view)))
}
