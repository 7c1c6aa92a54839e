use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{error, info, warn};

use crate::error::ApiError;

pub async fn connect(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    info!("Connected to sqlite database.");
    Ok(pool)
}

/// Creates the engine's tables if they do not exist yet. Lock state is never
/// stored; it is always derived from game commence times.
pub async fn init_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS pools (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            invite_code TEXT NOT NULL UNIQUE,
            pick_type TEXT NOT NULL,
            max_members INTEGER NOT NULL,
            include_playoffs BOOLEAN NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS members (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            pool_id INTEGER NOT NULL REFERENCES pools(id) ON DELETE CASCADE,
            user_id TEXT NOT NULL,
            role TEXT NOT NULL,
            joined_at TEXT NOT NULL,
            UNIQUE(pool_id, user_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS weeks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            pool_id INTEGER NOT NULL REFERENCES pools(id) ON DELETE CASCADE,
            week_number INTEGER NOT NULL,
            UNIQUE(pool_id, week_number)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS games (
            id TEXT NOT NULL,
            week_id INTEGER NOT NULL REFERENCES weeks(id) ON DELETE CASCADE,
            home_team TEXT NOT NULL,
            away_team TEXT NOT NULL,
            commence_time TEXT NOT NULL,
            spread REAL,
            winner TEXT,
            resolved BOOLEAN NOT NULL DEFAULT 0,
            PRIMARY KEY (week_id, id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Picks deliberately carry no foreign key to games: a schedule correction
    // can drop a game out of the catalog after picks were made, and those
    // picks must survive as rows and be excluded from grading instead.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS picks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            week_id INTEGER NOT NULL REFERENCES weeks(id) ON DELETE CASCADE,
            member_id INTEGER NOT NULL REFERENCES members(id) ON DELETE CASCADE,
            game_id TEXT NOT NULL,
            selected_team TEXT NOT NULL,
            submitted_at TEXT NOT NULL,
            UNIQUE(member_id, game_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    info!("Database schema is ready.");
    Ok(())
}

/// Read-then-write transactions must take the SQLite write lock up front.
/// A deferred transaction that upgrades to a write mid-flight gets
/// SQLITE_BUSY immediately, bypassing busy_timeout; BEGIN IMMEDIATE makes
/// concurrent writers queue on the timeout instead of failing.
pub async fn begin_immediate(pool: &SqlitePool) -> Result<Transaction<'_, Sqlite>, sqlx::Error> {
    pool.begin_with("BEGIN IMMEDIATE").await
}

/// Bounded retry with doubling backoff for transient collaborator failures.
/// Business-rule rejections never pass through here; callers only wrap the
/// transport operation itself.
pub async fn with_retry<T, E, F, Fut>(
    label: &str,
    attempts: u32,
    base_delay: Duration,
    mut op: F,
) -> Result<T, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut delay = base_delay;

    for attempt in 1..=attempts {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < attempts => {
                warn!("{} attempt {}/{} failed: {}", label, attempt, attempts, e);
                tokio::time::sleep(delay).await;
                delay *= 2;
            }
            Err(e) => {
                error!("{} failed after {} attempts: {}", label, attempts, e);
            }
        }
    }

    Err(ApiError::ServiceUnavailable)
}
