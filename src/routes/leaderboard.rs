use std::collections::HashMap;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use tracing::warn;

use crate::dto::member_dto::Member;
use crate::dto::standing_dto::{LeaderboardEntry, Standing};
use crate::error::ApiError;
use crate::services::grading;
use crate::services::standings::{self, PickOutcome};

/// A pick joined (left) to its game's result. Game columns are nullable:
/// a pick can outlive its game after a schedule correction.
#[derive(FromRow)]
struct GradedRow {
    pick_id: i64,
    member_id: i64,
    game_id: String,
    selected_team: String,
    week_number: i64,
    commence_time: Option<DateTime<Utc>>,
    winner: Option<String>,
    resolved: Option<bool>,
}

/// Recomputes every member's standing from the full pick/game history of a
/// pool and ranks them. No cached counters anywhere; invoking this at any
/// point during a partially graded week gives the same, correct answer.
pub async fn leaderboard_internal(
    pool: &SqlitePool,
    pool_id: i64,
) -> Result<Vec<LeaderboardEntry>, ApiError> {
    sqlx::query_scalar::<_, i64>("SELECT id FROM pools WHERE id = ?")
        .bind(pool_id)
        .fetch_optional(pool)
        .await?
        .ok_or(ApiError::PoolNotFound)?;

    let members = sqlx::query_as::<_, Member>("SELECT * FROM members WHERE pool_id = ?")
        .bind(pool_id)
        .fetch_all(pool)
        .await?;

    let rows = sqlx::query_as::<_, GradedRow>(
        r#"
        SELECT
            p.id AS pick_id,
            p.member_id,
            p.game_id,
            p.selected_team,
            w.week_number,
            g.commence_time,
            g.winner,
            g.resolved
        FROM picks p
        JOIN weeks w ON w.id = p.week_id
        LEFT JOIN games g ON g.week_id = p.week_id AND g.id = p.game_id
        WHERE w.pool_id = ?
        "#,
    )
    .bind(pool_id)
    .fetch_all(pool)
    .await?;

    let mut per_member: HashMap<i64, Vec<PickOutcome>> = HashMap::new();
    for row in rows {
        let (commence_time, resolved) = match (row.commence_time, row.resolved) {
            (Some(t), Some(r)) => (t, r),
            _ => {
                // Fail-soft for the read, fail-loud for detection.
                warn!(
                    "Pick {} references game {} missing from the catalog; skipping.",
                    row.pick_id, row.game_id
                );
                continue;
            }
        };

        let outcome = grading::grade(&row.selected_team, resolved, row.winner.as_deref());
        per_member.entry(row.member_id).or_default().push(PickOutcome {
            week_number: row.week_number,
            commence_time,
            outcome,
        });
    }

    let computed: Vec<Standing> = members
        .into_iter()
        .map(|member| {
            let outcomes = per_member.remove(&member.id).unwrap_or_default();
            let totals = standings::compute_standing(outcomes);
            Standing {
                member_id: member.id,
                user_id: member.user_id,
                total_picks: totals.total_picks,
                correct_picks: totals.correct_picks,
                win_percentage: totals.win_percentage,
                current_streak: totals.current_streak,
            }
        })
        .collect();

    Ok(standings::rank_leaderboard(computed))
}

pub async fn get_leaderboard(
    Extension(pool): Extension<SqlitePool>,
    Path(pool_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let entries = leaderboard_internal(&pool, pool_id).await?;
    Ok((StatusCode::OK, Json(entries)))
}
