use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use rand::distr::Alphanumeric;
use rand::Rng;
use sqlx::SqlitePool;
use tracing::info;

use crate::dto::member_dto::{Member, Role, TransferOwnership};
use crate::dto::pool_dto::{CreatePool, DeletePool, JoinPool, Pool, PoolView};
use crate::error::ApiError;

fn generate_invite_code() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect()
}

pub async fn create_pool_internal(pool: &SqlitePool, payload: CreatePool) -> Result<Pool, ApiError> {
    let mut txn = crate::db::begin_immediate(pool).await?;

    // Invite codes are drawn from a 62^8 space; regenerate on the rare
    // collision instead of failing the create.
    let mut invite_code = generate_invite_code();
    loop {
        let taken: Option<i64> =
            sqlx::query_scalar("SELECT id FROM pools WHERE invite_code = ?")
                .bind(&invite_code)
                .fetch_optional(&mut *txn)
                .await?;
        if taken.is_none() {
            break;
        }
        invite_code = generate_invite_code();
    }

    let now = Utc::now();
    let pool_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO pools (name, description, invite_code, pick_type, max_members, include_playoffs, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(&payload.name)
    .bind(&payload.description)
    .bind(&invite_code)
    .bind(payload.pick_type)
    .bind(payload.max_members)
    .bind(payload.include_playoffs)
    .bind(now)
    .fetch_one(&mut *txn)
    .await?;

    // The creator is the pool's one Owner from the first instant.
    sqlx::query(
        r#"
        INSERT INTO members (pool_id, user_id, role, joined_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(pool_id)
    .bind(&payload.owner_user_id)
    .bind(Role::Owner)
    .bind(now)
    .execute(&mut *txn)
    .await?;

    let created = sqlx::query_as::<_, Pool>("SELECT * FROM pools WHERE id = ?")
        .bind(pool_id)
        .fetch_one(&mut *txn)
        .await?;

    txn.commit().await?;
    Ok(created)
}

/// Capacity check and insert run in one transaction, so concurrent joins
/// cannot push the pool past max_members.
pub async fn join_pool_internal(pool: &SqlitePool, payload: JoinPool) -> Result<Member, ApiError> {
    let mut txn = crate::db::begin_immediate(pool).await?;

    let target = sqlx::query_as::<_, Pool>("SELECT * FROM pools WHERE invite_code = ?")
        .bind(&payload.invite_code)
        .fetch_optional(&mut *txn)
        .await?
        .ok_or(ApiError::InvalidInviteCode)?;

    let existing: Option<i64> =
        sqlx::query_scalar("SELECT id FROM members WHERE pool_id = ? AND user_id = ?")
            .bind(target.id)
            .bind(&payload.user_id)
            .fetch_optional(&mut *txn)
            .await?;
    if existing.is_some() {
        return Err(ApiError::AlreadyMember);
    }

    let member_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM members WHERE pool_id = ?")
        .bind(target.id)
        .fetch_one(&mut *txn)
        .await?;
    if member_count >= target.max_members {
        return Err(ApiError::PoolFull);
    }

    let member = sqlx::query_as::<_, Member>(
        r#"
        INSERT INTO members (pool_id, user_id, role, joined_at)
        VALUES (?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(target.id)
    .bind(&payload.user_id)
    .bind(Role::Member)
    .bind(Utc::now())
    .fetch_one(&mut *txn)
    .await?;

    txn.commit().await?;
    Ok(member)
}

pub async fn get_pool_internal(pool: &SqlitePool, pool_id: i64) -> Result<PoolView, ApiError> {
    let found = sqlx::query_as::<_, Pool>("SELECT * FROM pools WHERE id = ?")
        .bind(pool_id)
        .fetch_optional(pool)
        .await?
        .ok_or(ApiError::PoolNotFound)?;

    let members = sqlx::query_as::<_, Member>(
        "SELECT * FROM members WHERE pool_id = ? ORDER BY joined_at, id",
    )
    .bind(pool_id)
    .fetch_all(pool)
    .await?;

    Ok(PoolView { pool: found, members })
}

/// Demotes the current Owner and promotes the target in one transaction, so
/// the pool is never observable with zero Owners.
pub async fn transfer_ownership_internal(
    pool: &SqlitePool,
    pool_id: i64,
    payload: TransferOwnership,
) -> Result<(), ApiError> {
    let mut txn = crate::db::begin_immediate(pool).await?;

    let from = sqlx::query_as::<_, Member>(
        "SELECT * FROM members WHERE pool_id = ? AND user_id = ?",
    )
    .bind(pool_id)
    .bind(&payload.from_user_id)
    .fetch_optional(&mut *txn)
    .await?
    .ok_or(ApiError::MemberNotFound)?;

    if from.role != Role::Owner {
        return Err(ApiError::NotOwner);
    }

    let to = sqlx::query_as::<_, Member>(
        "SELECT * FROM members WHERE pool_id = ? AND user_id = ?",
    )
    .bind(pool_id)
    .bind(&payload.to_user_id)
    .fetch_optional(&mut *txn)
    .await?
    .ok_or(ApiError::MemberNotFound)?;

    sqlx::query("UPDATE members SET role = ? WHERE id = ?")
        .bind(Role::Member)
        .bind(from.id)
        .execute(&mut *txn)
        .await?;

    sqlx::query("UPDATE members SET role = ? WHERE id = ?")
        .bind(Role::Owner)
        .bind(to.id)
        .execute(&mut *txn)
        .await?;

    txn.commit().await?;
    info!("Pool {} ownership moved to {}", pool_id, payload.to_user_id);
    Ok(())
}

/// Owner-only. Members, weeks, games and picks go with the pool via
/// ON DELETE CASCADE.
pub async fn delete_pool_internal(
    pool: &SqlitePool,
    pool_id: i64,
    requester_user_id: &str,
) -> Result<(), ApiError> {
    let requester = sqlx::query_as::<_, Member>(
        "SELECT * FROM members WHERE pool_id = ? AND user_id = ?",
    )
    .bind(pool_id)
    .bind(requester_user_id)
    .fetch_optional(pool)
    .await?
    .ok_or(ApiError::MemberNotFound)?;

    if requester.role != Role::Owner {
        return Err(ApiError::NotOwner);
    }

    let result = sqlx::query("DELETE FROM pools WHERE id = ?")
        .bind(pool_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::PoolNotFound);
    }

    info!("Deleted pool {} and its members, weeks and picks.", pool_id);
    Ok(())
}

pub async fn create_pool(
    Extension(pool): Extension<SqlitePool>,
    Json(payload): Json<CreatePool>,
) -> Result<impl IntoResponse, ApiError> {
    info!("Creating pool {}.", payload.name);
    let created = create_pool_internal(&pool, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn join_pool(
    Extension(pool): Extension<SqlitePool>,
    Json(payload): Json<JoinPool>,
) -> Result<impl IntoResponse, ApiError> {
    info!("User {} joining via invite code.", payload.user_id);
    let member = join_pool_internal(&pool, payload).await?;
    Ok((StatusCode::CREATED, Json(member)))
}

pub async fn get_pool(
    Extension(pool): Extension<SqlitePool>,
    Path(pool_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let view = get_pool_internal(&pool, pool_id).await?;
    Ok((StatusCode::OK, Json(view)))
}

pub async fn transfer_ownership(
    Extension(pool): Extension<SqlitePool>,
    Path(pool_id): Path<i64>,
    Json(payload): Json<TransferOwnership>,
) -> Result<impl IntoResponse, ApiError> {
    info!("Transferring ownership of pool {}.", pool_id);
    transfer_ownership_internal(&pool, pool_id, payload).await?;
    Ok((StatusCode::OK, "Ownership transferred.".to_string()))
}

pub async fn delete_pool(
    Extension(pool): Extension<SqlitePool>,
    Path(pool_id): Path<i64>,
    Json(payload): Json<DeletePool>,
) -> Result<impl IntoResponse, ApiError> {
    info!("Deleting pool {}.", pool_id);
    delete_pool_internal(&pool, pool_id, &payload.user_id).await?;
    Ok((StatusCode::OK, "Pool was successfully removed.".to_string()))
}
