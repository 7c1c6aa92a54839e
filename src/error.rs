use axum::{http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Every failure the engine can surface to a caller. Validation and state
/// rejections are final; only `ServiceUnavailable` marks an exhausted
/// transient failure the caller may retry later.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("no pool matches that invite code")]
    InvalidInviteCode,

    #[error("pool is already at its member limit")]
    PoolFull,

    #[error("user is already a member of this pool")]
    AlreadyMember,

    #[error("game is not part of this week")]
    InvalidGame,

    #[error("selected team plays in neither side of this game")]
    InvalidTeam,

    #[error("week locked at {locks_at}")]
    WeekLocked { locks_at: DateTime<Utc> },

    #[error("pool not found")]
    PoolNotFound,

    #[error("week not found")]
    WeekNotFound,

    #[error("week {week_number} already exists for this pool")]
    DuplicateWeek { week_number: i64 },

    #[error("member not found in this pool")]
    MemberNotFound,

    #[error("only the pool owner may do this")]
    NotOwner,

    #[error("upstream service unavailable")]
    ServiceUnavailable,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    locks_at: Option<DateTime<Utc>>,
}

impl ApiError {
    fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidInviteCode => "invalid_invite_code",
            ApiError::PoolFull => "pool_full",
            ApiError::AlreadyMember => "already_member",
            ApiError::InvalidGame => "invalid_game",
            ApiError::InvalidTeam => "invalid_team",
            ApiError::WeekLocked { .. } => "week_locked",
            ApiError::PoolNotFound => "pool_not_found",
            ApiError::WeekNotFound => "week_not_found",
            ApiError::DuplicateWeek { .. } => "duplicate_week",
            ApiError::MemberNotFound => "member_not_found",
            ApiError::NotOwner => "not_owner",
            ApiError::ServiceUnavailable => "service_unavailable",
            ApiError::Database(_) => "internal_error",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidInviteCode
            | ApiError::InvalidGame
            | ApiError::InvalidTeam => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::PoolFull
            | ApiError::AlreadyMember
            | ApiError::DuplicateWeek { .. }
            | ApiError::WeekLocked { .. } => StatusCode::CONFLICT,
            ApiError::PoolNotFound
            | ApiError::WeekNotFound
            | ApiError::MemberNotFound => StatusCode::NOT_FOUND,
            ApiError::NotOwner => StatusCode::FORBIDDEN,
            ApiError::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        if let ApiError::Database(e) = &self {
            error!("database error: {:?}", e);
        }

        let locks_at = match &self {
            ApiError::WeekLocked { locks_at } => Some(*locks_at),
            _ => None,
        };

        let body = ErrorBody {
            error: self.code(),
            message: self.to_string(),
            locks_at,
        };

        (self.status(), Json(body)).into_response()
    }
}
