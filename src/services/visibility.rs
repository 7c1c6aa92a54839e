use chrono::{DateTime, Utc};

use crate::dto::game_dto::Game;
use crate::dto::member_dto::Role;
use crate::services::lock;

/// Whether a pool member may see another member's picks for a week.
/// Own picks are always visible; everyone's picks open up once the week
/// locks; Owners additionally see all picks pre-lock for moderation.
/// Uses the same lock derivation and server clock as the write path.
pub fn can_view_picks(
    requester_member_id: i64,
    target_member_id: i64,
    requester_role: Role,
    games: &[Game],
    now: DateTime<Utc>,
) -> bool {
    requester_member_id == target_member_id
        || requester_role == Role::Owner
        || lock::is_locked(games, now)
}
