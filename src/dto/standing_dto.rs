use serde::Serialize;

/// Derived per-member performance. Never stored; always recomputed from the
/// full pick/game history so it cannot drift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Standing {
    pub member_id: i64,
    pub user_id: String,
    pub total_picks: i64,
    pub correct_picks: i64,
    pub win_percentage: i64,
    pub current_streak: i64,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardEntry {
    pub rank: i64,
    #[serde(flatten)]
    pub standing: Standing,
}
