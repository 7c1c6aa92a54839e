use chrono::{DateTime, Utc};

use crate::dto::game_dto::Game;

/// The instant a week locks: the earliest commence time across its games.
/// A week with no games has no boundary and never locks.
pub fn lock_boundary(games: &[Game]) -> Option<DateTime<Utc>> {
    games.iter().map(|g| g.commence_time).min()
}

/// A week is OPEN strictly before its boundary and LOCKED from the boundary
/// on, permanently. `now` must come from the server clock; this is the single
/// gate for both pick writes and pick visibility, and feeding it a
/// client-supplied timestamp would let a late pick slip through.
pub fn is_locked(games: &[Game], now: DateTime<Utc>) -> bool {
    match lock_boundary(games) {
        Some(boundary) => now >= boundary,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn game(id: &str, commence_time: DateTime<Utc>) -> Game {
        Game {
            id: id.to_string(),
            week_id: 1,
            home_team: "Lakers".to_string(),
            away_team: "Celtics".to_string(),
            commence_time,
            spread: None,
            winner: None,
            resolved: false,
        }
    }

    #[test]
    fn empty_week_never_locks() {
        let now = Utc.with_ymd_and_hms(2026, 1, 4, 12, 0, 0).unwrap();
        assert_eq!(lock_boundary(&[]), None);
        assert!(!is_locked(&[], now));
    }

    #[test]
    fn boundary_is_earliest_commence_time() {
        let t1 = Utc.with_ymd_and_hms(2026, 1, 4, 10, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2026, 1, 4, 12, 0, 0).unwrap();
        let games = vec![game("g2", t2), game("g1", t1)];
        assert_eq!(lock_boundary(&games), Some(t1));
    }

    #[test]
    fn earliest_game_locks_the_whole_week() {
        let t1 = Utc.with_ymd_and_hms(2026, 1, 4, 10, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2026, 1, 4, 12, 0, 0).unwrap();
        let games = vec![game("g1", t1), game("g2", t2)];

        let just_before = Utc.with_ymd_and_hms(2026, 1, 4, 9, 59, 0).unwrap();
        assert!(!is_locked(&games, just_before));
        assert!(is_locked(&games, t1));
        // G2 has not started, but the week as a whole is locked.
        let after = Utc.with_ymd_and_hms(2026, 1, 4, 10, 1, 0).unwrap();
        assert!(is_locked(&games, after));
    }

    #[test]
    fn lock_is_monotone_in_time() {
        let boundary = Utc.with_ymd_and_hms(2026, 1, 4, 10, 0, 0).unwrap();
        let games = vec![game("g1", boundary)];

        let mut t = boundary;
        for _ in 0..48 {
            assert!(is_locked(&games, t));
            t += Duration::hours(1);
        }
    }
}
