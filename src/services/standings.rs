use chrono::{DateTime, Utc};

use crate::dto::standing_dto::{LeaderboardEntry, Standing};
use crate::services::grading::Correctness;

/// One pick joined to its game's result, positioned in pool chronology.
#[derive(Debug, Clone)]
pub struct PickOutcome {
    pub week_number: i64,
    pub commence_time: DateTime<Utc>,
    pub outcome: Correctness,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StandingTotals {
    pub total_picks: i64,
    pub correct_picks: i64,
    pub win_percentage: i64,
    pub current_streak: i64,
}

/// Recomputes one member's totals from their full pick history. Pure and
/// idempotent: a partially graded week yields the same answer no matter when
/// this runs, because Pending and Void entries are simply not graded yet.
pub fn compute_standing(mut outcomes: Vec<PickOutcome>) -> StandingTotals {
    outcomes.sort_by(|a, b| {
        (a.week_number, a.commence_time).cmp(&(b.week_number, b.commence_time))
    });

    let graded: Vec<Correctness> = outcomes
        .iter()
        .map(|o| o.outcome)
        .filter(|c| matches!(c, Correctness::Correct | Correctness::Incorrect))
        .collect();

    let total_picks = graded.len() as i64;
    let correct_picks = graded
        .iter()
        .filter(|c| **c == Correctness::Correct)
        .count() as i64;

    let win_percentage = if total_picks == 0 {
        0
    } else {
        (100.0 * correct_picks as f64 / total_picks as f64).round() as i64
    };

    let current_streak = match graded.last() {
        None => 0,
        Some(last) => {
            let run = graded.iter().rev().take_while(|c| *c == last).count() as i64;
            if *last == Correctness::Correct {
                run
            } else {
                -run
            }
        }
    };

    StandingTotals {
        total_picks,
        correct_picks,
        win_percentage,
        current_streak,
    }
}

/// Total-orders standings: correct picks desc, win percentage desc, then
/// member id asc so two members can never rank equal.
pub fn rank_leaderboard(mut standings: Vec<Standing>) -> Vec<LeaderboardEntry> {
    standings.sort_by(|a, b| {
        b.correct_picks
            .cmp(&a.correct_picks)
            .then(b.win_percentage.cmp(&a.win_percentage))
            .then(a.member_id.cmp(&b.member_id))
    });

    standings
        .into_iter()
        .enumerate()
        .map(|(i, standing)| LeaderboardEntry {
            rank: i as i64 + 1,
            standing,
        })
        .collect()
}
