use crate::dto::game_dto::Game;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Correctness {
    Correct,
    Incorrect,
    /// Game has not resolved yet.
    Pending,
    /// Game resolved with no winner (postponement/tie); excluded from every
    /// standing denominator.
    Void,
}

/// Grades one selection against the raw result fields. Usable straight off a
/// joined query row without materializing a `Game`.
pub fn grade(selected_team: &str, resolved: bool, winner: Option<&str>) -> Correctness {
    if !resolved {
        return Correctness::Pending;
    }
    match winner {
        None => Correctness::Void,
        Some(w) if w == selected_team => Correctness::Correct,
        Some(_) => Correctness::Incorrect,
    }
}

pub fn correctness_of(selected_team: &str, game: &Game) -> Correctness {
    grade(selected_team, game.resolved, game.winner.as_deref())
}
