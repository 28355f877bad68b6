use thiserror::Error;

use crate::state::game::{ScoreEntry, Team};

/// Raised when a team registration yields no usable team.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("at least one non-empty team name is required")]
pub struct SetupError;

/// Team registry and score ledger. Only the game controller holds a mutable handle.
#[derive(Debug, Clone, Default)]
pub struct Scoreboard {
    teams: Vec<Team>,
}

impl Scoreboard {
    /// Create an empty scoreboard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the registered teams with `names`, in input order and with zeroed scores.
    ///
    /// Blank names are skipped. The previous roster is kept untouched when no name survives.
    pub fn register<I, S>(&mut self, names: I) -> Result<&[Team], SetupError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let teams: Vec<Team> = names
            .into_iter()
            .map(|name| name.as_ref().trim().to_string())
            .filter(|name| !name.is_empty())
            .enumerate()
            .map(|(id, name)| Team { id, name, score: 0 })
            .collect();

        if teams.is_empty() {
            return Err(SetupError);
        }

        self.teams = teams;
        Ok(&self.teams)
    }

    /// Add `delta` to the score of `team_index`, returning the new score.
    pub fn apply_delta(&mut self, team_index: usize, delta: i32) -> Option<i32> {
        let team = self.teams.get_mut(team_index)?;
        team.score = team.score.saturating_add(delta);
        Some(team.score)
    }

    /// Zero every score while keeping the roster.
    pub fn reset_scores(&mut self) {
        self.teams.iter_mut().for_each(|team| team.score = 0);
    }

    /// Scores in registration order.
    pub fn snapshot(&self) -> Vec<ScoreEntry> {
        self.teams.iter().map(ScoreEntry::from).collect()
    }

    /// Registered teams.
    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    /// Whether `team_index` designates a registered team.
    pub fn contains(&self, team_index: usize) -> bool {
        team_index < self.teams.len()
    }

    /// Number of registered teams.
    pub fn len(&self) -> usize {
        self.teams.len()
    }

    /// Whether no team is registered yet.
    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_assigns_sequential_ids_and_skips_blank_names() {
        let mut board = Scoreboard::new();
        let teams = board.register(["Owls", "", "  ", "Foxes", " Bears "]).unwrap();

        let summary: Vec<(usize, &str, i32)> = teams
            .iter()
            .map(|team| (team.id, team.name.as_str(), team.score))
            .collect();
        assert_eq!(summary, vec![(0, "Owls", 0), (1, "Foxes", 0), (2, "Bears", 0)]);
    }

    #[test]
    fn register_without_valid_names_fails_and_keeps_roster() {
        let mut board = Scoreboard::new();
        board.register(["A"]).unwrap();

        assert_eq!(board.register(["", " "]), Err(SetupError));
        assert_eq!(board.register(Vec::<String>::new()), Err(SetupError));
        assert_eq!(board.len(), 1);
    }

    #[test]
    fn deltas_accumulate_and_may_go_negative() {
        let mut board = Scoreboard::new();
        board.register(["A", "B"]).unwrap();

        assert_eq!(board.apply_delta(1, 10), Some(10));
        assert_eq!(board.apply_delta(0, -20), Some(-20));
        assert_eq!(board.apply_delta(1, -5), Some(5));
        assert_eq!(board.apply_delta(2, 5), None);

        let snapshot = board.snapshot();
        assert_eq!(snapshot[0], ScoreEntry { name: "A".into(), score: -20 });
        assert_eq!(snapshot[1], ScoreEntry { name: "B".into(), score: 5 });
    }

    #[test]
    fn reset_scores_keeps_teams() {
        let mut board = Scoreboard::new();
        board.register(["A", "B"]).unwrap();
        board.apply_delta(0, 7);
        board.reset_scores();

        assert_eq!(board.len(), 2);
        assert!(board.snapshot().iter().all(|entry| entry.score == 0));
    }
}
