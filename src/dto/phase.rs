use serde::Serialize;
use utoipa::ToSchema;

use crate::state::state_machine::GamePhase;

/// Publicly visible game phase exposed to clients (REST/SSE).
#[derive(Debug, Serialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VisibleGamePhase {
    /// Lobby: teams are being registered.
    Idle,
    /// Question on screen, buzzers closed.
    Reading,
    /// Countdown running, buzzers open.
    Listening,
    /// A team buzzed and awaits judgement.
    Buzzed,
    /// Answer on screen.
    AnswerRevealed,
    /// Countdown ran out without a buzz.
    Timeout,
    /// Final scores.
    GameOver,
}

impl From<GamePhase> for VisibleGamePhase {
    fn from(value: GamePhase) -> Self {
        match value {
            GamePhase::Idle => VisibleGamePhase::Idle,
            GamePhase::Reading => VisibleGamePhase::Reading,
            GamePhase::Listening => VisibleGamePhase::Listening,
            GamePhase::Buzzed => VisibleGamePhase::Buzzed,
            GamePhase::AnswerRevealed => VisibleGamePhase::AnswerRevealed,
            GamePhase::Timeout => VisibleGamePhase::Timeout,
            GamePhase::GameOver => VisibleGamePhase::GameOver,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_serialize_in_snake_case() {
        let json = serde_json::to_string(&VisibleGamePhase::from(GamePhase::AnswerRevealed)).unwrap();
        assert_eq!(json, "\"answer_revealed\"");
        let json = serde_json::to_string(&VisibleGamePhase::from(GamePhase::GameOver)).unwrap();
        assert_eq!(json, "\"game_over\"");
    }
}
