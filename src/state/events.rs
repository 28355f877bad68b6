use crate::state::{game::ScoreEntry, state_machine::GamePhase};

/// State-transition notifications emitted by the game controller, in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// A new question is on screen.
    QuestionChanged {
        /// Zero-based round position.
        round_index: usize,
        /// Zero-based question position inside the round.
        question_index: usize,
        /// Question prompt.
        text: String,
        /// Name of the round the question belongs to.
        round_name: String,
        /// Countdown length for this question.
        time_limit: u32,
        /// Points at stake.
        points: i32,
    },
    /// One second elapsed on the countdown.
    TimerTick {
        /// Seconds left after this tick.
        remaining: u32,
    },
    /// The countdown reached zero without a buzz.
    TimerExpired,
    /// A team won the buzz.
    Buzzed {
        /// Winning team.
        team_index: usize,
    },
    /// A judgement was recorded without revealing the answer (buzzers reopen).
    AnswerJudged {
        /// Judged team.
        team_index: usize,
        /// Moderator verdict.
        correct: bool,
    },
    /// The answer is shown.
    AnswerRevealed {
        /// Expected answer text.
        answer: String,
        /// Whether the buzzing team found it (always `false` after a timeout).
        correct: bool,
    },
    /// Scores changed (or teams were registered).
    ScoresUpdated {
        /// Scores in registration order.
        scores: Vec<ScoreEntry>,
    },
    /// The session entered a new phase.
    PhaseChanged {
        /// Phase after the transition.
        phase: GamePhase,
    },
    /// Every round has been played.
    GameOver,
}
