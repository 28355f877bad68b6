use serde::{Deserialize, Serialize};
use validator::Validate;

/// Time limit applied to a round whose document omits `time_limit`.
pub const DEFAULT_TIME_LIMIT_SECONDS: i64 = 30;
/// Longest countdown a round may define (one day).
pub const MAX_TIME_LIMIT_SECONDS: i64 = 86_400;
/// Largest absolute number of points a round may award or deduct.
pub const MAX_ROUND_POINTS: i32 = 1_000_000;

/// Root of a quiz content document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct QuizDocument {
    /// Ordered rounds played during the session.
    #[validate(
        length(min = 1, message = "content must define at least one round"),
        nested
    )]
    pub rounds: Vec<RoundEntity>,
}

/// Round entry inside a quiz document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct RoundEntity {
    /// Display name of the round (e.g. "Geography").
    #[serde(default)]
    pub name: String,
    /// Seconds granted to teams once the countdown starts.
    #[serde(default = "default_time_limit")]
    #[validate(range(
        min = 1,
        max = MAX_TIME_LIMIT_SECONDS,
        message = "time limit must be between 1 second and one day"
    ))]
    pub time_limit: i64,
    /// Points awarded for a correct answer and deducted for a wrong one.
    #[serde(default)]
    #[validate(range(
        min = -MAX_ROUND_POINTS,
        max = MAX_ROUND_POINTS,
        message = "points must stay within one million either way"
    ))]
    pub points: i32,
    /// Ordered questions of the round.
    #[validate(length(min = 1, message = "round must contain at least one question"))]
    pub questions: Vec<QuestionEntity>,
}

/// Question entry inside a round.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuestionEntity {
    /// Prompt shown to the contestants.
    pub text: String,
    /// Expected answer, revealed by the moderator.
    pub answer: String,
}

fn default_time_limit() -> i64 {
    DEFAULT_TIME_LIMIT_SECONDS
}
