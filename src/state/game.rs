use crate::dao::models::{MAX_TIME_LIMIT_SECONDS, QuestionEntity, QuizDocument, RoundEntity};

/// Immutable question as presented during the game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    /// Prompt shown to the contestants.
    pub text: String,
    /// Expected answer, revealed by the moderator.
    pub answer: String,
}

/// Immutable round: a themed group of questions sharing a time limit and point value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Round {
    /// Display name of the round.
    pub name: String,
    /// Countdown length for every question of the round (always positive).
    pub time_limit_seconds: u32,
    /// Points won on a correct answer and lost on a wrong one.
    pub points: i32,
    /// Ordered questions (never empty).
    pub questions: Vec<Question>,
}

/// Every round loaded for the session. Read-only once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizContent {
    rounds: Vec<Round>,
}

impl QuizContent {
    /// Build content from already validated rounds.
    pub fn new(rounds: Vec<Round>) -> Self {
        Self { rounds }
    }

    /// Ordered rounds.
    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    /// Round at `index`, if any.
    pub fn round(&self, index: usize) -> Option<&Round> {
        self.rounds.get(index)
    }

    /// Question at the given position, if any.
    pub fn question(&self, round_index: usize, question_index: usize) -> Option<&Question> {
        self.round(round_index)?.questions.get(question_index)
    }

    /// Total number of questions across all rounds.
    pub fn question_count(&self) -> usize {
        self.rounds.iter().map(|round| round.questions.len()).sum()
    }
}

/// Participating team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Team {
    /// Position of the team in registration order; also the buzzer index.
    pub id: usize,
    /// Display name.
    pub name: String,
    /// Running score, may go negative.
    pub score: i32,
}

/// Read-only `(name, score)` pair pushed to displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreEntry {
    /// Team display name.
    pub name: String,
    /// Score at the time of the snapshot.
    pub score: i32,
}

impl From<&Team> for ScoreEntry {
    fn from(team: &Team) -> Self {
        Self {
            name: team.name.clone(),
            score: team.score,
        }
    }
}

impl From<QuestionEntity> for Question {
    fn from(value: QuestionEntity) -> Self {
        Self {
            text: value.text,
            answer: value.answer,
        }
    }
}

impl From<RoundEntity> for Round {
    fn from(value: RoundEntity) -> Self {
        Self {
            name: value.name,
            // Validated into 1..=MAX_TIME_LIMIT_SECONDS, always within u32.
            time_limit_seconds: u32::try_from(value.time_limit.clamp(1, MAX_TIME_LIMIT_SECONDS))
                .unwrap_or(1),
            points: value.points,
            questions: value.questions.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<QuizDocument> for QuizContent {
    fn from(value: QuizDocument) -> Self {
        Self::new(value.rounds.into_iter().map(Into::into).collect())
    }
}
