use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dto::phase::VisibleGamePhase,
    state::{controller::SessionSnapshot, game::ScoreEntry},
};

/// Team entry as shown on displays. `index` is the buzzer number.
#[derive(Debug, Serialize, ToSchema, Clone, PartialEq, Eq)]
pub struct TeamSummary {
    pub index: usize,
    pub name: String,
    pub score: i32,
}

impl TeamSummary {
    /// Number score entries by registration order.
    pub fn from_scores(scores: &[ScoreEntry]) -> Vec<Self> {
        scores
            .iter()
            .enumerate()
            .map(|(index, entry)| Self {
                index,
                name: entry.name.clone(),
                score: entry.score,
            })
            .collect()
    }
}

/// Response payload listing the registered teams.
#[derive(Debug, Serialize, ToSchema)]
pub struct TeamsResponse {
    pub teams: Vec<TeamSummary>,
}

/// Response exposing the game's phase as seen by the public.
#[derive(Debug, Serialize, ToSchema)]
pub struct GamePhaseResponse {
    pub phase: VisibleGamePhase,
}

/// Question currently on screen.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct QuestionSnapshot {
    pub round_index: usize,
    pub question_index: usize,
    pub round_name: String,
    pub text: String,
    pub time_limit: u32,
    pub points: i32,
    /// Present once the answer has been revealed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
}

/// Full session state handed to a display when it connects.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct SessionSnapshotResponse {
    pub session_id: Uuid,
    pub phase: VisibleGamePhase,
    pub round_count: usize,
    /// Absent in the lobby and on the final scoreboard.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<QuestionSnapshot>,
    pub timer_remaining: u32,
    pub timer_running: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buzz_winner: Option<usize>,
    pub locked_out: Vec<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_judgement: Option<bool>,
    pub teams: Vec<TeamSummary>,
}

impl From<SessionSnapshot> for SessionSnapshotResponse {
    fn from(value: SessionSnapshot) -> Self {
        let question = match (value.question, value.round_name) {
            (Some(text), Some(round_name)) => Some(QuestionSnapshot {
                round_index: value.round_index,
                question_index: value.question_index,
                round_name,
                text,
                time_limit: value.time_limit.unwrap_or_default(),
                points: value.points.unwrap_or_default(),
                answer: value.answer,
            }),
            _ => None,
        };

        Self {
            session_id: value.session_id,
            phase: value.phase.into(),
            round_count: value.round_count,
            question,
            timer_remaining: value.timer_remaining,
            timer_running: value.timer_running,
            buzz_winner: value.buzz_winner,
            locked_out: value.locked_out,
            last_judgement: value.last_judgement,
            teams: TeamSummary::from_scores(&value.scores),
        }
    }
}
