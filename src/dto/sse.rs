use serde::Serialize;
use utoipa::ToSchema;

use crate::dto::{phase::VisibleGamePhase, public::TeamSummary};

#[derive(Clone, Debug, PartialEq, Eq)]
/// Dispatched payload carried across SSE channels.
pub struct ServerEvent {
    /// Broadcast sequence number, used as the SSE `id` field.
    pub id: Option<u64>,
    pub event: Option<String>,
    pub data: String,
}

impl ServerEvent {
    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            id: None,
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }

    /// Attach the broadcast sequence number.
    pub fn with_id(mut self, seq: u64) -> Self {
        self.id = Some(seq);
        self
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when a new question is on screen.
pub struct QuestionChangedEvent {
    pub round_index: usize,
    pub question_index: usize,
    pub text: String,
    pub round_name: String,
    pub time_limit: u32,
    pub points: i32,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast once per countdown second.
pub struct TimerTickEvent {
    pub remaining: u32,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when a team wins the buzz.
pub struct BuzzedEvent {
    pub team_index: usize,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when a judgement is recorded and buzzers may reopen.
pub struct AnswerJudgedEvent {
    pub team_index: usize,
    pub correct: bool,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the answer is shown.
pub struct AnswerRevealedEvent {
    pub answer: String,
    pub correct: bool,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast whenever scores change.
pub struct ScoresUpdatedEvent {
    pub teams: Vec<TeamSummary>,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast whenever the gameplay phase changes.
pub struct PhaseChangedEvent {
    pub phase: VisibleGamePhase,
}

#[derive(Debug, Serialize, ToSchema)]
/// Payload-less notification (`timer_expired`, `game_over`).
pub struct EmptyEvent {}
