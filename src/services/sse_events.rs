use serde::Serialize;
use tracing::warn;

use crate::{
    dto::{
        public::{SessionSnapshotResponse, TeamSummary},
        sse::{
            AnswerJudgedEvent, AnswerRevealedEvent, BuzzedEvent, EmptyEvent, PhaseChangedEvent,
            QuestionChangedEvent, ScoresUpdatedEvent, ServerEvent, TimerTickEvent,
        },
    },
    state::{broadcaster::Published, controller::SessionSnapshot, events::GameEvent},
};

/// Name of the first event on every display stream.
pub const EVENT_SNAPSHOT: &str = "snapshot";
const EVENT_QUESTION_CHANGED: &str = "question_changed";
const EVENT_TIMER_TICK: &str = "timer_tick";
const EVENT_TIMER_EXPIRED: &str = "timer_expired";
const EVENT_BUZZED: &str = "buzzed";
const EVENT_ANSWER_JUDGED: &str = "answer_judged";
const EVENT_ANSWER_REVEALED: &str = "answer_revealed";
const EVENT_SCORES_UPDATED: &str = "scores_updated";
const EVENT_PHASE_CHANGED: &str = "phase_changed";
const EVENT_GAME_OVER: &str = "game_over";

/// Wire name of a game event.
pub fn event_name(event: &GameEvent) -> &'static str {
    match event {
        GameEvent::QuestionChanged { .. } => EVENT_QUESTION_CHANGED,
        GameEvent::TimerTick { .. } => EVENT_TIMER_TICK,
        GameEvent::TimerExpired => EVENT_TIMER_EXPIRED,
        GameEvent::Buzzed { .. } => EVENT_BUZZED,
        GameEvent::AnswerJudged { .. } => EVENT_ANSWER_JUDGED,
        GameEvent::AnswerRevealed { .. } => EVENT_ANSWER_REVEALED,
        GameEvent::ScoresUpdated { .. } => EVENT_SCORES_UPDATED,
        GameEvent::PhaseChanged { .. } => EVENT_PHASE_CHANGED,
        GameEvent::GameOver => EVENT_GAME_OVER,
    }
}

/// Render a published game event for display streams.
pub fn to_server_event(published: &Published) -> Option<ServerEvent> {
    let event = published.event.as_ref();
    let name = event_name(event);
    let rendered = match event {
        GameEvent::QuestionChanged {
            round_index,
            question_index,
            text,
            round_name,
            time_limit,
            points,
        } => encode(
            name,
            &QuestionChangedEvent {
                round_index: *round_index,
                question_index: *question_index,
                text: text.clone(),
                round_name: round_name.clone(),
                time_limit: *time_limit,
                points: *points,
            },
        ),
        GameEvent::TimerTick { remaining } => encode(
            name,
            &TimerTickEvent {
                remaining: *remaining,
            },
        ),
        GameEvent::Buzzed { team_index } => encode(
            name,
            &BuzzedEvent {
                team_index: *team_index,
            },
        ),
        GameEvent::AnswerJudged {
            team_index,
            correct,
        } => encode(
            name,
            &AnswerJudgedEvent {
                team_index: *team_index,
                correct: *correct,
            },
        ),
        GameEvent::AnswerRevealed { answer, correct } => encode(
            name,
            &AnswerRevealedEvent {
                answer: answer.clone(),
                correct: *correct,
            },
        ),
        GameEvent::ScoresUpdated { scores } => encode(
            name,
            &ScoresUpdatedEvent {
                teams: TeamSummary::from_scores(scores),
            },
        ),
        GameEvent::PhaseChanged { phase } => encode(
            name,
            &PhaseChangedEvent {
                phase: (*phase).into(),
            },
        ),
        GameEvent::TimerExpired | GameEvent::GameOver => encode(name, &EmptyEvent {}),
    };

    rendered.map(|event| event.with_id(published.seq))
}

/// Render the session snapshot sent first on every display stream.
pub fn snapshot_event(snapshot: SessionSnapshot, last_seq: u64) -> Option<ServerEvent> {
    let payload = SessionSnapshotResponse::from(snapshot);
    encode(EVENT_SNAPSHOT, &payload).map(|event| event.with_id(last_seq))
}

fn encode(name: &str, payload: &impl Serialize) -> Option<ServerEvent> {
    match ServerEvent::json(Some(name.to_string()), payload) {
        Ok(event) => Some(event),
        Err(err) => {
            warn!(event = name, error = %err, "failed to serialize SSE payload");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::state::{game::ScoreEntry, state_machine::GamePhase};

    fn published(seq: u64, event: GameEvent) -> Published {
        Published {
            seq,
            event: Arc::new(event),
        }
    }

    #[test]
    fn scores_are_numbered_in_registration_order() {
        let event = to_server_event(&published(
            7,
            GameEvent::ScoresUpdated {
                scores: vec![
                    ScoreEntry {
                        name: "A".into(),
                        score: 0,
                    },
                    ScoreEntry {
                        name: "B".into(),
                        score: 10,
                    },
                ],
            },
        ))
        .unwrap();

        assert_eq!(event.id, Some(7));
        assert_eq!(event.event.as_deref(), Some("scores_updated"));
        assert_eq!(
            event.data,
            r#"{"teams":[{"index":0,"name":"A","score":0},{"index":1,"name":"B","score":10}]}"#
        );
    }

    #[test]
    fn phase_and_unit_events_render() {
        let event = to_server_event(&published(
            1,
            GameEvent::PhaseChanged {
                phase: GamePhase::AnswerRevealed,
            },
        ))
        .unwrap();
        assert_eq!(event.data, r#"{"phase":"answer_revealed"}"#);

        let event = to_server_event(&published(2, GameEvent::GameOver)).unwrap();
        assert_eq!(event.event.as_deref(), Some("game_over"));
        assert_eq!(event.data, "{}");
    }
}
