//! Business logic powering the admin REST routes. Every action is a single command
//! dispatched through the game lock; events reach displays before the response returns.

use std::time::Instant;

use tracing::info;

use crate::{
    dto::{
        admin::{
            ActionResponse, JudgeRequest, RegisterTeamsRequest, RegisterTeamsResponse,
            ScoreAdjustmentRequest,
        },
        public::TeamSummary,
    },
    error::ServiceError,
    services::websocket_service,
    state::{
        SharedState,
        controller::GameCommand,
        events::GameEvent,
        transitions::{Dispatched, dispatch},
    },
};

async fn run(
    state: &SharedState,
    command: GameCommand,
    message: &str,
) -> Result<ActionResponse, ServiceError> {
    let Dispatched { phase, .. } = dispatch(state, command).await?;
    Ok(ActionResponse {
        message: message.to_string(),
        phase: phase.into(),
    })
}

/// Replace the team roster. Only allowed in the lobby.
pub async fn register_teams(
    state: &SharedState,
    payload: RegisterTeamsRequest,
) -> Result<RegisterTeamsResponse, ServiceError> {
    let Dispatched { events, .. } =
        dispatch(state, GameCommand::RegisterTeams(payload.names)).await?;
    let teams = events
        .iter()
        .find_map(|event| match event {
            GameEvent::ScoresUpdated { scores } => Some(TeamSummary::from_scores(scores)),
            _ => None,
        })
        .unwrap_or_default();
    Ok(RegisterTeamsResponse { teams })
}

/// Present the first question.
pub async fn start_game(state: &SharedState) -> Result<ActionResponse, ServiceError> {
    run(state, GameCommand::StartGame, "game started").await
}

/// Advance to the next question, or to the final scoreboard once every round is played.
pub async fn next_question(state: &SharedState) -> Result<ActionResponse, ServiceError> {
    run(state, GameCommand::NextQuestion, "question advanced").await
}

/// Start the countdown and open buzzers.
pub async fn start_timer(state: &SharedState) -> Result<ActionResponse, ServiceError> {
    run(state, GameCommand::StartTimer, "timer started").await
}

/// Suspend the countdown and close buzzers.
pub async fn pause_timer(state: &SharedState) -> Result<ActionResponse, ServiceError> {
    run(state, GameCommand::PauseTimer, "timer paused").await
}

/// Record the moderator verdict for the buzzing team.
pub async fn judge(state: &SharedState, payload: JudgeRequest) -> Result<ActionResponse, ServiceError> {
    let message = if payload.correct {
        "answer accepted"
    } else {
        "answer rejected"
    };
    run(
        state,
        GameCommand::Judge {
            correct: payload.correct,
        },
        message,
    )
    .await
}

/// Reveal the answer after a timeout.
pub async fn reveal(state: &SharedState) -> Result<ActionResponse, ServiceError> {
    run(state, GameCommand::Reveal, "answer revealed").await
}

/// Manually correct a team's score.
pub async fn adjust_score(
    state: &SharedState,
    payload: ScoreAdjustmentRequest,
) -> Result<ActionResponse, ServiceError> {
    info!(team = payload.team_index, delta = payload.delta, "manual score adjustment");
    run(
        state,
        GameCommand::AdjustScore {
            team_index: payload.team_index,
            delta: payload.delta,
        },
        "score adjusted",
    )
    .await
}

/// Buzz on behalf of a team, from the moderator console.
pub async fn host_buzz(state: &SharedState, team_index: usize) -> Result<ActionResponse, ServiceError> {
    let outcome = websocket_service::buzz(state, team_index, Instant::now()).await?;
    Ok(ActionResponse {
        message: if outcome.accepted() {
            "buzz accepted".into()
        } else {
            "buzz ignored".into()
        },
        phase: outcome.phase.into(),
    })
}

/// Leave the final scoreboard and go back to the lobby, keeping the teams.
pub async fn end_game(state: &SharedState) -> Result<ActionResponse, ServiceError> {
    run(state, GameCommand::EndGame, "back to lobby").await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig,
        dto::phase::VisibleGamePhase,
        state::{
            AppState,
            game::{Question, QuizContent, Round},
        },
    };

    fn app_state() -> SharedState {
        let rounds = ["Round 1", "Round 2"]
            .into_iter()
            .map(|name| Round {
                name: name.into(),
                time_limit_seconds: 5,
                points: 10,
                questions: vec![Question {
                    text: format!("{name} question"),
                    answer: format!("{name} answer"),
                }],
            })
            .collect();
        AppState::new(AppConfig::default(), Arc::new(QuizContent::new(rounds)))
    }

    #[tokio::test]
    async fn moderator_flow_through_services() {
        let state = app_state();
        let teams = register_teams(
            &state,
            RegisterTeamsRequest {
                names: vec!["A".into(), " ".into(), "B".into()],
            },
        )
        .await
        .unwrap();
        assert_eq!(
            teams.teams.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
            vec!["A", "B"]
        );

        assert_eq!(start_game(&state).await.unwrap().phase, VisibleGamePhase::Reading);
        assert_eq!(start_timer(&state).await.unwrap().phase, VisibleGamePhase::Listening);
        let accepted = host_buzz(&state, 1).await.unwrap();
        assert_eq!(accepted.message, "buzz accepted");
        assert_eq!(accepted.phase, VisibleGamePhase::Buzzed);
        let ignored = host_buzz(&state, 0).await.unwrap();
        assert_eq!(ignored.message, "buzz ignored");
        assert_eq!(ignored.phase, VisibleGamePhase::Buzzed);

        let response = judge(&state, JudgeRequest { correct: true }).await.unwrap();
        assert_eq!(response.phase, VisibleGamePhase::AnswerRevealed);
        assert_eq!(state.snapshot().await.scores[1].score, 10);

        next_question(&state).await.unwrap();
        assert_eq!(next_question(&state).await.unwrap().phase, VisibleGamePhase::GameOver);
        assert_eq!(end_game(&state).await.unwrap().phase, VisibleGamePhase::Idle);
    }

    #[tokio::test]
    async fn host_buzz_reports_the_phase_of_its_own_dispatch() {
        let state = app_state();
        let response = host_buzz(&state, 0).await.unwrap();
        assert_eq!(response.message, "buzz ignored");
        assert_eq!(response.phase, VisibleGamePhase::Idle);

        let teams = register_teams(
            &state,
            RegisterTeamsRequest {
                names: vec!["A".into()],
            },
        )
        .await
        .unwrap();
        assert_eq!(teams.teams.len(), 1);
        assert_eq!(teams.teams[0].score, 0);
        start_game(&state).await.unwrap();

        let response = host_buzz(&state, 0).await.unwrap();
        assert_eq!(response.message, "buzz ignored");
        assert_eq!(response.phase, VisibleGamePhase::Reading);
    }

    #[tokio::test]
    async fn errors_map_to_service_errors() {
        let state = app_state();
        assert!(matches!(
            reveal(&state).await,
            Err(ServiceError::InvalidState(_))
        ));
        assert!(matches!(
            register_teams(&state, RegisterTeamsRequest { names: vec!["".into()] }).await,
            Err(ServiceError::InvalidInput(_))
        ));
        assert!(matches!(
            adjust_score(
                &state,
                ScoreAdjustmentRequest {
                    team_index: 3,
                    delta: 1
                }
            )
            .await,
            Err(ServiceError::NotFound(_))
        ));
    }
}
