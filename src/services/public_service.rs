//! Service helpers that expose read-only public projections of the current session.

use crate::{
    dto::public::{GamePhaseResponse, SessionSnapshotResponse, TeamSummary, TeamsResponse},
    state::SharedState,
};

/// Return the registered teams with their scores.
pub async fn get_teams(state: &SharedState) -> TeamsResponse {
    let snapshot = state.snapshot().await;
    TeamsResponse {
        teams: TeamSummary::from_scores(&snapshot.scores),
    }
}

/// Return the current game phase.
pub async fn get_game_phase(state: &SharedState) -> GamePhaseResponse {
    GamePhaseResponse {
        phase: state.snapshot().await.phase.into(),
    }
}

/// Return the full session state.
pub async fn get_session(state: &SharedState) -> SessionSnapshotResponse {
    state.snapshot().await.into()
}
