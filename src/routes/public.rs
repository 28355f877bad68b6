use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::public::{GamePhaseResponse, SessionSnapshotResponse, TeamsResponse},
    services::public_service,
    state::SharedState,
};

/// Public read-only endpoints that expose the current session.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/public/session", get(get_session))
        .route("/public/teams", get(get_teams))
        .route("/public/phase", get(get_game_phase))
}

#[utoipa::path(
    get,
    path = "/public/session",
    tag = "public",
    responses((status = 200, description = "Full session state", body = SessionSnapshotResponse))
)]
/// Return the whole session as a display would render it.
pub async fn get_session(State(state): State<SharedState>) -> Json<SessionSnapshotResponse> {
    Json(public_service::get_session(&state).await)
}

#[utoipa::path(
    get,
    path = "/public/teams",
    tag = "public",
    responses((status = 200, description = "Current teams", body = TeamsResponse))
)]
/// Return the registered teams and their scores.
pub async fn get_teams(State(state): State<SharedState>) -> Json<TeamsResponse> {
    Json(public_service::get_teams(&state).await)
}

#[utoipa::path(
    get,
    path = "/public/phase",
    tag = "public",
    responses((status = 200, description = "Current game phase", body = GamePhaseResponse))
)]
/// Return the phase the game is currently in.
pub async fn get_game_phase(State(state): State<SharedState>) -> Json<GamePhaseResponse> {
    Json(public_service::get_game_phase(&state).await)
}
