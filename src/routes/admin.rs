use axum::{Json, Router, extract::State, routing::post};
use axum_valid::Valid;

use crate::{
    dto::admin::{
        ActionResponse, BuzzRequest, JudgeRequest, RegisterTeamsRequest, RegisterTeamsResponse,
        ScoreAdjustmentRequest,
    },
    error::AppError,
    services::admin_service,
    state::SharedState,
};

/// Moderator endpoints driving the quiz.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/admin/teams", post(register_teams))
        .route("/admin/game/start", post(start_game))
        .route("/admin/game/next", post(next_question))
        .route("/admin/game/timer/start", post(start_timer))
        .route("/admin/game/timer/pause", post(pause_timer))
        .route("/admin/game/buzz", post(host_buzz))
        .route("/admin/game/judge", post(judge))
        .route("/admin/game/reveal", post(reveal))
        .route("/admin/game/score", post(adjust_score))
        .route("/admin/game/end", post(end_game))
}

/// Replace the team roster (lobby only).
#[utoipa::path(
    post,
    path = "/admin/teams",
    tag = "admin",
    request_body = RegisterTeamsRequest,
    responses(
        (status = 200, description = "Teams registered", body = RegisterTeamsResponse),
        (status = 400, description = "No usable team name"),
        (status = 409, description = "A game is running")
    )
)]
pub async fn register_teams(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<RegisterTeamsRequest>>,
) -> Result<Json<RegisterTeamsResponse>, AppError> {
    Ok(Json(admin_service::register_teams(&state, payload).await?))
}

/// Present the first question.
#[utoipa::path(
    post,
    path = "/admin/game/start",
    tag = "admin",
    responses(
        (status = 200, description = "Game started", body = ActionResponse),
        (status = 409, description = "No teams, no content or game already running")
    )
)]
pub async fn start_game(State(state): State<SharedState>) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(admin_service::start_game(&state).await?))
}

/// Advance to the next question or to the final scoreboard.
#[utoipa::path(
    post,
    path = "/admin/game/next",
    tag = "admin",
    responses((status = 200, description = "Question advanced", body = ActionResponse))
)]
pub async fn next_question(
    State(state): State<SharedState>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(admin_service::next_question(&state).await?))
}

/// Start the countdown and open buzzers.
#[utoipa::path(
    post,
    path = "/admin/game/timer/start",
    tag = "admin",
    responses((status = 200, description = "Timer started", body = ActionResponse))
)]
pub async fn start_timer(
    State(state): State<SharedState>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(admin_service::start_timer(&state).await?))
}

/// Suspend the countdown and close buzzers.
#[utoipa::path(
    post,
    path = "/admin/game/timer/pause",
    tag = "admin",
    responses((status = 200, description = "Timer paused", body = ActionResponse))
)]
pub async fn pause_timer(
    State(state): State<SharedState>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(admin_service::pause_timer(&state).await?))
}

/// Buzz on behalf of a team.
#[utoipa::path(
    post,
    path = "/admin/game/buzz",
    tag = "admin",
    request_body = BuzzRequest,
    responses((status = 200, description = "Buzz submitted", body = ActionResponse))
)]
pub async fn host_buzz(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<BuzzRequest>>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(admin_service::host_buzz(&state, payload.team_index).await?))
}

/// Judge the answer of the buzzing team.
#[utoipa::path(
    post,
    path = "/admin/game/judge",
    tag = "admin",
    request_body = JudgeRequest,
    responses((status = 200, description = "Answer judged", body = ActionResponse))
)]
pub async fn judge(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<JudgeRequest>>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(admin_service::judge(&state, payload).await?))
}

/// Reveal the answer after a timeout.
#[utoipa::path(
    post,
    path = "/admin/game/reveal",
    tag = "admin",
    responses((status = 200, description = "Answer revealed", body = ActionResponse))
)]
pub async fn reveal(State(state): State<SharedState>) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(admin_service::reveal(&state).await?))
}

/// Manually correct a team's score.
#[utoipa::path(
    post,
    path = "/admin/game/score",
    tag = "admin",
    request_body = ScoreAdjustmentRequest,
    responses(
        (status = 200, description = "Score adjusted", body = ActionResponse),
        (status = 404, description = "Unknown team")
    )
)]
pub async fn adjust_score(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<ScoreAdjustmentRequest>>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(admin_service::adjust_score(&state, payload).await?))
}

/// Leave the final scoreboard and return to the lobby.
#[utoipa::path(
    post,
    path = "/admin/game/end",
    tag = "admin",
    responses((status = 200, description = "Back to lobby", body = ActionResponse))
)]
pub async fn end_game(State(state): State<SharedState>) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(admin_service::end_game(&state).await?))
}
