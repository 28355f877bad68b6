use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI document for the quiz backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::admin::register_teams,
        crate::routes::admin::start_game,
        crate::routes::admin::next_question,
        crate::routes::admin::start_timer,
        crate::routes::admin::pause_timer,
        crate::routes::admin::host_buzz,
        crate::routes::admin::judge,
        crate::routes::admin::reveal,
        crate::routes::admin::adjust_score,
        crate::routes::admin::end_game,
        crate::routes::public::get_session,
        crate::routes::public::get_teams,
        crate::routes::public::get_game_phase,
        crate::routes::sse::display_stream,
        crate::routes::websocket::ws_handler,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::ws::BuzzerInboundMessage,
            crate::dto::ws::BuzzFeedback,
            crate::dto::sse::QuestionChangedEvent,
            crate::dto::sse::TimerTickEvent,
            crate::dto::sse::BuzzedEvent,
            crate::dto::sse::AnswerJudgedEvent,
            crate::dto::sse::AnswerRevealedEvent,
            crate::dto::sse::ScoresUpdatedEvent,
            crate::dto::sse::PhaseChangedEvent,
            crate::dto::sse::EmptyEvent,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "admin", description = "Moderator commands"),
        (name = "public", description = "Read-only session projections"),
        (name = "sse", description = "Server-sent events streams"),
        (name = "buzzers", description = "WebSocket operations for buzzer devices"),
    )
)]
pub struct ApiDoc;
