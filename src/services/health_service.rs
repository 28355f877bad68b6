use crate::{dto::health::HealthResponse, state::SharedState};

/// Report liveness together with the number of connected displays and buzzers.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    HealthResponse::ok(
        state.broadcaster().observer_count(),
        state.buzzers().len(),
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use uuid::Uuid;

    use super::*;
    use crate::{
        config::AppConfig,
        state::{AppState, game::QuizContent},
    };

    #[tokio::test]
    async fn counts_connected_displays_and_buzzers() {
        let state = AppState::new(AppConfig::default(), Arc::new(QuizContent::new(Vec::new())));
        let buzzer = Uuid::new_v4();
        state.buzzers().insert(buzzer);
        state.buzzers().insert(Uuid::new_v4());
        let display = state.broadcaster().subscribe();

        let health = health_status(&state).await;
        assert_eq!(health.displays, 1);
        assert_eq!(health.buzzers, 2);

        drop(display);
        state.buzzers().remove(&buzzer);
        let health = health_status(&state).await;
        assert_eq!(health.displays, 0);
        assert_eq!(health.buzzers, 1);
    }
}
