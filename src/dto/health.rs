use std::time::SystemTime;

use serde::Serialize;
use utoipa::ToSchema;

use crate::dto::format_system_time;

/// Simple health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status, always "ok" while the server answers.
    pub status: String,
    /// Connected display streams.
    pub displays: usize,
    /// Connected buzzer sockets.
    pub buzzers: usize,
    /// Server clock (RFC 3339).
    pub server_time: String,
}

impl HealthResponse {
    /// Create a health response indicating the system is operational.
    pub fn ok(displays: usize, buzzers: usize) -> Self {
        Self {
            status: "ok".to_string(),
            displays,
            buzzers,
            server_time: format_system_time(SystemTime::now()),
        }
    }
}
