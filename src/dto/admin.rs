//! DTO definitions used by the admin REST API and documentation layer.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::dto::{phase::VisibleGamePhase, public::TeamSummary};

/// Replace the registered teams. Blank names are skipped.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct RegisterTeamsRequest {
    #[validate(length(min = 1, message = "at least one team name is required"))]
    pub names: Vec<String>,
}

/// Request to validate or reject the answer of the buzzing team.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct JudgeRequest {
    pub correct: bool,
}

/// Request to adjust a team's score by a delta.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ScoreAdjustmentRequest {
    pub team_index: usize,
    #[validate(range(min = -10000, max = 10000))]
    pub delta: i32,
}

/// Buzz on behalf of a team (moderator console fallback for missing buzzers).
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct BuzzRequest {
    pub team_index: usize,
}

/// Generic action acknowledgement used by admin endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct ActionResponse {
    pub message: String,
    /// Phase after the action was applied.
    pub phase: VisibleGamePhase,
}

/// Roster returned after a team registration.
#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterTeamsResponse {
    pub teams: Vec<TeamSummary>,
}
