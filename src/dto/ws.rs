use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, Serialize, ToSchema, PartialEq, Eq)]
/// Messages accepted from buzzer WebSocket clients.
#[serde(tag = "type")]
pub enum BuzzerInboundMessage {
    #[serde(rename = "buzz")]
    Buzz { team: usize },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
/// Feedback sent to a buzzer after it triggers a buzz event.
pub struct BuzzFeedback {
    pub team: usize,
    /// Whether this buzz won the question.
    pub accepted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_buzz_frames_and_tolerates_unknown_types() {
        let message: BuzzerInboundMessage =
            serde_json::from_str(r#"{"type":"buzz","team":2}"#).unwrap();
        assert_eq!(message, BuzzerInboundMessage::Buzz { team: 2 });

        let message: BuzzerInboundMessage = serde_json::from_str(r#"{"type":"ping"}"#).unwrap();
        assert_eq!(message, BuzzerInboundMessage::Unknown);

        assert!(serde_json::from_str::<BuzzerInboundMessage>(r#"{"type":"buzz"}"#).is_err());
    }
}
