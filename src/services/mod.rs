/// Admin service driving the quiz flow.
pub mod admin_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Public service for read-only session information.
pub mod public_service;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events display streams.
pub mod sse_service;
/// WebSocket buzzer input adapter.
pub mod websocket_service;
