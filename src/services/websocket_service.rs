use std::time::Instant;

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    dto::ws::{BuzzFeedback, BuzzerInboundMessage},
    state::{
        SharedState,
        controller::{CommandError, GameCommand},
        transitions::{Dispatched, dispatch},
    },
};

/// Internal error type for buzz handling operations.
#[derive(Debug, Error)]
enum BuzzError {
    /// Writer channel closed - connection should be terminated immediately.
    #[error("connection closed")]
    ConnectionClosed,
    /// Frame is not a valid buzzer message.
    #[error("malformed buzzer message: {0}")]
    Malformed(#[from] serde_json::Error),
    /// Frame type is not handled by this adapter.
    #[error("unsupported buzzer message")]
    Unsupported,
}

/// Handle the full lifecycle for an individual buzzer WebSocket connection.
pub async fn handle_socket(state: SharedState, socket: WebSocket) {
    let (mut sender, mut receiver) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Message>();

    // Dedicated writer task keeps outbound messages flowing even while we await inbound frames.
    let writer_task = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            if sender.send(message).await.is_err() {
                break;
            }
        }
    });

    let connection_id = Uuid::new_v4();
    state.buzzers().insert(connection_id);
    info!(id = %connection_id, "buzzer connected");

    while let Some(message) = receiver.next().await {
        match message {
            Ok(Message::Text(text)) => {
                debug!(id = %connection_id, payload = %text, "received buzzer message");
                match handle_frame(&state, &text, &outbound_tx).await {
                    Ok(()) => {}
                    Err(BuzzError::ConnectionClosed) => {
                        info!(id = %connection_id, "connection closed during buzz handling, terminating");
                        break;
                    }
                    Err(err) => warn!(id = %connection_id, error = %err, "ignoring buzzer message"),
                }
            }
            Ok(Message::Ping(payload)) => {
                let _ = outbound_tx.send(Message::Pong(payload));
            }
            Ok(Message::Close(frame)) => {
                info!(id = %connection_id, "buzzer closed");
                let _ = outbound_tx.send(Message::Close(frame));
                break;
            }
            Ok(Message::Binary(_)) => {}
            Ok(Message::Pong(_)) => {}
            Err(err) => {
                warn!(id = %connection_id, error = %err, "websocket error");
                break;
            }
        }
    }

    state.buzzers().remove(&connection_id);
    info!(id = %connection_id, "buzzer disconnected");

    finalize(writer_task, outbound_tx).await;
}

/// Map one text frame onto a buzz command and report the verdict back to the sender.
async fn handle_frame(
    state: &SharedState,
    text: &str,
    outbound_tx: &mpsc::UnboundedSender<Message>,
) -> Result<(), BuzzError> {
    let arrival = Instant::now();
    let BuzzerInboundMessage::Buzz { team } = serde_json::from_str::<BuzzerInboundMessage>(text)? else {
        return Err(BuzzError::Unsupported);
    };

    let accepted = match buzz(state, team, arrival).await {
        Ok(outcome) => outcome.accepted(),
        Err(err) => {
            warn!(team, error = %err, "buzz failed");
            false
        }
    };
    send_message_to_websocket(outbound_tx, &BuzzFeedback { team, accepted })
}

/// Submit a buzz for `team_index`.
///
/// Late, duplicate or out-of-phase buzzes succeed without events; the returned phase is the
/// one this very dispatch left the session in.
pub async fn buzz(
    state: &SharedState,
    team_index: usize,
    at: Instant,
) -> Result<Dispatched, CommandError> {
    let outcome = dispatch(state, GameCommand::Buzz { team_index, at }).await?;
    if !outcome.accepted() {
        debug!(team = team_index, phase = ?outcome.phase, "buzz not accepted");
    }
    Ok(outcome)
}

/// Serialize a payload and push it onto the provided WebSocket sender.
fn send_message_to_websocket<T>(
    tx: &mpsc::UnboundedSender<Message>,
    value: &T,
) -> Result<(), BuzzError>
where
    T: ?Sized + serde::Serialize + std::fmt::Debug,
{
    let payload = match serde_json::to_string(value) {
        Ok(p) => p,
        Err(err) => {
            warn!(error = %err, "failed to serialize message `{value:?}`");
            return Ok(());
        }
    };

    tx.send(Message::Text(payload.into()))
        .map_err(|_| BuzzError::ConnectionClosed)
}

/// Ensure the writer task winds down before we return from the socket handler.
async fn finalize(writer_task: JoinHandle<()>, outbound_tx: mpsc::UnboundedSender<Message>) {
    drop(outbound_tx);
    let _ = writer_task.await;
}
