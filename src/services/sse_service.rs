use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tracing::info;

use crate::{
    dto::sse::ServerEvent,
    services::sse_events,
    state::{SharedState, broadcaster::Subscription, controller::SessionSnapshot},
};

/// Register a display: its stream starts with the session snapshot, then every later event.
pub async fn subscribe_display(
    state: &SharedState,
) -> Sse<impl Stream<Item = Result<Event, Infallible>> + use<>> {
    let (snapshot, last_seq, subscription) = state.subscribe_with_snapshot().await;
    info!(observer = %subscription.id(), last_seq, "display connected");
    to_sse_stream(snapshot, last_seq, subscription)
}

/// Convert a subscription into an SSE response. Dropping the response drops the subscription,
/// which unregisters the display.
fn to_sse_stream(
    snapshot: SessionSnapshot,
    last_seq: u64,
    mut subscription: Subscription,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = async_stream::stream! {
        if let Some(event) = sse_events::snapshot_event(snapshot, last_seq) {
            yield Ok::<_, Infallible>(to_event(event));
        }

        while let Some(published) = subscription.recv().await {
            if let Some(event) = sse_events::to_server_event(&published) {
                yield Ok::<_, Infallible>(to_event(event));
            }
        }

        info!(observer = %subscription.id(), "display stream closed");
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

fn to_event(payload: ServerEvent) -> Event {
    let mut event = Event::default().data(payload.data);
    if let Some(name) = payload.event {
        event = event.event(name);
    }
    if let Some(id) = payload.id {
        event = event.id(id.to_string());
    }
    event
}
