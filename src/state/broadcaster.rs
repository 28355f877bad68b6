use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::state::events::GameEvent;

/// Event tagged with its position in the global emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    /// Monotonically increasing sequence number, starting at 1.
    pub seq: u64,
    /// Shared event payload.
    pub event: Arc<GameEvent>,
}

type Registry = Arc<DashMap<Uuid, mpsc::UnboundedSender<Published>>>;

/// Fan-out of game events to every connected display.
///
/// Each observer owns an unbounded queue, so a slow reader never holds back publication or
/// the other observers. Observers whose receiving end is gone are pruned on the next publish.
#[derive(Debug, Default)]
pub struct StateBroadcaster {
    observers: Registry,
    last_seq: AtomicU64,
}

/// Receiving side of one observer. Dropping it unregisters the observer.
#[derive(Debug)]
pub struct Subscription {
    id: Uuid,
    receiver: mpsc::UnboundedReceiver<Published>,
    registry: Registry,
}

impl Subscription {
    /// Identifier of the observer.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Wait for the next event; `None` once the broadcaster dropped this observer.
    pub async fn recv(&mut self) -> Option<Published> {
        self.receiver.recv().await
    }

    /// Take the next event if one is already queued.
    pub fn try_recv(&mut self) -> Option<Published> {
        self.receiver.try_recv().ok()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if self.registry.remove(&self.id).is_some() {
            debug!(observer = %self.id, "observer unsubscribed");
        }
    }
}

impl StateBroadcaster {
    /// Create a broadcaster without observers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new observer. It receives every event published from now on.
    pub fn subscribe(&self) -> Subscription {
        let (tx, receiver) = mpsc::unbounded_channel();
        let id = Uuid::new_v4();
        self.observers.insert(id, tx);
        info!(observer = %id, observers = self.observers.len(), "observer subscribed");

        Subscription {
            id,
            receiver,
            registry: Arc::clone(&self.observers),
        }
    }

    /// Remove an observer explicitly. Returns whether it was registered.
    pub fn unsubscribe(&self, id: Uuid) -> bool {
        self.observers.remove(&id).is_some()
    }

    /// Number of registered observers.
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Sequence number of the last published event (0 before the first one).
    pub fn last_seq(&self) -> u64 {
        self.last_seq.load(Ordering::Acquire)
    }

    /// Deliver `event` to every observer and return its sequence number.
    ///
    /// Callers serialize publication (the game lock), which keeps queue order equal to `seq`
    /// order for every observer.
    pub fn publish(&self, event: GameEvent) -> u64 {
        let seq = self.last_seq.fetch_add(1, Ordering::AcqRel) + 1;
        let published = Published {
            seq,
            event: Arc::new(event),
        };

        let dead: Vec<Uuid> = self
            .observers
            .iter()
            .filter(|entry| entry.value().send(published.clone()).is_err())
            .map(|entry| *entry.key())
            .collect();

        for id in dead {
            self.observers.remove(&id);
            debug!(observer = %id, seq, "pruned disconnected observer");
        }

        seq
    }
}
