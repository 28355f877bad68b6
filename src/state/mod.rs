/// First-buzz-wins arbitration.
pub mod arbiter;
/// Ordered fan-out of game events to displays.
pub mod broadcaster;
/// Command handling for the single game session.
pub mod controller;
/// Events emitted by the controller.
pub mod events;
/// Immutable quiz content and team records.
pub mod game;
/// Team roster and scores.
pub mod scoreboard;
/// Phase transition table.
pub mod state_machine;
/// Epoch-tagged countdown.
pub mod timer;
/// Command dispatch, event publication and the tick driver.
pub mod transitions;

use std::sync::Arc;

use dashmap::DashSet;
use tokio::{sync::Mutex, task::JoinHandle};
use uuid::Uuid;

use crate::{
    config::AppConfig,
    state::{
        broadcaster::{StateBroadcaster, Subscription},
        controller::{GameController, SessionSnapshot},
        game::QuizContent,
    },
};

/// Application state shared across handlers and background tasks.
pub type SharedState = Arc<AppState>;

/// Controller plus the countdown driver bound to its running epoch.
pub(crate) struct Engine {
    pub(crate) controller: GameController,
    pub(crate) ticker: Option<Ticker>,
}

/// Background task delivering ticks for one countdown epoch.
pub(crate) struct Ticker {
    pub(crate) epoch: u64,
    pub(crate) handle: JoinHandle<()>,
}

/// Central application state: the single game session, its display fan-out and buzzer sockets.
pub struct AppState {
    config: Arc<AppConfig>,
    game: Mutex<Engine>,
    broadcaster: StateBroadcaster,
    buzzers: DashSet<Uuid>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(config: AppConfig, content: Arc<QuizContent>) -> SharedState {
        let controller = GameController::new(content, config.judging);
        Arc::new(Self {
            config: Arc::new(config),
            game: Mutex::new(Engine {
                controller,
                ticker: None,
            }),
            broadcaster: StateBroadcaster::new(),
            buzzers: DashSet::new(),
        })
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Fan-out of game events to displays.
    pub fn broadcaster(&self) -> &StateBroadcaster {
        &self.broadcaster
    }

    /// Identifiers of the buzzer sockets currently connected.
    pub fn buzzers(&self) -> &DashSet<Uuid> {
        &self.buzzers
    }

    /// Full copy of the current session.
    pub async fn snapshot(&self) -> SessionSnapshot {
        self.game.lock().await.controller.snapshot()
    }

    /// Register a display and capture the session it starts from, with the sequence number
    /// of the last event the snapshot already reflects.
    ///
    /// Both happen under the game lock, so the subscription receives exactly the events
    /// published after the snapshot.
    pub async fn subscribe_with_snapshot(&self) -> (SessionSnapshot, u64, Subscription) {
        let engine = self.game.lock().await;
        let snapshot = engine.controller.snapshot();
        let subscription = self.broadcaster.subscribe();
        (snapshot, self.broadcaster.last_seq(), subscription)
    }

    pub(crate) fn engine(&self) -> &Mutex<Engine> {
        &self.game
    }
}
