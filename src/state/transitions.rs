use std::time::Duration;

use futures::future::BoxFuture;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, warn};

use crate::state::{
    Engine, SharedState, Ticker,
    controller::{CommandError, GameCommand},
    events::GameEvent,
    state_machine::GamePhase,
};

/// Outcome of a command that went through the game lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatched {
    /// Phase once the command has been applied.
    pub phase: GamePhase,
    /// Events published for this command, in order.
    pub events: Vec<GameEvent>,
}

impl Dispatched {
    /// Whether the command changed anything. Ignored buzzes and stale ticks did not.
    pub fn accepted(&self) -> bool {
        !self.events.is_empty()
    }
}

/// Apply `command` to the session, publish its events and keep the countdown driver in sync.
///
/// Everything happens under the game lock: the global event order equals the command order.
pub async fn dispatch(state: &SharedState, command: GameCommand) -> Result<Dispatched, CommandError> {
    let mut engine = state.engine().lock().await;
    let kind = command.kind();

    let events = match engine.controller.handle(command) {
        Ok(events) => events,
        Err(err) => {
            warn!(command = kind, phase = ?engine.controller.phase(), error = %err, "command rejected");
            return Err(err);
        }
    };

    for event in &events {
        let seq = state.broadcaster().publish(event.clone());
        debug!(command = kind, seq, "event published");
    }

    sync_ticker(state, &mut engine);

    Ok(Dispatched {
        phase: engine.controller.phase(),
        events,
    })
}

/// Start, keep or abort the tick driver so it matches the countdown's running epoch.
fn sync_ticker(state: &SharedState, engine: &mut Engine) {
    let running = engine.controller.timer().running_epoch();
    let current = engine.ticker.as_ref().map(|ticker| ticker.epoch);
    if current.is_some() && current == running {
        return;
    }

    if let Some(ticker) = engine.ticker.take() {
        ticker.handle.abort();
        debug!(epoch = ticker.epoch, "tick driver stopped");
    }

    if let Some(epoch) = running {
        let period = state.config().tick_interval;
        let handle = tokio::spawn(run_ticker(state.clone(), epoch, period));
        engine.ticker = Some(Ticker { epoch, handle });
        debug!(epoch, ?period, "tick driver started");
    }
}

/// Deliver one tick per `period` until the countdown of `epoch` stops.
fn run_ticker(state: SharedState, epoch: u64, period: Duration) -> BoxFuture<'static, ()> {
    Box::pin(async move {
        let mut interval = time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            match dispatch(&state, GameCommand::Tick { epoch }).await {
                // Stale epoch: the countdown was stopped or restarted.
                Ok(outcome) if !outcome.accepted() => break,
                Ok(outcome) if outcome.phase != GamePhase::Listening => break,
                Ok(_) => {}
                Err(err) => {
                    warn!(epoch, error = %err, "tick driver aborted");
                    break;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig,
        state::{
            AppState,
            game::{Question, QuizContent, Round},
        },
    };

    fn app_state(time_limit_seconds: u32) -> SharedState {
        let content = QuizContent::new(vec![Round {
            name: "Warmup".into(),
            time_limit_seconds,
            points: 10,
            questions: vec![
                Question {
                    text: "q1".into(),
                    answer: "a1".into(),
                },
                Question {
                    text: "q2".into(),
                    answer: "a2".into(),
                },
            ],
        }]);
        AppState::new(AppConfig::default(), Arc::new(content))
    }

    async fn listening(state: &SharedState) {
        dispatch(state, GameCommand::RegisterTeams(vec!["A".into(), "B".into()]))
            .await
            .unwrap();
        dispatch(state, GameCommand::StartGame).await.unwrap();
        dispatch(state, GameCommand::StartTimer).await.unwrap();
    }

    async fn ticker_is_idle(state: &SharedState) -> bool {
        state.engine().lock().await.ticker.is_none()
    }

    #[tokio::test(start_paused = true)]
    async fn countdown_ticks_every_second_until_expiry() {
        let state = app_state(3);
        listening(&state).await;
        let mut display = state.broadcaster().subscribe();

        time::sleep(Duration::from_millis(3500)).await;

        let received: Vec<_> = std::iter::from_fn(|| display.try_recv())
            .map(|published| (*published.event).clone())
            .collect();
        assert_eq!(
            received,
            vec![
                GameEvent::TimerTick { remaining: 2 },
                GameEvent::TimerTick { remaining: 1 },
                GameEvent::TimerTick { remaining: 0 },
                GameEvent::TimerExpired,
                GameEvent::PhaseChanged {
                    phase: GamePhase::Timeout
                },
            ]
        );
        assert!(ticker_is_idle(&state).await);

        time::sleep(Duration::from_secs(5)).await;
        assert!(display.try_recv().is_none(), "no tick after expiry");
    }

    #[tokio::test(start_paused = true)]
    async fn buzz_stops_the_countdown() {
        let state = app_state(5);
        listening(&state).await;

        time::sleep(Duration::from_millis(2500)).await;
        let outcome = dispatch(
            &state,
            GameCommand::Buzz {
                team_index: 1,
                at: std::time::Instant::now(),
            },
        )
        .await
        .unwrap();
        assert_eq!(outcome.phase, GamePhase::Buzzed);
        assert!(ticker_is_idle(&state).await);

        let mut display = state.broadcaster().subscribe();
        time::sleep(Duration::from_secs(10)).await;
        assert!(display.try_recv().is_none());
        assert_eq!(state.snapshot().await.timer_remaining, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn pause_and_resume_keep_remaining_time() {
        let state = app_state(10);
        listening(&state).await;

        time::sleep(Duration::from_millis(2500)).await;
        dispatch(&state, GameCommand::PauseTimer).await.unwrap();
        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(state.snapshot().await.timer_remaining, 8);

        dispatch(&state, GameCommand::StartTimer).await.unwrap();
        time::sleep(Duration::from_millis(1500)).await;
        let snapshot = state.snapshot().await;
        assert_eq!(snapshot.timer_remaining, 7);
        assert!(snapshot.timer_running);
    }

    #[tokio::test]
    async fn rejected_command_publishes_nothing() {
        let state = app_state(5);
        let mut display = state.broadcaster().subscribe();

        let err = dispatch(&state, GameCommand::Reveal).await.unwrap_err();
        assert!(matches!(err, CommandError::IllegalTransition(_)));
        assert!(display.try_recv().is_none());
        assert_eq!(state.broadcaster().last_seq(), 0);
    }

    #[tokio::test]
    async fn snapshot_subscription_has_no_gap() {
        let state = app_state(5);
        dispatch(&state, GameCommand::RegisterTeams(vec!["A".into()]))
            .await
            .unwrap();

        let (snapshot, last_seq, mut display) = state.subscribe_with_snapshot().await;
        assert_eq!(snapshot.phase, GamePhase::Idle);
        assert_eq!(last_seq, 1);
        assert_eq!(snapshot.scores.len(), 1);

        dispatch(&state, GameCommand::StartGame).await.unwrap();
        let first = display.try_recv().unwrap();
        assert_eq!(first.seq, 2);
        assert!(matches!(*first.event, GameEvent::ScoresUpdated { .. }));
        let second = display.try_recv().unwrap();
        assert_eq!(second.seq, 3);
        assert!(matches!(*second.event, GameEvent::QuestionChanged { .. }));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_buzzes_publish_a_single_winner() {
        let state = app_state(30);
        let teams: Vec<String> = (0..8).map(|i| format!("Team {i}")).collect();
        dispatch(&state, GameCommand::RegisterTeams(teams)).await.unwrap();
        dispatch(&state, GameCommand::StartGame).await.unwrap();
        dispatch(&state, GameCommand::StartTimer).await.unwrap();
        let mut display = state.broadcaster().subscribe();

        let barrier = Arc::new(tokio::sync::Barrier::new(8));
        let tasks: Vec<_> = (0..8)
            .map(|team_index| {
                let state = state.clone();
                let barrier = barrier.clone();
                tokio::spawn(async move {
                    barrier.wait().await;
                    dispatch(
                        &state,
                        GameCommand::Buzz {
                            team_index,
                            at: std::time::Instant::now(),
                        },
                    )
                    .await
                    .unwrap()
                })
            })
            .collect();

        let mut accepted = Vec::new();
        for (team_index, task) in tasks.into_iter().enumerate() {
            if task.await.unwrap().accepted() {
                accepted.push(team_index);
            }
        }
        assert_eq!(accepted.len(), 1);

        let buzzed: Vec<usize> = std::iter::from_fn(|| display.try_recv())
            .filter_map(|published| match *published.event {
                GameEvent::Buzzed { team_index } => Some(team_index),
                _ => None,
            })
            .collect();
        assert_eq!(buzzed, accepted);

        let snapshot = state.snapshot().await;
        assert_eq!(snapshot.phase, GamePhase::Buzzed);
        assert_eq!(snapshot.buzz_winner, accepted.first().copied());
    }
}
