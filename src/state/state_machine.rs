use thiserror::Error;

/// Phases a quiz session goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GamePhase {
    /// Teams are being registered; no question is on screen.
    Idle,
    /// A question is displayed and the moderator reads it out.
    Reading,
    /// Countdown running, buzzers open.
    Listening,
    /// A team buzzed in and awaits the moderator's judgement.
    Buzzed,
    /// The answer is on screen.
    AnswerRevealed,
    /// Countdown reached zero without any buzz.
    Timeout,
    /// Every round has been played.
    GameOver,
}

/// Phase-level triggers applied to the state machine.
///
/// Data guards (loaded rounds, remaining time, arbiter verdict) are checked by the
/// controller; this table only knows which trigger is legal from which phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Team roster replaced.
    RegisterTeams,
    /// First question presented.
    StartGame,
    /// Moderator advances; `exhausted` is set when no question is left.
    NextQuestion {
        /// Whether the question pointer ran past the last round.
        exhausted: bool,
    },
    /// Countdown started and buzzers opened.
    StartTimer,
    /// Countdown suspended without a buzz.
    PauseTimer,
    /// Arbiter accepted a buzz.
    Buzz,
    /// Countdown reached zero.
    TimerExpired,
    /// Moderator judged the buzzing team; `reopen` sends the question back to reading.
    Judge {
        /// Whether buzzing reopens for the remaining teams instead of revealing.
        reopen: bool,
    },
    /// Answer revealed after a timeout.
    Reveal,
    /// Manual score correction.
    AdjustScore,
    /// Leave the final scoreboard and return to the lobby.
    EndGame,
}

/// Error returned when a command is not allowed in the current phase or fails its guard.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("illegal transition: {trigger:?} cannot be applied while in {from:?}{}", guard_suffix(.guard))]
pub struct IllegalTransition {
    /// The phase the state machine was in when the trigger was received.
    pub from: GamePhase,
    /// The rejected trigger.
    pub trigger: Trigger,
    /// Guard that failed, when the phase itself allowed the trigger.
    pub guard: Option<&'static str>,
}

impl IllegalTransition {
    /// Build the error for a trigger whose phase was legal but whose guard failed.
    pub fn guard(from: GamePhase, trigger: Trigger, guard: &'static str) -> Self {
        Self {
            from,
            trigger,
            guard: Some(guard),
        }
    }
}

fn guard_suffix(guard: &Option<&'static str>) -> String {
    guard.map(|g| format!(" ({g})")).unwrap_or_default()
}

/// Error raised when a plan no longer matches the state machine it was computed on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("stale transition plan (expected version {expected}, state machine at {actual})")]
pub struct StalePlan {
    /// Version the plan was computed against.
    pub expected: usize,
    /// Version of the state machine when applying.
    pub actual: usize,
}

/// A validated transition that has not been applied yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Plan {
    /// Phase the state machine is currently in.
    pub from: GamePhase,
    /// Phase the state machine will transition to.
    pub to: GamePhase,
    /// Trigger that produced this plan.
    pub trigger: Trigger,
    /// Version the state machine had when the plan was computed.
    pub version: usize,
}

/// Snapshot of the current state machine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    /// Current phase of the state machine.
    pub phase: GamePhase,
    /// Number of transitions applied so far.
    pub version: usize,
}

/// Transition table of the quiz flow.
///
/// `plan` never mutates, so a caller can validate a command, apply its side effects, and
/// only then commit the phase with `apply`.
#[derive(Debug, Clone)]
pub struct GameStateMachine {
    phase: GamePhase,
    version: usize,
}

impl Default for GameStateMachine {
    fn default() -> Self {
        Self {
            phase: GamePhase::Idle,
            version: 0,
        }
    }
}

impl GameStateMachine {
    /// Create a new state machine initialised in the idle state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inspect the current phase.
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Create a snapshot of the current state machine state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.phase,
            version: self.version,
        }
    }

    /// Validate that `trigger` can be applied from the current phase.
    pub fn plan(&self, trigger: Trigger) -> Result<Plan, IllegalTransition> {
        let to = compute_transition(self.phase, trigger)?;
        Ok(Plan {
            from: self.phase,
            to,
            trigger,
            version: self.version,
        })
    }

    /// Commit a plan computed on the current version, returning the new phase.
    pub fn apply(&mut self, plan: Plan) -> Result<GamePhase, StalePlan> {
        if plan.version != self.version || plan.from != self.phase {
            return Err(StalePlan {
                expected: plan.version,
                actual: self.version,
            });
        }

        self.phase = plan.to;
        self.version += 1;
        Ok(self.phase)
    }
}

/// Compute the phase reached by applying `trigger` from `from`.
fn compute_transition(from: GamePhase, trigger: Trigger) -> Result<GamePhase, IllegalTransition> {
    use GamePhase::*;

    let next = match (from, trigger) {
        (Idle, Trigger::RegisterTeams) => Idle,
        (Idle, Trigger::StartGame) => Reading,
        (Reading | AnswerRevealed | Timeout, Trigger::NextQuestion { exhausted: false }) => {
            Reading
        }
        (Reading | AnswerRevealed | Timeout, Trigger::NextQuestion { exhausted: true }) => {
            GameOver
        }
        (Reading, Trigger::StartTimer) => Listening,
        (Listening, Trigger::PauseTimer) => Reading,
        (Listening, Trigger::Buzz) => Buzzed,
        (Listening, Trigger::TimerExpired) => Timeout,
        (Buzzed, Trigger::Judge { reopen: false }) => AnswerRevealed,
        (Buzzed, Trigger::Judge { reopen: true }) => Reading,
        (Timeout, Trigger::Reveal) => AnswerRevealed,
        (phase, Trigger::AdjustScore) => phase,
        (GameOver, Trigger::EndGame) => Idle,
        (from, trigger) => {
            return Err(IllegalTransition {
                from,
                trigger,
                guard: None,
            });
        }
    };

    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(sm: &mut GameStateMachine, trigger: Trigger) -> GamePhase {
        let plan = sm.plan(trigger).unwrap();
        sm.apply(plan).unwrap()
    }

    #[test]
    fn initial_state_is_idle() {
        let sm = GameStateMachine::new();
        assert_eq!(sm.phase(), GamePhase::Idle);
        assert_eq!(sm.snapshot().version, 0);
    }

    #[test]
    fn full_happy_path_through_game() {
        let mut sm = GameStateMachine::new();

        assert_eq!(apply(&mut sm, Trigger::RegisterTeams), GamePhase::Idle);
        assert_eq!(apply(&mut sm, Trigger::StartGame), GamePhase::Reading);
        assert_eq!(apply(&mut sm, Trigger::StartTimer), GamePhase::Listening);
        assert_eq!(apply(&mut sm, Trigger::Buzz), GamePhase::Buzzed);
        assert_eq!(
            apply(&mut sm, Trigger::Judge { reopen: false }),
            GamePhase::AnswerRevealed
        );
        assert_eq!(
            apply(&mut sm, Trigger::NextQuestion { exhausted: false }),
            GamePhase::Reading
        );
        assert_eq!(apply(&mut sm, Trigger::StartTimer), GamePhase::Listening);
        assert_eq!(apply(&mut sm, Trigger::TimerExpired), GamePhase::Timeout);
        assert_eq!(apply(&mut sm, Trigger::Reveal), GamePhase::AnswerRevealed);
        assert_eq!(
            apply(&mut sm, Trigger::NextQuestion { exhausted: true }),
            GamePhase::GameOver
        );
        assert_eq!(apply(&mut sm, Trigger::EndGame), GamePhase::Idle);
        assert_eq!(sm.snapshot().version, 11);
    }

    #[test]
    fn reopen_after_wrong_answer_returns_to_reading() {
        let mut sm = GameStateMachine::new();
        apply(&mut sm, Trigger::StartGame);
        apply(&mut sm, Trigger::StartTimer);
        apply(&mut sm, Trigger::Buzz);

        assert_eq!(
            apply(&mut sm, Trigger::Judge { reopen: true }),
            GamePhase::Reading
        );
    }

    #[test]
    fn pause_returns_to_reading() {
        let mut sm = GameStateMachine::new();
        apply(&mut sm, Trigger::StartGame);
        apply(&mut sm, Trigger::StartTimer);
        assert_eq!(apply(&mut sm, Trigger::PauseTimer), GamePhase::Reading);
    }

    #[test]
    fn adjust_score_keeps_phase() {
        let mut sm = GameStateMachine::new();
        assert_eq!(apply(&mut sm, Trigger::AdjustScore), GamePhase::Idle);
        apply(&mut sm, Trigger::StartGame);
        assert_eq!(apply(&mut sm, Trigger::AdjustScore), GamePhase::Reading);
    }

    #[test]
    fn invalid_transition_returns_error() {
        let sm = GameStateMachine::new();
        let err = sm.plan(Trigger::Reveal).unwrap_err();
        assert_eq!(err.from, GamePhase::Idle);
        assert_eq!(err.trigger, Trigger::Reveal);
        assert_eq!(err.guard, None);
    }

    #[test]
    fn listening_rejects_advancing_and_judging() {
        let mut sm = GameStateMachine::new();
        apply(&mut sm, Trigger::StartGame);
        apply(&mut sm, Trigger::StartTimer);

        assert!(sm.plan(Trigger::NextQuestion { exhausted: false }).is_err());
        assert!(sm.plan(Trigger::Judge { reopen: false }).is_err());
        assert!(sm.plan(Trigger::Reveal).is_err());
        assert!(sm.plan(Trigger::StartTimer).is_err());
    }

    #[test]
    fn game_over_never_reenters_reading() {
        let mut sm = GameStateMachine::new();
        apply(&mut sm, Trigger::StartGame);
        apply(&mut sm, Trigger::NextQuestion { exhausted: true });

        assert!(sm.plan(Trigger::NextQuestion { exhausted: true }).is_err());
        assert!(sm.plan(Trigger::NextQuestion { exhausted: false }).is_err());
        assert!(sm.plan(Trigger::StartGame).is_err());
    }

    #[test]
    fn stale_plan_is_rejected() {
        let mut sm = GameStateMachine::new();
        let plan = sm.plan(Trigger::StartGame).unwrap();
        apply(&mut sm, Trigger::RegisterTeams);

        let err = sm.apply(plan).unwrap_err();
        assert_eq!(err, StalePlan { expected: 0, actual: 1 });
        assert_eq!(sm.phase(), GamePhase::Idle);
    }

    #[test]
    fn guard_error_mentions_guard() {
        let err = IllegalTransition::guard(GamePhase::Reading, Trigger::StartTimer, "no time left");
        assert!(err.to_string().contains("no time left"));
    }
}
