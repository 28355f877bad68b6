//! The game controller owns the quiz session and is its only mutator. Every command is
//! validated against the phase table and its guards before any component is touched, so a
//! rejected command leaves the session exactly as it was.

use std::{collections::BTreeSet, sync::Arc, time::Instant};

use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::state::{
    arbiter::BuzzerArbiter,
    events::GameEvent,
    game::{Question, QuizContent, Round, ScoreEntry},
    scoreboard::{Scoreboard, SetupError},
    state_machine::{GamePhase, GameStateMachine, IllegalTransition, Plan, StalePlan, Trigger},
    timer::{CountdownTimer, Tick},
};

/// What happens to a question after a wrong answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WrongAnswerPolicy {
    /// Reveal the answer immediately.
    #[default]
    Reveal,
    /// Send the question back to reading so the moderator can reopen buzzers for other teams.
    Reopen,
}

/// Judging rules selected in the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JudgingPolicy {
    /// Behaviour after a wrong answer.
    pub wrong_answer: WrongAnswerPolicy,
    /// Whether a team judged wrong may buzz again on the same question.
    pub allow_rebuzz_after_wrong: bool,
}

/// Commands accepted by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameCommand {
    /// Replace the roster with these names.
    RegisterTeams(Vec<String>),
    /// Present the first question.
    StartGame,
    /// Advance to the next question, or finish the game.
    NextQuestion,
    /// Start the countdown and open the buzzers.
    StartTimer,
    /// Suspend the countdown and close the buzzers.
    PauseTimer,
    /// A team pressed its buzzer.
    Buzz {
        /// Buzzing team.
        team_index: usize,
        /// When the signal arrived.
        at: Instant,
    },
    /// Countdown tick scheduled for the given epoch.
    Tick {
        /// Epoch of the countdown that scheduled the tick.
        epoch: u64,
    },
    /// Moderator verdict on the buzzing team.
    Judge {
        /// Whether the answer was right.
        correct: bool,
    },
    /// Show the answer after a timeout.
    Reveal,
    /// Manual score correction.
    AdjustScore {
        /// Team to correct.
        team_index: usize,
        /// Points to add (negative to remove).
        delta: i32,
    },
    /// Leave the final scoreboard and go back to the lobby.
    EndGame,
}

impl GameCommand {
    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RegisterTeams(_) => "register_teams",
            Self::StartGame => "start_game",
            Self::NextQuestion => "next_question",
            Self::StartTimer => "start_timer",
            Self::PauseTimer => "pause_timer",
            Self::Buzz { .. } => "buzz",
            Self::Tick { .. } => "tick",
            Self::Judge { .. } => "judge",
            Self::Reveal => "reveal",
            Self::AdjustScore { .. } => "adjust_score",
            Self::EndGame => "end_game",
        }
    }
}

/// Errors reported to the command issuer. The session is unchanged whenever one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// No usable team name.
    #[error(transparent)]
    Setup(#[from] SetupError),
    /// Command not allowed in the current phase or guard failed.
    #[error(transparent)]
    IllegalTransition(#[from] IllegalTransition),
    /// Team index does not designate a registered team.
    #[error("unknown team index {0}")]
    UnknownTeam(usize),
    /// The phase changed between planning and applying a transition.
    #[error(transparent)]
    Stale(#[from] StalePlan),
}

/// Point-in-time copy of the whole session, handed to new displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Identifier of the running session.
    pub session_id: Uuid,
    /// Current phase.
    pub phase: GamePhase,
    /// State machine version, bumped on every transition.
    pub version: usize,
    /// Current round position (equals `round_count` once the game is over).
    pub round_index: usize,
    /// Current question position in the round.
    pub question_index: usize,
    /// Number of rounds loaded.
    pub round_count: usize,
    /// Round on screen, if any.
    pub round_name: Option<String>,
    /// Question on screen, if any.
    pub question: Option<String>,
    /// Answer, exposed only once revealed.
    pub answer: Option<String>,
    /// Countdown length of the current question.
    pub time_limit: Option<u32>,
    /// Points at stake on the current question.
    pub points: Option<i32>,
    /// Seconds left.
    pub timer_remaining: u32,
    /// Whether the countdown is ticking.
    pub timer_running: bool,
    /// Team that won the buzz.
    pub buzz_winner: Option<usize>,
    /// Teams barred from buzzing on the current question.
    pub locked_out: Vec<usize>,
    /// Last verdict given on the current question.
    pub last_judgement: Option<bool>,
    /// Scores in registration order.
    pub scores: Vec<ScoreEntry>,
}

/// Central authority of the quiz: orchestrates content, scoreboard, countdown and arbiter.
#[derive(Debug)]
pub struct GameController {
    session_id: Uuid,
    content: Arc<QuizContent>,
    policy: JudgingPolicy,
    machine: GameStateMachine,
    scoreboard: Scoreboard,
    timer: CountdownTimer,
    arbiter: BuzzerArbiter,
    round_index: usize,
    question_index: usize,
    buzz_winner: Option<usize>,
    locked_out: BTreeSet<usize>,
    last_judgement: Option<bool>,
}

impl GameController {
    /// Create an idle session over `content`.
    pub fn new(content: Arc<QuizContent>, policy: JudgingPolicy) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            content,
            policy,
            machine: GameStateMachine::new(),
            scoreboard: Scoreboard::new(),
            timer: CountdownTimer::new(),
            arbiter: BuzzerArbiter::new(),
            round_index: 0,
            question_index: 0,
            buzz_winner: None,
            locked_out: BTreeSet::new(),
            last_judgement: None,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> GamePhase {
        self.machine.phase()
    }

    /// Scoreboard (read-only).
    pub fn scoreboard(&self) -> &Scoreboard {
        &self.scoreboard
    }

    /// Countdown (read-only).
    pub fn timer(&self) -> &CountdownTimer {
        &self.timer
    }

    /// Buzz winner on the current question.
    pub fn buzz_winner(&self) -> Option<usize> {
        self.buzz_winner
    }

    /// Apply one command and return the events it produced, in emission order.
    pub fn handle(&mut self, command: GameCommand) -> Result<Vec<GameEvent>, CommandError> {
        match command {
            GameCommand::RegisterTeams(names) => self.register_teams(names),
            GameCommand::StartGame => self.start_game(),
            GameCommand::NextQuestion => self.next_question(),
            GameCommand::StartTimer => self.start_timer(),
            GameCommand::PauseTimer => self.pause_timer(),
            GameCommand::Buzz { team_index, at } => self.buzz(team_index, at),
            GameCommand::Tick { epoch } => self.tick(epoch),
            GameCommand::Judge { correct } => self.judge(correct),
            GameCommand::Reveal => self.reveal(),
            GameCommand::AdjustScore { team_index, delta } => self.adjust_score(team_index, delta),
            GameCommand::EndGame => self.end_game(),
        }
    }

    fn register_teams(&mut self, names: Vec<String>) -> Result<Vec<GameEvent>, CommandError> {
        let plan = self.machine.plan(Trigger::RegisterTeams)?;
        let count = self.scoreboard.register(names)?.len();
        self.commit(plan)?;

        info!(teams = count, "teams registered");
        Ok(vec![self.scores_updated()])
    }

    fn start_game(&mut self) -> Result<Vec<GameEvent>, CommandError> {
        let plan = self.machine.plan(Trigger::StartGame)?;
        let Some(first_round) = self.first_round_from(0) else {
            return Err(
                IllegalTransition::guard(plan.from, plan.trigger, "no questions loaded").into(),
            );
        };
        if self.scoreboard.is_empty() {
            return Err(
                IllegalTransition::guard(plan.from, plan.trigger, "no teams registered").into(),
            );
        }

        self.scoreboard.reset_scores();
        let question_changed = self.present_question(first_round, 0);
        let phase = self.commit(plan)?;

        info!(session = %self.session_id, "game started");
        Ok(vec![
            self.scores_updated(),
            question_changed,
            GameEvent::PhaseChanged { phase },
        ])
    }

    fn next_question(&mut self) -> Result<Vec<GameEvent>, CommandError> {
        let next = self.next_position();
        let plan = self.machine.plan(Trigger::NextQuestion {
            exhausted: next.is_none(),
        })?;

        let Some((round_index, question_index)) = next else {
            self.clear_question_state();
            self.round_index = self.content.rounds().len();
            self.question_index = 0;
            let phase = self.commit(plan)?;

            info!("all rounds played; game over");
            return Ok(vec![GameEvent::GameOver, GameEvent::PhaseChanged { phase }]);
        };

        let question_changed = self.present_question(round_index, question_index);
        let phase = self.commit(plan)?;
        debug!(round = round_index, question = question_index, "question advanced");
        Ok(vec![question_changed, GameEvent::PhaseChanged { phase }])
    }

    fn start_timer(&mut self) -> Result<Vec<GameEvent>, CommandError> {
        let plan = self.machine.plan(Trigger::StartTimer)?;
        if self.timer.remaining() == 0 {
            return Err(IllegalTransition::guard(plan.from, plan.trigger, "no time left").into());
        }
        if self.buzz_winner.is_some() {
            return Err(
                IllegalTransition::guard(plan.from, plan.trigger, "a buzz is being judged").into(),
            );
        }

        self.timer.start();
        self.arbiter.open();
        let phase = self.commit(plan)?;
        Ok(vec![GameEvent::PhaseChanged { phase }])
    }

    fn pause_timer(&mut self) -> Result<Vec<GameEvent>, CommandError> {
        let plan = self.machine.plan(Trigger::PauseTimer)?;
        self.timer.stop();
        self.arbiter.close();
        let phase = self.commit(plan)?;
        Ok(vec![GameEvent::PhaseChanged { phase }])
    }

    /// Late, duplicate, unknown or locked-out buzzes are dropped without error.
    fn buzz(&mut self, team_index: usize, at: Instant) -> Result<Vec<GameEvent>, CommandError> {
        let Ok(plan) = self.machine.plan(Trigger::Buzz) else {
            debug!(team = team_index, phase = ?self.phase(), "buzz ignored outside listening");
            return Ok(Vec::new());
        };
        if !self.scoreboard.contains(team_index) {
            debug!(team = team_index, "buzz ignored: unknown team");
            return Ok(Vec::new());
        }
        if self.locked_out.contains(&team_index) {
            debug!(team = team_index, "buzz ignored: team locked out");
            return Ok(Vec::new());
        }
        if !self.arbiter.try_buzz(team_index, at) {
            return Ok(Vec::new());
        }

        self.timer.stop();
        self.arbiter.close();
        self.buzz_winner = Some(team_index);
        let phase = self.commit(plan)?;

        info!(team = team_index, remaining = self.timer.remaining(), "team buzzed in");
        Ok(vec![
            GameEvent::Buzzed { team_index },
            GameEvent::PhaseChanged { phase },
        ])
    }

    /// Stale ticks (stopped or restarted countdown) are dropped without error.
    fn tick(&mut self, epoch: u64) -> Result<Vec<GameEvent>, CommandError> {
        if self.timer.running_epoch() != Some(epoch) {
            debug!(epoch, "stale tick ignored");
            return Ok(Vec::new());
        }

        // Check the expiry transition before the countdown moves so a failure leaves it intact.
        let expiry = if self.timer.remaining() <= 1 {
            Some(self.machine.plan(Trigger::TimerExpired)?)
        } else {
            None
        };

        match (self.timer.tick(epoch), expiry) {
            (Some(Tick::Remaining(remaining)), _) => Ok(vec![GameEvent::TimerTick { remaining }]),
            (Some(Tick::Expired), Some(plan)) => {
                self.arbiter.close();
                let phase = self.commit(plan)?;
                info!("countdown expired without buzz");
                Ok(vec![
                    GameEvent::TimerTick { remaining: 0 },
                    GameEvent::TimerExpired,
                    GameEvent::PhaseChanged { phase },
                ])
            }
            _ => Ok(Vec::new()),
        }
    }

    fn judge(&mut self, correct: bool) -> Result<Vec<GameEvent>, CommandError> {
        let reopen = !correct && self.reopens_after_wrong();
        let plan = self.machine.plan(Trigger::Judge { reopen })?;
        let Some(team_index) = self.buzz_winner else {
            return Err(IllegalTransition::guard(plan.from, plan.trigger, "no buzz winner").into());
        };
        let points = self.current_round().map_or(0, |round| round.points);

        let delta = if correct { points } else { points.saturating_neg() };
        self.scoreboard.apply_delta(team_index, delta);
        self.last_judgement = Some(correct);
        info!(team = team_index, correct, delta, "answer judged");

        if reopen {
            if !self.policy.allow_rebuzz_after_wrong {
                self.locked_out.insert(team_index);
            }
            self.buzz_winner = None;
            let phase = self.commit(plan)?;
            return Ok(vec![
                self.scores_updated(),
                GameEvent::AnswerJudged {
                    team_index,
                    correct,
                },
                GameEvent::PhaseChanged { phase },
            ]);
        }

        let phase = self.commit(plan)?;
        Ok(vec![
            self.scores_updated(),
            GameEvent::AnswerRevealed {
                answer: self.current_answer(),
                correct,
            },
            GameEvent::PhaseChanged { phase },
        ])
    }

    fn reveal(&mut self) -> Result<Vec<GameEvent>, CommandError> {
        let plan = self.machine.plan(Trigger::Reveal)?;
        let phase = self.commit(plan)?;
        Ok(vec![
            GameEvent::AnswerRevealed {
                answer: self.current_answer(),
                correct: false,
            },
            GameEvent::PhaseChanged { phase },
        ])
    }

    fn adjust_score(&mut self, team_index: usize, delta: i32) -> Result<Vec<GameEvent>, CommandError> {
        let plan = self.machine.plan(Trigger::AdjustScore)?;
        if !self.scoreboard.contains(team_index) {
            return Err(CommandError::UnknownTeam(team_index));
        }

        self.scoreboard.apply_delta(team_index, delta);
        self.commit(plan)?;
        info!(team = team_index, delta, "score adjusted by moderator");
        Ok(vec![self.scores_updated()])
    }

    fn end_game(&mut self) -> Result<Vec<GameEvent>, CommandError> {
        let plan = self.machine.plan(Trigger::EndGame)?;
        self.clear_question_state();
        self.timer.arm(0);
        self.round_index = 0;
        self.question_index = 0;
        self.scoreboard.reset_scores();
        let phase = self.commit(plan)?;

        info!(session = %self.session_id, "game ended; back to lobby");
        Ok(vec![self.scores_updated(), GameEvent::PhaseChanged { phase }])
    }

    /// Build a full copy of the session for late-joining displays.
    pub fn snapshot(&self) -> SessionSnapshot {
        let phase = self.phase();
        let on_question = !matches!(phase, GamePhase::Idle | GamePhase::GameOver);
        let round = on_question.then(|| self.current_round()).flatten();
        let question = on_question.then(|| self.current_question()).flatten();
        let machine = self.machine.snapshot();

        SessionSnapshot {
            session_id: self.session_id,
            phase,
            version: machine.version,
            round_index: self.round_index,
            question_index: self.question_index,
            round_count: self.content.rounds().len(),
            round_name: round.map(|r| r.name.clone()),
            question: question.map(|q| q.text.clone()),
            answer: question
                .filter(|_| phase == GamePhase::AnswerRevealed)
                .map(|q| q.answer.clone()),
            time_limit: round.map(|r| r.time_limit_seconds),
            points: round.map(|r| r.points),
            timer_remaining: self.timer.remaining(),
            timer_running: self.timer.is_running(),
            buzz_winner: self.buzz_winner,
            locked_out: self.locked_out.iter().copied().collect(),
            last_judgement: self.last_judgement,
            scores: self.scoreboard.snapshot(),
        }
    }

    fn commit(&mut self, plan: Plan) -> Result<GamePhase, StalePlan> {
        self.machine.apply(plan)
    }

    /// Move the pointer, reset per-question state and arm the countdown.
    fn present_question(&mut self, round_index: usize, question_index: usize) -> GameEvent {
        self.clear_question_state();
        self.round_index = round_index;
        self.question_index = question_index;

        let round = &self.content.rounds()[round_index];
        self.timer.arm(round.time_limit_seconds);

        GameEvent::QuestionChanged {
            round_index,
            question_index,
            text: round.questions[question_index].text.clone(),
            round_name: round.name.clone(),
            time_limit: round.time_limit_seconds,
            points: round.points,
        }
    }

    fn clear_question_state(&mut self) {
        self.timer.stop();
        self.arbiter.close();
        self.buzz_winner = None;
        self.locked_out.clear();
        self.last_judgement = None;
    }

    /// Position following the current question, `None` once every round is exhausted.
    fn next_position(&self) -> Option<(usize, usize)> {
        let question_index = self.question_index + 1;
        if self.content.question(self.round_index, question_index).is_some() {
            return Some((self.round_index, question_index));
        }
        self.first_round_from(self.round_index + 1)
            .map(|round_index| (round_index, 0))
    }

    /// First round at or after `start` holding at least one question.
    fn first_round_from(&self, start: usize) -> Option<usize> {
        (start..self.content.rounds().len())
            .find(|&round_index| self.content.question(round_index, 0).is_some())
    }

    fn reopens_after_wrong(&self) -> bool {
        if self.policy.wrong_answer != WrongAnswerPolicy::Reopen || self.timer.remaining() == 0 {
            return false;
        }
        if self.policy.allow_rebuzz_after_wrong {
            return true;
        }
        // Reopening only makes sense while another team may still buzz.
        (0..self.scoreboard.len())
            .any(|team| Some(team) != self.buzz_winner && !self.locked_out.contains(&team))
    }

    fn current_round(&self) -> Option<&Round> {
        self.content.round(self.round_index)
    }

    fn current_question(&self) -> Option<&Question> {
        self.content.question(self.round_index, self.question_index)
    }

    fn current_answer(&self) -> String {
        self.current_question()
            .map(|question| question.answer.clone())
            .unwrap_or_default()
    }

    fn scores_updated(&self) -> GameEvent {
        GameEvent::ScoresUpdated {
            scores: self.scoreboard.snapshot(),
        }
    }
}
