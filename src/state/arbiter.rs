use std::{
    sync::atomic::{AtomicBool, Ordering},
    time::Instant,
};

use tracing::debug;

/// Single-winner lock over buzz signals.
///
/// The window is closed by default. Acceptance and closing happen in one compare-exchange,
/// so among any number of concurrent calls exactly one observes `true` per open window.
#[derive(Debug, Default)]
pub struct BuzzerArbiter {
    open: AtomicBool,
}

impl BuzzerArbiter {
    /// Create a closed arbiter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow the next buzz to win.
    pub fn open(&self) {
        self.open.store(true, Ordering::Release);
    }

    /// Reject every buzz until the next [`BuzzerArbiter::open`].
    pub fn close(&self) {
        self.open.store(false, Ordering::Release);
    }

    /// Whether a buzz would currently be accepted.
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    /// Claim the window for `team_index`. Late or duplicate claims return `false`.
    pub fn try_buzz(&self, team_index: usize, arrival_time: Instant) -> bool {
        let accepted = self
            .open
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if !accepted {
            debug!(team = team_index, "buzz rejected: arbiter closed");
        } else {
            debug!(team = team_index, elapsed = ?arrival_time.elapsed(), "buzz accepted");
        }
        accepted
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{Arc, Barrier},
        thread,
    };

    use super::*;

    #[test]
    fn closed_by_default() {
        let arbiter = BuzzerArbiter::new();
        assert!(!arbiter.is_open());
        assert!(!arbiter.try_buzz(0, Instant::now()));
    }

    #[test]
    fn first_buzz_wins_and_closes_window() {
        let arbiter = BuzzerArbiter::new();
        arbiter.open();

        assert!(arbiter.try_buzz(2, Instant::now()));
        assert!(!arbiter.is_open());
        assert!(!arbiter.try_buzz(0, Instant::now()));
        assert!(!arbiter.try_buzz(2, Instant::now()));

        arbiter.open();
        assert!(arbiter.try_buzz(0, Instant::now()));
    }

    #[test]
    fn close_rejects_until_reopened() {
        let arbiter = BuzzerArbiter::new();
        arbiter.open();
        arbiter.close();
        assert!(!arbiter.try_buzz(1, Instant::now()));
    }

    #[test]
    fn concurrent_buzzes_have_exactly_one_winner() {
        const CONTENDERS: usize = 16;

        for _ in 0..50 {
            let arbiter = Arc::new(BuzzerArbiter::new());
            arbiter.open();
            let barrier = Arc::new(Barrier::new(CONTENDERS));

            let handles: Vec<_> = (0..CONTENDERS)
                .map(|team| {
                    let arbiter = Arc::clone(&arbiter);
                    let barrier = Arc::clone(&barrier);
                    thread::spawn(move || {
                        barrier.wait();
                        arbiter.try_buzz(team, Instant::now())
                    })
                })
                .collect();

            let winners = handles
                .into_iter()
                .map(|handle| handle.join().unwrap())
                .filter(|accepted| *accepted)
                .count();
            assert_eq!(winners, 1);
        }
    }
}
