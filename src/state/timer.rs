/// Outcome of a delivered tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Countdown still running with this many seconds left.
    Remaining(u32),
    /// Countdown just reached zero and stopped itself.
    Expired,
}

/// Single countdown bound to the session's remaining time.
///
/// The countdown never sleeps by itself: a driver delivers ticks tagged with the epoch
/// returned by [`CountdownTimer::running_epoch`]. Every start or stop moves to a new epoch,
/// so a tick scheduled before a stop is recognised as stale and ignored.
#[derive(Debug, Clone, Default)]
pub struct CountdownTimer {
    remaining: u32,
    running: bool,
    epoch: u64,
}

impl CountdownTimer {
    /// Create a stopped timer with nothing left on the clock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop the countdown and set the remaining value.
    pub fn arm(&mut self, seconds: u32) {
        self.stop();
        self.remaining = seconds;
    }

    /// Start ticking. Returns `false` when already running or when nothing is left.
    pub fn start(&mut self) -> bool {
        if self.running || self.remaining == 0 {
            return false;
        }
        self.running = true;
        self.epoch += 1;
        true
    }

    /// Stop ticking and keep the remaining value. Stopping a stopped timer is a no-op.
    pub fn stop(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.running = false;
        self.epoch += 1;
        true
    }

    /// Apply one tick scheduled for `epoch`; stale or idle ticks yield `None`.
    pub fn tick(&mut self, epoch: u64) -> Option<Tick> {
        if !self.running || epoch != self.epoch {
            return None;
        }

        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.stop();
            Some(Tick::Expired)
        } else {
            Some(Tick::Remaining(self.remaining))
        }
    }

    /// Seconds left on the clock.
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Whether the countdown is ticking.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Epoch ticks must carry while running, `None` when stopped.
    pub fn running_epoch(&self) -> Option<u64> {
        self.running.then_some(self.epoch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_requires_time_on_the_clock() {
        let mut timer = CountdownTimer::new();
        assert!(!timer.start());

        timer.arm(3);
        assert!(!timer.is_running());
        assert!(timer.start());
        assert!(!timer.start(), "second start is a no-op");
    }

    #[test]
    fn counts_down_one_per_tick_and_expires_once() {
        let mut timer = CountdownTimer::new();
        timer.arm(3);
        timer.start();
        let epoch = timer.running_epoch().unwrap();

        assert_eq!(timer.tick(epoch), Some(Tick::Remaining(2)));
        assert_eq!(timer.tick(epoch), Some(Tick::Remaining(1)));
        assert_eq!(timer.tick(epoch), Some(Tick::Expired));
        assert_eq!(timer.remaining(), 0);
        assert!(!timer.is_running());

        assert_eq!(timer.tick(epoch), None);
        assert_eq!(timer.remaining(), 0);
    }

    #[test]
    fn stop_preserves_remaining_and_invalidates_pending_ticks() {
        let mut timer = CountdownTimer::new();
        timer.arm(5);
        timer.start();
        let epoch = timer.running_epoch().unwrap();
        timer.tick(epoch);

        assert!(timer.stop());
        assert!(!timer.stop(), "stopping twice is idempotent");
        assert_eq!(timer.remaining(), 4);
        assert_eq!(timer.tick(epoch), None);

        timer.start();
        let resumed = timer.running_epoch().unwrap();
        assert_ne!(resumed, epoch);
        assert_eq!(timer.tick(epoch), None, "old epoch stays stale after restart");
        assert_eq!(timer.tick(resumed), Some(Tick::Remaining(3)));
    }

    #[test]
    fn arm_stops_a_running_countdown() {
        let mut timer = CountdownTimer::new();
        timer.arm(5);
        timer.start();
        timer.arm(8);

        assert!(!timer.is_running());
        assert_eq!(timer.remaining(), 8);
        assert_eq!(timer.running_epoch(), None);
    }
}
