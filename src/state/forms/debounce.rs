//! Cancellable timers owned by a form
//!
//! Both timers are driven by the caller's clock: the UI loop passes
//! `Instant::now()` on every tick, tests pass synthetic instants.

use std::time::{Duration, Instant};

/// Trailing-edge debounce with a single pending deadline
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Cancel any pending deadline and start a new quiet period
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Returns true exactly once when the quiet period has elapsed
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Fixed-period interval that can be stopped and restarted
#[derive(Debug, Clone)]
pub struct Ticker {
    period: Duration,
    next: Option<Instant>,
}

impl Ticker {
    pub fn new(period: Duration) -> Self {
        Self { period, next: None }
    }

    /// Start ticking unless already running
    pub fn start(&mut self, now: Instant) {
        if self.next.is_none() {
            self.next = Some(now + self.period);
        }
    }

    pub fn stop(&mut self) {
        self.next = None;
    }

    pub fn is_running(&self) -> bool {
        self.next.is_some()
    }

    /// Returns true when a period has elapsed and schedules the next one
    pub fn due(&mut self, now: Instant) -> bool {
        match self.next {
            Some(next) if now >= next => {
                self.next = Some(now + self.period);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(300);

    #[test]
    fn test_fires_once_after_quiet_period() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(DELAY);
        debouncer.schedule(start);
        assert!(!debouncer.fire(start + Duration::from_millis(299)));
        assert!(debouncer.fire(start + DELAY));
        assert!(!debouncer.fire(start + DELAY * 2));
    }

    #[test]
    fn test_new_edit_restarts_the_quiet_period() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(DELAY);
        debouncer.schedule(start);
        debouncer.schedule(start + Duration::from_millis(200));
        assert!(!debouncer.fire(start + DELAY));
        assert!(debouncer.fire(start + Duration::from_millis(500)));
    }

    #[test]
    fn test_cancel_drops_pending_deadline() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(DELAY);
        debouncer.schedule(start);
        debouncer.cancel();
        assert!(!debouncer.is_pending());
        assert!(!debouncer.fire(start + DELAY * 10));
    }

    #[test]
    fn test_ticker_repeats_until_stopped() {
        let start = Instant::now();
        let second = Duration::from_secs(1);
        let mut ticker = Ticker::new(second);
        ticker.start(start);
        assert!(!ticker.due(start));
        assert!(ticker.due(start + second));
        assert!(!ticker.due(start + second));
        assert!(ticker.due(start + second * 2));
        ticker.stop();
        assert!(!ticker.due(start + second * 10));
    }

    #[test]
    fn test_ticker_start_is_idempotent_while_running() {
        let start = Instant::now();
        let second = Duration::from_secs(1);
        let mut ticker = Ticker::new(second);
        ticker.start(start);
        ticker.start(start + Duration::from_millis(900));
        assert!(ticker.due(start + second));
    }
}
