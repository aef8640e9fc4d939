//! Trailing-edge debounce timer driven by an explicit clock.
//!
//! The owner calls [`Debouncer::schedule`] on every input and polls with the
//! current time; the timer fires once, `delay` after the last input.

use std::time::{Duration, Instant};

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

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// (Re)arm the timer relative to `now`.
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Time at which the pending timer fires.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns true exactly once when the deadline has passed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_after_the_last_input() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(Duration::from_millis(500));
        for i in 0..5 {
            d.schedule(t0 + Duration::from_millis(i * 100));
        }
        assert!(!d.poll(t0 + Duration::from_millis(899)));
        assert!(d.poll(t0 + Duration::from_millis(900)));
        assert!(!d.poll(t0 + Duration::from_millis(2000)));
    }

    #[test]
    fn cancel_disarms() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(Duration::from_millis(10));
        d.schedule(t0);
        d.cancel();
        assert!(!d.is_pending());
        assert!(!d.poll(t0 + Duration::from_secs(1)));
    }
}
