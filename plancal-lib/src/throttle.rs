// src/throttle.rs
use std::time::{Duration, Instant};

/// Coalesces bursts of samples into at most one evaluation per interval.
///
/// A sample scheduled after a quiet period is due immediately (leading edge).
/// Samples arriving inside the interval replace each other and fire once when
/// the interval elapses (trailing edge), carrying the latest value.
#[derive(Debug, Clone)]
pub struct CoalescingTimer<T> {
    interval: Duration,
    pending: Option<T>,
    deadline: Option<Instant>,
    last_fired: Option<Instant>,
}

impl<T> CoalescingTimer<T> {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            pending: None,
            deadline: None,
            last_fired: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn schedule(&mut self, now: Instant, sample: T) {
        self.pending = Some(sample);
        if self.deadline.is_none() {
            let deadline = match self.last_fired {
                Some(last) if now < last + self.interval => last + self.interval,
                _ => now,
            };
            self.deadline = Some(deadline);
        }
    }

    /// Returns the latest sample once its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                self.last_fired = Some(now);
                self.pending.take()
            }
            _ => None,
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Time left until the pending sample is due, for event-loop poll timeouts.
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(now))
    }
}
