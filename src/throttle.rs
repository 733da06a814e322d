//! Time-based rate limiting for pointer handling

use std::time::{Duration, Instant};

/// Lets through at most one value per interval. The latest value offered
/// inside a closed window is kept and released by [`Throttle::poll`] once
/// the window has passed.
#[derive(Debug)]
pub struct Throttle<T> {
    interval: Duration,
    last_run: Option<Instant>,
    pending: Option<T>,
}

impl<T> Throttle<T> {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_run: None,
            pending: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    fn window_open(&self, now: Instant) -> bool {
        self.last_run
            .is_none_or(|last| now.duration_since(last) >= self.interval)
    }

    /// Returns the value if it may be evaluated now
    pub fn offer(&mut self, now: Instant, value: T) -> Option<T> {
        if self.window_open(now) {
            self.last_run = Some(now);
            self.pending = None;
            Some(value)
        } else {
            self.pending = Some(value);
            None
        }
    }

    /// Release the trailing value if its window has passed
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        if self.pending.is_some() && self.window_open(now) {
            self.last_run = Some(now);
            self.pending.take()
        } else {
            None
        }
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn reset(&mut self) {
        self.last_run = None;
        self.pending = None;
    }
}
