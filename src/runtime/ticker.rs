//! Elapsed-time periodic triggers

use std::time::Duration;
use web_time::Instant;

/// Fires once every `interval`, polled from a loop
#[derive(Debug, Clone)]
pub struct Ticker {
    interval: Duration,
    last: Instant,
}

impl Ticker {
    pub fn new(interval: Duration) -> Self {
        Self::starting_at(interval, Instant::now())
    }

    /// Interval in seconds; non-finite or negative values fire on every poll
    pub fn from_secs(secs: f32) -> Self {
        Self::new(Duration::try_from_secs_f32(secs).unwrap_or(Duration::ZERO))
    }

    pub fn starting_at(interval: Duration, start: Instant) -> Self {
        Self {
            interval,
            last: start,
        }
    }

    /// Time since the previous firing if at least one interval has passed
    pub fn poll_at(&mut self, now: Instant) -> Option<Duration> {
        let elapsed = now.saturating_duration_since(self.last);
        if elapsed >= self.interval {
            self.last = now;
            Some(elapsed)
        } else {
            None
        }
    }
}
