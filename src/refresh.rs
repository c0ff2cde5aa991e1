//! Refresh scheduling for the weather panel
//!
//! Tracks when the last fetch attempt happened and decides when the next one
//! is due. Every attempt re-arms the interval, whether it succeeded or not, so
//! a dead network is retried once per interval rather than on every tick.

use std::time::{Duration, Instant};

/// Default time between weather fetch attempts
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// Default time between screen repaints
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(500);

/// Configuration for refresh intervals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshConfig {
    /// Interval between weather fetch attempts
    pub weather_interval: Duration,
    /// Sleep between dashboard ticks
    pub tick_interval: Duration,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            weather_interval: DEFAULT_REFRESH_INTERVAL,
            tick_interval: DEFAULT_TICK_INTERVAL,
        }
    }
}

/// Elapsed-time bookkeeping for the weather refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshState {
    last_attempt: Option<Instant>,
    interval: Duration,
}

impl RefreshState {
    /// Creates a state with no prior attempt, so the first check is due
    pub fn new(interval: Duration) -> Self {
        Self {
            last_attempt: None,
            interval,
        }
    }

    /// Interval between attempts
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// When the last attempt was made, if any
    pub fn last_attempt(&self) -> Option<Instant> {
        self.last_attempt
    }

    /// Returns true when no attempt has been made yet or the full interval has elapsed
    pub fn is_due(&self, now: Instant) -> bool {
        match self.last_attempt {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.interval,
        }
    }

    /// Records an attempt at `now`, re-arming the interval
    pub fn mark_attempted(&mut self, now: Instant) {
        self.last_attempt = Some(now);
    }

    /// Time left before the next attempt is due, zero once due
    pub fn remaining(&self, now: Instant) -> Duration {
        match self.last_attempt {
            None => Duration::ZERO,
            Some(last) => self
                .interval
                .saturating_sub(now.saturating_duration_since(last)),
        }
    }

    /// Whole seconds until the next attempt, rounded up.
    ///
    /// Rounding up keeps the countdown above zero until the attempt is
    /// actually due.
    pub fn seconds_until_next(&self, now: Instant) -> u64 {
        let remaining = self.remaining(now);
        if remaining.subsec_nanos() > 0 {
            remaining.as_secs() + 1
        } else {
            remaining.as_secs()
        }
    }
}

impl Default for RefreshState {
    fn default() -> Self {
        Self::new(DEFAULT_REFRESH_INTERVAL)
    }
}
