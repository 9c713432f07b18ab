//! Client-side submit throttling.
//!
//! DESIGN
//! ======
//! A single timestamp of the last accepted request. A submit arriving within
//! the minimum interval of that timestamp is rejected before it can reach the
//! network or the processing guard. Rejections never move the timestamp, so
//! a burst of early submits cannot extend the wait indefinitely.
//!
//! Checking and recording are separate steps: the conversation manager checks
//! first, then applies its own busy gate, and only records once the submit is
//! actually accepted.

use std::time::{Duration, Instant};

pub const DEFAULT_MIN_INTERVAL_MS: u64 = 1000;

// =============================================================================
// ERROR TYPE
// =============================================================================

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ThrottleError {
    #[error("submit rejected: retry in {}ms", .retry_in.as_millis())]
    TooSoon { retry_in: Duration },
}

// =============================================================================
// THROTTLE
// =============================================================================

#[derive(Clone, Debug)]
pub struct SubmitThrottle {
    min_interval: Duration,
    last_accepted: Option<Instant>,
}

impl SubmitThrottle {
    #[must_use]
    pub fn new(min_interval: Duration) -> Self {
        Self { min_interval, last_accepted: None }
    }

    #[must_use]
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Check whether a submit at `now` would be accepted. Does not record it.
    pub fn check_at(&self, now: Instant) -> Result<(), ThrottleError> {
        let Some(last) = self.last_accepted else {
            return Ok(());
        };
        let elapsed = now.saturating_duration_since(last);
        if elapsed < self.min_interval {
            return Err(ThrottleError::TooSoon { retry_in: self.min_interval - elapsed });
        }
        Ok(())
    }

    /// Record an accepted submit at `now`.
    pub fn record_at(&mut self, now: Instant) {
        self.last_accepted = Some(now);
    }
}

impl Default for SubmitThrottle {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_MIN_INTERVAL_MS))
    }
}

#[cfg(test)]
#[path = "throttle_test.rs"]
mod tests;
