//! Reconnect backoff with jitter.
//!
//! While the collector is unreachable every send would otherwise pay a full
//! connect timeout on the broker's hot path. The backoff window makes sends
//! fail fast until the next reconnect attempt is due.

use std::time::{Duration, Instant};

use rand::Rng;

/// Longest reconnect window, whatever the configured maximum.
pub const MAX_RECONNECT_DELAY: Duration = Duration::from_secs(3600);

/// Exponential delay for the given failure count, capped at `max`, plus up to
/// 10% jitter.
pub fn calculate_backoff(failures: u32, base: Duration, max: Duration) -> Duration {
    if failures == 0 {
        return Duration::ZERO;
    }

    let base_ms = u64::try_from(base.as_millis()).unwrap_or(u64::MAX);
    let max_ms = u64::try_from(max.as_millis()).unwrap_or(u64::MAX);

    let exponent = 2u64.saturating_pow(failures - 1);
    let capped = base_ms.saturating_mul(exponent).min(max_ms);

    let jitter_range = capped / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(capped.saturating_add(jitter))
}

/// Tracks consecutive failures and when the next attempt is allowed.
#[derive(Debug, Clone)]
pub struct ReconnectBackoff {
    base: Duration,
    max: Duration,
    failures: u32,
    retry_at: Option<Instant>,
}

impl ReconnectBackoff {
    pub fn new(base: Duration, max: Duration) -> Self {
        Self {
            base,
            max,
            failures: 0,
            retry_at: None,
        }
    }

    /// Time left before another attempt is allowed, if any.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.retry_at
            .and_then(|at| at.checked_duration_since(now))
            .filter(|left| !left.is_zero())
    }

    /// Register a failure at `now` and return the delay until the next attempt.
    pub fn on_failure(&mut self, now: Instant) -> Duration {
        self.failures = self.failures.saturating_add(1);
        let delay = calculate_backoff(self.failures, self.base, self.max).min(MAX_RECONNECT_DELAY);
        self.retry_at = now.checked_add(delay);
        delay
    }

    pub fn on_success(&mut self) {
        self.failures = 0;
        self.retry_at = None;
    }

    pub fn failures(&self) -> u32 {
        self.failures
    }
}
