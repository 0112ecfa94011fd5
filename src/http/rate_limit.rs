//! Client-side request throttling
//!
//! A fixed-window limiter: requests are counted until the per-second
//! budget is used up, at which point the caller waits out whatever is left
//! of the current second and a new window starts. Bursts up to the budget
//! are allowed inside a window.
//!
//! Time comes from `tokio::time`, so tests can drive it with a paused clock.

use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Length of one throttle window
pub const WINDOW: Duration = Duration::from_secs(1);

/// Configuration for rate limiting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimiterConfig {
    /// Maximum number of requests per second
    pub requests_per_second: u32,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            requests_per_second: crate::config::DEFAULT_REQS_PER_SEC,
        }
    }
}

impl RateLimiterConfig {
    /// Create a new rate limiter config
    pub fn new(requests_per_second: u32) -> Self {
        Self {
            requests_per_second,
        }
    }
}

/// Fixed-window rate limiter owned by a single client
///
/// Not shareable between callers: it is mutated through `&mut self` on every
/// request.
#[derive(Debug)]
pub struct RateLimiter {
    limit: u32,
    req_count: u32,
    window_start: Instant,
}

impl RateLimiter {
    /// Create a new rate limiter; the first window starts now
    pub fn new(config: &RateLimiterConfig) -> Self {
        Self {
            limit: config.requests_per_second.max(1),
            req_count: 0,
            window_start: Instant::now(),
        }
    }

    /// Wait until a request can be made
    ///
    /// Returns how long the caller was blocked, if at all.
    pub async fn wait(&mut self) -> Option<Duration> {
        if self.req_count < self.limit {
            return None;
        }

        let elapsed = self.window_start.elapsed();
        let mut blocked = None;
        if elapsed < WINDOW {
            let remaining = WINDOW - elapsed;
            debug!(
                "Throttling: {} requests in {:?}, sleeping {:?}",
                self.req_count, elapsed, remaining
            );
            tokio::time::sleep(remaining).await;
            blocked = Some(remaining);
        }

        self.window_start = Instant::now();
        self.req_count = 0;
        blocked
    }

    /// Record a completed request against the current window
    pub fn record(&mut self) {
        self.req_count = self.req_count.saturating_add(1);
    }

    /// Requests recorded in the current window
    pub fn count(&self) -> u32 {
        self.req_count
    }

    /// Per-second request budget
    pub fn limit(&self) -> u32 {
        self.limit
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(&RateLimiterConfig::default())
    }
}
