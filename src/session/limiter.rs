//! Request rate limiting.
//!
//! Limiting belongs to whatever serves requests, not to the engine, so
//! it sits behind the narrow `RateLimiter` trait. `FixedWindowLimiter`
//! grants each client `max_requests` per window; the window starts at
//! the client's first request and resets once it has fully elapsed.

use rustc_hash::FxHashMap;

use crate::core::clock::Timestamp;
use crate::core::config::RateLimitConfig;

/// Decides whether a client may make another request.
pub trait RateLimiter: Send {
    /// Record a request from `client_id` at `now` and return whether
    /// it is allowed.
    fn allow(&mut self, client_id: &str, now: Timestamp) -> bool;
}

/// Tracked clients above which expired windows are swept on insert.
const PRUNE_THRESHOLD: usize = 1024;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Window {
    count: u32,
    reset_at: Timestamp,
}

/// Per-client fixed-window counter.
///
/// ```
/// use card_progression::core::{RateLimitConfig, Timestamp};
/// use card_progression::session::{FixedWindowLimiter, RateLimiter};
///
/// let mut limiter = FixedWindowLimiter::new(RateLimitConfig {
///     window_millis: 1_000,
///     max_requests: 2,
/// });
/// let t0 = Timestamp::from_secs(0);
///
/// assert!(limiter.allow("alice", t0));
/// assert!(limiter.allow("alice", t0));
/// assert!(!limiter.allow("alice", t0));
/// assert!(limiter.allow("bob", t0));
/// ```
#[derive(Clone, Debug, Default)]
pub struct FixedWindowLimiter {
    config: RateLimitConfig,
    windows: FxHashMap<String, Window>,
}

impl FixedWindowLimiter {
    /// Create a limiter.
    #[must_use]
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: FxHashMap::default(),
        }
    }

    /// Requests left for `client_id` in its current window.
    #[must_use]
    pub fn remaining(&self, client_id: &str, now: Timestamp) -> u32 {
        match self.windows.get(client_id) {
            Some(window) if now <= window.reset_at => {
                self.config.max_requests.saturating_sub(window.count)
            }
            _ => self.config.max_requests,
        }
    }

    /// Drop windows that have expired.
    pub fn prune(&mut self, now: Timestamp) {
        self.windows.retain(|_, window| now <= window.reset_at);
    }

    /// Number of clients being tracked.
    #[must_use]
    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }
}

impl RateLimiter for FixedWindowLimiter {
    fn allow(&mut self, client_id: &str, now: Timestamp) -> bool {
        if let Some(window) = self.windows.get_mut(client_id) {
            if now <= window.reset_at {
                if window.count >= self.config.max_requests {
                    return false;
                }
                window.count += 1;
                return true;
            }
        }

        if self.windows.len() >= PRUNE_THRESHOLD {
            self.prune(now);
        }
        self.windows.insert(
            client_id.to_string(),
            Window {
                count: 1,
                reset_at: now.plus_millis(self.config.window_millis),
            },
        );
        true
    }
}
