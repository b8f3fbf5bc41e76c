//! Rate limiter for WebSocket message handling.
//!
//! Limits the number of messages a connection can send within specific
//! time windows. Each connection carries its own limiters, so state stays
//! on the connection task and needs no locking.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Sliding-window rate limiter.
#[derive(Debug)]
pub struct RateLimiter {
    /// Timestamps of recent requests
    timestamps: VecDeque<Instant>,
    /// Maximum number of requests allowed in the window
    max_requests: usize,
    /// Time window for rate limiting
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            timestamps: VecDeque::with_capacity(max_requests),
            max_requests,
            window,
        }
    }

    /// Burst protection: 10 messages per second.
    pub fn burst() -> Self {
        Self::new(10, Duration::from_secs(1))
    }

    /// Sustained usage: 100 messages per minute.
    pub fn sustained() -> Self {
        Self::new(100, Duration::from_secs(60))
    }

    /// Returns `true` if the request is allowed and records it, `false`
    /// if the limit is exceeded.
    pub fn check(&mut self) -> bool {
        let now = Instant::now();

        // Expire timestamps outside the window.
        while let Some(ts) = self.timestamps.front() {
            if now.duration_since(*ts) > self.window {
                self.timestamps.pop_front();
            } else {
                break;
            }
        }

        if self.timestamps.len() >= self.max_requests {
            return false;
        }

        self.timestamps.push_back(now);
        true
    }
}
