//! Sliding-window request budget shared by the agents of a game.
//!
//! Two windows are tracked. Hitting the short one suspends the caller on a
//! timer until the oldest request leaves the window; hitting the long one is
//! fatal for the game and reported as [`RateLimitExceeded`].

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info};

use crate::config::{ArbiterConfig, RateLimitScope, WindowLimit};
use crate::error::RateLimitExceeded;

#[derive(Debug)]
struct SlidingWindow {
    limit: WindowLimit,
    calls: VecDeque<Instant>,
}

impl SlidingWindow {
    fn new(limit: WindowLimit) -> Self {
        Self {
            limit,
            calls: VecDeque::new(),
        }
    }

    fn prune(&mut self, now: Instant) {
        let window = self.limit.window();
        while let Some(&oldest) = self.calls.front() {
            if now.duration_since(oldest) >= window {
                self.calls.pop_front();
            } else {
                break;
            }
        }
    }

    fn is_full(&self) -> bool {
        self.calls.len() >= self.limit.max_requests as usize
    }

    /// When the oldest recorded call stops counting. `None` if the window
    /// never frees up: no calls to age out, or an instant past the clock's range.
    fn frees_at(&self) -> Option<Instant> {
        self.calls
            .front()
            .and_then(|&oldest| oldest.checked_add(self.limit.window()))
    }

    fn exceeded(&self) -> RateLimitExceeded {
        RateLimitExceeded {
            used: self.calls.len(),
            max_requests: self.limit.max_requests,
            window: self.limit.window(),
        }
    }
}

#[derive(Debug)]
struct Budget {
    short: SlidingWindow,
    long: SlidingWindow,
}

/// Requests made inside each window right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Usage {
    pub short_used: usize,
    pub short_max: u32,
    pub long_used: usize,
    pub long_max: u32,
}

/// Cheap to clone; clones share one budget.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    budget: Arc<Mutex<Budget>>,
}

impl RateLimiter {
    pub fn new(short: WindowLimit, long: WindowLimit) -> Self {
        Self {
            budget: Arc::new(Mutex::new(Budget {
                short: SlidingWindow::new(short),
                long: SlidingWindow::new(long),
            })),
        }
    }

    pub fn from_config(config: &ArbiterConfig) -> Self {
        Self::new(config.short_window_limit, config.long_window_limit)
    }

    /// Wait for room in the short window and record one request.
    ///
    /// Fails without waiting when the long window is already exhausted.
    pub async fn acquire(&self) -> Result<(), RateLimitExceeded> {
        loop {
            let wake_at = {
                let mut budget = self.budget.lock().await;
                let now = Instant::now();
                budget.short.prune(now);
                budget.long.prune(now);

                if budget.long.is_full() {
                    return Err(budget.long.exceeded());
                }
                if !budget.short.is_full() {
                    budget.short.calls.push_back(now);
                    budget.long.calls.push_back(now);
                    debug!(
                        short_used = budget.short.calls.len(),
                        long_used = budget.long.calls.len(),
                        "rate limiter granted request"
                    );
                    return Ok(());
                }
                match budget.short.frees_at() {
                    Some(at) => at,
                    None => return Err(budget.short.exceeded()),
                }
            };

            info!(
                wait_ms = wake_at.saturating_duration_since(Instant::now()).as_millis() as u64,
                "short rate-limit window full, waiting"
            );
            sleep_until(wake_at).await;
        }
    }

    pub async fn usage(&self) -> Usage {
        let mut budget = self.budget.lock().await;
        let now = Instant::now();
        budget.short.prune(now);
        budget.long.prune(now);
        Usage {
            short_used: budget.short.calls.len(),
            short_max: budget.short.limit.max_requests,
            long_used: budget.long.calls.len(),
            long_max: budget.long.limit.max_requests,
        }
    }

    /// Time until the short window has room again, zero if it has room now.
    pub async fn short_window_wait(&self) -> Duration {
        let mut budget = self.budget.lock().await;
        let now = Instant::now();
        budget.short.prune(now);
        if !budget.short.is_full() {
            return Duration::ZERO;
        }
        budget
            .short
            .frees_at()
            .map(|at| at.saturating_duration_since(now))
            .unwrap_or_default()
    }
}

/// Limiters for the white and black agent according to the configured scope.
pub fn limiters_for(config: &ArbiterConfig) -> (RateLimiter, RateLimiter) {
    let white = RateLimiter::from_config(config);
    let black = match config.rate_limit_scope {
        RateLimitScope::Shared => white.clone(),
        RateLimitScope::PerAgent => RateLimiter::from_config(config),
    };
    (white, black)
}

#[cfg(test)]
#[path = "rate_limit_tests.rs"]
mod rate_limit_tests;
