// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Restart budget for a supervised process.
//!
//! At most `max_restarts` restarts are allowed per rolling window. Once the
//! budget is spent, the counter resets only after a full window has passed
//! since the last restart. Each granted restart carries a backoff delay of
//! `restart_delay * 2^count`, capped at `max_backoff`.

use std::time::{Duration, Instant};

use thiserror::Error;

use crate::backoff;

/// One hour
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(3600);

/// Five minutes
pub const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("restart budget exhausted: {used} restarts, next allowed in {retry_in:?}")]
pub struct BudgetExhausted {
    pub used: u32,
    pub retry_in: Duration,
}

#[derive(Debug, Clone)]
pub struct RestartBudget {
    max_restarts: u32,
    restart_delay: Duration,
    window: Duration,
    max_backoff: Duration,
    count: u32,
    last_restart: Option<Instant>,
}

impl RestartBudget {
    pub fn new(max_restarts: u32, restart_delay: Duration) -> Self {
        Self {
            max_restarts,
            restart_delay,
            window: DEFAULT_WINDOW,
            max_backoff: DEFAULT_MAX_BACKOFF,
            count: 0,
            last_restart: None,
        }
    }

    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    pub fn with_max_backoff(mut self, max_backoff: Duration) -> Self {
        self.max_backoff = max_backoff;
        self
    }

    /// Claim one restart at `now`, returning the backoff to wait before it.
    ///
    /// A budget of zero refuses every restart.
    pub fn acquire(&mut self, now: Instant) -> Result<Duration, BudgetExhausted> {
        if self.max_restarts == 0 {
            return Err(BudgetExhausted { used: 0, retry_in: self.window });
        }
        if self.count >= self.max_restarts {
            if let Some(at) = self.last_restart {
                let since = now.saturating_duration_since(at);
                if since < self.window {
                    return Err(BudgetExhausted {
                        used: self.count,
                        retry_in: self.window - since,
                    });
                }
            }
            self.count = 0;
        }

        let delay = backoff::doubling(self.restart_delay, self.count, self.max_backoff);
        self.count += 1;
        self.last_restart = Some(now);
        Ok(delay)
    }

    /// Restarts counted in the current window.
    pub fn used(&self) -> u32 {
        self.count
    }

    pub fn last_restart(&self) -> Option<Instant> {
        self.last_restart
    }
}

#[cfg(test)]
#[path = "restart_tests.rs"]
mod tests;
