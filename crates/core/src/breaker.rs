// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tri-state circuit breaker guarding calls into the helper process.
//!
//! ```text
//! Closed ──(failures ≥ max)──▶ Open ──(reset timeout elapsed)──▶ HalfOpen
//!   ▲                                                              │
//!   └──────────────(success)───────────────────────────────────────┤
//!                                   Open ◀──────(any failure)──────┘
//! ```
//!
//! The Open → HalfOpen transition is evaluated lazily by [`CircuitBreaker::before_call`]
//! and [`CircuitBreaker::can_attempt`]; there is no background timer. The breaker
//! knows nothing about process liveness: a helper restart leaves it untouched.

use std::time::{Duration, Instant};

use parking_lot::Mutex;
use thiserror::Error;

use crate::clock::{Clock, SystemClock};

/// Breaker position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

crate::simple_display! {
    BreakerState {
        Closed => "closed",
        Open => "open",
        HalfOpen => "half-open",
    }
}

impl BreakerState {
    /// Numeric code exported as the `circuit_breaker_state` metric.
    pub fn code(self) -> i64 {
        match self {
            BreakerState::Closed => 0,
            BreakerState::Open => 1,
            BreakerState::HalfOpen => 2,
        }
    }
}

/// Why a call was refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BreakerError {
    #[error("circuit open after {failures} consecutive failures")]
    Open { failures: u32 },
    #[error("circuit half-open: trial budget of {max_calls} exhausted")]
    HalfOpenSaturated { max_calls: u32 },
}

/// Breaker thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakerConfig {
    /// Consecutive failures that open the circuit
    pub max_failures: u32,
    /// Cool-down after the last failure before a trial call is admitted
    pub reset_timeout: Duration,
    /// Trial calls admitted per half-open window
    pub half_open_max_calls: u32,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self { max_failures: 5, reset_timeout: Duration::from_secs(60), half_open_max_calls: 1 }
    }
}

/// Point-in-time view for logging and metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakerSnapshot {
    pub state: BreakerState,
    pub failure_count: u32,
    pub half_open_attempts: u32,
}

#[derive(Debug)]
struct Inner {
    state: BreakerState,
    failure_count: u32,
    last_failure: Option<Instant>,
    half_open_since: Option<Instant>,
    half_open_attempts: u32,
}

pub struct CircuitBreaker<C: Clock = SystemClock> {
    config: BreakerConfig,
    clock: C,
    inner: Mutex<Inner>,
}

impl CircuitBreaker<SystemClock> {
    pub fn new(config: BreakerConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> CircuitBreaker<C> {
    pub fn with_clock(config: BreakerConfig, clock: C) -> Self {
        // A zero trial budget would wedge the breaker in HalfOpen.
        let config = BreakerConfig {
            half_open_max_calls: config.half_open_max_calls.max(1),
            max_failures: config.max_failures.max(1),
            ..config
        };
        Self {
            config,
            clock,
            inner: Mutex::new(Inner {
                state: BreakerState::Closed,
                failure_count: 0,
                last_failure: None,
                half_open_since: None,
                half_open_attempts: 0,
            }),
        }
    }

    pub fn config(&self) -> &BreakerConfig {
        &self.config
    }

    /// Gate a call. `Ok` permits it and, in HalfOpen, consumes one trial.
    ///
    /// Every permitted call must be followed by [`record_success`](Self::record_success)
    /// or [`record_failure`](Self::record_failure).
    pub fn before_call(&self) -> Result<(), BreakerError> {
        let now = self.clock.now();
        let mut inner = self.inner.lock();
        self.refresh(&mut inner, now);
        match inner.state {
            BreakerState::Closed => Ok(()),
            BreakerState::Open => Err(BreakerError::Open { failures: inner.failure_count }),
            BreakerState::HalfOpen => {
                if inner.half_open_attempts < self.config.half_open_max_calls {
                    inner.half_open_attempts += 1;
                    tracing::debug!(
                        attempt = inner.half_open_attempts,
                        max_calls = self.config.half_open_max_calls,
                        "circuit half-open: admitting trial call"
                    );
                    Ok(())
                } else {
                    Err(BreakerError::HalfOpenSaturated {
                        max_calls: self.config.half_open_max_calls,
                    })
                }
            }
        }
    }

    /// Whether [`before_call`](Self::before_call) would currently admit a call.
    pub fn can_attempt(&self) -> bool {
        let now = self.clock.now();
        let mut inner = self.inner.lock();
        self.refresh(&mut inner, now);
        match inner.state {
            BreakerState::Closed => true,
            BreakerState::Open => false,
            BreakerState::HalfOpen => inner.half_open_attempts < self.config.half_open_max_calls,
        }
    }

    pub fn record_success(&self) {
        let mut inner = self.inner.lock();
        match inner.state {
            BreakerState::Closed => inner.failure_count = 0,
            BreakerState::HalfOpen => {
                tracing::info!("circuit closed after successful trial call");
                inner.state = BreakerState::Closed;
                inner.failure_count = 0;
                inner.half_open_attempts = 0;
                inner.half_open_since = None;
            }
            // Late result from a call admitted before the circuit opened.
            BreakerState::Open => inner.failure_count = 0,
        }
    }

    pub fn record_failure(&self) {
        let now = self.clock.now();
        let mut inner = self.inner.lock();
        inner.failure_count = inner.failure_count.saturating_add(1);
        inner.last_failure = Some(now);
        match inner.state {
            BreakerState::Closed => {
                if inner.failure_count >= self.config.max_failures {
                    tracing::warn!(
                        failures = inner.failure_count,
                        reset_timeout_ms = self.config.reset_timeout.as_millis() as u64,
                        "circuit opened"
                    );
                    inner.state = BreakerState::Open;
                }
            }
            BreakerState::HalfOpen => {
                tracing::warn!("trial call failed, circuit reopened");
                inner.state = BreakerState::Open;
                inner.half_open_attempts = 0;
                inner.half_open_since = None;
            }
            BreakerState::Open => {}
        }
    }

    /// Current state without evaluating the reset timeout.
    pub fn state(&self) -> BreakerState {
        self.inner.lock().state
    }

    pub fn state_code(&self) -> i64 {
        self.state().code()
    }

    pub fn failure_count(&self) -> u32 {
        self.inner.lock().failure_count
    }

    pub fn snapshot(&self) -> BreakerSnapshot {
        let inner = self.inner.lock();
        BreakerSnapshot {
            state: inner.state,
            failure_count: inner.failure_count,
            half_open_attempts: inner.half_open_attempts,
        }
    }

    /// Apply time-driven transitions: Open → HalfOpen once the reset timeout has
    /// passed since the last failure, and a fresh trial window for a HalfOpen
    /// breaker whose trials never reported back.
    fn refresh(&self, inner: &mut Inner, now: Instant) {
        match inner.state {
            BreakerState::Open => {
                let cooled = inner
                    .last_failure
                    .map(|at| now.saturating_duration_since(at) > self.config.reset_timeout)
                    .unwrap_or(true);
                if cooled {
                    tracing::info!(failures = inner.failure_count, "circuit half-open");
                    inner.state = BreakerState::HalfOpen;
                    inner.half_open_attempts = 0;
                    inner.half_open_since = Some(now);
                }
            }
            BreakerState::HalfOpen => {
                let saturated = inner.half_open_attempts >= self.config.half_open_max_calls;
                let window_over = inner
                    .half_open_since
                    .map(|at| now.saturating_duration_since(at) > self.config.reset_timeout)
                    .unwrap_or(true);
                if saturated && window_over {
                    inner.half_open_attempts = 0;
                    inner.half_open_since = Some(now);
                }
            }
            BreakerState::Closed => {}
        }
    }
}

#[cfg(test)]
#[path = "breaker_tests.rs"]
mod tests;
