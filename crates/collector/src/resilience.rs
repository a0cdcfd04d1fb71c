// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-cycle decision layer: breaker gate, bounded retries, last-good cache.
//!
//! ```text
//! before_call ──refused──▶ cached snapshot (stale) │ CircuitOpen
//!      │
//!      ▼
//! pass 1 ─fail─▶ sleep m^0 ─▶ pass 2 ─fail─▶ sleep m^1 ─▶ ... ─▶ record_failure ─▶ cached │ ExhaustedRetries
//!      │
//!    success ─▶ record_success ─▶ replace cache ─▶ fresh metrics
//! ```
//!
//! A whole cycle counts as one breaker call no matter how many passes it
//! makes. Neither a pass nor a retry sleep runs past the cycle budget; a pass
//! still running at the deadline is abandoned and ends the cycle as a failure.

use std::sync::Arc;
use std::time::{Duration, Instant};

use jx_core::{backoff, BreakerState, CircuitBreaker, Clock, SystemClock};
use parking_lot::Mutex;

use crate::cache::LastGood;
use crate::error::CollectError;
use crate::extract::{MetricMap, MetricSource};

pub const CONNECTION_HEALTH: &str = "connection_health";
pub const CIRCUIT_BREAKER_STATE: &str = "circuit_breaker_state";
pub const SECONDS_SINCE_LAST_SUCCESS: &str = "seconds_since_last_success";

/// Passes per cycle and the delay between them
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub multiplier: f64,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_retries: 3, multiplier: 2.0, max_delay: Duration::from_secs(30) }
    }
}

impl RetryPolicy {
    /// Delay before the zero-based `attempt`: none for the first pass, then
    /// `multiplier^(attempt-1)` seconds capped at `max_delay`.
    pub fn delay_before(&self, attempt: u32) -> Duration {
        match attempt {
            0 => Duration::ZERO,
            n => backoff::geometric_secs(self.multiplier, n - 1, self.max_delay),
        }
    }
}

pub struct ResilientCollector<S: MetricSource, C: Clock = SystemClock> {
    source: S,
    breaker: Arc<CircuitBreaker<C>>,
    retry: RetryPolicy,
    cycle_budget: Duration,
    clock: C,
    cache: Mutex<Option<LastGood>>,
}

impl<S: MetricSource> ResilientCollector<S, SystemClock> {
    pub fn new(source: S, breaker: Arc<CircuitBreaker>, retry: RetryPolicy, cycle_budget: Duration) -> Self {
        Self::with_clock(source, breaker, retry, cycle_budget, SystemClock)
    }
}

impl<S: MetricSource, C: Clock> ResilientCollector<S, C> {
    pub fn with_clock(
        source: S,
        breaker: Arc<CircuitBreaker<C>>,
        retry: RetryPolicy,
        cycle_budget: Duration,
        clock: C,
    ) -> Self {
        Self { source, breaker, retry, cycle_budget, clock, cache: Mutex::new(None) }
    }

    pub fn breaker(&self) -> &Arc<CircuitBreaker<C>> {
        &self.breaker
    }

    /// When the cached snapshot was taken, if any cycle has succeeded.
    pub fn last_success(&self) -> Option<Instant> {
        self.cache.lock().as_ref().map(LastGood::taken_at)
    }

    /// Run one collection cycle.
    ///
    /// After the first success this only fails if the cache is somehow
    /// empty; degraded cycles return the cached snapshot with
    /// `connection_health=0`.
    pub async fn collect(&self) -> Result<MetricMap, CollectError> {
        if let Err(refused) = self.breaker.before_call() {
            tracing::debug!(error = %refused, "collection skipped");
            return self.degraded(refused.into());
        }

        let started = tokio::time::Instant::now();
        let deadline = started.checked_add(self.cycle_budget);
        let max_passes = self.retry.max_retries.max(1);
        let mut attempts = 0;
        let mut last = String::new();
        for attempt in 0..max_passes {
            if attempt > 0 {
                let delay = self.retry.delay_before(attempt);
                if started.elapsed().saturating_add(delay) > self.cycle_budget {
                    tracing::warn!(
                        attempts,
                        budget_ms = self.cycle_budget.as_millis() as u64,
                        "cycle budget exhausted, giving up early"
                    );
                    break;
                }
                tokio::time::sleep(delay).await;
            }

            attempts += 1;
            let pass = self.source.collect();
            let outcome = match deadline {
                Some(deadline) => tokio::time::timeout_at(deadline, pass).await.ok(),
                None => Some(pass.await),
            };
            match outcome {
                Some(Ok(metrics)) => return Ok(self.fresh(metrics)),
                Some(Err(e)) => {
                    tracing::warn!(attempt = attempts, max_passes, error = %e, "collection pass failed");
                    last = e.to_string();
                }
                None => {
                    tracing::warn!(
                        attempt = attempts,
                        budget_ms = self.cycle_budget.as_millis() as u64,
                        "collection pass cut off by cycle budget"
                    );
                    last = format!("cycle budget of {:?} exceeded", self.cycle_budget);
                    break;
                }
            }
        }

        self.breaker.record_failure();
        self.degraded(CollectError::ExhaustedRetries { attempts, last })
    }

    fn fresh(&self, mut metrics: MetricMap) -> MetricMap {
        self.breaker.record_success();
        *self.cache.lock() = Some(LastGood::new(metrics.clone(), self.clock.now()));
        metrics.insert(CONNECTION_HEALTH.to_string(), 1);
        metrics.insert(CIRCUIT_BREAKER_STATE.to_string(), self.breaker.state_code());
        metrics.insert(SECONDS_SINCE_LAST_SUCCESS.to_string(), 0);
        metrics
    }

    /// Serve the cached snapshot with staleness markers, or fail with `err`.
    fn degraded(&self, err: CollectError) -> Result<MetricMap, CollectError> {
        let cache = self.cache.lock();
        let Some(snapshot) = cache.as_ref() else {
            return Err(err);
        };
        let age = snapshot.age_secs(self.clock.now());
        let state = self.breaker.state();
        if state != BreakerState::Closed {
            tracing::debug!(%state, age_secs = age, "serving cached metrics");
        } else {
            tracing::info!(error = %err, age_secs = age, "serving cached metrics");
        }

        let mut metrics = snapshot.metrics().clone();
        metrics.insert(CONNECTION_HEALTH.to_string(), 0);
        metrics.insert(CIRCUIT_BREAKER_STATE.to_string(), state.code());
        metrics.insert(SECONDS_SINCE_LAST_SUCCESS.to_string(), age);
        Ok(metrics)
    }
}

#[cfg(test)]
#[path = "resilience_tests.rs"]
mod tests;
