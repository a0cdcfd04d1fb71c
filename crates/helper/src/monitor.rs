// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Background liveness monitor for the helper process.
//!
//! Pings the current helper on a fixed interval and replaces it with a fresh
//! one when the ping fails. Restarts are budgeted (see [`RestartBudget`]) and
//! backed off; the backoff wait ends early when the monitor is stopped.
//!
//! The monitor never touches the circuit breaker. A restart does not close an
//! open circuit, and an open circuit does not trigger a restart.

use std::sync::Arc;
use std::time::Duration;

use jx_core::{Clock, RestartBudget, SystemClock};
use jx_wire::Command;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::client::SharedHelper;
use crate::env;
use crate::error::MonitorError;
use crate::process::HelperProcess;

/// Floor for `check_interval`; shorter intervals are raised to this
pub const MIN_CHECK_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub check_interval: Duration,
    pub ping_timeout: Duration,
    /// Base backoff, doubled per restart in the current window
    pub restart_delay: Duration,
    pub max_restarts: u32,
    pub restart_window: Duration,
    pub max_backoff: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            check_interval: Duration::from_secs(30),
            ping_timeout: env::ping_timeout(),
            restart_delay: Duration::from_secs(5),
            max_restarts: 3,
            restart_window: jx_core::restart::DEFAULT_WINDOW,
            max_backoff: jx_core::restart::DEFAULT_MAX_BACKOFF,
        }
    }
}

/// Result of one liveness check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    Healthy,
    Restarted,
}

/// Counters exposed for diagnostics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonitorStats {
    pub checks: u64,
    pub failed_checks: u64,
    pub restarts: u64,
    pub failed_restarts: u64,
    pub refused_restarts: u64,
    pub last_error: Option<String>,
}

pub struct HelperMonitor<C: Clock = SystemClock> {
    helper: SharedHelper,
    config: MonitorConfig,
    clock: C,
    /// Restart lock; held across backoff and relaunch
    budget: tokio::sync::Mutex<RestartBudget>,
    stop: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
    stats: Mutex<MonitorStats>,
}

impl HelperMonitor<SystemClock> {
    pub fn new(helper: SharedHelper, config: MonitorConfig) -> Self {
        Self::with_clock(helper, config, SystemClock)
    }
}

impl<C: Clock> HelperMonitor<C> {
    pub fn with_clock(helper: SharedHelper, config: MonitorConfig, clock: C) -> Self {
        let budget = RestartBudget::new(config.max_restarts, config.restart_delay)
            .with_window(config.restart_window)
            .with_max_backoff(config.max_backoff);
        Self {
            helper,
            config,
            clock,
            budget: tokio::sync::Mutex::new(budget),
            stop: CancellationToken::new(),
            task: Mutex::new(None),
            stats: Mutex::new(MonitorStats::default()),
        }
    }

    pub fn stats(&self) -> MonitorStats {
        self.stats.lock().clone()
    }

    /// Spawn the check loop. Calling it again, or after [`stop`](Self::stop), does nothing.
    pub fn start(self: &Arc<Self>) {
        let mut task = self.task.lock();
        if task.is_some() || self.stop.is_cancelled() {
            return;
        }
        let this = Arc::clone(self);
        let span = tracing::info_span!("helper.monitor");
        *task = Some(tokio::spawn(async move { this.run().await }.instrument(span)));
        tracing::info!(
            interval_ms = self.config.check_interval.as_millis() as u64,
            max_restarts = self.config.max_restarts,
            "helper monitor started"
        );
    }

    /// Signal the loop to exit and wait for it. Safe to call more than once.
    pub async fn stop(&self) {
        self.stop.cancel();
        let task = self.task.lock().take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "helper monitor task ended abnormally");
            }
            tracing::info!("helper monitor stopped");
        }
    }

    async fn run(&self) {
        let mut ticker = tokio::time::interval(self.config.check_interval.max(MIN_CHECK_INTERVAL));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick completes immediately; the helper was just started.
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = self.stop.cancelled() => break,
                _ = ticker.tick() => {
                    if let Err(e) = self.check().await {
                        tracing::warn!(error = %e, "helper not recovered, retrying next tick");
                    }
                }
            }
        }
    }

    /// Ping the current helper and restart it if the ping fails.
    pub async fn check(&self) -> Result<Probe, MonitorError> {
        let helper = self.helper.current();
        let ping = Command::ping(&helper.config().jmx);
        let failure = match helper.send(ping, self.config.ping_timeout).await {
            Ok(resp) if resp.is_ok() => None,
            Ok(resp) => Some(format!("ping returned error: {}", resp.describe())),
            Err(e) => Some(format!("ping failed: {e}")),
        };
        {
            let mut stats = self.stats.lock();
            stats.checks += 1;
            if let Some(reason) = &failure {
                stats.failed_checks += 1;
                stats.last_error = Some(reason.clone());
            }
        }
        match failure {
            None => Ok(Probe::Healthy),
            Some(reason) => {
                tracing::warn!(pid = ?helper.pid(), %reason, "helper unresponsive");
                self.restart(&reason).await.map(|()| Probe::Restarted)
            }
        }
    }

    /// Replace the current helper with a freshly started one.
    pub async fn restart(&self, reason: &str) -> Result<(), MonitorError> {
        let mut budget = self.budget.lock().await;
        let delay = match budget.acquire(self.clock.now()) {
            Ok(delay) => delay,
            Err(e) => {
                tracing::error!(error = %e, "helper restart refused");
                self.stats.lock().refused_restarts += 1;
                return Err(e.into());
            }
        };

        tracing::info!(
            attempt = budget.used(),
            delay_ms = delay.as_millis() as u64,
            reason,
            "restarting helper"
        );
        tokio::select! {
            _ = self.stop.cancelled() => return Err(MonitorError::Stopped),
            _ = tokio::time::sleep(delay) => {}
        }

        let old = self.helper.current();
        old.shutdown().await;
        let fresh = Arc::new(HelperProcess::new(old.config().clone()));
        match fresh.start().await {
            Ok(()) => {
                self.helper.replace(fresh);
                self.stats.lock().restarts += 1;
                tracing::info!(generation = self.helper.generation(), "helper restarted");
                Ok(())
            }
            Err(e) => {
                let mut stats = self.stats.lock();
                stats.failed_restarts += 1;
                stats.last_error = Some(e.to_string());
                Err(MonitorError::RestartFailed(e))
            }
        }
    }
}

#[cfg(test)]
#[path = "monitor_tests.rs"]
mod tests;
