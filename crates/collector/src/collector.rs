// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Host-facing lifecycle: `init` once, `check`/`collect` per tick, `cleanup` once.

use std::sync::Arc;

use jx_core::{BreakerState, CircuitBreaker};
use jx_helper::{
    HelperClient, HelperConfig, HelperMonitor, HelperProcess, MonitorStats, Payload, SharedHelper,
};
use jx_wire::Command;
use tracing::Instrument;

use crate::config::CollectorConfig;
use crate::error::CollectError;
use crate::extract::{MetricExtractor, MetricMap};
use crate::resilience::ResilientCollector;

pub struct JmxCollector {
    config: CollectorConfig,
    helper: SharedHelper,
    monitor: Arc<HelperMonitor>,
    resilient: ResilientCollector<MetricExtractor<SharedHelper>>,
}

impl JmxCollector {
    /// Read the helper jar named by the config and start everything.
    pub async fn init(config: CollectorConfig) -> Result<Self, CollectError> {
        let payload = Payload::read(&config.helper_jar)
            .map_err(|source| CollectError::Payload { path: config.helper_jar.clone(), source })?;
        let helper_config = config.helper_config(payload);
        Self::init_with(config, helper_config).await
    }

    /// Start with explicit helper launch settings.
    ///
    /// A helper that fails to start fails the whole collector.
    pub async fn init_with(config: CollectorConfig, helper_config: HelperConfig) -> Result<Self, CollectError> {
        config.validate()?;
        let span = tracing::info_span!("collector.init", url = %config.jmx_url);
        async {
            let process = Arc::new(HelperProcess::new(helper_config));
            process.start().await.map_err(CollectError::Init)?;
            let helper = SharedHelper::new(process);

            let monitor = Arc::new(HelperMonitor::new(helper.clone(), config.monitor_config()));
            monitor.start();

            let extractor = MetricExtractor::new(helper.clone(), config.connection(), config.targets.clone())
                .max_items(config.max_items)
                .collect_options(config.collect_options.clone())
                .scrape_timeout(config.scrape_timeout);
            let breaker = Arc::new(CircuitBreaker::new(config.breaker_config()));
            let resilient =
                ResilientCollector::new(extractor, breaker, config.retry_policy(), config.cycle_budget());

            tracing::info!(targets = config.targets.len(), "collector initialized");
            Ok(Self { config, helper, monitor, resilient })
        }
        .instrument(span)
        .await
    }

    /// Breaker-gated PING of the current helper.
    pub async fn check(&self) -> Result<(), CollectError> {
        let breaker = self.resilient.breaker();
        breaker.before_call()?;
        let ping = Command::ping(&self.config.connection());
        match self.helper.send(ping, self.config.monitor.ping_timeout).await {
            Ok(resp) if resp.is_ok() => {
                breaker.record_success();
                Ok(())
            }
            Ok(resp) => {
                breaker.record_failure();
                Err(CollectError::Unhealthy(resp.describe()))
            }
            Err(e) => {
                breaker.record_failure();
                Err(e.into())
            }
        }
    }

    pub async fn collect(&self) -> Result<MetricMap, CollectError> {
        self.resilient.collect().await
    }

    /// Stop the monitor, then the helper. Safe to call more than once.
    pub async fn cleanup(&self) {
        self.monitor.stop().await;
        self.helper.current().shutdown().await;
        tracing::info!("collector cleaned up");
    }

    pub fn breaker_state(&self) -> BreakerState {
        self.resilient.breaker().state()
    }

    /// Number of times the monitor has replaced the helper
    pub fn helper_generation(&self) -> u64 {
        self.helper.generation()
    }

    pub fn monitor_stats(&self) -> MonitorStats {
        self.monitor.stats()
    }

    pub fn helper(&self) -> &SharedHelper {
        &self.helper
    }
}

#[cfg(test)]
#[path = "collector_tests.rs"]
mod tests;
