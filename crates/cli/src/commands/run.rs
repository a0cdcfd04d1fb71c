// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::future::Future;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use jx_collector::{CollectError, MetricMap};

#[derive(Args)]
pub struct RunArgs {
    /// Collector config (TOML)
    #[arg(long, short)]
    pub config: PathBuf,

    /// Collect a single cycle and exit
    #[arg(long)]
    pub once: bool,
}

pub async fn handle(args: RunArgs) -> anyhow::Result<()> {
    let (config, collector) = super::start(&args.config).await?;
    tracing::info!(
        interval_ms = config.poll_interval.as_millis() as u64,
        once = args.once,
        "collection loop starting"
    );
    let result = collect_loop(
        || collector.collect(),
        config.poll_interval,
        args.once,
        interrupted(),
        &mut std::io::stdout(),
    )
    .await;
    collector.cleanup().await;

    let stats = collector.monitor_stats();
    tracing::info!(
        checks = stats.checks,
        failed_checks = stats.failed_checks,
        restarts = stats.restarts,
        failed_restarts = stats.failed_restarts,
        refused_restarts = stats.refused_restarts,
        last_error = ?stats.last_error,
        generation = collector.helper_generation(),
        "helper monitor summary"
    );
    result
}

/// Resolves on Ctrl-C. If the handler cannot be installed, never resolves.
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "cannot listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

/// Run `cycle` every `interval` until `shutdown` resolves, which also cuts
/// short a cycle in flight.
async fn collect_loop<F, Fut>(
    mut cycle: F,
    interval: Duration,
    once: bool,
    shutdown: impl Future<Output = ()>,
    out: &mut impl Write,
) -> anyhow::Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<MetricMap, CollectError>>,
{
    let mut tick = tokio::time::interval(interval);
    tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    tokio::pin!(shutdown);

    loop {
        let result = tokio::select! {
            _ = &mut shutdown => None,
            result = async {
                tick.tick().await;
                cycle().await
            } => Some(result),
        };
        let Some(result) = result else {
            tracing::info!("interrupted, shutting down");
            return Ok(());
        };

        match result {
            Ok(metrics) => write_cycle(out, &metrics)?,
            Err(e) if once => return Err(e.into()),
            Err(e) => tracing::warn!(error = %e, "no metrics this cycle"),
        }
        if once {
            return Ok(());
        }
    }
}

/// One JSON object per line, flushed so consumers see each cycle promptly.
pub fn write_cycle(out: &mut impl Write, metrics: &MetricMap) -> anyhow::Result<()> {
    serde_json::to_writer(&mut *out, metrics)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
