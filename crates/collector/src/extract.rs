// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Turns per-target SCRAPE payloads into one flat metric map.
//!
//! Keys are `<target>_<path>`, lower-cased, with every non-alphanumeric
//! character replaced by `_`. Integers pass through, booleans become 0/1,
//! floats are scaled by 1000 and rounded. Arrays of objects are keyed by
//! their `name` field, or by index when there is none. Strings and nulls
//! are dropped.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use jx_helper::HelperClient;
use jx_wire::{Command, JmxConnection, Target};
use serde_json::Value;

use crate::error::CollectError;

pub type MetricMap = BTreeMap<String, i64>;

/// Scale applied to fractional values so they survive as integers
pub const FLOAT_SCALE: f64 = 1000.0;

pub const TARGETS_OK: &str = "scrape_targets_ok";
pub const TARGETS_FAILED: &str = "scrape_targets_failed";

/// One full pass over every configured target
#[async_trait]
pub trait MetricSource: Send + Sync + 'static {
    async fn collect(&self) -> Result<MetricMap, CollectError>;
}

pub struct MetricExtractor<H: HelperClient> {
    helper: H,
    connection: JmxConnection,
    targets: Vec<Target>,
    max_items: u32,
    collect_options: BTreeMap<String, bool>,
    scrape_timeout: Duration,
}

impl<H: HelperClient> MetricExtractor<H> {
    pub fn new(helper: H, connection: JmxConnection, targets: Vec<Target>) -> Self {
        Self {
            helper,
            connection,
            targets,
            max_items: 0,
            collect_options: BTreeMap::new(),
            scrape_timeout: Duration::from_secs(5),
        }
    }

    pub fn max_items(mut self, max_items: u32) -> Self {
        self.max_items = max_items;
        self
    }

    pub fn collect_options(mut self, options: BTreeMap<String, bool>) -> Self {
        self.collect_options = options;
        self
    }

    pub fn scrape_timeout(mut self, timeout: Duration) -> Self {
        self.scrape_timeout = timeout;
        self
    }

    async fn scrape(&self, target: Target) -> Result<Value, String> {
        let command = Command::scrape(&self.connection, target)
            .with_max_items(self.max_items)
            .with_collect_options(self.collect_options.clone());
        match self.helper.send(command, self.scrape_timeout).await {
            Ok(resp) if resp.is_ok() => Ok(resp.data.unwrap_or(Value::Null)),
            Ok(resp) => Err(resp.describe()),
            Err(e) => Err(e.to_string()),
        }
    }
}

#[async_trait]
impl<H: HelperClient> MetricSource for MetricExtractor<H> {
    async fn collect(&self) -> Result<MetricMap, CollectError> {
        if self.targets.is_empty() {
            return Err(CollectError::NoTargets);
        }

        let mut metrics = MetricMap::new();
        let mut ok = 0usize;
        let mut failed = 0usize;
        let mut last = String::new();
        for &target in &self.targets {
            match self.scrape(target).await {
                Ok(data) => {
                    flatten(&target.metric_prefix(), &data, &mut metrics);
                    ok += 1;
                }
                Err(e) => {
                    tracing::warn!(%target, error = %e, "scrape failed, skipping target");
                    failed += 1;
                    last = e;
                }
            }
        }

        if ok == 0 {
            return Err(CollectError::AllTargetsFailed { failed, last });
        }
        metrics.insert(TARGETS_OK.to_string(), ok as i64);
        metrics.insert(TARGETS_FAILED.to_string(), failed as i64);
        tracing::debug!(ok, failed, metrics = metrics.len(), "scrape pass complete");
        Ok(metrics)
    }
}

/// Flatten `value` into `out` under `prefix`.
pub fn flatten(prefix: &str, value: &Value, out: &mut MetricMap) {
    match value {
        Value::Bool(b) => {
            out.insert(metric_key(prefix), i64::from(*b));
        }
        Value::Number(n) => {
            if let Some(v) = number_value(n) {
                out.insert(metric_key(prefix), v);
            }
        }
        Value::Object(fields) => {
            for (name, field) in fields {
                flatten(&join(prefix, name), field, out);
            }
        }
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                let label = match item.get("name").and_then(Value::as_str) {
                    Some(name) => name.to_string(),
                    None => i.to_string(),
                };
                flatten(&join(prefix, &label), item, out);
            }
        }
        Value::String(_) | Value::Null => {}
    }
}

fn number_value(n: &serde_json::Number) -> Option<i64> {
    if let Some(v) = n.as_i64() {
        return Some(v);
    }
    if n.is_u64() {
        return Some(i64::MAX);
    }
    let scaled = (n.as_f64()? * FLOAT_SCALE).round();
    // `as` saturates out-of-range floats
    scaled.is_finite().then_some(scaled as i64)
}

fn join(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_string()
    } else {
        format!("{prefix}_{segment}")
    }
}

fn metric_key(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect()
}

#[cfg(test)]
#[path = "extract_tests.rs"]
mod tests;
