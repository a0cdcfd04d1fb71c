// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::{Duration, Instant};

use crate::extract::MetricMap;

/// Most recent fully successful cycle. Replaced wholesale, never merged.
#[derive(Debug, Clone)]
pub struct LastGood {
    metrics: MetricMap,
    taken_at: Instant,
}

impl LastGood {
    pub fn new(metrics: MetricMap, taken_at: Instant) -> Self {
        Self { metrics, taken_at }
    }

    pub fn metrics(&self) -> &MetricMap {
        &self.metrics
    }

    pub fn taken_at(&self) -> Instant {
        self.taken_at
    }

    /// Whole seconds since the snapshot, rounded up; a served snapshot is
    /// never reported as zero seconds old.
    pub fn age_secs(&self, now: Instant) -> i64 {
        let age = now.saturating_duration_since(self.taken_at);
        ceil_secs(age).max(1)
    }
}

fn ceil_secs(d: Duration) -> i64 {
    let secs = d.as_secs() + u64::from(d.subsec_nanos() > 0);
    i64::try_from(secs).unwrap_or(i64::MAX)
}
