// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

pub mod check;
pub mod run;

use std::path::Path;

use anyhow::Context;
use jx_collector::{CollectorConfig, JmxCollector};

/// Load the config file and start the collector.
async fn start(config_path: &Path) -> anyhow::Result<(CollectorConfig, JmxCollector)> {
    let config = CollectorConfig::load(config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    let collector = JmxCollector::init(config.clone()).await.context("starting collector")?;
    Ok((config, collector))
}
