// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use jx_core::BreakerError;
use jx_helper::HelperError;
use thiserror::Error;

/// Errors surfaced to the host by a collection or check call
#[derive(Debug, Error)]
pub enum CollectError {
    #[error("failed to read helper payload {}: {source}", path.display())]
    Payload {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("helper failed to start: {0}")]
    Init(#[source] HelperError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("no scrape targets configured")]
    NoTargets,
    #[error("all {failed} scrape targets failed, last error: {last}")]
    AllTargetsFailed { failed: usize, last: String },
    /// Refused by the breaker with nothing cached to serve instead
    #[error(transparent)]
    CircuitOpen(#[from] BreakerError),
    #[error("collection failed after {attempts} attempts: {last}")]
    ExhaustedRetries { attempts: u32, last: String },
    #[error("health check failed: {0}")]
    Unhealthy(String),
    #[error(transparent)]
    Helper(#[from] HelperError),
}

/// Errors loading a [`CollectorConfig`](crate::CollectorConfig)
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {field} must be greater than zero")]
    ZeroInterval { field: &'static str },
}
