// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! jx-collector: resilient metric collection through the JMX helper

pub mod cache;
pub mod collector;
pub mod config;
pub mod error;
pub mod extract;
pub mod resilience;

pub use cache::LastGood;
pub use collector::JmxCollector;
pub use config::{parse_duration, CollectorConfig};
pub use error::{CollectError, ConfigError};
pub use extract::{flatten, MetricExtractor, MetricMap, MetricSource};
pub use resilience::{
    ResilientCollector, RetryPolicy, CIRCUIT_BREAKER_STATE, CONNECTION_HEALTH,
    SECONDS_SINCE_LAST_SUCCESS,
};
