// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Once a cycle has succeeded, later cycles degrade to labelled stale data.

use std::time::Duration;

use jx_collector::{
    CollectError, CollectorConfig, JmxCollector, CIRCUIT_BREAKER_STATE, CONNECTION_HEALTH,
    SECONDS_SINCE_LAST_SUCCESS,
};
use jx_core::BreakerState;

use crate::prelude::*;

fn config() -> CollectorConfig {
    let conn = test_connection();
    let mut config = CollectorConfig {
        jmx_url: conn.url,
        jmx_username: conn.username,
        jmx_password: conn.password,
        poll_interval: Duration::from_secs(1),
        scrape_timeout: Duration::from_secs(1),
        ..CollectorConfig::default()
    };
    config.breaker.max_failures = 1;
    config.breaker.reset_timeout = Duration::from_secs(60);
    config.retry.max_retries = 1;
    config.monitor.check_interval = Duration::from_secs(3600);
    config
}

#[tokio::test]
async fn dead_helper_yields_cached_metrics_with_staleness() {
    let rig = Rig::new();
    let collector = JmxCollector::init_with(config(), rig.helper_config()).await.unwrap();

    let fresh = collector.collect().await.unwrap();
    assert_eq!(fresh[CONNECTION_HEALTH], 1);

    // Kill the helper out from under the collector; the monitor is idle.
    collector.helper().current().shutdown().await;
    tokio::time::sleep(Duration::from_millis(1100)).await;

    let stale = collector.collect().await.unwrap();
    assert_eq!(stale[CONNECTION_HEALTH], 0);
    assert_eq!(stale[CIRCUIT_BREAKER_STATE], 1);
    assert!(stale[SECONDS_SINCE_LAST_SUCCESS] >= 2, "{stale:?}");
    assert_eq!(stale["jvm_heap_used"], fresh["jvm_heap_used"]);
    assert_eq!(collector.breaker_state(), BreakerState::Open);

    // Open circuit: served from cache without touching the helper.
    let again = collector.collect().await.unwrap();
    assert_eq!(again[CONNECTION_HEALTH], 0);
    assert_eq!(again["threadpools_pools_webcontainer_max"], 50);

    collector.cleanup().await;
    assert_eq!(rig.payloads(), 0);
}

#[tokio::test]
async fn first_cycle_failure_is_a_hard_error() {
    let rig = Rig::new();
    let collector = JmxCollector::init_with(config(), rig.helper_config()).await.unwrap();
    collector.helper().current().shutdown().await;

    let err = collector.collect().await.unwrap_err();
    assert!(matches!(err, CollectError::ExhaustedRetries { attempts: 1, .. }), "{err:?}");
    let err = collector.collect().await.unwrap_err();
    assert!(matches!(err, CollectError::CircuitOpen(_)), "{err:?}");

    collector.cleanup().await;
}
