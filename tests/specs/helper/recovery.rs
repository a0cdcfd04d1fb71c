// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Breaker and monitor react to the same outage independently.

use std::sync::Arc;
use std::time::Duration;

use jx_core::{BreakerConfig, BreakerState, CircuitBreaker};
use jx_helper::{HelperClient, HelperMonitor, MonitorConfig};
use jx_wire::Command;

use crate::prelude::*;

const PING: Duration = Duration::from_secs(2);

#[tokio::test]
async fn breaker_opens_monitor_restarts_breaker_closes_after_reset() {
    let rig = Rig::new();
    let shared = SharedHelper::new(rig.started_helper().await);
    let first_pid = shared.current().pid();

    let reset_timeout = Duration::from_millis(300);
    let breaker = CircuitBreaker::new(BreakerConfig {
        max_failures: 2,
        reset_timeout,
        half_open_max_calls: 1,
    });
    let monitor = Arc::new(HelperMonitor::new(
        shared.clone(),
        MonitorConfig {
            check_interval: Duration::from_millis(200),
            ping_timeout: PING,
            restart_delay: Duration::from_millis(10),
            max_restarts: 3,
            ..MonitorConfig::default()
        },
    ));
    monitor.start();

    // Two failed PINGs through the breaker open it.
    rig.break_ping();
    for _ in 0..2 {
        breaker.before_call().unwrap();
        let resp = shared.send(Command::ping(&test_connection()), PING).await.unwrap();
        assert!(!resp.is_ok());
        breaker.record_failure();
    }
    assert_eq!(breaker.state(), BreakerState::Open);
    assert!(!breaker.can_attempt());

    // The monitor sees the same outage on its own tick and replaces the helper.
    assert!(wait_for(Duration::from_secs(5), || shared.generation() >= 1).await);
    rig.heal_ping();
    monitor.stop().await;

    let current = shared.current();
    assert!(current.is_running());
    assert_ne!(current.pid(), first_pid);
    // A restart leaves the breaker alone.
    assert_eq!(breaker.state(), BreakerState::Open);

    tokio::time::sleep(reset_timeout + Duration::from_millis(100)).await;
    breaker.before_call().unwrap();
    assert_eq!(breaker.state(), BreakerState::HalfOpen);
    let resp = shared.send(Command::ping(&test_connection()), PING).await.unwrap();
    assert!(resp.is_ok());
    breaker.record_success();
    assert_eq!(breaker.state(), BreakerState::Closed);
    assert_eq!(breaker.failure_count(), 0);

    shared.current().shutdown().await;
    assert_eq!(rig.payloads(), 0);
}

#[tokio::test]
async fn breaker_transitions_never_touch_the_helper() {
    let rig = Rig::new();
    let shared = SharedHelper::new(rig.started_helper().await);
    let breaker = CircuitBreaker::new(BreakerConfig { max_failures: 1, ..BreakerConfig::default() });

    breaker.record_failure();
    assert_eq!(breaker.state(), BreakerState::Open);
    assert_eq!(shared.generation(), 0);
    assert!(shared.current().is_running());

    shared.current().shutdown().await;
}
