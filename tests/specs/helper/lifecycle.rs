// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Helper start, exchange and shutdown against a real subprocess.

use std::time::Duration;

use jx_helper::HelperError;
use jx_wire::{Command, Target};

use crate::prelude::*;

#[tokio::test]
async fn concurrent_helpers_never_share_a_payload() {
    let rig = Rig::new();
    let a = rig.started_helper().await;
    let b = rig.started_helper().await;
    assert_ne!(a.payload_path(), b.payload_path());
    assert_eq!(rig.payloads(), 2);

    // Shutting one down leaves the other's payload in place.
    a.shutdown().await;
    assert_eq!(rig.payloads(), 1);
    assert!(b.payload_path().unwrap().exists());
    assert!(b.send(Command::ping(&test_connection()), Duration::from_secs(2)).await.unwrap().is_ok());

    b.shutdown().await;
    assert_eq!(rig.payloads(), 0);
}

#[tokio::test]
async fn expired_deadline_returns_promptly_and_late_reply_is_dropped() {
    let rig = Rig::new();
    let config = fake_helper_config(rig.dir.path(), &[("JX_FAKE_SCRAPE_DELAY", "1")]);
    let helper = HelperProcess::new(config);
    helper.start().await.unwrap();

    let started = std::time::Instant::now();
    let err = helper.send(Command::scrape(&test_connection(), Target::Jvm), Duration::ZERO).await.unwrap_err();
    assert!(err.is_deadline());
    assert!(started.elapsed() < Duration::from_millis(100));

    let err = helper
        .send(Command::scrape(&test_connection(), Target::Jvm), Duration::from_millis(100))
        .await
        .unwrap_err();
    assert!(err.is_deadline());

    // Wait past the helper's late SCRAPE reply, then make sure it went nowhere.
    tokio::time::sleep(Duration::from_millis(1200)).await;
    let resp = helper.send(Command::ping(&test_connection()), Duration::from_secs(2)).await.unwrap();
    assert_eq!(resp.message, "pong");

    helper.shutdown().await;
    assert_eq!(rig.payloads(), 0);
}

#[tokio::test]
async fn failed_start_then_double_shutdown_leaves_no_payload() {
    let rig = Rig::new();
    let config = fake_helper_config(rig.dir.path(), &[("JX_FAKE_INIT", "exit")]);
    let helper = HelperProcess::new(config);

    let err = helper.start().await.unwrap_err();
    assert!(matches!(err, HelperError::Init(_)), "{err:?}");
    helper.shutdown().await;
    helper.shutdown().await;
    assert_eq!(rig.payloads(), 0);
}

#[tokio::test]
async fn dropping_a_running_helper_removes_its_payload() {
    let rig = Rig::new();
    let helper = rig.started_helper().await;
    let payload = helper.payload_path().unwrap();
    drop(helper);
    assert!(!payload.exists());
}
