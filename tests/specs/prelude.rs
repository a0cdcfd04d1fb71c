// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for specs.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

pub use jx_helper::testing::{fake_helper_config, payload_files, test_connection};
pub use jx_helper::{HelperConfig, HelperProcess, SharedHelper};

/// Scratch directory holding helper payloads plus a switch that makes the
/// helper answer PING with ERROR while it exists.
pub struct Rig {
    pub dir: tempfile::TempDir,
    fail_file: PathBuf,
}

impl Rig {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let fail_file = dir.path().join("ping-fails");
        Self { dir, fail_file }
    }

    pub fn helper_config(&self) -> HelperConfig {
        let fail_env = self.fail_file.display().to_string();
        fake_helper_config(self.dir.path(), &[("JX_FAKE_PING_FAIL_FILE", &fail_env)])
    }

    pub async fn started_helper(&self) -> Arc<HelperProcess> {
        let helper = Arc::new(HelperProcess::new(self.helper_config()));
        helper.start().await.unwrap();
        helper
    }

    pub fn break_ping(&self) {
        std::fs::write(&self.fail_file, b"").unwrap();
    }

    pub fn heal_ping(&self) {
        std::fs::remove_file(&self.fail_file).unwrap();
    }

    pub fn payloads(&self) -> usize {
        payload_files(self.dir.path())
    }
}

/// Poll `cond` every 20ms until it holds or `timeout` passes.
pub async fn wait_for(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if cond() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    cond()
}
