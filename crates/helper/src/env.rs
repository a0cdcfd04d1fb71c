// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the helper crate.

use std::path::PathBuf;
use std::time::Duration;

fn duration_ms(var: &str, default: Duration) -> Duration {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(default)
}

/// Java launcher: `JX_JAVA` > `$JAVA_HOME/bin/java` > `java` on PATH
pub fn java_path() -> PathBuf {
    if let Ok(java) = std::env::var("JX_JAVA") {
        if !java.is_empty() {
            return PathBuf::from(java);
        }
    }
    match std::env::var("JAVA_HOME") {
        Ok(home) if !home.is_empty() => PathBuf::from(home).join("bin").join("java"),
        _ => PathBuf::from("java"),
    }
}

/// INIT handshake deadline (default 30s, `JX_INIT_TIMEOUT_MS`)
pub fn init_timeout() -> Duration {
    duration_ms("JX_INIT_TIMEOUT_MS", Duration::from_secs(30))
}

/// Wait for the helper to exit on its own before killing it (default 500ms,
/// `JX_SHUTDOWN_GRACE_MS`)
pub fn shutdown_grace() -> Duration {
    duration_ms("JX_SHUTDOWN_GRACE_MS", Duration::from_millis(500))
}

/// Liveness probe deadline (default 5s, `JX_PING_TIMEOUT_MS`)
pub fn ping_timeout() -> Duration {
    duration_ms("JX_PING_TIMEOUT_MS", Duration::from_secs(5))
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
