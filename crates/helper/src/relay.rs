// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Forwards helper stderr into the collector's log.

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Severity {
    Error,
    Warning,
    Info,
}

/// Map a JVM log line to a severity by its leading keyword.
pub(crate) fn classify(line: &str) -> Severity {
    let head = line.trim_start();
    if ["SEVERE", "ERROR", "Exception", "FATAL"].iter().any(|p| head.starts_with(p)) {
        Severity::Error
    } else if ["WARN", "WARNING"].iter().any(|p| head.starts_with(p)) {
        Severity::Warning
    } else {
        Severity::Info
    }
}

pub(crate) async fn forward_stderr<R>(stderr: R, pid: Option<u32>)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(stderr).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => match classify(&line) {
                Severity::Error => tracing::warn!(target: "jx_helper::stderr", ?pid, "{line}"),
                Severity::Warning => tracing::info!(target: "jx_helper::stderr", ?pid, "{line}"),
                Severity::Info => tracing::debug!(target: "jx_helper::stderr", ?pid, "{line}"),
            },
            Ok(None) => break,
            Err(e) => {
                tracing::debug!(?pid, error = %e, "helper stderr relay stopped");
                break;
            }
        }
    }
}

#[cfg(test)]
#[path = "relay_tests.rs"]
mod tests;
