// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use jx_core::BudgetExhausted;
use jx_wire::CommandKind;
use thiserror::Error;

/// Errors from talking to or managing the helper process
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HelperError {
    #[error("failed to write helper payload: {0}")]
    Payload(String),
    #[error("failed to spawn helper: {0}")]
    Spawn(String),
    #[error("helper init failed: {0}")]
    Init(String),
    #[error("helper already running")]
    AlreadyRunning,
    #[error("helper not running")]
    NotRunning,
    #[error("write to helper failed: {0}")]
    Write(String),
    #[error("helper closed its output stream")]
    StreamClosed,
    #[error("malformed helper response: {0}")]
    Malformed(String),
    #[error("{command} timed out after {timeout:?}")]
    DeadlineExceeded { command: CommandKind, timeout: Duration },
}

impl HelperError {
    /// Transport failures are worth retrying; startup failures are not.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            HelperError::Payload(_)
                | HelperError::Spawn(_)
                | HelperError::Init(_)
                | HelperError::AlreadyRunning
        )
    }

    pub fn is_deadline(&self) -> bool {
        matches!(self, HelperError::DeadlineExceeded { .. })
    }
}

/// Errors from the health monitor's restart path
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MonitorError {
    #[error(transparent)]
    RestartRefused(#[from] BudgetExhausted),
    #[error("restart failed: {0}")]
    RestartFailed(#[source] HelperError),
    #[error("monitor stopped")]
    Stopped,
}
