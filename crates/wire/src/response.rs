// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Ok,
    Error,
}

/// Reply from the helper
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Echo of the command id; absent from revision-1 helpers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub status: Status,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub recoverable: bool,
    /// Target-specific payload, opaque to the transport
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl Response {
    pub fn ok(data: Option<serde_json::Value>) -> Self {
        Self {
            id: None,
            status: Status::Ok,
            message: String::new(),
            details: String::new(),
            recoverable: false,
            data,
        }
    }

    pub fn error(message: impl Into<String>, recoverable: bool) -> Self {
        Self {
            status: Status::Error,
            message: message.into(),
            recoverable,
            ..Self::ok(None)
        }
    }

    pub fn with_id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }

    /// `message` plus `details` when the helper supplied them
    pub fn describe(&self) -> String {
        match (self.message.is_empty(), self.details.is_empty()) {
            (true, true) => format!("{:?}", self.status),
            (false, true) => self.message.clone(),
            (true, false) => self.details.clone(),
            (false, false) => format!("{}: {}", self.message, self.details),
        }
    }
}
