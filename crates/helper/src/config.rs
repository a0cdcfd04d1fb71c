// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use jx_wire::JmxConnection;

use crate::env;

/// Helper program bytes, written to a temp file on every start
#[derive(Clone)]
pub struct Payload(Arc<[u8]>);

impl Payload {
    pub fn read(path: &Path) -> std::io::Result<Self> {
        Ok(Self(Arc::from(std::fs::read(path)?)))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Self(Arc::from(bytes))
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Self(Arc::from(text.as_bytes()))
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Payload({} bytes)", self.0.len())
    }
}

/// Everything needed to (re)launch an identical helper
#[derive(Debug, Clone)]
pub struct HelperConfig {
    pub payload: Payload,
    pub jmx: JmxConnection,
    /// Launcher binary, `java` by default
    pub java_path: PathBuf,
    /// Arguments placed before the payload path, `["-jar"]` by default
    pub launch_args: Vec<String>,
    /// Extra environment for the helper
    pub env: Vec<(String, String)>,
    /// File name prefix for the payload temp file
    pub payload_prefix: String,
    /// Directory for the payload temp file; OS temp dir when unset
    pub temp_dir: Option<PathBuf>,
    pub init_timeout: Duration,
    /// How long to wait for a voluntary exit before killing the helper
    pub shutdown_grace: Duration,
    /// Deadline for the best-effort SHUTDOWN command
    pub shutdown_timeout: Duration,
}

impl HelperConfig {
    pub fn new(payload: impl Into<Payload>, jmx: JmxConnection) -> Self {
        Self {
            payload: payload.into(),
            jmx,
            java_path: env::java_path(),
            launch_args: vec!["-jar".to_string()],
            env: Vec::new(),
            payload_prefix: "jx-helper".to_string(),
            temp_dir: None,
            init_timeout: env::init_timeout(),
            shutdown_grace: env::shutdown_grace(),
            shutdown_timeout: Duration::from_secs(2),
        }
    }

    jx_core::setters! {
        into {
            java_path: PathBuf,
            payload_prefix: String,
        }
        set {
            launch_args: Vec<String>,
            env: Vec<(String, String)>,
            temp_dir: Option<PathBuf>,
            init_timeout: Duration,
            shutdown_grace: Duration,
            shutdown_timeout: Duration,
        }
    }

    pub(crate) fn payload_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}
