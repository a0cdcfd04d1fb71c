// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! jx-helper: supervision of the JMX helper subprocess

pub mod client;
pub mod config;
pub mod env;
pub mod error;
pub mod monitor;
pub mod payload;
pub mod process;
mod relay;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use client::{HelperClient, SharedHelper};
pub use config::{HelperConfig, Payload};
pub use error::{HelperError, MonitorError};
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeHelper;
pub use monitor::{HelperMonitor, MonitorConfig, MonitorStats, Probe};
pub use payload::PayloadFile;
pub use process::HelperProcess;
