// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The seam callers use to talk to "the current helper".

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use jx_wire::{Command, Response};
use parking_lot::RwLock;

use crate::error::HelperError;
use crate::process::HelperProcess;

/// Anything that can run one command/response exchange
#[async_trait]
pub trait HelperClient: Send + Sync + 'static {
    async fn send(&self, command: Command, timeout: Duration) -> Result<Response, HelperError>;
}

#[async_trait]
impl HelperClient for HelperProcess {
    async fn send(&self, command: Command, timeout: Duration) -> Result<Response, HelperError> {
        HelperProcess::send(self, command, timeout).await
    }
}

/// Shared slot holding the live helper.
///
/// The health monitor swaps in a fresh [`HelperProcess`] on restart; callers
/// resolve the current one per exchange and never hold the slot's lock
/// across an await.
#[derive(Clone)]
pub struct SharedHelper {
    slot: Arc<RwLock<Arc<HelperProcess>>>,
    generation: Arc<AtomicU64>,
}

impl SharedHelper {
    pub fn new(helper: Arc<HelperProcess>) -> Self {
        Self { slot: Arc::new(RwLock::new(helper)), generation: Arc::new(AtomicU64::new(0)) }
    }

    pub fn current(&self) -> Arc<HelperProcess> {
        Arc::clone(&self.slot.read())
    }

    /// Install `helper`, returning the one it replaced.
    pub fn replace(&self, helper: Arc<HelperProcess>) -> Arc<HelperProcess> {
        let old = std::mem::replace(&mut *self.slot.write(), helper);
        self.generation.fetch_add(1, Ordering::AcqRel);
        old
    }

    /// Number of replacements so far
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }
}

#[async_trait]
impl HelperClient for SharedHelper {
    async fn send(&self, command: Command, timeout: Duration) -> Result<Response, HelperError> {
        let helper = self.current();
        helper.send(command, timeout).await
    }
}
