// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scripted in-memory helper for orchestrator tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use jx_wire::{Command, CommandKind, Response, Target};
use parking_lot::Mutex;

use crate::client::HelperClient;
use crate::error::HelperError;

/// Key for scripted replies: command kind plus target for SCRAPE
type ReplyKey = (CommandKind, Option<Target>);

#[derive(Default)]
struct FakeState {
    queued: HashMap<ReplyKey, VecDeque<Result<Response, HelperError>>>,
    fallback: HashMap<ReplyKey, Result<Response, HelperError>>,
    calls: Vec<Command>,
}

/// Replies come from per-key queues first, then from a sticky fallback,
/// then default to `NotRunning`.
#[derive(Clone, Default)]
pub struct FakeHelper {
    state: Arc<Mutex<FakeState>>,
}

impl FakeHelper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply used for every matching command until changed.
    pub fn set_reply(&self, kind: CommandKind, target: Option<Target>, reply: Result<Response, HelperError>) {
        self.state.lock().fallback.insert((kind, target), reply);
    }

    /// One-shot reply consumed before the fallback.
    pub fn push_reply(&self, kind: CommandKind, target: Option<Target>, reply: Result<Response, HelperError>) {
        self.state.lock().queued.entry((kind, target)).or_default().push_back(reply);
    }

    pub fn set_scrape(&self, target: Target, data: serde_json::Value) {
        self.set_reply(CommandKind::Scrape, Some(target), Ok(Response::ok(Some(data))));
    }

    pub fn fail_scrape(&self, target: Target, err: HelperError) {
        self.set_reply(CommandKind::Scrape, Some(target), Err(err));
    }

    pub fn calls(&self) -> Vec<Command> {
        self.state.lock().calls.clone()
    }

    pub fn call_count(&self, kind: CommandKind) -> usize {
        self.state.lock().calls.iter().filter(|c| c.command == kind).count()
    }
}

#[async_trait]
impl HelperClient for FakeHelper {
    async fn send(&self, command: Command, _timeout: Duration) -> Result<Response, HelperError> {
        let mut state = self.state.lock();
        let key = (command.command, command.target);
        state.calls.push(command);
        if let Some(reply) = state.queued.get_mut(&key).and_then(VecDeque::pop_front) {
            return reply;
        }
        state.fallback.get(&key).cloned().unwrap_or(Err(HelperError::NotRunning))
    }
}
