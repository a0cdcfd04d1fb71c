// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Helper process supervisor.
//!
//! Owns one helper subprocess: writes the payload, launches
//! `<java> -jar <payload>`, performs the INIT handshake, and runs
//! request/response exchanges over stdio under caller deadlines.
//!
//! # Exchange model
//!
//! ```text
//! send() ──lock──▶ register id ──▶ write line ──▶ await one-shot ◀── demux task ◀── stdout
//! ```
//!
//! All exchanges hold one lock, so at most one command is in flight. Each
//! command carries an id; the stdout demultiplexer resolves the pending
//! slot with the matching id. A caller that gives up (deadline or drop)
//! removes its slot, and the late line is discarded instead of reaching
//! the next caller.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use jx_wire::{Command, ProtocolError, Response};
use parking_lot::Mutex;
use tokio::io::{AsyncBufRead, BufReader};
use tokio::process::{Child, ChildStdin};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::config::HelperConfig;
use crate::error::HelperError;
use crate::payload::PayloadFile;
use crate::relay;

type Reply = Result<Response, HelperError>;

/// Outstanding requests keyed by id
#[derive(Default)]
struct Pending {
    slots: Mutex<HashMap<u64, oneshot::Sender<Reply>>>,
}

impl Pending {
    fn register(self: &Arc<Self>, id: u64, tx: oneshot::Sender<Reply>) -> PendingSlot {
        self.slots.lock().insert(id, tx);
        PendingSlot { pending: Arc::clone(self), id }
    }

    /// Deliver a response to its caller. Returns false when nobody is waiting.
    fn resolve(&self, response: Response) -> bool {
        let tx = {
            let mut slots = self.slots.lock();
            match response.id {
                Some(id) => slots.remove(&id),
                // Revision-1 helpers don't echo ids; only unambiguous with one caller.
                None if slots.len() == 1 => {
                    let id = slots.keys().next().copied();
                    id.and_then(|id| slots.remove(&id))
                }
                None => None,
            }
        };
        match tx {
            Some(tx) => tx.send(Ok(response)).is_ok(),
            None => false,
        }
    }

    fn fail_all(&self, err: impl Fn() -> HelperError) {
        let drained: Vec<_> = self.slots.lock().drain().collect();
        for (_, tx) in drained {
            let _ = tx.send(Err(err()));
        }
    }
}

/// Removes its pending entry when the waiting call ends, however it ends.
struct PendingSlot {
    pending: Arc<Pending>,
    id: u64,
}

impl Drop for PendingSlot {
    fn drop(&mut self) {
        self.pending.slots.lock().remove(&self.id);
    }
}

/// Write side of a running helper; guarded by the exchange lock.
struct Channel {
    stdin: ChildStdin,
    pending: Arc<Pending>,
    alive: Arc<AtomicBool>,
}

/// Process-side resources released by shutdown.
struct Running {
    child: Child,
    pid: Option<u32>,
    payload: PayloadFile,
    alive: Arc<AtomicBool>,
    reader: JoinHandle<()>,
    relay: JoinHandle<()>,
}

pub struct HelperProcess {
    config: HelperConfig,
    exchange: tokio::sync::Mutex<Option<Channel>>,
    running: Mutex<Option<Running>>,
    next_id: AtomicU64,
}

impl HelperProcess {
    pub fn new(config: HelperConfig) -> Self {
        Self {
            config,
            exchange: tokio::sync::Mutex::new(None),
            running: Mutex::new(None),
            next_id: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &HelperConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.running.lock().as_ref().is_some_and(|r| r.alive.load(Ordering::Acquire))
    }

    pub fn pid(&self) -> Option<u32> {
        self.running.lock().as_ref().and_then(|r| r.pid)
    }

    pub fn payload_path(&self) -> Option<PathBuf> {
        self.running.lock().as_ref().map(|r| r.payload.path().to_path_buf())
    }

    /// Launch the helper and complete the INIT handshake.
    ///
    /// On any failure the partially started helper is shut down before the
    /// error is returned.
    pub async fn start(&self) -> Result<(), HelperError> {
        let span = tracing::info_span!("helper.start", java = %self.config.java_path.display());
        async {
            let started = Instant::now();
            let result = self.launch().await;
            let elapsed_ms = started.elapsed().as_millis() as u64;
            match &result {
                Ok(()) => tracing::info!(pid = ?self.pid(), elapsed_ms, "helper started"),
                Err(HelperError::AlreadyRunning) => tracing::warn!("helper already running"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "helper start failed"),
            }
            if matches!(&result, Err(e) if *e != HelperError::AlreadyRunning) {
                self.shutdown().await;
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn launch(&self) -> Result<(), HelperError> {
        let mut exchange = self.exchange.lock().await;
        if exchange.is_some() || self.running.lock().is_some() {
            return Err(HelperError::AlreadyRunning);
        }

        let payload = PayloadFile::write(
            &self.config.payload_dir(),
            &self.config.payload_prefix,
            self.config.payload.bytes(),
        )
        .map_err(|e| HelperError::Payload(e.to_string()))?;

        let mut cmd = tokio::process::Command::new(&self.config.java_path);
        cmd.args(&self.config.launch_args)
            .arg(payload.path())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        for (key, value) in &self.config.env {
            cmd.env(key, value);
        }

        let mut child = cmd.spawn().map_err(|e| {
            HelperError::Spawn(format!("{}: {}", self.config.java_path.display(), e))
        })?;
        let pid = child.id();
        let (Some(stdin), Some(stdout), Some(stderr)) =
            (child.stdin.take(), child.stdout.take(), child.stderr.take())
        else {
            return Err(HelperError::Spawn("helper stdio not captured".to_string()));
        };

        let pending = Arc::new(Pending::default());
        let alive = Arc::new(AtomicBool::new(true));
        let relay = tokio::spawn(relay::forward_stderr(stderr, pid));
        let reader = tokio::spawn(demux(
            BufReader::new(stdout),
            Arc::clone(&pending),
            Arc::clone(&alive),
            pid,
        ));

        tracing::debug!(?pid, payload = %payload.path().display(), "helper process spawned");
        *exchange = Some(Channel { stdin, pending, alive: Arc::clone(&alive) });
        *self.running.lock() = Some(Running { child, pid, payload, alive, reader, relay });
        drop(exchange);

        let init = Command::init(&self.config.jmx);
        let response = self
            .send(init, self.config.init_timeout)
            .await
            .map_err(|e| HelperError::Init(e.to_string()))?;
        if !response.is_ok() {
            return Err(HelperError::Init(response.describe()));
        }
        Ok(())
    }

    /// Run one command/response exchange.
    ///
    /// Waiting for the exchange lock counts against `timeout`. Expiry leaves
    /// the helper running; its eventual reply is dropped.
    pub async fn send(&self, mut command: Command, timeout: Duration) -> Result<Response, HelperError> {
        let kind = command.command;
        let expired = || HelperError::DeadlineExceeded { command: kind, timeout };
        if timeout.is_zero() {
            return Err(expired());
        }
        let deadline = tokio::time::Instant::now() + timeout;

        let mut exchange = tokio::time::timeout_at(deadline, self.exchange.lock())
            .await
            .map_err(|_| expired())?;
        let channel = exchange.as_mut().ok_or(HelperError::NotRunning)?;
        if !channel.alive.load(Ordering::Acquire) {
            return Err(HelperError::StreamClosed);
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        command.id = id;
        let (tx, rx) = oneshot::channel();
        let _slot = channel.pending.register(id, tx);

        match tokio::time::timeout_at(deadline, jx_wire::write_line(&mut channel.stdin, &command))
            .await
        {
            Err(_) => return Err(expired()),
            Ok(Err(e)) => return Err(HelperError::Write(e.to_string())),
            Ok(Ok(())) => {}
        }

        match tokio::time::timeout_at(deadline, rx).await {
            Err(_) => {
                tracing::warn!(id, command = %kind, timeout_ms = timeout.as_millis() as u64, "helper call timed out");
                Err(expired())
            }
            Ok(Err(_)) => Err(HelperError::StreamClosed),
            Ok(Ok(reply)) => reply,
        }
    }

    /// Stop the helper and release its resources. Idempotent.
    pub async fn shutdown(&self) {
        if self.is_running() {
            let bye = Command::shutdown(&self.config.jmx);
            if let Err(e) = self.send(bye, self.config.shutdown_timeout).await {
                tracing::debug!(error = %e, "SHUTDOWN not acknowledged");
            }
        }

        // Waits for any in-flight exchange; closing stdin signals EOF to the helper.
        let channel = self.exchange.lock().await.take();
        let running = self.running.lock().take();
        let Some(mut running) = running else {
            return;
        };

        let status = match tokio::time::timeout(self.config.shutdown_grace, running.child.wait()).await
        {
            Ok(status) => status,
            Err(_) => {
                tracing::warn!(pid = ?running.pid, "helper did not exit in time, killing");
                if let Err(e) = running.child.start_kill() {
                    tracing::debug!(error = %e, "kill failed");
                }
                running.child.wait().await
            }
        };
        running.alive.store(false, Ordering::Release);

        if let Some(channel) = channel {
            channel.pending.fail_all(|| HelperError::StreamClosed);
        }
        for task in [running.reader, running.relay] {
            if tokio::time::timeout(Duration::from_secs(1), task).await.is_err() {
                tracing::debug!(pid = ?running.pid, "helper pipe task still draining, detaching");
            }
        }
        if let Err(e) = running.payload.remove() {
            tracing::warn!(path = %running.payload.path().display(), error = %e, "failed to remove helper payload");
        }

        match status {
            Ok(status) => tracing::info!(pid = ?running.pid, %status, "helper stopped"),
            Err(e) => tracing::warn!(pid = ?running.pid, error = %e, "failed to reap helper"),
        }
    }
}

/// Route stdout lines to pending callers until the helper closes the stream.
async fn demux<R>(mut stdout: R, pending: Arc<Pending>, alive: Arc<AtomicBool>, pid: Option<u32>)
where
    R: AsyncBufRead + Unpin,
{
    loop {
        match jx_wire::read_line(&mut stdout).await {
            Ok(Some(line)) => match jx_wire::decode_line::<Response>(&line) {
                Ok(response) => {
                    let id = response.id;
                    if !pending.resolve(response) {
                        tracing::debug!(?pid, ?id, "discarding helper response with no waiting caller");
                    }
                }
                Err(e) => {
                    tracing::warn!(?pid, error = %e, "malformed helper output");
                    pending.fail_all(|| HelperError::Malformed(e.to_string()));
                }
            },
            Ok(None) => break,
            Err(e @ (ProtocolError::LineTooLong | ProtocolError::InvalidUtf8)) => {
                tracing::warn!(?pid, error = %e, "unreadable helper output");
                pending.fail_all(|| HelperError::Malformed(e.to_string()));
            }
            Err(e) => {
                tracing::warn!(?pid, error = %e, "helper stdout read failed");
                break;
            }
        }
    }
    alive.store(false, Ordering::Release);
    pending.fail_all(|| HelperError::StreamClosed);
    tracing::info!(?pid, "helper output closed");
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
