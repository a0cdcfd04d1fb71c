// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Temp file holding the helper program for the lifetime of one process.
//!
//! Names embed the collector's pid and a random suffix so concurrent
//! collectors never share or delete each other's file. The file is removed
//! on [`PayloadFile::remove`] or, failing that, on drop.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct PayloadFile {
    path: PathBuf,
    removed: bool,
}

impl PayloadFile {
    pub fn write(dir: &Path, prefix: &str, bytes: &[u8]) -> std::io::Result<Self> {
        let name = format!("{prefix}-{}-{}.jar", std::process::id(), uuid::Uuid::new_v4().simple());
        let path = dir.join(name);
        let mut file = OpenOptions::new().write(true).create_new(true).open(&path)?;
        // From here on the guard owns the path, so a failed write still cleans up.
        let guard = Self { path, removed: false };
        file.write_all(bytes)?;
        file.sync_all()?;
        Ok(guard)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the file; a file that is already gone counts as removed.
    pub fn remove(&mut self) -> std::io::Result<()> {
        if self.removed {
            return Ok(());
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
        self.removed = true;
        Ok(())
    }
}

impl Drop for PayloadFile {
    fn drop(&mut self) {
        if let Err(e) = self.remove() {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to remove helper payload");
        }
    }
}

#[cfg(test)]
#[path = "payload_tests.rs"]
mod tests;
