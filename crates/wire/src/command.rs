// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Target;

/// Protocol revision sent with every command. Revision 2 adds request ids.
pub const PROTOCOL_VERSION: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandKind {
    Init,
    Ping,
    Scrape,
    Shutdown,
}

jx_core::simple_display! {
    CommandKind {
        Init => "INIT",
        Ping => "PING",
        Scrape => "SCRAPE",
        Shutdown => "SHUTDOWN",
    }
}

/// JMX endpoint and credentials, repeated on every command
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JmxConnection {
    pub url: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub classpath: String,
}

impl fmt::Debug for JmxConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JmxConnection")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &redact(&self.password))
            .field("classpath", &self.classpath)
            .finish()
    }
}

/// Request sent to the helper
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    /// Assigned by the supervisor just before the command is written
    #[serde(default)]
    pub id: u64,
    pub command: CommandKind,
    pub protocol_version: u32,
    #[serde(default)]
    pub jmx_url: String,
    #[serde(default)]
    pub jmx_username: String,
    #[serde(default)]
    pub jmx_password: String,
    #[serde(default)]
    pub jmx_classpath: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Target>,
    /// 0 = unbounded
    #[serde(default)]
    pub max_items: u32,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub collect_options: BTreeMap<String, bool>,
}

impl Command {
    fn new(command: CommandKind, conn: &JmxConnection) -> Self {
        Self {
            id: 0,
            command,
            protocol_version: PROTOCOL_VERSION,
            jmx_url: conn.url.clone(),
            jmx_username: conn.username.clone(),
            jmx_password: conn.password.clone(),
            jmx_classpath: conn.classpath.clone(),
            target: None,
            max_items: 0,
            collect_options: BTreeMap::new(),
        }
    }

    pub fn init(conn: &JmxConnection) -> Self {
        Self::new(CommandKind::Init, conn)
    }

    pub fn ping(conn: &JmxConnection) -> Self {
        Self::new(CommandKind::Ping, conn)
    }

    pub fn shutdown(conn: &JmxConnection) -> Self {
        Self::new(CommandKind::Shutdown, conn)
    }

    pub fn scrape(conn: &JmxConnection, target: Target) -> Self {
        Self { target: Some(target), ..Self::new(CommandKind::Scrape, conn) }
    }

    pub fn with_max_items(mut self, max_items: u32) -> Self {
        self.max_items = max_items;
        self
    }

    pub fn with_collect_options(mut self, options: BTreeMap<String, bool>) -> Self {
        self.collect_options = options;
        self
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("id", &self.id)
            .field("command", &self.command)
            .field("protocol_version", &self.protocol_version)
            .field("jmx_url", &self.jmx_url)
            .field("jmx_username", &self.jmx_username)
            .field("jmx_password", &redact(&self.jmx_password))
            .field("target", &self.target)
            .field("max_items", &self.max_items)
            .field("collect_options", &self.collect_options)
            .finish()
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        ""
    } else {
        "***"
    }
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
