// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Collector configuration, loaded from TOML.
//!
//! ```toml
//! jmx_url = "service:jmx:iiop://dmgr01:2809/jndi/JMXConnector"
//! jmx_username = "wsadmin"
//! jmx_password = "secret"
//! helper_jar = "/opt/jx/jmx-helper.jar"
//! poll_interval = "10s"
//! targets = ["JVM", "THREADPOOLS", "JDBC"]
//!
//! [breaker]
//! max_failures = 5
//! reset_timeout = "1m"
//!
//! [retry]
//! max_retries = 3
//! multiplier = 2.0
//!
//! [monitor]
//! check_interval = "30s"
//! max_restarts = 3
//! ```
//!
//! Every field has a default. Intervals that drive a timer must be non-zero.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use jx_core::BreakerConfig;
use jx_helper::{env, HelperConfig, MonitorConfig, Payload};
use jx_wire::{JmxConnection, Target};
use serde::{Deserialize, Deserializer};

use crate::error::ConfigError;
use crate::resilience::RetryPolicy;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    pub jmx_url: String,
    pub jmx_username: String,
    pub jmx_password: String,
    pub jmx_classpath: String,
    /// Helper jar shipped alongside the collector
    pub helper_jar: PathBuf,
    /// Launcher override; otherwise `JX_JAVA`, then `$JAVA_HOME/bin/java`, then `java`
    pub java_path: Option<PathBuf>,
    /// Where the per-start payload copy is written; OS temp dir when unset
    pub temp_dir: Option<PathBuf>,
    #[serde(deserialize_with = "de_duration")]
    pub poll_interval: Duration,
    #[serde(deserialize_with = "de_duration")]
    pub scrape_timeout: Duration,
    /// Wall-clock cap on one resilient cycle; three poll intervals when unset
    #[serde(deserialize_with = "de_opt_duration")]
    pub cycle_budget: Option<Duration>,
    pub targets: Vec<Target>,
    /// Per-target item cap forwarded to the helper; 0 is unbounded
    pub max_items: u32,
    pub collect_options: BTreeMap<String, bool>,
    pub breaker: BreakerSection,
    pub retry: RetrySection,
    pub monitor: MonitorSection,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            jmx_url: String::new(),
            jmx_username: String::new(),
            jmx_password: String::new(),
            jmx_classpath: String::new(),
            helper_jar: PathBuf::from("jmx-helper.jar"),
            java_path: None,
            temp_dir: None,
            poll_interval: Duration::from_secs(10),
            scrape_timeout: Duration::from_secs(5),
            cycle_budget: None,
            targets: vec![Target::Jvm, Target::ThreadPools],
            max_items: 0,
            collect_options: BTreeMap::new(),
            breaker: BreakerSection::default(),
            retry: RetrySection::default(),
            monitor: MonitorSection::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BreakerSection {
    pub max_failures: u32,
    #[serde(deserialize_with = "de_duration")]
    pub reset_timeout: Duration,
    pub half_open_max_calls: u32,
}

impl Default for BreakerSection {
    fn default() -> Self {
        let defaults = BreakerConfig::default();
        Self {
            max_failures: defaults.max_failures,
            reset_timeout: defaults.reset_timeout,
            half_open_max_calls: defaults.half_open_max_calls,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrySection {
    pub max_retries: u32,
    pub multiplier: f64,
    #[serde(deserialize_with = "de_duration")]
    pub max_delay: Duration,
}

impl Default for RetrySection {
    fn default() -> Self {
        let defaults = RetryPolicy::default();
        Self {
            max_retries: defaults.max_retries,
            multiplier: defaults.multiplier,
            max_delay: defaults.max_delay,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MonitorSection {
    #[serde(deserialize_with = "de_duration")]
    pub check_interval: Duration,
    #[serde(deserialize_with = "de_duration")]
    pub ping_timeout: Duration,
    #[serde(deserialize_with = "de_duration")]
    pub restart_delay: Duration,
    pub max_restarts: u32,
}

impl Default for MonitorSection {
    fn default() -> Self {
        let defaults = MonitorConfig::default();
        Self {
            check_interval: defaults.check_interval,
            ping_timeout: defaults.ping_timeout,
            restart_delay: defaults.restart_delay,
            max_restarts: defaults.max_restarts,
        }
    }
}

impl CollectorConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval.is_zero() {
            return Err(ConfigError::ZeroInterval { field: "poll_interval" });
        }
        if self.monitor.check_interval.is_zero() {
            return Err(ConfigError::ZeroInterval { field: "monitor.check_interval" });
        }
        Ok(())
    }

    pub fn connection(&self) -> JmxConnection {
        JmxConnection {
            url: self.jmx_url.clone(),
            username: self.jmx_username.clone(),
            password: self.jmx_password.clone(),
            classpath: self.jmx_classpath.clone(),
        }
    }

    pub fn cycle_budget(&self) -> Duration {
        self.cycle_budget.unwrap_or(self.poll_interval.saturating_mul(3))
    }

    pub fn breaker_config(&self) -> BreakerConfig {
        BreakerConfig {
            max_failures: self.breaker.max_failures,
            reset_timeout: self.breaker.reset_timeout,
            half_open_max_calls: self.breaker.half_open_max_calls,
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.retry.max_retries,
            multiplier: self.retry.multiplier,
            max_delay: self.retry.max_delay,
        }
    }

    pub fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            check_interval: self.monitor.check_interval,
            ping_timeout: self.monitor.ping_timeout,
            restart_delay: self.monitor.restart_delay,
            max_restarts: self.monitor.max_restarts,
            ..MonitorConfig::default()
        }
    }

    /// Helper launch settings for `payload`.
    pub fn helper_config(&self, payload: Payload) -> HelperConfig {
        let java_path = self.java_path.clone().unwrap_or_else(env::java_path);
        HelperConfig::new(payload, self.connection())
            .java_path(java_path)
            .temp_dir(self.temp_dir.clone())
    }
}

/// Parse `"500ms"`, `"5s"`, `"2m"`, `"1h"`; a bare number is seconds.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    let (num_str, suffix) = s
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| (&s[..i], &s[i..]))
        .unwrap_or((s, ""));

    let num: u64 = num_str.parse().map_err(|_| format!("invalid number in duration: {}", s))?;

    let multiplier = match suffix.trim() {
        "ms" | "millis" => return Ok(Duration::from_millis(num)),
        "" | "s" | "sec" | "secs" => 1,
        "m" | "min" | "mins" => 60,
        "h" | "hr" | "hrs" => 3600,
        other => return Err(format!("unknown duration suffix: {}", other)),
    };

    let secs = num
        .checked_mul(multiplier)
        .ok_or_else(|| format!("duration out of range: {}", s))?;
    Ok(Duration::from_secs(secs))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDuration {
    Secs(u64),
    Text(String),
}

impl RawDuration {
    fn into_duration<E: serde::de::Error>(self) -> Result<Duration, E> {
        match self {
            RawDuration::Secs(secs) => Ok(Duration::from_secs(secs)),
            RawDuration::Text(text) => parse_duration(&text).map_err(E::custom),
        }
    }
}

fn de_duration<'de, D: Deserializer<'de>>(de: D) -> Result<Duration, D::Error> {
    RawDuration::deserialize(de)?.into_duration()
}

fn de_opt_duration<'de, D: Deserializer<'de>>(de: D) -> Result<Option<Duration>, D::Error> {
    Option::<RawDuration>::deserialize(de)?.map(RawDuration::into_duration).transpose()
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
