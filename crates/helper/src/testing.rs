// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stand-in helper for tests: a POSIX `sh` script speaking the line protocol.
//!
//! Behavior is steered through environment variables so one script covers
//! the happy path and the failure modes:
//!
//! - `JX_FAKE_INIT=fail|exit` — reject INIT, or exit before answering it
//! - `JX_FAKE_PING_FAIL_FILE=<path>` — answer PING with ERROR while the file exists
//! - `JX_FAKE_SCRAPE_DELAY=<secs>` — sleep before answering SCRAPE
//! - `JX_FAKE_GARBAGE=1` — answer SCRAPE with a non-JSON line
//! - `JX_FAKE_NO_ID=1` — omit `id` from responses (revision-1 helper)
//! - `JX_FAKE_EXIT_ON_PING=1` — exit when pinged

use std::path::Path;
use std::time::Duration;

use jx_wire::JmxConnection;

use crate::config::HelperConfig;

pub const FAKE_HELPER_SCRIPT: &str = r#"
echo "INFO fake helper starting" >&2
while IFS= read -r line; do
  id=$(printf '%s\n' "$line" | sed -n 's/^{"id":\([0-9]*\),.*/\1/p')
  idf="\"id\":$id,"
  [ -n "$JX_FAKE_NO_ID" ] && idf=""
  case "$line" in
    *'"command":"INIT"'*)
      case "$JX_FAKE_INIT" in
        exit) exit 3 ;;
        fail) printf '{%s"status":"ERROR","message":"cannot connect to dmgr","recoverable":false}\n' "$idf" ;;
        *) printf '{%s"status":"OK","message":"initialized"}\n' "$idf" ;;
      esac ;;
    *'"command":"PING"'*)
      [ -n "$JX_FAKE_EXIT_ON_PING" ] && exit 4
      if [ -n "$JX_FAKE_PING_FAIL_FILE" ] && [ -e "$JX_FAKE_PING_FAIL_FILE" ]; then
        printf '{%s"status":"ERROR","message":"jmx connection lost","recoverable":true}\n' "$idf"
      else
        printf '{%s"status":"OK","message":"pong"}\n' "$idf"
      fi ;;
    *'"command":"SCRAPE"'*)
      [ -n "$JX_FAKE_SCRAPE_DELAY" ] && sleep "$JX_FAKE_SCRAPE_DELAY"
      if [ -n "$JX_FAKE_GARBAGE" ]; then
        echo "this is not json"
        continue
      fi
      case "$line" in
        *'"target":"JVM"'*)
          printf '{%s"status":"OK","data":{"heap":{"used":1048576,"max":4194304},"threads":{"live":42},"cpu":{"usage":0.25}}}\n' "$idf" ;;
        *'"target":"THREADPOOLS"'*)
          printf '{%s"status":"OK","data":{"pools":[{"name":"WebContainer","active":5,"max":50},{"name":"ORB.thread.pool","active":1,"max":10}]}}\n' "$idf" ;;
        *)
          printf '{%s"status":"ERROR","message":"target not available","recoverable":true}\n' "$idf" ;;
      esac ;;
    *'"command":"SHUTDOWN"'*)
      printf '{%s"status":"OK","message":"bye"}\n' "$idf"
      exit 0 ;;
  esac
done
"#;

pub fn test_connection() -> JmxConnection {
    JmxConnection {
        url: "service:jmx:iiop://dmgr01:2809/jndi/JMXConnector".to_string(),
        username: "wsadmin".to_string(),
        password: "secret".to_string(),
        classpath: String::new(),
    }
}

/// Config that runs [`FAKE_HELPER_SCRIPT`] through `sh`, with the payload
/// written into `temp_dir`.
pub fn fake_helper_config(temp_dir: &Path, env: &[(&str, &str)]) -> HelperConfig {
    HelperConfig::new(FAKE_HELPER_SCRIPT, test_connection())
        .java_path("sh")
        .launch_args(Vec::new())
        .temp_dir(Some(temp_dir.to_path_buf()))
        .env(env.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect())
        .init_timeout(Duration::from_secs(5))
        .shutdown_grace(Duration::from_millis(300))
        .shutdown_timeout(Duration::from_secs(1))
}

/// Number of payload files left in `dir`.
pub fn payload_files(dir: &Path) -> usize {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .filter(|e| e.path().extension().is_some_and(|ext| ext == "jar"))
                .count()
        })
        .unwrap_or(0)
}
