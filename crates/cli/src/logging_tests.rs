// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;

#[yare::parameterized(
    nested = { "/var/log/jx/collector.log", "/var/log/jx", "collector.log" },
    relative = { "logs/jx.log", "logs", "jx.log" },
    bare = { "jx.log", ".", "jx.log" },
)]
fn splits_log_path(input: &str, dir: &str, name: &str) {
    let (d, n) = split_log_path(Path::new(input)).unwrap();
    assert_eq!(d, PathBuf::from(dir));
    assert_eq!(n, OsString::from(name));
}

#[test]
fn rejects_path_without_file_name() {
    assert!(split_log_path(Path::new("/")).is_err());
}

#[test]
#[serial]
fn filter_reads_env() {
    std::env::set_var(LOG_ENV, "jx_helper=debug");
    assert_eq!(env_filter().to_string(), "jx_helper=debug");
    std::env::remove_var(LOG_ENV);
    assert_eq!(env_filter().to_string(), "info");
}
