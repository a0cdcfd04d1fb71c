// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    millis = { "500ms", Duration::from_millis(500) },
    secs = { "5s", Duration::from_secs(5) },
    bare = { "30", Duration::from_secs(30) },
    minutes = { "2m", Duration::from_secs(120) },
    hours = { "1h", Duration::from_secs(3600) },
    padded = { " 10s ", Duration::from_secs(10) },
)]
fn parses_durations(input: &str, expected: Duration) {
    assert_eq!(parse_duration(input), Ok(expected));
}

#[yare::parameterized(
    empty = { "" },
    no_number = { "s" },
    unknown_suffix = { "5w" },
    negative = { "-5s" },
    overflow = { "9999999999999999h" },
    overflow_minutes = { "18446744073709551615m" },
)]
fn rejects_bad_durations(input: &str) {
    assert!(parse_duration(input).is_err());
}

#[test]
fn empty_document_uses_defaults() {
    let config = CollectorConfig::from_toml_str("").unwrap();
    assert_eq!(config.poll_interval, Duration::from_secs(10));
    assert_eq!(config.scrape_timeout, Duration::from_secs(5));
    assert_eq!(config.cycle_budget(), Duration::from_secs(30));
    assert_eq!(config.targets, vec![Target::Jvm, Target::ThreadPools]);
    assert_eq!(config.breaker_config(), BreakerConfig::default());
    assert_eq!(config.retry_policy(), RetryPolicy::default());
    assert_eq!(config.monitor.max_restarts, 3);
    assert_eq!(config.monitor.restart_delay, Duration::from_secs(5));
}

#[test]
fn full_document_round_trips_into_component_configs() {
    let config = CollectorConfig::from_toml_str(
        r#"
        jmx_url = "service:jmx:iiop://dmgr01:2809/jndi/JMXConnector"
        jmx_username = "wsadmin"
        jmx_password = "secret"
        helper_jar = "/opt/jx/helper.jar"
        java_path = "/opt/ibm/java/bin/java"
        poll_interval = "5s"
        scrape_timeout = "1500ms"
        cycle_budget = 12
        targets = ["JVM", "JDBC", "THREADPOOLS", "HAMANAGER"]
        max_items = 50
        collect_options = { include_sessions = true }

        [breaker]
        max_failures = 2
        reset_timeout = "30s"

        [retry]
        max_retries = 4
        multiplier = 1.5

        [monitor]
        check_interval = "1m"
        max_restarts = 5
        "#,
    )
    .unwrap();

    assert_eq!(config.cycle_budget(), Duration::from_secs(12));
    assert_eq!(config.scrape_timeout, Duration::from_millis(1500));
    assert_eq!(
        config.targets,
        vec![Target::Jvm, Target::Jdbc, Target::ThreadPools, Target::HaManager]
    );
    assert_eq!(config.collect_options.get("include_sessions"), Some(&true));

    let breaker = config.breaker_config();
    assert_eq!(breaker.max_failures, 2);
    assert_eq!(breaker.reset_timeout, Duration::from_secs(30));
    assert_eq!(breaker.half_open_max_calls, 1);

    let retry = config.retry_policy();
    assert_eq!(retry.max_retries, 4);
    assert_eq!(retry.multiplier, 1.5);
    assert_eq!(retry.max_delay, Duration::from_secs(30));

    let monitor = config.monitor_config();
    assert_eq!(monitor.check_interval, Duration::from_secs(60));
    assert_eq!(monitor.max_restarts, 5);

    let helper = config.helper_config(Payload::from("jar"));
    assert_eq!(helper.java_path, PathBuf::from("/opt/ibm/java/bin/java"));
    assert_eq!(helper.launch_args, vec!["-jar".to_string()]);
    assert_eq!(helper.jmx.username, "wsadmin");
    assert_eq!(helper.jmx.password, "secret");
}

#[test]
fn bad_duration_is_a_parse_error() {
    let err = CollectorConfig::from_toml_str(r#"poll_interval = "soon""#).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)), "{err:?}");
}

#[yare::parameterized(
    poll_secs = { "poll_interval = \"0s\"", "poll_interval" },
    poll_bare = { "poll_interval = 0", "poll_interval" },
    check_millis = { "[monitor]\ncheck_interval = \"0ms\"", "monitor.check_interval" },
)]
fn zero_timer_interval_is_rejected(text: &str, expected: &str) {
    let err = CollectorConfig::from_toml_str(text).unwrap_err();
    match err {
        ConfigError::ZeroInterval { field } => assert_eq!(field, expected),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn derived_cycle_budget_saturates() {
    let config = CollectorConfig { poll_interval: Duration::MAX, ..CollectorConfig::default() };
    assert_eq!(config.cycle_budget(), Duration::MAX);
}

#[test]
fn unknown_target_is_a_parse_error() {
    let err = CollectorConfig::from_toml_str(r#"targets = ["JVM", "KAFKA"]"#).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)), "{err:?}");
}

#[test]
fn load_reports_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = CollectorConfig::load(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }), "{err:?}");
}

#[test]
fn load_reads_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("jx.toml");
    std::fs::write(&path, "jmx_url = \"service:jmx:rmi:///jndi/rmi://was01:9809/jmxrmi\"\n").unwrap();
    let config = CollectorConfig::load(&path).unwrap();
    assert_eq!(config.connection().url, "service:jmx:rmi:///jndi/rmi://was01:9809/jmxrmi");
}
