// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::clock::FakeClock;
use proptest::prelude::*;

fn breaker(max_failures: u32, reset_secs: u64) -> (CircuitBreaker<FakeClock>, FakeClock) {
    let clock = FakeClock::new();
    let config = BreakerConfig {
        max_failures,
        reset_timeout: Duration::from_secs(reset_secs),
        half_open_max_calls: 1,
    };
    (CircuitBreaker::with_clock(config, clock.clone()), clock)
}

fn open(cb: &CircuitBreaker<FakeClock>) {
    for _ in 0..cb.config().max_failures {
        cb.record_failure();
    }
    assert_eq!(cb.state(), BreakerState::Open);
}

#[test]
fn starts_closed_and_admits_calls() {
    let (cb, _) = breaker(3, 10);
    assert_eq!(cb.state(), BreakerState::Closed);
    assert!(cb.can_attempt());
    assert!(cb.before_call().is_ok());
}

#[test]
fn opens_once_failures_reach_threshold() {
    let (cb, _) = breaker(3, 10);
    cb.record_failure();
    cb.record_failure();
    assert_eq!(cb.state(), BreakerState::Closed);
    cb.record_failure();
    assert_eq!(cb.state(), BreakerState::Open);
    assert!(!cb.can_attempt());
    assert_eq!(cb.before_call(), Err(BreakerError::Open { failures: 3 }));
}

#[test]
fn success_in_closed_resets_failure_count() {
    let (cb, _) = breaker(3, 10);
    cb.record_failure();
    cb.record_failure();
    cb.record_success();
    assert_eq!(cb.failure_count(), 0);
    cb.record_failure();
    cb.record_failure();
    assert_eq!(cb.state(), BreakerState::Closed);
}

#[test]
fn stays_open_until_reset_timeout_strictly_elapsed() {
    let (cb, clock) = breaker(2, 10);
    open(&cb);
    clock.advance(Duration::from_secs(10));
    assert!(!cb.can_attempt());
    clock.advance(Duration::from_millis(1));
    assert!(cb.can_attempt());
    assert_eq!(cb.state(), BreakerState::HalfOpen);
}

#[test]
fn half_open_admits_exactly_one_trial() {
    let (cb, clock) = breaker(2, 10);
    open(&cb);
    clock.advance(Duration::from_secs(11));
    assert!(cb.before_call().is_ok());
    assert_eq!(cb.state(), BreakerState::HalfOpen);
    assert_eq!(cb.before_call(), Err(BreakerError::HalfOpenSaturated { max_calls: 1 }));
    assert!(!cb.can_attempt());
}

#[test]
fn half_open_success_closes() {
    let (cb, clock) = breaker(2, 10);
    open(&cb);
    clock.advance(Duration::from_secs(11));
    cb.before_call().unwrap();
    cb.record_success();
    assert_eq!(
        cb.snapshot(),
        BreakerSnapshot { state: BreakerState::Closed, failure_count: 0, half_open_attempts: 0 }
    );
    assert!(cb.before_call().is_ok());
}

#[test]
fn half_open_failure_reopens_immediately() {
    let (cb, clock) = breaker(5, 10);
    for _ in 0..5 {
        cb.record_failure();
    }
    clock.advance(Duration::from_secs(11));
    cb.before_call().unwrap();
    cb.record_failure();
    assert_eq!(cb.state(), BreakerState::Open);
    assert!(!cb.can_attempt());

    // The new cool-down counts from the trial failure
    clock.advance(Duration::from_secs(5));
    assert!(!cb.can_attempt());
    clock.advance(Duration::from_secs(6));
    assert!(cb.can_attempt());
}

#[test]
fn unreported_trial_gets_new_window_after_reset_timeout() {
    let (cb, clock) = breaker(1, 10);
    cb.record_failure();
    clock.advance(Duration::from_secs(11));
    cb.before_call().unwrap();
    clock.advance(Duration::from_secs(5));
    assert!(cb.before_call().is_err());
    clock.advance(Duration::from_secs(6));
    assert!(cb.before_call().is_ok());
}

#[test]
fn late_success_while_open_keeps_circuit_open() {
    let (cb, _) = breaker(2, 10);
    open(&cb);
    cb.record_success();
    assert_eq!(cb.state(), BreakerState::Open);
    assert_eq!(cb.failure_count(), 0);
}

#[test]
fn zero_limits_are_clamped() {
    let clock = FakeClock::new();
    let config =
        BreakerConfig { max_failures: 0, reset_timeout: Duration::ZERO, half_open_max_calls: 0 };
    let cb = CircuitBreaker::with_clock(config, clock.clone());
    assert_eq!(cb.config().max_failures, 1);
    assert_eq!(cb.config().half_open_max_calls, 1);
    cb.record_failure();
    clock.advance(Duration::from_millis(1));
    assert!(cb.before_call().is_ok());
}

#[yare::parameterized(
    closed    = { BreakerState::Closed,   0, "closed" },
    open      = { BreakerState::Open,     1, "open" },
    half_open = { BreakerState::HalfOpen, 2, "half-open" },
)]
fn state_codes_and_names(state: BreakerState, code: i64, name: &str) {
    assert_eq!(state.code(), code);
    assert_eq!(state.to_string(), name);
}

proptest! {
    #[test]
    fn open_until_reset_timeout(max in 1u32..8, extra in 0u32..8, wait_ms in 0u64..20_000) {
        let (cb, clock) = breaker(max, 10);
        for _ in 0..(max + extra) {
            cb.record_failure();
        }
        prop_assert!(!cb.can_attempt());
        clock.advance(Duration::from_millis(wait_ms));
        prop_assert_eq!(cb.can_attempt(), wait_ms > 10_000);
    }

    #[test]
    fn below_threshold_never_opens(max in 2u32..10, failures in 0u32..10) {
        prop_assume!(failures < max);
        let (cb, _) = breaker(max, 10);
        for _ in 0..failures {
            cb.record_failure();
        }
        prop_assert_eq!(cb.state(), BreakerState::Closed);
        prop_assert!(cb.before_call().is_ok());
    }
}
