// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Exponential delay helpers.

use std::time::Duration;

/// `base * 2^exponent`, capped at `max`.
pub fn doubling(base: Duration, exponent: u32, max: Duration) -> Duration {
    let factor = 1u32.checked_shl(exponent).unwrap_or(u32::MAX);
    base.checked_mul(factor).map_or(max, |d| d.min(max))
}

/// `multiplier^exponent` seconds, capped at `max`.
///
/// Non-finite or negative results fall back to `max`.
pub fn geometric_secs(multiplier: f64, exponent: u32, max: Duration) -> Duration {
    let secs = multiplier.powi(exponent.min(i32::MAX as u32) as i32);
    if !secs.is_finite() || secs < 0.0 || secs >= max.as_secs_f64() {
        return max;
    }
    Duration::from_secs_f64(secs)
}

#[cfg(test)]
#[path = "backoff_tests.rs"]
mod tests;
