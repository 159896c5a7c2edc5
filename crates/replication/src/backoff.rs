// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Retry delays for failed deliveries.

use crate::config::ReplicationConfig;
use std::time::Duration;

/// `base × 2^(attempts − 1)`, never above `cap`.
///
/// `attempts` counts failures so far; zero is treated as one.
#[must_use]
pub fn exponential_delay(base: Duration, cap: Duration, attempts: u32) -> Duration {
    let exponent: u32 = attempts.saturating_sub(1).min(31);
    base.checked_mul(1_u32 << exponent)
        .map_or(cap, |delay| delay.min(cap))
}

/// Adds a random delay of at most `jitter` to `delay`.
#[must_use]
pub fn jittered(delay: Duration, jitter: Duration) -> Duration {
    let max_ms: u64 = u64::try_from(jitter.as_millis()).unwrap_or(u64::MAX);
    if max_ms == 0 {
        return delay;
    }
    let extra_ms: u64 = rand::random::<u64>() % max_ms.saturating_add(1);
    delay.saturating_add(Duration::from_millis(extra_ms))
}

/// Delay before retrying an event that has failed `attempts` times.
#[must_use]
pub fn retry_delay(config: &ReplicationConfig, attempts: u32) -> Duration {
    jittered(
        exponential_delay(config.backoff_base, config.backoff_cap, attempts),
        config.backoff_jitter,
    )
}
