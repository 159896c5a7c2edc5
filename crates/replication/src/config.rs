// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::time::Duration;

/// Tuning for the push worker and the pull task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplicationConfig {
    /// Events claimed per poll.
    pub batch_size: usize,
    /// Sleep between polls that found nothing to deliver.
    pub poll_interval: Duration,
    /// Time between reference-table pulls.
    pub pull_interval: Duration,
    /// Failed deliveries after which an event is marked failed.
    pub max_attempts: u32,
    /// First retry delay; doubles with each failed attempt.
    pub backoff_base: Duration,
    /// Largest retry delay.
    pub backoff_cap: Duration,
    /// Upper bound of the random delay added to each retry.
    pub backoff_jitter: Duration,
    /// Fixed delay after the mirror throttles a delivery.
    pub rate_limit_backoff: Duration,
    /// Throttled deliveries after which an event is marked failed.
    pub max_rate_limit_hits: u32,
    /// Deadline for applying one event or reading one sheet.
    pub apply_timeout: Duration,
}

impl Default for ReplicationConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            poll_interval: Duration::from_secs(2),
            pull_interval: Duration::from_secs(300),
            max_attempts: 5,
            backoff_base: Duration::from_secs(5),
            backoff_cap: Duration::from_secs(15 * 60),
            backoff_jitter: Duration::from_secs(1),
            rate_limit_backoff: Duration::from_secs(30),
            max_rate_limit_hits: 20,
            apply_timeout: Duration::from_secs(30),
        }
    }
}
