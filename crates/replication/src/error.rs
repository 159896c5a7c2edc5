// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use shiftbook_persistence::PersistenceError;
use thiserror::Error;

/// Failures reported by a mirror backend.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MirrorError {
    /// The mirror refused the call because of throughput limits.
    #[error("mirror rate limit exceeded")]
    RateLimited,
    /// The mirror could not be reached or read.
    #[error("mirror unavailable: {0}")]
    Unavailable(String),
    /// The call did not finish in time.
    #[error("mirror call timed out after {0} ms")]
    Timeout(u64),
    /// The mirror refused the data itself.
    #[error("mirror rejected {sheet}: {reason}")]
    Rejected {
        /// The sheet written to.
        sheet: String,
        /// Why the data was refused.
        reason: String,
    },
}

impl MirrorError {
    /// Whether the failure is the mirror throttling us.
    #[must_use]
    pub const fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited)
    }
}

/// Errors raised by the replication tasks.
#[derive(Debug, Error)]
pub enum ReplicationError {
    /// The store failed.
    #[error("store error: {0}")]
    Persistence(#[from] PersistenceError),
    /// The mirror failed.
    #[error(transparent)]
    Mirror(#[from] MirrorError),
    /// A mirror row could not be read as reference data.
    #[error("invalid {sheet} row {row}: {reason}")]
    InvalidRow {
        /// The sheet read.
        sheet: &'static str,
        /// One-based data row number.
        row: usize,
        /// What is wrong with it.
        reason: String,
    },
}
