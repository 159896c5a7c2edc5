// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Replication between the shiftbook store and its spreadsheet mirror.
//!
//! Two long-lived tasks live here:
//!
//! - The push worker drains the outbox. Every event is applied to the
//!   mirror by locating its row by ID and overwriting it, so delivering an
//!   event twice never duplicates a row. Failures are retried with
//!   exponential backoff until the attempt budget runs out.
//! - The pull task periodically copies the two mirror-owned reference
//!   sheets (employee settings and commission tiers) into the store and
//!   tells registered caches to drop their copies.
//!
//! Neither task reports errors to ledger callers. Their outcome is visible
//! in the logs and in the outbox status column.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod backoff;
mod config;
mod error;
mod mirror;
mod pull;
mod transform;
mod worker;

#[cfg(test)]
mod tests;

pub use backoff::{exponential_delay, jittered, retry_delay};
pub use config::ReplicationConfig;
pub use error::{MirrorError, ReplicationError};
pub use mirror::{CsvMirror, InMemoryMirror, Mirror, MirrorRow, Sheet};
pub use pull::{CacheInvalidation, PullTask, ReferenceTable, pull_reference_table};
pub use transform::{parse_commission_tiers, parse_employee_settings, to_mirror_row};
pub use worker::{PushSummary, ReplicationWorker, apply_event};

use shiftbook_persistence::Persistence;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Persistence handle shared between request handlers and replication tasks.
pub type SharedPersistence = Arc<Mutex<Persistence>>;
