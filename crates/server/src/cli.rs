// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use clap::Parser;
use rust_decimal::Decimal;
use shiftbook_api::PayrollConfig;
use shiftbook_domain::DEFAULT_TIMEZONE;
use shiftbook_replication::ReplicationConfig;
use std::path::PathBuf;
use std::time::Duration;

/// Shiftbook Server - shift ledger, payroll and spreadsheet replication
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long)]
    pub database: Option<String>,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    pub port: u16,

    /// Directory holding the CSV mirror sheets. If not provided, replicates to memory.
    #[arg(short, long)]
    pub mirror_dir: Option<PathBuf>,

    /// Outbox events claimed per poll
    #[arg(long, default_value_t = 100)]
    pub batch_size: usize,

    /// Milliseconds between polls that found nothing to deliver
    #[arg(long, default_value_t = 2000)]
    pub poll_interval_ms: u64,

    /// Seconds between reference-table pulls
    #[arg(long, default_value_t = 300)]
    pub pull_interval_secs: u64,

    /// Failed deliveries before an event is marked failed
    #[arg(long, default_value_t = 5)]
    pub max_attempts: u32,

    /// First retry delay in milliseconds
    #[arg(long, default_value_t = 5000)]
    pub backoff_base_ms: u64,

    /// Largest retry delay in seconds
    #[arg(long, default_value_t = 900)]
    pub backoff_cap_secs: u64,

    /// Upper bound of the random retry delay in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub backoff_jitter_ms: u64,

    /// Seconds allowed for one mirror call
    #[arg(long, default_value_t = 30)]
    pub apply_timeout_secs: u64,

    /// Fortnight bonus rate per bonus-counter hit
    #[arg(long, default_value = "0.01")]
    pub bonus_rate: Decimal,

    /// IANA timezone of the business wall clock
    #[arg(long, default_value = DEFAULT_TIMEZONE)]
    pub timezone: String,
}

impl Args {
    /// Replication tuning from the command line.
    pub fn replication_config(&self) -> ReplicationConfig {
        ReplicationConfig {
            batch_size: self.batch_size,
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            pull_interval: Duration::from_secs(self.pull_interval_secs),
            max_attempts: self.max_attempts,
            backoff_base: Duration::from_millis(self.backoff_base_ms),
            backoff_cap: Duration::from_secs(self.backoff_cap_secs),
            backoff_jitter: Duration::from_millis(self.backoff_jitter_ms),
            apply_timeout: Duration::from_secs(self.apply_timeout_secs),
            ..ReplicationConfig::default()
        }
    }

    /// Payroll settings from the command line.
    pub fn payroll_config(&self) -> PayrollConfig {
        PayrollConfig {
            bonus_rate: self.bonus_rate,
            timezone: self.timezone.clone(),
        }
    }
}
