// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Pulls the mirror-owned reference tables into the store.

use crate::SharedPersistence;
use crate::config::ReplicationConfig;
use crate::error::{MirrorError, ReplicationError};
use crate::mirror::{Mirror, MirrorRow};
use crate::transform::{parse_commission_tiers, parse_employee_settings};
use shiftbook_domain::CommissionTier;
use shiftbook_persistence::{EmployeeSettings, ReplaceSummary};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// A table whose authoritative copy lives in the mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceTable {
    /// Hourly wage and commission override per employee.
    EmployeeSettings,
    /// The commission tier bands.
    CommissionTiers,
}

impl ReferenceTable {
    /// Every reference table, in pull order.
    pub const ALL: [Self; 2] = [Self::EmployeeSettings, Self::CommissionTiers];

    /// Mirror sheet name.
    #[must_use]
    pub const fn sheet_name(&self) -> &'static str {
        match self {
            Self::EmployeeSettings => "EmployeeSettings",
            Self::CommissionTiers => "CommissionTiers",
        }
    }
}

impl std::fmt::Display for ReferenceTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.sheet_name())
    }
}

/// Something holding a copy of reference data that must be dropped after a pull.
pub trait CacheInvalidation: Send + Sync {
    /// Drops every cached row of `table`.
    fn invalidate(&self, table: ReferenceTable);
}

/// Reads one reference sheet and replaces the store's copy.
///
/// The replacement runs in one transaction. It never enqueues events for
/// the pulled sheet itself; employees whose settings changed are pushed to
/// the `Employees` sheet. Caches are invalidated only when it commits.
///
/// # Errors
///
/// Returns an error if the mirror cannot be read in time, a row is
/// malformed or the store refuses the table. The store is unchanged.
pub async fn pull_reference_table(
    persistence: &SharedPersistence,
    mirror: &dyn Mirror,
    caches: &[Arc<dyn CacheInvalidation>],
    table: ReferenceTable,
    read_timeout: Duration,
) -> Result<ReplaceSummary, ReplicationError> {
    let sheet: &str = table.sheet_name();
    let rows: Vec<MirrorRow> = tokio::time::timeout(read_timeout, mirror.read_all(sheet))
        .await
        .map_err(|_| {
            MirrorError::Timeout(u64::try_from(read_timeout.as_millis()).unwrap_or(u64::MAX))
        })??;
    debug!(%table, rows = rows.len(), "Read reference sheet");

    let summary: ReplaceSummary = match table {
        ReferenceTable::EmployeeSettings => {
            let settings: Vec<EmployeeSettings> = parse_employee_settings(&rows)?;
            persistence
                .lock()
                .await
                .replace_employee_settings(&settings)?
        }
        ReferenceTable::CommissionTiers => {
            let tiers: Vec<CommissionTier> = parse_commission_tiers(&rows)?;
            persistence.lock().await.replace_commission_tiers(&tiers)?
        }
    };

    for cache in caches {
        cache.invalidate(table);
    }

    Ok(summary)
}

/// Periodic pull of every reference table.
pub struct PullTask {
    persistence: SharedPersistence,
    mirror: Arc<dyn Mirror>,
    caches: Vec<Arc<dyn CacheInvalidation>>,
    config: ReplicationConfig,
    shutdown: CancellationToken,
}

impl PullTask {
    /// Creates the task. Nothing runs until [`PullTask::run`].
    #[must_use]
    pub fn new(
        persistence: SharedPersistence,
        mirror: Arc<dyn Mirror>,
        caches: Vec<Arc<dyn CacheInvalidation>>,
        config: ReplicationConfig,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            persistence,
            mirror,
            caches,
            config,
            shutdown,
        }
    }

    /// Pulls every table once. A failed table is logged and skipped.
    ///
    /// # Returns
    ///
    /// The number of tables replaced.
    pub async fn pull_once(&self) -> usize {
        let mut replaced: usize = 0;

        for table in ReferenceTable::ALL {
            match pull_reference_table(
                &self.persistence,
                self.mirror.as_ref(),
                &self.caches,
                table,
                self.config.apply_timeout,
            )
            .await
            {
                Ok(summary) => {
                    info!(
                        %table,
                        inserted = summary.inserted,
                        updated = summary.updated,
                        deactivated = summary.deactivated,
                        unchanged = summary.unchanged,
                        skipped = summary.skipped,
                        "Pulled reference table"
                    );
                    replaced += 1;
                }
                Err(e) => error!(%table, error = %e, "Reference table pull failed"),
            }
        }

        replaced
    }

    /// Pulls on every `pull_interval` tick until shutdown.
    pub async fn run(self) {
        info!(
            interval_secs = self.config.pull_interval.as_secs(),
            "Reference pull task started"
        );
        let mut ticker = tokio::time::interval(self.config.pull_interval);

        loop {
            tokio::select! {
                () = self.shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    self.pull_once().await;
                }
            }
        }

        info!("Reference pull task stopped");
    }
}
