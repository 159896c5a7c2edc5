// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

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

//! Change events recorded alongside every replicated mutation.
//!
//! An `OutboxEvent` is written in the same transaction as the entity change
//! it describes. Its payload is a self-contained snapshot of the entity, so
//! the replication worker never has to read the entity table back.

mod snapshot;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub use snapshot::{
    BonusSnapshot, BonusTransactionSnapshot, EmployeeSnapshot, EntitySnapshot, ProductLine,
    RankSnapshot, SettlementSnapshot, ShiftSnapshot,
};

/// Current wall-clock time in unix milliseconds.
#[must_use]
pub fn now_millis() -> i64 {
    let nanos: i128 = time::OffsetDateTime::now_utc().unix_timestamp_nanos();
    i64::try_from(nanos / 1_000_000).unwrap_or(i64::MAX)
}

/// Priority assigned to tables without an explicit entry.
pub const DEFAULT_PRIORITY: i32 = 7;

/// Replicated entity tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityTable {
    /// `shifts`
    Shifts,
    /// `active_bonuses`
    ActiveBonuses,
    /// `employees`
    Employees,
    /// `employee_fortnights`
    EmployeeFortnights,
    /// `employee_ranks`
    EmployeeRanks,
    /// `bonus_transactions`
    BonusTransactions,
}

impl EntityTable {
    /// Every replicated table.
    pub const ALL: [Self; 6] = [
        Self::Shifts,
        Self::ActiveBonuses,
        Self::Employees,
        Self::EmployeeFortnights,
        Self::EmployeeRanks,
        Self::BonusTransactions,
    ];

    /// Store table name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Shifts => "shifts",
            Self::ActiveBonuses => "active_bonuses",
            Self::Employees => "employees",
            Self::EmployeeFortnights => "employee_fortnights",
            Self::EmployeeRanks => "employee_ranks",
            Self::BonusTransactions => "bonus_transactions",
        }
    }

    /// Mirror sheet name.
    #[must_use]
    pub const fn sheet_name(&self) -> &'static str {
        match self {
            Self::Shifts => "Shifts",
            Self::ActiveBonuses => "ActiveBonuses",
            Self::Employees => "Employees",
            Self::EmployeeFortnights => "EmployeeFortnights",
            Self::EmployeeRanks => "EmployeeRanks",
            Self::BonusTransactions => "BonusTransactions",
        }
    }

    /// Drain priority. Lower values are pushed first.
    #[must_use]
    pub const fn priority(&self) -> i32 {
        match self {
            Self::Shifts => 1,
            Self::ActiveBonuses => 2,
            Self::Employees => 3,
            Self::EmployeeFortnights => 4,
            Self::EmployeeRanks => 5,
            Self::BonusTransactions => 6,
        }
    }
}

/// Drain priority for a raw table name.
#[must_use]
pub fn priority_for(table: &str) -> i32 {
    EntityTable::from_str(table).map_or(DEFAULT_PRIORITY, |t| t.priority())
}

impl FromStr for EntityTable {
    type Err = OutboxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "shifts" => Ok(Self::Shifts),
            "active_bonuses" => Ok(Self::ActiveBonuses),
            "employees" => Ok(Self::Employees),
            "employee_fortnights" => Ok(Self::EmployeeFortnights),
            "employee_ranks" => Ok(Self::EmployeeRanks),
            "bonus_transactions" => Ok(Self::BonusTransactions),
            _ => Err(OutboxError::UnknownTable(s.to_string())),
        }
    }
}

impl std::fmt::Display for EntityTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What happened to the entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutboxOperation {
    Insert,
    Update,
    Delete,
}

impl OutboxOperation {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl FromStr for OutboxOperation {
    type Err = OutboxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "insert" => Ok(Self::Insert),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            _ => Err(OutboxError::UnknownOperation(s.to_string())),
        }
    }
}

impl std::fmt::Display for OutboxOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Delivery state of an event.
///
/// `Done` and `Failed` are terminal and retained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutboxStatus {
    /// Waiting to be claimed.
    Pending,
    /// Claimed by the worker.
    InFlight,
    /// Applied to the mirror.
    Done,
    /// Gave up after exhausting retries.
    Failed,
}

impl OutboxStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InFlight => "in_flight",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }

    /// Whether the event will never be delivered again.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

impl FromStr for OutboxStatus {
    type Err = OutboxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "in_flight" => Ok(Self::InFlight),
            "done" => Ok(Self::Done),
            "failed" => Ok(Self::Failed),
            _ => Err(OutboxError::UnknownStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for OutboxStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A queued change event.
///
/// Timestamps are unix milliseconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboxEvent {
    /// Database identifier. `None` until persisted.
    pub event_id: Option<i64>,
    /// Table of the changed entity.
    pub entity_table: EntityTable,
    /// Identifier of the changed entity, as text.
    pub entity_id: String,
    /// What happened.
    pub operation: OutboxOperation,
    /// Entity state at enqueue time.
    pub payload: EntitySnapshot,
    /// Drain priority.
    pub priority: i32,
    /// When the event was recorded.
    pub enqueued_at: i64,
    /// Earliest time the event may be claimed.
    pub available_at: i64,
    /// Failed delivery attempts.
    pub attempts: u32,
    /// Deliveries refused by mirror throttling.
    pub rate_limit_hits: u32,
    /// Delivery state.
    pub status: OutboxStatus,
    /// Most recent delivery error.
    pub last_error: Option<String>,
    /// When the event reached a terminal state.
    pub processed_at: Option<i64>,
}

impl OutboxEvent {
    /// Creates a pending, unpersisted event for a snapshot.
    ///
    /// # Arguments
    ///
    /// * `operation` - The mutation being recorded
    /// * `payload` - Entity state after the mutation (before it, for deletes)
    /// * `now_ms` - Enqueue time in unix milliseconds
    #[must_use]
    pub fn new(operation: OutboxOperation, payload: EntitySnapshot, now_ms: i64) -> Self {
        let entity_table: EntityTable = payload.table();
        Self {
            event_id: None,
            entity_table,
            entity_id: payload.entity_id(),
            operation,
            payload,
            priority: entity_table.priority(),
            enqueued_at: now_ms,
            available_at: now_ms,
            attempts: 0,
            rate_limit_hits: 0,
            status: OutboxStatus::Pending,
            last_error: None,
            processed_at: None,
        }
    }
}

/// Errors raised while building or decoding outbox events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboxError {
    /// The entity has not been persisted, so it has no identifier.
    MissingEntityId(&'static str),
    /// Unknown table name.
    UnknownTable(String),
    /// Unknown operation name.
    UnknownOperation(String),
    /// Unknown status name.
    UnknownStatus(String),
    /// The payload could not be encoded or decoded.
    Payload(String),
}

impl std::fmt::Display for OutboxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingEntityId(entity) => {
                write!(f, "Cannot snapshot {entity} without an identifier")
            }
            Self::UnknownTable(t) => write!(f, "Unknown outbox table: {t}"),
            Self::UnknownOperation(o) => write!(f, "Unknown outbox operation: {o}"),
            Self::UnknownStatus(s) => write!(f, "Unknown outbox status: {s}"),
            Self::Payload(msg) => write!(f, "Invalid outbox payload: {msg}"),
        }
    }
}

impl std::error::Error for OutboxError {}

/// Serializes a snapshot for storage.
///
/// # Errors
///
/// Returns `OutboxError::Payload` if serialization fails.
pub fn encode_payload(snapshot: &EntitySnapshot) -> Result<String, OutboxError> {
    serde_json::to_string(snapshot).map_err(|e| OutboxError::Payload(e.to_string()))
}

/// Deserializes a stored snapshot.
///
/// # Errors
///
/// Returns `OutboxError::Payload` if the JSON does not describe a snapshot.
pub fn decode_payload(payload: &str) -> Result<EntitySnapshot, OutboxError> {
    serde_json::from_str(payload).map_err(|e| OutboxError::Payload(e.to_string()))
}
