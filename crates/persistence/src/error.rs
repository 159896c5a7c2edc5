// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use shiftbook::CoreError;
use shiftbook_domain::DomainError;
use shiftbook_outbox::OutboxError;

/// Errors that can occur during persistence operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// A database error occurred.
    DatabaseError(String),
    /// The database was locked by another writer.
    Busy(String),
    /// A write broke a table constraint.
    ConstraintViolation(String),
    /// Database connection failed.
    DatabaseConnectionFailed(String),
    /// Database migration failed.
    MigrationFailed(String),
    /// Query execution failed.
    QueryFailed(String),
    /// Serialization/deserialization error.
    SerializationError(String),
    /// Initialization error.
    InitializationError(String),
    /// Foreign key enforcement is not enabled.
    ForeignKeyEnforcementNotEnabled,
    /// A stored row could not be decoded into a domain value.
    CorruptRow { table: &'static str, reason: String },
    /// The requested employee was not found.
    EmployeeNotFound(i64),
    /// The requested shift was not found.
    ShiftNotFound(i64),
    /// The requested settlement was not found.
    SettlementNotFound { employee_id: i64, period: String },
    /// The requested outbox event was not found.
    EventNotFound(i64),
    /// A failed outbox event has a newer event for the same entity.
    EventSuperseded { event_id: i64, by: i64 },
    /// A reference table replacement was refused.
    ReferenceRejected { table: &'static str, reason: String },
    /// The ledger refused the change.
    Ledger(CoreError),
    /// The requested resource was not found.
    NotFound(String),
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            Self::Busy(msg) => write!(f, "Database busy: {msg}"),
            Self::ConstraintViolation(msg) => write!(f, "Constraint violation: {msg}"),
            Self::DatabaseConnectionFailed(msg) => {
                write!(f, "Database connection failed: {msg}")
            }
            Self::MigrationFailed(msg) => write!(f, "Migration failed: {msg}"),
            Self::QueryFailed(msg) => write!(f, "Query failed: {msg}"),
            Self::SerializationError(msg) => write!(f, "Serialization error: {msg}"),
            Self::InitializationError(msg) => write!(f, "Initialization error: {msg}"),
            Self::ForeignKeyEnforcementNotEnabled => {
                write!(f, "Foreign key enforcement is not enabled")
            }
            Self::CorruptRow { table, reason } => {
                write!(f, "Corrupt row in {table}: {reason}")
            }
            Self::EmployeeNotFound(id) => write!(f, "Employee not found: {id}"),
            Self::ShiftNotFound(id) => write!(f, "Shift not found: {id}"),
            Self::SettlementNotFound {
                employee_id,
                period,
            } => {
                write!(
                    f,
                    "Settlement not found for employee_id={employee_id}, period={period}"
                )
            }
            Self::EventNotFound(id) => write!(f, "Outbox event not found: {id}"),
            Self::EventSuperseded { event_id, by } => {
                write!(f, "Outbox event {event_id} is superseded by event {by}")
            }
            Self::ReferenceRejected { table, reason } => {
                write!(f, "Refused to replace {table}: {reason}")
            }
            Self::Ledger(err) => write!(f, "Ledger error: {err}"),
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
        }
    }
}

impl std::error::Error for PersistenceError {}

/// SQLite reports lock contention through the message only.
fn is_busy(message: &str) -> bool {
    let message: String = message.to_ascii_lowercase();
    message.contains("database is locked")
        || message.contains("database table is locked")
        || message.contains("database is busy")
}

impl From<diesel::result::Error> for PersistenceError {
    fn from(err: diesel::result::Error) -> Self {
        use diesel::result::{DatabaseErrorKind, Error};

        match err {
            Error::NotFound => Self::NotFound("Record not found".to_string()),
            Error::DatabaseError(kind, info) => {
                let message: String = info.message().to_string();
                match kind {
                    DatabaseErrorKind::UniqueViolation
                    | DatabaseErrorKind::ForeignKeyViolation
                    | DatabaseErrorKind::CheckViolation
                    | DatabaseErrorKind::NotNullViolation => Self::ConstraintViolation(message),
                    DatabaseErrorKind::ClosedConnection => Self::DatabaseConnectionFailed(message),
                    _ if is_busy(&message) => Self::Busy(message),
                    _ => Self::DatabaseError(message),
                }
            }
            _ => Self::QueryFailed(err.to_string()),
        }
    }
}

impl From<diesel::ConnectionError> for PersistenceError {
    fn from(err: diesel::ConnectionError) -> Self {
        Self::DatabaseConnectionFailed(err.to_string())
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

impl From<CoreError> for PersistenceError {
    fn from(err: CoreError) -> Self {
        Self::Ledger(err)
    }
}

impl From<DomainError> for PersistenceError {
    fn from(err: DomainError) -> Self {
        Self::Ledger(CoreError::DomainViolation(err))
    }
}

impl From<OutboxError> for PersistenceError {
    fn from(err: OutboxError) -> Self {
        Self::SerializationError(err.to_string())
    }
}
