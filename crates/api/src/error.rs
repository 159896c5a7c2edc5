// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use shiftbook::CoreError;
use shiftbook_domain::DomainError;
use shiftbook_persistence::PersistenceError;

/// API-level errors.
///
/// These are distinct from domain/core errors and represent the API contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The request violates an input contract or a ledger rule.
    Validation {
        /// The field or rule that was violated.
        field: String,
        /// A human-readable description of the violation.
        message: String,
    },
    /// A requested resource was not found.
    NotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// The store could not be reached or the write could not complete.
    ///
    /// Nothing was committed; the caller may retry.
    TransientIo {
        /// A description of the failure.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl ApiError {
    /// Shorthand for a `Validation` error.
    #[must_use]
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Shorthand for a `NotFound` error.
    #[must_use]
    pub fn not_found(resource_type: &str, message: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type: resource_type.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation { field, message } => {
                write!(f, "Invalid input for '{field}': {message}")
            }
            Self::NotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::TransientIo { message } => {
                write!(f, "Storage unavailable: {message}")
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    match err {
        DomainError::InvalidInput { field, reason } => ApiError::Validation {
            field,
            message: reason,
        },
        DomainError::NegativeAmount { field, amount } => ApiError::Validation {
            field,
            message: format!("must be non-negative, got {amount}"),
        },
        DomainError::InvalidTimeRange {
            clock_in,
            clock_out,
        } => ApiError::validation(
            "clock_out",
            format!("clock-out {clock_out} must be after clock-in {clock_in}"),
        ),
        DomainError::InvalidName(msg) => ApiError::validation("name", msg),
        DomainError::EmptyProductName => {
            ApiError::validation("product_sales", "product name must not be empty")
        }
        DomainError::DuplicateProduct(product) => ApiError::validation(
            "product_sales",
            format!("product '{product}' appears more than once"),
        ),
        DomainError::NoActiveTiers => {
            ApiError::not_found("Commission tier", "no active commission tiers are configured")
        }
        DomainError::NoActiveRanks => {
            ApiError::not_found("Rank", "no active sales ranks are configured")
        }
        DomainError::InvalidTier { name, reason } => {
            ApiError::validation("commission_tiers", format!("tier '{name}': {reason}"))
        }
        DomainError::InvalidShiftTransition { from, to } => ApiError::validation(
            "status",
            format!("shift cannot move from {from} to {to}"),
        ),
        DomainError::InvalidShiftStatus(value) => {
            ApiError::validation("status", format!("unknown shift status '{value}'"))
        }
        DomainError::InvalidBonusKind(value) => {
            ApiError::validation("kind", format!("unknown bonus kind '{value}'"))
        }
        DomainError::InvalidTransactionKind(value) => {
            ApiError::validation("kind", format!("unknown bonus transaction kind '{value}'"))
        }
        DomainError::InvalidHalf(value) => {
            ApiError::validation("half", format!("{value} is not 1 or 2"))
        }
        DomainError::InvalidMonth(value) => {
            ApiError::validation("month", format!("{value} is not in 1..=12"))
        }
        DomainError::DateArithmeticOverflow { operation } => {
            ApiError::validation("date", format!("date arithmetic overflow while {operation}"))
        }
        DomainError::DateParseError { date_string, error } => ApiError::validation(
            "date",
            format!("failed to parse '{date_string}': {error}"),
        ),
        DomainError::AmountParseError {
            amount_string,
            error,
        } => ApiError::validation(
            "amount",
            format!("failed to parse '{amount_string}': {error}"),
        ),
        DomainError::InvalidTimezone(name) => ApiError::Internal {
            message: format!("unknown business timezone '{name}'"),
        },
    }
}

/// Translates a core error into an API error.
///
/// This translation is explicit and ensures core errors are not leaked directly.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        CoreError::UnpersistedEmployee => ApiError::Internal {
            message: String::from("ledger state carried an unpersisted employee"),
        },
        CoreError::InactiveEmployee { employee_id } => ApiError::validation(
            "employee_id",
            format!("employee {employee_id} is inactive"),
        ),
        CoreError::MissingShift { shift_id } => {
            ApiError::not_found("Shift", format!("shift {shift_id} does not exist"))
        }
        CoreError::PeriodPaid { period } => ApiError::validation(
            "period_paid",
            format!("the settlement for {period} has already been paid"),
        ),
    }
}

/// Translates a persistence error into an API error.
///
/// Lock contention and lost connections are transient. Constraint
/// violations, schema errors and decoding failures are internal.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::Ledger(core_err) => translate_core_error(core_err),
        PersistenceError::EmployeeNotFound(id) => {
            ApiError::not_found("Employee", format!("employee {id} does not exist"))
        }
        PersistenceError::ShiftNotFound(id) => {
            ApiError::not_found("Shift", format!("shift {id} does not exist"))
        }
        PersistenceError::SettlementNotFound {
            employee_id,
            period,
        } => ApiError::not_found(
            "Settlement",
            format!("no settlement for employee {employee_id} in {period}"),
        ),
        PersistenceError::EventNotFound(id) => ApiError::not_found(
            "Outbox event",
            format!("no failed outbox event {id}"),
        ),
        PersistenceError::EventSuperseded { event_id, by } => ApiError::validation(
            "event_id",
            format!("outbox event {event_id} is superseded by newer event {by}"),
        ),
        PersistenceError::NotFound(msg) => ApiError::not_found("Record", msg),
        PersistenceError::ReferenceRejected { table, reason } => {
            ApiError::validation(table, reason)
        }
        PersistenceError::Busy(msg) | PersistenceError::DatabaseConnectionFailed(msg) => {
            ApiError::TransientIo { message: msg }
        }
        PersistenceError::DatabaseError(_)
        | PersistenceError::QueryFailed(_)
        | PersistenceError::ConstraintViolation(_)
        | PersistenceError::MigrationFailed(_)
        | PersistenceError::SerializationError(_)
        | PersistenceError::InitializationError(_)
        | PersistenceError::ForeignKeyEnforcementNotEnabled
        | PersistenceError::CorruptRow { .. } => ApiError::Internal {
            message: err.to_string(),
        },
    }
}
