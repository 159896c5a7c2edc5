// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::types::ShiftStatus;
use rust_decimal::Decimal;
use time::PrimitiveDateTime;

/// Errors that can occur during domain validation and payroll computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A caller supplied a value that violates an input contract.
    InvalidInput {
        /// The offending field.
        field: String,
        /// Why the value was rejected.
        reason: String,
    },
    /// A monetary amount was negative where only non-negative values are allowed.
    NegativeAmount {
        /// The offending field.
        field: String,
        /// The rejected amount.
        amount: Decimal,
    },
    /// Clock-out is not strictly after clock-in.
    InvalidTimeRange {
        /// The recorded clock-in.
        clock_in: PrimitiveDateTime,
        /// The rejected clock-out.
        clock_out: PrimitiveDateTime,
    },
    /// Employee name is empty or invalid.
    InvalidName(String),
    /// A product sale has no product name.
    EmptyProductName,
    /// The same product appears more than once in a shift.
    DuplicateProduct(String),
    /// The tier table contains no active tiers.
    NoActiveTiers,
    /// The rank table contains no active ranks.
    NoActiveRanks,
    /// A commission tier definition is malformed.
    InvalidTier {
        /// The tier name.
        name: String,
        /// Why the tier was rejected.
        reason: String,
    },
    /// A shift lifecycle transition is not permitted.
    InvalidShiftTransition {
        /// The current status.
        from: ShiftStatus,
        /// The requested status.
        to: ShiftStatus,
    },
    /// Unknown shift status string.
    InvalidShiftStatus(String),
    /// Unknown bonus kind string.
    InvalidBonusKind(String),
    /// Unknown bonus transaction kind string.
    InvalidTransactionKind(String),
    /// Fortnight half must be 1 or 2.
    InvalidHalf(u8),
    /// Month must be in 1..=12.
    InvalidMonth(u8),
    /// Date arithmetic overflow.
    DateArithmeticOverflow {
        /// Description of the operation that failed.
        operation: String,
    },
    /// Failed to parse a date or timestamp.
    DateParseError {
        /// The invalid input.
        date_string: String,
        /// The parsing error message.
        error: String,
    },
    /// Failed to parse a decimal amount.
    AmountParseError {
        /// The invalid input.
        amount_string: String,
        /// The parsing error message.
        error: String,
    },
    /// The configured business timezone is unknown.
    InvalidTimezone(String),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput { field, reason } => {
                write!(f, "Invalid value for '{field}': {reason}")
            }
            Self::NegativeAmount { field, amount } => {
                write!(f, "'{field}' must be non-negative, got {amount}")
            }
            Self::InvalidTimeRange {
                clock_in,
                clock_out,
            } => write!(
                f,
                "Clock-out {clock_out} must be after clock-in {clock_in}"
            ),
            Self::InvalidName(msg) => write!(f, "Invalid name: {msg}"),
            Self::EmptyProductName => write!(f, "Product name must not be empty"),
            Self::DuplicateProduct(product) => {
                write!(f, "Product '{product}' appears more than once")
            }
            Self::NoActiveTiers => write!(f, "No active commission tiers are defined"),
            Self::NoActiveRanks => write!(f, "No active sales ranks are defined"),
            Self::InvalidTier { name, reason } => {
                write!(f, "Invalid commission tier '{name}': {reason}")
            }
            Self::InvalidShiftTransition { from, to } => {
                write!(f, "Shift cannot move from {from} to {to}")
            }
            Self::InvalidShiftStatus(s) => write!(f, "Invalid shift status: {s}"),
            Self::InvalidBonusKind(s) => write!(f, "Invalid bonus kind: {s}"),
            Self::InvalidTransactionKind(s) => write!(f, "Invalid bonus transaction kind: {s}"),
            Self::InvalidHalf(half) => write!(f, "Fortnight half must be 1 or 2, got {half}"),
            Self::InvalidMonth(month) => write!(f, "Month must be in 1..=12, got {month}"),
            Self::DateArithmeticOverflow { operation } => {
                write!(f, "Date arithmetic overflow: {operation}")
            }
            Self::DateParseError { date_string, error } => {
                write!(f, "Failed to parse date '{date_string}': {error}")
            }
            Self::AmountParseError {
                amount_string,
                error,
            } => write!(f, "Failed to parse amount '{amount_string}': {error}"),
            Self::InvalidTimezone(tz) => write!(f, "Invalid timezone: {tz}"),
        }
    }
}

impl std::error::Error for DomainError {}
