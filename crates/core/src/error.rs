// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use shiftbook_domain::{DomainError, FortnightPeriod};

/// Errors that can occur during ledger transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A domain rule was violated.
    DomainViolation(DomainError),
    /// The employee in the ledger state has not been persisted.
    UnpersistedEmployee,
    /// The employee is inactive and cannot record shifts.
    InactiveEmployee {
        /// The employee.
        employee_id: i64,
    },
    /// The command needs an existing shift that the state does not carry.
    MissingShift {
        /// The requested shift.
        shift_id: i64,
    },
    /// The change would alter a settlement that has already been paid.
    PeriodPaid {
        /// The paid period.
        period: FortnightPeriod,
    },
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DomainViolation(err) => write!(f, "Domain violation: {err}"),
            Self::UnpersistedEmployee => write!(f, "Employee has not been persisted"),
            Self::InactiveEmployee { employee_id } => {
                write!(f, "Employee {employee_id} is inactive")
            }
            Self::MissingShift { shift_id } => {
                write!(f, "Shift {shift_id} is not loaded in the ledger state")
            }
            Self::PeriodPaid { period } => {
                write!(f, "Settlement for {period} has already been paid")
            }
        }
    }
}

impl std::error::Error for CoreError {}

impl From<DomainError> for CoreError {
    fn from(err: DomainError) -> Self {
        Self::DomainViolation(err)
    }
}
