// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::CoreError;
use rust_decimal::Decimal;
use shiftbook_domain::{
    ActiveBonus, CommissionTier, Employee, FortnightPeriod, ResolvedTier, SalesHistory, Shift,
};
use shiftbook_outbox::OutboxOperation;

/// Everything a ledger transition reads, scoped to one employee.
///
/// The persistence layer loads this inside the write transaction so the
/// history seen here is the committed history at the time of the write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerState {
    /// The employee the shift belongs to.
    pub employee: Employee,
    /// Tier table snapshot.
    pub tiers: Vec<CommissionTier>,
    /// Closed-shift sales in the calendar month before the effective date.
    pub trailing_month_sales: Decimal,
    /// Bonuses not yet consumed, oldest first.
    pub active_bonuses: Vec<ActiveBonus>,
    /// Committed sales history around the effective date.
    pub history: SalesHistory,
    /// The shift being closed or amended.
    pub existing_shift: Option<Shift>,
    /// Periods whose settlements are already paid.
    pub paid_periods: Vec<FortnightPeriod>,
}

impl LedgerState {
    /// Creates a state with no tiers, bonuses, history or existing shift.
    #[must_use]
    pub const fn new(employee: Employee) -> Self {
        Self {
            employee,
            tiers: Vec::new(),
            trailing_month_sales: Decimal::ZERO,
            active_bonuses: Vec::new(),
            history: SalesHistory {
                first_shift_date: None,
                entries: Vec::new(),
            },
            existing_shift: None,
            paid_periods: Vec::new(),
        }
    }

    /// The employee's identifier.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::UnpersistedEmployee` if the employee has no identifier.
    pub const fn employee_id(&self) -> Result<i64, CoreError> {
        match self.employee.employee_id {
            Some(id) => Ok(id),
            None => Err(CoreError::UnpersistedEmployee),
        }
    }

    /// Rejects changes that land in a paid period.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::PeriodPaid` if `period` is paid.
    pub fn ensure_unpaid(&self, period: FortnightPeriod) -> Result<(), CoreError> {
        if self.paid_periods.contains(&period) {
            return Err(CoreError::PeriodPaid { period });
        }
        Ok(())
    }
}

/// The result of a successful ledger transition.
///
/// Transitions are atomic: the caller persists every part of the result in
/// one transaction or none of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    /// The shift after the transition. `shift_id` is `None` for new shifts.
    pub shift: Shift,
    /// How the outbox should record the change.
    pub operation: OutboxOperation,
    /// Bonuses the shift consumed.
    pub consumed_bonus_ids: Vec<i64>,
    /// Tier resolved for the shift, when one was resolved.
    pub resolved_tier: Option<ResolvedTier>,
    /// Settlement periods that must be recomputed.
    pub affected_periods: Vec<FortnightPeriod>,
}
