// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Fortnight settlement aggregation.
//!
//! A settlement is always rebuilt from its constituent shifts. There is no
//! incremental patching, so the result only depends on the shifts passed in.

use crate::error::CoreError;
use rust_decimal::Decimal;
use shiftbook_domain::{FortnightPeriod, FortnightSettlement, Shift, round_money};

/// Identity carried over from the stored settlement, if one exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SettlementIdentity {
    /// Stored identifier.
    pub settlement_id: Option<i64>,
    /// Stored paid flag.
    pub is_paid: bool,
}

/// Re-sums the closed shifts of `employee_id` that fall in `period`.
///
/// # Arguments
///
/// * `employee_id` - The employee being settled
/// * `period` - The half-month period
/// * `shifts` - Candidate shifts; others are filtered out
/// * `bonus_rate` - Rate applied per bonus-counter hit
/// * `identity` - Identifier and paid flag of the stored settlement
///
/// # Returns
///
/// `None` when the period has no closed shifts.
///
/// # Errors
///
/// Returns an error if the payment date cannot be computed.
pub fn aggregate_settlement(
    employee_id: i64,
    period: FortnightPeriod,
    shifts: &[Shift],
    bonus_rate: Decimal,
    identity: SettlementIdentity,
) -> Result<Option<FortnightSettlement>, CoreError> {
    let members: Vec<&Shift> = shifts
        .iter()
        .filter(|s| s.employee_id == employee_id)
        .filter(|s| s.status.is_settled())
        .filter(|s| period.contains(s.shift_date))
        .collect();

    if members.is_empty() {
        return Ok(None);
    }

    let mut total_worked_hours: Decimal = Decimal::ZERO;
    let mut total_sales: Decimal = Decimal::ZERO;
    let mut total_commissions: Decimal = Decimal::ZERO;
    let mut total_hourly_pay: Decimal = Decimal::ZERO;
    let mut total_made: Decimal = Decimal::ZERO;
    let mut bonus_counter_true_count: i64 = 0;

    for shift in &members {
        let figures = &shift.figures;
        total_worked_hours += figures.worked_hours;
        total_sales += figures.total_sales;
        total_commissions += figures.commission_amount;
        total_hourly_pay += figures.total_hourly;
        total_made += figures.total_made;
        if figures.bonus_counter {
            bonus_counter_true_count += 1;
        }
    }

    let bonus_amount: Decimal =
        round_money(Decimal::from(bonus_counter_true_count) * total_commissions * bonus_rate);
    let total_made: Decimal = round_money(total_made);

    Ok(Some(FortnightSettlement {
        settlement_id: identity.settlement_id,
        employee_id,
        period,
        total_shifts: i64::try_from(members.len()).unwrap_or(i64::MAX),
        total_worked_hours: round_money(total_worked_hours),
        total_sales: round_money(total_sales),
        total_commissions: round_money(total_commissions),
        total_hourly_pay: round_money(total_hourly_pay),
        total_made,
        bonus_counter_true_count,
        bonus_amount,
        total_salary: total_made + bonus_amount,
        payment_date: period.payment_date()?,
        is_paid: identity.is_paid,
    }))
}
