// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Per-shift pay computation.

use crate::error::DomainError;
use crate::money::{NET_SALES_RATIO, round_money};
use crate::types::{ActiveBonus, BonusKind, ProductSale, ShiftFigures};
use crate::validation::validate_time_range;
use rust_decimal::Decimal;
use time::PrimitiveDateTime;
use tracing::debug;

const SECONDS_PER_HOUR: i64 = 3600;

/// Commission percentage and flat dollars after applying bonuses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BonusEffect {
    /// Final commission percentage.
    pub commission_pct: Decimal,
    /// Flat dollars to add to the shift total.
    pub flat_bonus: Decimal,
    /// Identifiers of the bonuses consumed, in application order.
    pub applied_bonus_ids: Vec<i64>,
}

/// Applies unapplied bonuses, in the order given, to a base percentage.
///
/// `percent_next` adds points, `double_commission` doubles the percentage
/// accumulated so far, and both flat kinds add dollars.
#[must_use]
pub fn apply_bonuses(base_pct: Decimal, bonuses: &[ActiveBonus]) -> BonusEffect {
    let mut commission_pct: Decimal = base_pct;
    let mut flat_bonus: Decimal = Decimal::ZERO;
    let mut applied_bonus_ids: Vec<i64> = Vec::new();

    for bonus in bonuses.iter().filter(|b| !b.applied) {
        match bonus.kind {
            BonusKind::PercentNext => commission_pct += bonus.value,
            BonusKind::DoubleCommission => commission_pct *= Decimal::TWO,
            BonusKind::Flat | BonusKind::FlatImmediate => flat_bonus += bonus.value,
        }
        debug!(
            bonus_id = ?bonus.bonus_id,
            kind = %bonus.kind,
            value = %bonus.value,
            "Applied bonus"
        );
        if let Some(id) = bonus.bonus_id {
            applied_bonus_ids.push(id);
        }
    }

    BonusEffect {
        commission_pct,
        flat_bonus,
        applied_bonus_ids,
    }
}

/// Hours between clock-in and clock-out, rounded to two decimals.
///
/// # Errors
///
/// Returns `DomainError::InvalidTimeRange` unless `clock_out > clock_in`.
pub fn worked_hours(
    clock_in: PrimitiveDateTime,
    clock_out: PrimitiveDateTime,
) -> Result<Decimal, DomainError> {
    validate_time_range(clock_in, clock_out)?;
    let seconds: i64 = (clock_out - clock_in).whole_seconds();
    Ok(round_money(
        Decimal::from(seconds) / Decimal::from(SECONDS_PER_HOUR),
    ))
}

/// Sum of product sale amounts.
#[must_use]
pub fn total_sales(product_sales: &[ProductSale]) -> Decimal {
    product_sales.iter().map(|p| p.amount).sum()
}

/// Inputs to the pay formula for a single shift.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayInputs {
    /// Clock-in wall time.
    pub clock_in: PrimitiveDateTime,
    /// Clock-out wall time.
    pub clock_out: PrimitiveDateTime,
    /// Gross sales.
    pub total_sales: Decimal,
    /// Employee hourly wage.
    pub hourly_wage: Decimal,
    /// Commission percentage after bonuses.
    pub commission_pct: Decimal,
    /// Flat bonus dollars.
    pub flat_bonus: Decimal,
}

/// Computes the money fields of a shift.
///
/// The rolling average and bonus counter are left unset; callers fill them
/// from the rolling-average engine.
///
/// # Errors
///
/// Returns an error if the time range is invalid.
pub fn compute_pay(inputs: &PayInputs) -> Result<ShiftFigures, DomainError> {
    let worked_hours: Decimal = worked_hours(inputs.clock_in, inputs.clock_out)?;
    let net_sales: Decimal = round_money(inputs.total_sales * NET_SALES_RATIO);
    let commission_amount: Decimal =
        round_money(net_sales * inputs.commission_pct / Decimal::ONE_HUNDRED);
    let total_hourly: Decimal = round_money(worked_hours * inputs.hourly_wage);
    let flat_bonus: Decimal = round_money(inputs.flat_bonus);
    let total_made: Decimal = total_hourly + commission_amount + flat_bonus;

    Ok(ShiftFigures {
        worked_hours,
        total_sales: round_money(inputs.total_sales),
        net_sales,
        commission_pct: inputs.commission_pct,
        total_hourly,
        commission_amount,
        flat_bonus,
        total_made,
        rolling_average: None,
        bonus_counter: false,
    })
}
