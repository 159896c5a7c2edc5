// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::command::{Command, ShiftAmendment};
use crate::error::CoreError;
use crate::state::{LedgerState, TransitionResult};
use rust_decimal::Decimal;
use shiftbook_domain::{
    BonusEffect, DomainError, FortnightPeriod, PayInputs, ProductSale, ResolvedTier, Shift,
    ShiftFigures, ShiftStatus, apply_bonuses, compute_bonus_counter, compute_pay,
    compute_rolling_average, resolve_tier, total_sales, validate_product_sales,
    validate_time_range,
};
use shiftbook_outbox::OutboxOperation;
use time::{Date, PrimitiveDateTime};
use tracing::debug;

/// Applies a command to the ledger state, producing the shift to persist.
///
/// # Arguments
///
/// * `state` - Employee-scoped ledger state (immutable)
/// * `command` - The command to apply
///
/// # Returns
///
/// * `Ok(TransitionResult)` with the new shift, consumed bonuses and the
///   settlement periods to recompute
/// * `Err(CoreError)` if the command is invalid
///
/// # Errors
///
/// Returns an error if:
/// - The employee is inactive or unpersisted
/// - The time range or product sales are invalid
/// - The shift is not in a state that permits the command
/// - The change touches a paid settlement
pub fn apply(state: &LedgerState, command: Command) -> Result<TransitionResult, CoreError> {
    let employee_id: i64 = state.employee_id()?;

    match command {
        Command::CreateShift {
            shift_date,
            clock_in,
            clock_out,
            product_sales,
        } => {
            ensure_active(state, employee_id)?;
            validate_time_range(clock_in, clock_out)?;
            validate_product_sales(&product_sales)?;

            let period: FortnightPeriod = FortnightPeriod::containing(shift_date);
            state.ensure_unpaid(period)?;

            let (figures, consumed_bonus_ids, resolved) =
                settle_new_figures(state, shift_date, clock_in, clock_out, &product_sales, None)?;

            let shift: Shift = Shift {
                shift_id: None,
                employee_id,
                shift_date,
                clock_in,
                clock_out: Some(clock_out),
                status: ShiftStatus::Closed,
                product_sales,
                figures,
            };

            debug!(
                employee_id,
                shift_date = %shift_date,
                total_made = %shift.figures.total_made,
                "Computed new shift"
            );

            Ok(TransitionResult {
                shift,
                operation: OutboxOperation::Insert,
                consumed_bonus_ids,
                resolved_tier: Some(resolved),
                affected_periods: vec![period],
            })
        }
        Command::OpenShift {
            shift_date,
            clock_in,
        } => {
            ensure_active(state, employee_id)?;

            let shift: Shift = Shift {
                shift_id: None,
                employee_id,
                shift_date,
                clock_in,
                clock_out: None,
                status: ShiftStatus::Open,
                product_sales: Vec::new(),
                figures: ShiftFigures::default(),
            };

            Ok(TransitionResult {
                shift,
                operation: OutboxOperation::Insert,
                consumed_bonus_ids: Vec::new(),
                resolved_tier: None,
                affected_periods: Vec::new(),
            })
        }
        Command::CloseShift {
            shift_id,
            clock_out,
            product_sales,
        } => {
            let existing: &Shift = existing_shift(state, shift_id)?;
            let status: ShiftStatus = existing.status.transition_to(ShiftStatus::Closed)?;
            validate_time_range(existing.clock_in, clock_out)?;
            validate_product_sales(&product_sales)?;

            let period: FortnightPeriod = existing.period();
            state.ensure_unpaid(period)?;

            let (figures, consumed_bonus_ids, resolved) = settle_new_figures(
                state,
                existing.shift_date,
                existing.clock_in,
                clock_out,
                &product_sales,
                Some(shift_id),
            )?;

            let shift: Shift = Shift {
                clock_out: Some(clock_out),
                status,
                product_sales,
                figures,
                ..existing.clone()
            };

            Ok(TransitionResult {
                shift,
                operation: OutboxOperation::Update,
                consumed_bonus_ids,
                resolved_tier: Some(resolved),
                affected_periods: vec![period],
            })
        }
        Command::AmendShift { shift_id, changes } => {
            let existing: &Shift = existing_shift(state, shift_id)?;
            amend(state, existing, changes)
        }
    }
}

fn ensure_active(state: &LedgerState, employee_id: i64) -> Result<(), CoreError> {
    if !state.employee.is_active {
        return Err(CoreError::InactiveEmployee { employee_id });
    }
    Ok(())
}

fn existing_shift(state: &LedgerState, shift_id: i64) -> Result<&Shift, CoreError> {
    state
        .existing_shift
        .as_ref()
        .filter(|s| s.shift_id == Some(shift_id))
        .ok_or(CoreError::MissingShift { shift_id })
}

/// Resolves the tier, consumes bonuses and computes every derived field.
fn settle_new_figures(
    state: &LedgerState,
    shift_date: Date,
    clock_in: PrimitiveDateTime,
    clock_out: PrimitiveDateTime,
    product_sales: &[ProductSale],
    exclude_shift_id: Option<i64>,
) -> Result<(ShiftFigures, Vec<i64>, ResolvedTier), CoreError> {
    let resolved: ResolvedTier = resolve_tier(&state.tiers, state.trailing_month_sales)?;
    let base_pct: Decimal = state
        .employee
        .commission_override_pct
        .unwrap_or(resolved.percentage);
    let effect: BonusEffect = apply_bonuses(base_pct, &state.active_bonuses);

    let figures: ShiftFigures = compute_figures(
        state,
        shift_date,
        clock_in,
        clock_out,
        product_sales,
        effect.commission_pct,
        effect.flat_bonus,
        exclude_shift_id,
    )?;

    Ok((figures, effect.applied_bonus_ids, resolved))
}

#[allow(clippy::too_many_arguments)]
fn compute_figures(
    state: &LedgerState,
    shift_date: Date,
    clock_in: PrimitiveDateTime,
    clock_out: PrimitiveDateTime,
    product_sales: &[ProductSale],
    commission_pct: Decimal,
    flat_bonus: Decimal,
    exclude_shift_id: Option<i64>,
) -> Result<ShiftFigures, CoreError> {
    let total: Decimal = total_sales(product_sales);
    let mut figures: ShiftFigures = compute_pay(&PayInputs {
        clock_in,
        clock_out,
        total_sales: total,
        hourly_wage: state.employee.hourly_wage,
        commission_pct,
        flat_bonus,
    })?;

    let rolling_average: Option<Decimal> =
        compute_rolling_average(&state.history, shift_date, exclude_shift_id)?;
    figures.rolling_average = rolling_average;
    figures.bonus_counter = compute_bonus_counter(figures.total_sales, rolling_average);

    Ok(figures)
}

/// Recomputes a closed shift after its inputs change.
///
/// The commission percentage and flat bonus fixed at close are kept; no new
/// bonuses are consumed.
fn amend(
    state: &LedgerState,
    existing: &Shift,
    changes: ShiftAmendment,
) -> Result<TransitionResult, CoreError> {
    let amended: ShiftStatus = existing.status.transition_to(ShiftStatus::Amended)?;

    let shift_date: Date = changes.shift_date.unwrap_or(existing.shift_date);
    let clock_in: PrimitiveDateTime = changes.clock_in.unwrap_or(existing.clock_in);
    let clock_out: PrimitiveDateTime =
        changes
            .clock_out
            .or(existing.clock_out)
            .ok_or_else(|| DomainError::InvalidInput {
                field: String::from("clock_out"),
                reason: String::from("closed shift has no clock-out"),
            })?;
    let product_sales: Vec<ProductSale> = changes
        .product_sales
        .unwrap_or_else(|| existing.product_sales.clone());

    validate_time_range(clock_in, clock_out)?;
    validate_product_sales(&product_sales)?;

    let old_period: FortnightPeriod = existing.period();
    let new_period: FortnightPeriod = FortnightPeriod::containing(shift_date);
    state.ensure_unpaid(old_period)?;
    state.ensure_unpaid(new_period)?;

    let figures: ShiftFigures = compute_figures(
        state,
        shift_date,
        clock_in,
        clock_out,
        &product_sales,
        existing.figures.commission_pct,
        existing.figures.flat_bonus,
        existing.shift_id,
    )?;

    let shift: Shift = Shift {
        shift_date,
        clock_in,
        clock_out: Some(clock_out),
        status: amended.transition_to(ShiftStatus::Closed)?,
        product_sales,
        figures,
        ..existing.clone()
    };

    let mut affected_periods: Vec<FortnightPeriod> = vec![old_period];
    if new_period != old_period {
        affected_periods.push(new_period);
    }

    Ok(TransitionResult {
        shift,
        operation: OutboxOperation::Update,
        consumed_bonus_ids: Vec::new(),
        resolved_tier: None,
        affected_periods,
    })
}
