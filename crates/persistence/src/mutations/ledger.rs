// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Shift ledger transactions.
//!
//! Each entry point loads the employee's `LedgerState`, applies the command
//! with the pure transition in `shiftbook`, then writes the shift, its
//! product lines, consumed bonuses, the employee's tier reference, outbox
//! events, every affected settlement and the monthly ranks they fall in.
//! Callers run these inside one immediate transaction, so a failure at any
//! step leaves nothing behind.

use diesel::SqliteConnection;
use diesel::expression::SqlLiteral;
use diesel::prelude::*;
use diesel::sql_types::{Nullable, Text};
use rust_decimal::Decimal;
use shiftbook::{Command, CoreError, LedgerState, TransitionResult, apply};
use shiftbook_domain::{ActiveBonus, Employee, ProductSale, ResolvedTier, Shift};
use shiftbook_outbox::{
    BonusSnapshot, EmployeeSnapshot, EntitySnapshot, OutboxOperation, ShiftSnapshot,
};
use time::Date;
use tracing::{debug, info};

use crate::data_models::{ProductSaleRow, ShiftValues};
use crate::diesel_schema::{active_bonuses, employees, product_sales, shifts};
use crate::error::PersistenceError;
use crate::mutations::outbox::enqueue;
use crate::mutations::ranks::recompute_rank;
use crate::mutations::settlements::recompute_settlement;
use crate::queries::employees::{get_bonus, get_employee, list_tiers, list_unapplied_bonuses};
use crate::queries::settlements::list_paid_periods;
use crate::queries::shifts::{get_shift, load_sales_history, trailing_month_sales};

fn current_timestamp() -> SqlLiteral<Text> {
    diesel::dsl::sql::<Text>("CURRENT_TIMESTAMP")
}

fn current_timestamp_nullable() -> SqlLiteral<Nullable<Text>> {
    diesel::dsl::sql::<Nullable<Text>>("CURRENT_TIMESTAMP")
}

/// Records a shift that does not exist yet (`CreateShift` or `OpenShift`).
///
/// # Arguments
///
/// * `conn` - The connection holding the caller's transaction
/// * `employee_id` - The employee the shift belongs to
/// * `command` - The command to apply
/// * `bonus_rate` - Settlement bonus rate
/// * `now_ms` - Enqueue time in unix milliseconds
///
/// # Returns
///
/// The stored shift.
///
/// # Errors
///
/// Returns an error if the employee does not exist, the ledger refuses the
/// command or a write fails.
pub fn record_new_shift(
    conn: &mut SqliteConnection,
    employee_id: i64,
    command: Command,
    bonus_rate: Decimal,
    now_ms: i64,
) -> Result<Shift, PersistenceError> {
    execute(conn, employee_id, None, command, bonus_rate, now_ms)
}

/// Changes a stored shift (`CloseShift` or `AmendShift`).
///
/// # Arguments
///
/// * `conn` - The connection holding the caller's transaction
/// * `shift_id` - The shift to change
/// * `command` - The command to apply
/// * `bonus_rate` - Settlement bonus rate
/// * `now_ms` - Enqueue time in unix milliseconds
///
/// # Returns
///
/// The stored shift.
///
/// # Errors
///
/// Returns an error if the shift does not exist, the ledger refuses the
/// command or a write fails.
pub fn change_shift(
    conn: &mut SqliteConnection,
    shift_id: i64,
    command: Command,
    bonus_rate: Decimal,
    now_ms: i64,
) -> Result<Shift, PersistenceError> {
    let existing: Shift = get_shift(conn, shift_id)?;
    let employee_id: i64 = existing.employee_id;
    execute(conn, employee_id, Some(existing), command, bonus_rate, now_ms)
}

fn execute(
    conn: &mut SqliteConnection,
    employee_id: i64,
    existing: Option<Shift>,
    command: Command,
    bonus_rate: Decimal,
    now_ms: i64,
) -> Result<Shift, PersistenceError> {
    let employee: Employee = get_employee(conn, employee_id)?;
    let Some(effective_date) = command.effective_date(existing.as_ref()) else {
        return Err(PersistenceError::ShiftNotFound(
            command.target_shift_id().unwrap_or_default(),
        ));
    };

    let state: LedgerState = load_ledger_state(
        conn,
        employee,
        effective_date,
        existing,
        command.target_shift_id(),
    )?;
    let result: TransitionResult = apply(&state, command)?;

    persist_transition(conn, &state, result, bonus_rate, now_ms)
}

/// Loads everything a transition for `employee` on `effective_date` reads.
///
/// # Errors
///
/// Returns an error if any query fails.
pub fn load_ledger_state(
    conn: &mut SqliteConnection,
    employee: Employee,
    effective_date: Date,
    existing: Option<Shift>,
    exclude_shift_id: Option<i64>,
) -> Result<LedgerState, PersistenceError> {
    let mut state: LedgerState = LedgerState::new(employee);
    let employee_id: i64 = state.employee_id()?;

    state.tiers = list_tiers(conn)?;
    state.trailing_month_sales = trailing_month_sales(conn, employee_id, effective_date)?;
    state.active_bonuses = list_unapplied_bonuses(conn, employee_id)?;
    state.history = load_sales_history(conn, employee_id, effective_date, exclude_shift_id)?;
    state.existing_shift = existing;
    state.paid_periods = list_paid_periods(conn, employee_id)?;

    debug!(
        employee_id,
        effective_date = %effective_date,
        trailing_month_sales = %state.trailing_month_sales,
        history_entries = state.history.entries.len(),
        active_bonuses = state.active_bonuses.len(),
        "Loaded ledger state"
    );

    Ok(state)
}

fn persist_transition(
    conn: &mut SqliteConnection,
    state: &LedgerState,
    result: TransitionResult,
    bonus_rate: Decimal,
    now_ms: i64,
) -> Result<Shift, PersistenceError> {
    let TransitionResult {
        mut shift,
        operation,
        consumed_bonus_ids,
        resolved_tier,
        affected_periods,
    } = result;
    let values: ShiftValues = ShiftValues::from_domain(&shift);

    let shift_id: i64 = if let Some(shift_id) = shift.shift_id {
        diesel::update(shifts::table)
            .filter(shifts::shift_id.eq(shift_id))
            .set((values, shifts::updated_at.eq(current_timestamp())))
            .execute(conn)?;

        let amended: bool = state
            .existing_shift
            .as_ref()
            .is_some_and(|s| s.status.is_settled());
        if amended {
            diesel::update(shifts::table)
                .filter(shifts::shift_id.eq(shift_id))
                .set(shifts::amended_at.eq(current_timestamp_nullable()))
                .execute(conn)?;
        }
        shift_id
    } else {
        diesel::insert_into(shifts::table)
            .values(&values)
            .returning(shifts::shift_id)
            .get_result(conn)?
    };
    shift.shift_id = Some(shift_id);

    replace_product_sales(conn, shift_id, &shift.product_sales)?;
    enqueue(
        conn,
        operation,
        EntitySnapshot::Shift(ShiftSnapshot::from_shift(&shift, &state.employee.name)?),
        now_ms,
    )?;

    consume_bonuses(conn, &state.employee, &consumed_bonus_ids, shift_id, now_ms)?;
    let employee: Employee =
        update_employee_tier(conn, &state.employee, resolved_tier.as_ref(), now_ms)?;

    let mut months: Vec<(i32, u8)> = Vec::new();
    for period in affected_periods {
        recompute_settlement(conn, &employee, period, bonus_rate, now_ms)?;
        let month: (i32, u8) = (period.year(), period.month_number());
        if !months.contains(&month) {
            months.push(month);
        }
    }
    for (year, month) in months {
        recompute_rank(conn, &employee, year, month, now_ms)?;
    }

    info!(
        shift_id,
        employee_id = shift.employee_id,
        status = %shift.status,
        operation = %operation,
        total_made = %shift.figures.total_made,
        "Persisted shift"
    );

    Ok(shift)
}

fn replace_product_sales(
    conn: &mut SqliteConnection,
    shift_id: i64,
    sales: &[ProductSale],
) -> Result<(), PersistenceError> {
    diesel::delete(product_sales::table)
        .filter(product_sales::shift_id.eq(shift_id))
        .execute(conn)?;

    if sales.is_empty() {
        return Ok(());
    }

    let rows: Vec<ProductSaleRow> = sales
        .iter()
        .map(|sale| ProductSaleRow::from_domain(shift_id, sale))
        .collect();
    diesel::insert_into(product_sales::table)
        .values(&rows)
        .execute(conn)?;
    Ok(())
}

fn consume_bonuses(
    conn: &mut SqliteConnection,
    employee: &Employee,
    bonus_ids: &[i64],
    shift_id: i64,
    now_ms: i64,
) -> Result<(), PersistenceError> {
    for &bonus_id in bonus_ids {
        diesel::update(active_bonuses::table)
            .filter(active_bonuses::bonus_id.eq(bonus_id))
            .filter(active_bonuses::applied.eq(0))
            .set((
                active_bonuses::applied.eq(1),
                active_bonuses::shift_id.eq(Some(shift_id)),
                active_bonuses::applied_at.eq(current_timestamp_nullable()),
            ))
            .execute(conn)?;

        let bonus: ActiveBonus = get_bonus(conn, bonus_id)?;
        enqueue(
            conn,
            OutboxOperation::Update,
            EntitySnapshot::ActiveBonus(BonusSnapshot::from_bonus(&bonus, &employee.name)?),
            now_ms,
        )?;
        debug!(bonus_id, shift_id, kind = %bonus.kind, "Consumed bonus");
    }
    Ok(())
}

fn update_employee_tier(
    conn: &mut SqliteConnection,
    employee: &Employee,
    resolved: Option<&ResolvedTier>,
    now_ms: i64,
) -> Result<Employee, PersistenceError> {
    let Some(tier) = resolved else {
        return Ok(employee.clone());
    };
    if tier.tier_id.is_none() || tier.tier_id == employee.commission_tier_id {
        return Ok(employee.clone());
    }

    let mut updated: Employee = employee.clone();
    updated.commission_tier_id = tier.tier_id;
    let employee_id: i64 = updated
        .employee_id
        .ok_or(CoreError::UnpersistedEmployee)?;

    diesel::update(employees::table)
        .filter(employees::employee_id.eq(employee_id))
        .set((
            employees::commission_tier_id.eq(tier.tier_id),
            employees::updated_at.eq(current_timestamp()),
        ))
        .execute(conn)?;

    enqueue(
        conn,
        OutboxOperation::Update,
        EntitySnapshot::Employee(EmployeeSnapshot::from_employee(
            &updated,
            Some(&tier.name),
        )?),
        now_ms,
    )?;
    info!(employee_id, tier = %tier.name, "Employee moved to new commission tier");

    Ok(updated)
}
