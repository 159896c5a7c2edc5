// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Fortnight settlement recomputation and payment.

use diesel::SqliteConnection;
use diesel::prelude::*;
use rust_decimal::Decimal;
use shiftbook::{CoreError, SettlementIdentity, aggregate_settlement};
use shiftbook_domain::{Employee, FortnightPeriod, FortnightSettlement, Shift};
use shiftbook_outbox::{EntitySnapshot, OutboxOperation, SettlementSnapshot};
use tracing::{debug, info};

use crate::data_models::SettlementValues;
use crate::diesel_schema::employee_fortnights;
use crate::error::PersistenceError;
use crate::mutations::outbox::enqueue;
use crate::queries::employees::get_employee;
use crate::queries::settlements::find_settlement;
use crate::queries::shifts::list_settled_shifts_in_period;

fn snapshot(
    settlement: &FortnightSettlement,
    employee: &Employee,
) -> Result<EntitySnapshot, PersistenceError> {
    Ok(EntitySnapshot::Settlement(
        SettlementSnapshot::from_settlement(settlement, &employee.name)?,
    ))
}

fn stored_id(settlement: &FortnightSettlement) -> Result<i64, PersistenceError> {
    settlement.settlement_id.ok_or_else(|| {
        PersistenceError::NotFound(format!("Identifier of settlement {}", settlement.period))
    })
}

/// Rebuilds one settlement from its shifts and stores the result.
///
/// The settlement row is inserted on first creation, updated when its
/// figures change and deleted when no settled shift remains in the period.
/// Every recompute enqueues the matching outbox event, including one that
/// leaves the figures unchanged. The paid flag survives recomputation.
///
/// # Arguments
///
/// * `conn` - The connection holding the caller's transaction
/// * `employee` - The employee being settled
/// * `period` - The half-month period
/// * `bonus_rate` - Rate applied per bonus-counter hit
/// * `now_ms` - Enqueue time in unix milliseconds
///
/// # Returns
///
/// The stored settlement, or `None` if the period has no settled shifts.
///
/// # Errors
///
/// Returns an error if the queries or writes fail.
pub fn recompute_settlement(
    conn: &mut SqliteConnection,
    employee: &Employee,
    period: FortnightPeriod,
    bonus_rate: Decimal,
    now_ms: i64,
) -> Result<Option<FortnightSettlement>, PersistenceError> {
    let employee_id: i64 = employee
        .employee_id
        .ok_or(CoreError::UnpersistedEmployee)?;

    let shifts: Vec<Shift> = list_settled_shifts_in_period(conn, employee_id, period)?;
    let stored: Option<FortnightSettlement> = find_settlement(conn, employee_id, period)?;
    let identity: SettlementIdentity =
        stored
            .as_ref()
            .map_or_else(SettlementIdentity::default, |s| SettlementIdentity {
                settlement_id: s.settlement_id,
                is_paid: s.is_paid,
            });

    let aggregated: Option<FortnightSettlement> =
        aggregate_settlement(employee_id, period, &shifts, bonus_rate, identity)?;

    match (aggregated, stored) {
        (Some(mut settlement), None) => {
            let settlement_id: i64 = diesel::insert_into(employee_fortnights::table)
                .values(&SettlementValues::from_domain(&settlement))
                .returning(employee_fortnights::settlement_id)
                .get_result(conn)?;
            settlement.settlement_id = Some(settlement_id);

            enqueue(
                conn,
                OutboxOperation::Insert,
                snapshot(&settlement, employee)?,
                now_ms,
            )?;
            info!(employee_id, %period, settlement_id, "Created settlement");
            Ok(Some(settlement))
        }
        (Some(settlement), Some(previous)) => {
            if settlement == previous {
                debug!(employee_id, %period, "Settlement unchanged");
            } else {
                diesel::update(employee_fortnights::table)
                    .filter(employee_fortnights::settlement_id.eq(stored_id(&previous)?))
                    .set((
                        SettlementValues::from_domain(&settlement),
                        employee_fortnights::updated_at.eq(diesel::dsl::sql::<
                            diesel::sql_types::Text,
                        >("CURRENT_TIMESTAMP")),
                    ))
                    .execute(conn)?;
                info!(employee_id, %period, total_salary = %settlement.total_salary, "Updated settlement");
            }

            enqueue(
                conn,
                OutboxOperation::Update,
                snapshot(&settlement, employee)?,
                now_ms,
            )?;
            Ok(Some(settlement))
        }
        (None, Some(previous)) => {
            diesel::delete(employee_fortnights::table)
                .filter(employee_fortnights::settlement_id.eq(stored_id(&previous)?))
                .execute(conn)?;

            enqueue(
                conn,
                OutboxOperation::Delete,
                snapshot(&previous, employee)?,
                now_ms,
            )?;
            info!(employee_id, %period, "Removed empty settlement");
            Ok(None)
        }
        (None, None) => Ok(None),
    }
}

/// Marks a settlement as paid, freezing its shifts against changes.
///
/// Marking an already paid settlement changes nothing.
///
/// # Errors
///
/// Returns `PersistenceError::SettlementNotFound` if the settlement does not exist.
pub fn mark_settlement_paid(
    conn: &mut SqliteConnection,
    employee_id: i64,
    period: FortnightPeriod,
    now_ms: i64,
) -> Result<FortnightSettlement, PersistenceError> {
    let employee: Employee = get_employee(conn, employee_id)?;
    let mut settlement: FortnightSettlement = find_settlement(conn, employee_id, period)?
        .ok_or_else(|| PersistenceError::SettlementNotFound {
            employee_id,
            period: period.to_string(),
        })?;

    if settlement.is_paid {
        return Ok(settlement);
    }

    diesel::update(employee_fortnights::table)
        .filter(employee_fortnights::settlement_id.eq(stored_id(&settlement)?))
        .set((
            employee_fortnights::is_paid.eq(1),
            employee_fortnights::updated_at
                .eq(diesel::dsl::sql::<diesel::sql_types::Text>("CURRENT_TIMESTAMP")),
        ))
        .execute(conn)?;
    settlement.is_paid = true;

    enqueue(
        conn,
        OutboxOperation::Update,
        snapshot(&settlement, &employee)?,
        now_ms,
    )?;
    info!(employee_id, %period, "Settlement marked paid");

    Ok(settlement)
}
