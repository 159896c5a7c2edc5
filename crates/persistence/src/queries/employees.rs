// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Employee, commission tier and bonus queries.

use diesel::SqliteConnection;
use diesel::prelude::*;
use shiftbook_domain::{ActiveBonus, CommissionTier, Employee};
use tracing::debug;

use crate::data_models::{BonusRow, EmployeeRow, TierRow};
use crate::diesel_schema::{active_bonuses, commission_tiers, employees};
use crate::error::PersistenceError;

/// Retrieves an employee by ID.
///
/// # Errors
///
/// Returns `PersistenceError::EmployeeNotFound` if no such employee exists.
pub fn get_employee(
    conn: &mut SqliteConnection,
    employee_id: i64,
) -> Result<Employee, PersistenceError> {
    find_employee(conn, employee_id)?.ok_or(PersistenceError::EmployeeNotFound(employee_id))
}

/// Retrieves an employee by ID, returning `Ok(None)` if it does not exist.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be decoded.
pub fn find_employee(
    conn: &mut SqliteConnection,
    employee_id: i64,
) -> Result<Option<Employee>, PersistenceError> {
    debug!(employee_id, "Looking up employee");

    employees::table
        .filter(employees::employee_id.eq(employee_id))
        .select(EmployeeRow::as_select())
        .first(conn)
        .optional()?
        .map(EmployeeRow::into_domain)
        .transpose()
}

/// Lists every employee ordered by ID.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn list_employees(conn: &mut SqliteConnection) -> Result<Vec<Employee>, PersistenceError> {
    employees::table
        .order(employees::employee_id.asc())
        .select(EmployeeRow::as_select())
        .load(conn)?
        .into_iter()
        .map(EmployeeRow::into_domain)
        .collect()
}

/// Lists every commission tier, active or not, ordered by lower bound.
///
/// Bounds are stored as text, so ordering happens after decoding.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn list_tiers(conn: &mut SqliteConnection) -> Result<Vec<CommissionTier>, PersistenceError> {
    let mut tiers: Vec<CommissionTier> = commission_tiers::table
        .select(TierRow::as_select())
        .load(conn)?
        .into_iter()
        .map(TierRow::into_domain)
        .collect::<Result<_, _>>()?;
    tiers.sort_by(|a, b| a.min_amount.cmp(&b.min_amount));
    Ok(tiers)
}

/// Name of a tier, if it exists.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn tier_name(
    conn: &mut SqliteConnection,
    tier_id: i64,
) -> Result<Option<String>, PersistenceError> {
    Ok(commission_tiers::table
        .filter(commission_tiers::tier_id.eq(tier_id))
        .select(commission_tiers::name)
        .first::<String>(conn)
        .optional()?)
}

/// Name of the tier an employee currently references.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn employee_tier_name(
    conn: &mut SqliteConnection,
    employee: &Employee,
) -> Result<Option<String>, PersistenceError> {
    match employee.commission_tier_id {
        Some(tier_id) => tier_name(conn, tier_id),
        None => Ok(None),
    }
}

/// Bonuses an employee holds that no shift has consumed yet, oldest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn list_unapplied_bonuses(
    conn: &mut SqliteConnection,
    employee_id: i64,
) -> Result<Vec<ActiveBonus>, PersistenceError> {
    active_bonuses::table
        .filter(active_bonuses::employee_id.eq(employee_id))
        .filter(active_bonuses::applied.eq(0))
        .order(active_bonuses::bonus_id.asc())
        .select(BonusRow::as_select())
        .load(conn)?
        .into_iter()
        .map(BonusRow::into_domain)
        .collect()
}

/// Retrieves a bonus by ID.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the bonus does not exist.
pub fn get_bonus(
    conn: &mut SqliteConnection,
    bonus_id: i64,
) -> Result<ActiveBonus, PersistenceError> {
    active_bonuses::table
        .filter(active_bonuses::bonus_id.eq(bonus_id))
        .select(BonusRow::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| PersistenceError::NotFound(format!("Bonus {bonus_id}")))?
        .into_domain()
}
