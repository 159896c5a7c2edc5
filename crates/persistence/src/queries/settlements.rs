// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Fortnight settlement queries.

use diesel::SqliteConnection;
use diesel::prelude::*;
use shiftbook_domain::{FortnightPeriod, FortnightSettlement};

use crate::data_models::SettlementRow;
use crate::diesel_schema::employee_fortnights;
use crate::error::PersistenceError;

/// Retrieves the settlement of an employee for a period, if one exists.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be decoded.
pub fn find_settlement(
    conn: &mut SqliteConnection,
    employee_id: i64,
    period: FortnightPeriod,
) -> Result<Option<FortnightSettlement>, PersistenceError> {
    employee_fortnights::table
        .filter(employee_fortnights::employee_id.eq(employee_id))
        .filter(employee_fortnights::year.eq(period.year()))
        .filter(employee_fortnights::month.eq(i32::from(period.month_number())))
        .filter(employee_fortnights::half.eq(i32::from(period.half().number())))
        .select(SettlementRow::as_select())
        .first(conn)
        .optional()?
        .map(SettlementRow::into_domain)
        .transpose()
}

/// Periods in which the employee has already been paid.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn list_paid_periods(
    conn: &mut SqliteConnection,
    employee_id: i64,
) -> Result<Vec<FortnightPeriod>, PersistenceError> {
    employee_fortnights::table
        .filter(employee_fortnights::employee_id.eq(employee_id))
        .filter(employee_fortnights::is_paid.eq(1))
        .select(SettlementRow::as_select())
        .load(conn)?
        .iter()
        .map(SettlementRow::period)
        .collect()
}
