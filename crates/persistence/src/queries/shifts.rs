// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Shift queries, including the history views the ledger reads.
//!
//! Dates are stored as `YYYY-MM-DD` text, so range filters compare
//! lexically and still match calendar order.

use diesel::SqliteConnection;
use diesel::prelude::*;
use rust_decimal::Decimal;
use shiftbook_domain::{
    FortnightPeriod, SalesHistory, SalesHistoryEntry, Shift, format_date, parse_amount,
    month_range, parse_date, parse_datetime, previous_month_range, window_start,
};
use std::collections::HashMap;
use time::Date;
use tracing::debug;

use crate::data_models::{ProductSaleRow, ShiftRow};
use crate::diesel_schema::{product_sales, shifts};
use crate::error::PersistenceError;

/// Statuses whose figures count towards history and settlements.
const SETTLED_STATUSES: [&str; 2] = ["closed", "amended"];

fn corrupt(err: &impl std::fmt::Display) -> PersistenceError {
    PersistenceError::CorruptRow {
        table: "shifts",
        reason: err.to_string(),
    }
}

/// Attaches product lines to shift rows with a single extra query.
fn attach_product_sales(
    conn: &mut SqliteConnection,
    rows: Vec<ShiftRow>,
) -> Result<Vec<Shift>, PersistenceError> {
    let ids: Vec<i64> = rows.iter().map(|r| r.shift_id).collect();
    let lines: Vec<ProductSaleRow> = product_sales::table
        .filter(product_sales::shift_id.eq_any(&ids))
        .order((product_sales::shift_id.asc(), product_sales::product.asc()))
        .select(ProductSaleRow::as_select())
        .load(conn)?;

    let mut by_shift: HashMap<i64, Vec<ProductSaleRow>> = HashMap::new();
    for line in lines {
        by_shift.entry(line.shift_id).or_default().push(line);
    }

    rows.into_iter()
        .map(|row| {
            let lines: Vec<ProductSaleRow> = by_shift.remove(&row.shift_id).unwrap_or_default();
            row.into_domain(lines)
        })
        .collect()
}

/// Retrieves a shift with its product lines, returning `Ok(None)` if it does not exist.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be decoded.
pub fn find_shift(
    conn: &mut SqliteConnection,
    shift_id: i64,
) -> Result<Option<Shift>, PersistenceError> {
    debug!(shift_id, "Looking up shift");

    let row: Option<ShiftRow> = shifts::table
        .filter(shifts::shift_id.eq(shift_id))
        .select(ShiftRow::as_select())
        .first(conn)
        .optional()?;

    match row {
        Some(row) => Ok(attach_product_sales(conn, vec![row])?.pop()),
        None => Ok(None),
    }
}

/// Retrieves a shift with its product lines.
///
/// # Errors
///
/// Returns `PersistenceError::ShiftNotFound` if no such shift exists.
pub fn get_shift(conn: &mut SqliteConnection, shift_id: i64) -> Result<Shift, PersistenceError> {
    find_shift(conn, shift_id)?.ok_or(PersistenceError::ShiftNotFound(shift_id))
}

/// Most recent shifts of an employee, newest first.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `employee_id` - The employee
/// * `limit` - Maximum number of shifts returned
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn list_shifts_for_employee(
    conn: &mut SqliteConnection,
    employee_id: i64,
    limit: i64,
) -> Result<Vec<Shift>, PersistenceError> {
    let rows: Vec<ShiftRow> = shifts::table
        .filter(shifts::employee_id.eq(employee_id))
        .order((
            shifts::shift_date.desc(),
            shifts::clock_in.desc(),
            shifts::shift_id.desc(),
        ))
        .limit(limit)
        .select(ShiftRow::as_select())
        .load(conn)?;

    attach_product_sales(conn, rows)
}

/// Settled shifts of an employee that fall inside `period`.
///
/// # Errors
///
/// Returns an error if the period bounds cannot be computed or the query fails.
pub fn list_settled_shifts_in_period(
    conn: &mut SqliteConnection,
    employee_id: i64,
    period: FortnightPeriod,
) -> Result<Vec<Shift>, PersistenceError> {
    let start: String = format_date(period.start_date()?);
    let end: String = format_date(period.end_date()?);

    let rows: Vec<ShiftRow> = shifts::table
        .filter(shifts::employee_id.eq(employee_id))
        .filter(shifts::status.eq_any(SETTLED_STATUSES))
        .filter(shifts::shift_date.ge(&start))
        .filter(shifts::shift_date.le(&end))
        .order((shifts::shift_date.asc(), shifts::clock_in.asc()))
        .select(ShiftRow::as_select())
        .load(conn)?;

    attach_product_sales(conn, rows)
}

/// Committed sales history an employee's rolling average reads for `shift_date`.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `employee_id` - The employee
/// * `shift_date` - Date of the shift being computed
/// * `exclude_shift_id` - The shift being computed, if already stored
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn load_sales_history(
    conn: &mut SqliteConnection,
    employee_id: i64,
    shift_date: Date,
    exclude_shift_id: Option<i64>,
) -> Result<SalesHistory, PersistenceError> {
    let excluded: i64 = exclude_shift_id.unwrap_or(-1);

    let first: Option<String> = shifts::table
        .filter(shifts::employee_id.eq(employee_id))
        .filter(shifts::status.eq_any(SETTLED_STATUSES))
        .filter(shifts::shift_id.ne(excluded))
        .select(diesel::dsl::min(shifts::shift_date))
        .first(conn)?;

    let start: String = format_date(window_start(shift_date)?);
    let end: String = format_date(shift_date);

    let rows: Vec<(i64, String, String, String)> = shifts::table
        .filter(shifts::employee_id.eq(employee_id))
        .filter(shifts::status.eq_any(SETTLED_STATUSES))
        .filter(shifts::shift_id.ne(excluded))
        .filter(shifts::shift_date.ge(&start))
        .filter(shifts::shift_date.lt(&end))
        .select((
            shifts::shift_id,
            shifts::shift_date,
            shifts::clock_in,
            shifts::total_sales,
        ))
        .load(conn)?;

    let entries: Vec<SalesHistoryEntry> = rows
        .into_iter()
        .map(|(shift_id, date, clock_in, sales)| {
            Ok(SalesHistoryEntry {
                shift_id,
                shift_date: parse_date(&date).map_err(|e| corrupt(&e))?,
                clock_in: parse_datetime(&clock_in).map_err(|e| corrupt(&e))?,
                total_sales: parse_amount(&sales).map_err(|e| corrupt(&e))?,
            })
        })
        .collect::<Result<_, PersistenceError>>()?;

    Ok(SalesHistory {
        first_shift_date: first
            .as_deref()
            .map(parse_date)
            .transpose()
            .map_err(|e| corrupt(&e))?,
        entries,
    })
}

/// Settled sales of an employee over the calendar month before `date`.
///
/// This is the input to commission tier resolution.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn trailing_month_sales(
    conn: &mut SqliteConnection,
    employee_id: i64,
    date: Date,
) -> Result<Decimal, PersistenceError> {
    let (first, last) = previous_month_range(date)?;
    let amounts: Vec<String> = settled_sales_between(conn, employee_id, first, last)?;

    amounts.iter().try_fold(Decimal::ZERO, |sum, amount| {
        Ok(sum + parse_amount(amount).map_err(|e| corrupt(&e))?)
    })
}

/// Shift count and sales of an employee's settled shifts in a calendar month.
///
/// # Errors
///
/// Returns an error if the month is invalid or a stored amount cannot be parsed.
pub fn month_sales(
    conn: &mut SqliteConnection,
    employee_id: i64,
    year: i32,
    month: u8,
) -> Result<(usize, Decimal), PersistenceError> {
    let (first, last) = month_range(year, month)?;
    let amounts: Vec<String> = settled_sales_between(conn, employee_id, first, last)?;

    let total: Decimal = amounts.iter().try_fold(Decimal::ZERO, |sum, amount| {
        Ok::<_, PersistenceError>(sum + parse_amount(amount).map_err(|e| corrupt(&e))?)
    })?;
    Ok((amounts.len(), total))
}

fn settled_sales_between(
    conn: &mut SqliteConnection,
    employee_id: i64,
    first: Date,
    last: Date,
) -> Result<Vec<String>, PersistenceError> {
    let start: String = format_date(first);
    let end: String = format_date(last);

    Ok(shifts::table
        .filter(shifts::employee_id.eq(employee_id))
        .filter(shifts::status.eq_any(SETTLED_STATUSES))
        .filter(shifts::shift_date.ge(&start))
        .filter(shifts::shift_date.le(&end))
        .select(shifts::total_sales)
        .load(conn)?)
}
