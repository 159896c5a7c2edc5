// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Rank ladder, monthly rank and bonus transaction queries.

use diesel::SqliteConnection;
use diesel::prelude::*;
use shiftbook_domain::{BonusTransaction, EmployeeRank, Rank};

use crate::data_models::{BonusTransactionRow, EmployeeRankRow, RankRow};
use crate::diesel_schema::{bonus_transactions, employee_ranks, ranks};
use crate::error::PersistenceError;

/// Lists every rank, active or not, in ladder order.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn list_ranks(conn: &mut SqliteConnection) -> Result<Vec<Rank>, PersistenceError> {
    ranks::table
        .order(ranks::display_order.asc())
        .select(RankRow::as_select())
        .load(conn)?
        .into_iter()
        .map(RankRow::into_domain)
        .collect()
}

/// Retrieves an employee's rank record for a month, if one exists.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be decoded.
pub fn find_employee_rank(
    conn: &mut SqliteConnection,
    employee_id: i64,
    year: i32,
    month: u8,
) -> Result<Option<EmployeeRank>, PersistenceError> {
    employee_ranks::table
        .filter(employee_ranks::employee_id.eq(employee_id))
        .filter(employee_ranks::year.eq(year))
        .filter(employee_ranks::month.eq(i32::from(month)))
        .select(EmployeeRankRow::as_select())
        .first(conn)
        .optional()?
        .map(EmployeeRankRow::into_domain)
        .transpose()
}

/// Lists an employee's most recent bonus transactions, newest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn list_bonus_transactions(
    conn: &mut SqliteConnection,
    employee_id: i64,
    limit: i64,
) -> Result<Vec<BonusTransaction>, PersistenceError> {
    bonus_transactions::table
        .filter(bonus_transactions::employee_id.eq(employee_id))
        .order(bonus_transactions::transaction_id.desc())
        .limit(limit)
        .select(BonusTransactionRow::as_select())
        .load(conn)?
        .into_iter()
        .map(BonusTransactionRow::into_domain)
        .collect()
}
