// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Monthly rank recomputation.

use diesel::SqliteConnection;
use diesel::prelude::*;
use rust_decimal::Decimal;
use shiftbook_domain::{
    BonusTransactionKind, Employee, EmployeeRank, Rank, RankOutcome, evaluate_rank,
};
use shiftbook_outbox::{EntitySnapshot, OutboxOperation, RankSnapshot};
use tracing::{debug, info};

use crate::data_models::EmployeeRankValues;
use crate::diesel_schema::employee_ranks;
use crate::error::PersistenceError;
use crate::mutations::outbox::enqueue;
use crate::mutations::reference::{BalanceChange, post_bonus_transaction};
use crate::queries::ranks::{find_employee_rank, list_ranks};
use crate::queries::shifts::month_sales;

/// Re-ranks an employee for one calendar month from their settled shifts.
///
/// The record is written and an `EmployeeRanks` event enqueued on every
/// recompute once the month has a record. Reaching a rank above the month's
/// best credits that rank's reward as a `rank_reward` transaction.
///
/// # Returns
///
/// The stored record, or `None` if the month has no settled shifts and was
/// never ranked.
///
/// # Errors
///
/// Returns an error if the rank table has no active rank or a write fails.
pub fn recompute_rank(
    conn: &mut SqliteConnection,
    employee: &Employee,
    year: i32,
    month: u8,
    now_ms: i64,
) -> Result<Option<EmployeeRank>, PersistenceError> {
    let employee_id: i64 = employee
        .employee_id
        .ok_or_else(|| PersistenceError::NotFound(format!("Identifier of {}", employee.name)))?;

    let stored: Option<EmployeeRank> = find_employee_rank(conn, employee_id, year, month)?;
    let (shift_count, total_sales) = month_sales(conn, employee_id, year, month)?;
    if stored.is_none() && shift_count == 0 {
        debug!(employee_id, year, month, "No settled shifts; month stays unranked");
        return Ok(None);
    }

    let ranks: Vec<Rank> = list_ranks(conn)?;
    let outcome: RankOutcome = evaluate_rank(&ranks, total_sales, stored.as_ref())?;
    let record = EmployeeRank {
        employee_id,
        year,
        month,
        total_sales,
        current_rank: outcome.rank.name.clone(),
        previous_rank: outcome.previous.clone(),
        best_rank: outcome.best.clone(),
        updated_at: now_ms,
    };
    let values: EmployeeRankValues = EmployeeRankValues::from_domain(&record);

    let operation: OutboxOperation = if stored.is_some() {
        diesel::update(employee_ranks::table)
            .filter(employee_ranks::employee_id.eq(employee_id))
            .filter(employee_ranks::year.eq(year))
            .filter(employee_ranks::month.eq(i32::from(month)))
            .set(&values)
            .execute(conn)?;
        OutboxOperation::Update
    } else {
        diesel::insert_into(employee_ranks::table)
            .values(&values)
            .execute(conn)?;
        OutboxOperation::Insert
    };
    enqueue(
        conn,
        operation,
        EntitySnapshot::Rank(RankSnapshot::from_rank(&record, &employee.name)),
        now_ms,
    )?;

    if outcome.changed {
        info!(
            employee_id,
            year,
            month,
            rank = %record.current_rank,
            previous = ?record.previous_rank,
            %total_sales,
            "Employee rank changed"
        );
    }

    if outcome.reward > Decimal::ZERO {
        let description: String = format!("Rank up bonus: {}", outcome.rank.name);
        post_bonus_transaction(
            conn,
            BalanceChange {
                employee_id,
                amount: outcome.reward,
                kind: BonusTransactionKind::RankReward,
                description: &description,
                rank_name: Some(&outcome.rank.name),
            },
            now_ms,
        )?;
    }

    Ok(Some(record))
}
