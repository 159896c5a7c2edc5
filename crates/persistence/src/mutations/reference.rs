// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Employee, bonus and reference-table mutations.
//!
//! Employees, bonuses and bonus transactions created here are replicated
//! through the outbox.
//! The two mirror-authoritative tables (commission tiers and employee
//! settings) are replaced from the mirror. Tier pulls enqueue nothing.
//! Settings pulls push changed employees to the `Employees` sheet only,
//! which is never pulled, so a pull cannot echo back into its own sheet.

use diesel::SqliteConnection;
use diesel::prelude::*;
use rust_decimal::Decimal;
use shiftbook::CoreError;
use shiftbook_domain::{
    ActiveBonus, BonusTransaction, BonusTransactionKind, CommissionTier, Employee, PartitionIssue,
    require_non_negative, validate_bonus, validate_employee_fields, validate_tier_partition,
};
use shiftbook_outbox::{
    BonusSnapshot, BonusTransactionSnapshot, EmployeeSnapshot, EntitySnapshot, OutboxOperation,
};
use std::collections::HashSet;
use tracing::{info, warn};

use crate::data_models::{NewBonus, NewBonusTransaction, NewEmployee, TierValues, money_text};
use crate::diesel_schema::{active_bonuses, bonus_transactions, commission_tiers, employees};
use crate::error::PersistenceError;
use crate::mutations::outbox::enqueue;
use crate::queries::employees::{
    employee_tier_name, find_employee, get_bonus, get_employee, list_tiers,
};

/// Mirror-managed settings of one employee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeSettings {
    /// The employee the row refers to.
    pub employee_id: i64,
    /// Hourly wage in dollars.
    pub hourly_wage: Decimal,
    /// Percentage replacing the tier percentage, if any.
    pub commission_override_pct: Option<Decimal>,
}

/// Counts reported by a reference-table replacement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaceSummary {
    /// Rows created.
    pub inserted: usize,
    /// Rows overwritten.
    pub updated: usize,
    /// Rows deactivated because the mirror no longer lists them.
    pub deactivated: usize,
    /// Mirror rows ignored.
    pub skipped: usize,
    /// Mirror rows that matched the store already.
    pub unchanged: usize,
}

fn employee_snapshot(
    conn: &mut SqliteConnection,
    employee: &Employee,
) -> Result<EntitySnapshot, PersistenceError> {
    let tier: Option<String> = employee_tier_name(conn, employee)?;
    Ok(EntitySnapshot::Employee(EmployeeSnapshot::from_employee(
        employee,
        tier.as_deref(),
    )?))
}

/// Creates an employee.
///
/// # Errors
///
/// Returns an error if the employee fields are invalid or the insert fails.
pub fn create_employee(
    conn: &mut SqliteConnection,
    employee: &Employee,
    now_ms: i64,
) -> Result<Employee, PersistenceError> {
    validate_employee_fields(employee)?;

    let employee_id: i64 = diesel::insert_into(employees::table)
        .values(&NewEmployee::from_domain(employee))
        .returning(employees::employee_id)
        .get_result(conn)?;

    let created: Employee = get_employee(conn, employee_id)?;
    let snapshot: EntitySnapshot = employee_snapshot(conn, &created)?;
    enqueue(conn, OutboxOperation::Insert, snapshot, now_ms)?;

    info!(employee_id, name = %created.name, "Created employee");
    Ok(created)
}

/// Adds `amount` to an employee's bonus balance. Negative amounts debit it.
///
/// The change is recorded as a credit or debit transaction.
///
/// # Errors
///
/// Returns an error if the employee does not exist or the balance would
/// become negative.
pub fn credit_bonus_balance(
    conn: &mut SqliteConnection,
    employee_id: i64,
    amount: Decimal,
    description: Option<&str>,
    now_ms: i64,
) -> Result<Employee, PersistenceError> {
    let (kind, default_description) = if amount.is_sign_negative() {
        (BonusTransactionKind::Debit, "Manual debit")
    } else {
        (BonusTransactionKind::Credit, "Manual credit")
    };

    let (employee, _) = post_bonus_transaction(
        conn,
        BalanceChange {
            employee_id,
            amount,
            kind,
            description: description.unwrap_or(default_description),
            rank_name: None,
        },
        now_ms,
    )?;
    Ok(employee)
}

/// A change to apply to an employee's bonus balance.
#[derive(Debug, Clone, Copy)]
pub struct BalanceChange<'a> {
    pub employee_id: i64,
    /// Signed amount; negative debits the balance.
    pub amount: Decimal,
    pub kind: BonusTransactionKind,
    pub description: &'a str,
    pub rank_name: Option<&'a str>,
}

/// Applies a balance change and records it as a bonus transaction.
///
/// Enqueues the transaction insert followed by the employee update.
///
/// # Errors
///
/// Returns an error if the employee does not exist or the balance would
/// become negative.
pub fn post_bonus_transaction(
    conn: &mut SqliteConnection,
    change: BalanceChange<'_>,
    now_ms: i64,
) -> Result<(Employee, BonusTransaction), PersistenceError> {
    let employee_id: i64 = change.employee_id;
    let mut employee: Employee = get_employee(conn, employee_id)?;
    let balance: Decimal = employee.bonus_balance + change.amount;
    require_non_negative("bonus_balance", balance)?;

    diesel::update(employees::table)
        .filter(employees::employee_id.eq(employee_id))
        .set((
            employees::bonus_balance.eq(money_text(balance)),
            employees::updated_at
                .eq(diesel::dsl::sql::<diesel::sql_types::Text>("CURRENT_TIMESTAMP")),
        ))
        .execute(conn)?;
    employee.bonus_balance = balance;

    let mut transaction = BonusTransaction {
        transaction_id: None,
        employee_id,
        amount: change.amount,
        kind: change.kind,
        description: change.description.to_string(),
        rank_name: change.rank_name.map(str::to_string),
        balance_after: balance,
        created_at: now_ms,
    };
    let transaction_id: i64 = diesel::insert_into(bonus_transactions::table)
        .values(&NewBonusTransaction::from_domain(&transaction))
        .returning(bonus_transactions::transaction_id)
        .get_result(conn)?;
    transaction.transaction_id = Some(transaction_id);

    enqueue(
        conn,
        OutboxOperation::Insert,
        EntitySnapshot::BonusTransaction(BonusTransactionSnapshot::from_transaction(
            &transaction,
            &employee.name,
        )?),
        now_ms,
    )?;
    let snapshot: EntitySnapshot = employee_snapshot(conn, &employee)?;
    enqueue(conn, OutboxOperation::Update, snapshot, now_ms)?;

    info!(
        employee_id,
        transaction_id,
        kind = %change.kind,
        amount = %change.amount,
        %balance,
        "Posted bonus transaction"
    );
    Ok((employee, transaction))
}

/// Grants a bonus that the employee's next shift will consume.
///
/// # Errors
///
/// Returns an error if the employee does not exist or is inactive, the
/// bonus is invalid or the insert fails.
pub fn grant_bonus(
    conn: &mut SqliteConnection,
    bonus: &ActiveBonus,
    now_ms: i64,
) -> Result<ActiveBonus, PersistenceError> {
    validate_bonus(bonus)?;
    let employee: Employee = get_employee(conn, bonus.employee_id)?;
    if !employee.is_active {
        return Err(CoreError::InactiveEmployee {
            employee_id: bonus.employee_id,
        }
        .into());
    }

    let bonus_id: i64 = diesel::insert_into(active_bonuses::table)
        .values(&NewBonus::from_domain(bonus))
        .returning(active_bonuses::bonus_id)
        .get_result(conn)?;
    let granted: ActiveBonus = get_bonus(conn, bonus_id)?;

    enqueue(
        conn,
        OutboxOperation::Insert,
        EntitySnapshot::ActiveBonus(BonusSnapshot::from_bonus(&granted, &employee.name)?),
        now_ms,
    )?;

    info!(
        bonus_id,
        employee_id = granted.employee_id,
        kind = %granted.kind,
        value = %granted.value,
        "Granted bonus"
    );
    Ok(granted)
}

/// Replaces the commission tier table with the mirror's copy.
///
/// Tiers are matched by name. Tiers missing from `tiers` are deactivated
/// rather than deleted because employees may reference them. Gaps and
/// overlaps are logged; malformed tiers, duplicate names and an empty table
/// are refused.
///
/// # Errors
///
/// Returns `PersistenceError::ReferenceRejected` if the table is refused, or
/// a database error if a write fails.
pub fn replace_commission_tiers(
    conn: &mut SqliteConnection,
    tiers: &[CommissionTier],
) -> Result<ReplaceSummary, PersistenceError> {
    const TABLE: &str = "commission_tiers";
    let rejected = |reason: String| PersistenceError::ReferenceRejected {
        table: TABLE,
        reason,
    };

    if tiers.is_empty() {
        return Err(rejected(String::from("mirror returned no tiers")));
    }

    let mut names: HashSet<String> = HashSet::new();
    for tier in tiers {
        if !names.insert(tier.name.trim().to_string()) {
            return Err(rejected(format!("duplicate tier name '{}'", tier.name)));
        }
    }

    let issues: Vec<PartitionIssue> =
        validate_tier_partition(tiers).map_err(|e| rejected(e.to_string()))?;
    for issue in &issues {
        warn!(%issue, "Commission tiers do not partition sales cleanly");
    }

    let existing: Vec<CommissionTier> = list_tiers(conn)?;
    let mut summary: ReplaceSummary = ReplaceSummary::default();

    for tier in tiers {
        let values: TierValues = TierValues::from_domain(tier);
        let current_id: Option<i64> = existing
            .iter()
            .find(|t| t.name == values.name)
            .and_then(|t| t.tier_id);

        if let Some(tier_id) = current_id {
            diesel::update(commission_tiers::table)
                .filter(commission_tiers::tier_id.eq(tier_id))
                .set(&values)
                .execute(conn)?;
            summary.updated += 1;
        } else {
            diesel::insert_into(commission_tiers::table)
                .values(&values)
                .execute(conn)?;
            summary.inserted += 1;
        }
    }

    let listed: Vec<String> = names.into_iter().collect();
    summary.deactivated = diesel::update(commission_tiers::table)
        .filter(commission_tiers::name.ne_all(&listed))
        .filter(commission_tiers::is_active.eq(1))
        .set(commission_tiers::is_active.eq(0))
        .execute(conn)?;

    info!(
        inserted = summary.inserted,
        updated = summary.updated,
        deactivated = summary.deactivated,
        "Replaced commission tiers"
    );
    Ok(summary)
}

/// Applies the mirror's employee settings to the store.
///
/// Only `hourly_wage` and `commission_override_pct` are taken from the
/// mirror. Rows naming unknown employees are skipped. Each employee whose
/// settings changed gets an `Employees` update in the outbox.
///
/// # Errors
///
/// Returns `PersistenceError::ReferenceRejected` if a value is negative, or
/// a database error if a write fails.
pub fn replace_employee_settings(
    conn: &mut SqliteConnection,
    settings: &[EmployeeSettings],
    now_ms: i64,
) -> Result<ReplaceSummary, PersistenceError> {
    let mut summary: ReplaceSummary = ReplaceSummary::default();

    for row in settings {
        let checked = require_non_negative("hourly_wage", row.hourly_wage).and_then(|()| {
            row.commission_override_pct
                .map_or(Ok(()), |pct| require_non_negative("commission_override_pct", pct))
        });
        if let Err(e) = checked {
            return Err(PersistenceError::ReferenceRejected {
                table: "employees",
                reason: format!("employee {}: {e}", row.employee_id),
            });
        }

        let Some(mut employee) = find_employee(conn, row.employee_id)? else {
            warn!(
                employee_id = row.employee_id,
                "Skipping settings for unknown employee"
            );
            summary.skipped += 1;
            continue;
        };
        if employee.hourly_wage == row.hourly_wage
            && employee.commission_override_pct == row.commission_override_pct
        {
            summary.unchanged += 1;
            continue;
        }

        diesel::update(employees::table)
            .filter(employees::employee_id.eq(row.employee_id))
            .set((
                employees::hourly_wage.eq(money_text(row.hourly_wage)),
                employees::commission_override_pct
                    .eq(row.commission_override_pct.map(money_text)),
                employees::updated_at
                    .eq(diesel::dsl::sql::<diesel::sql_types::Text>("CURRENT_TIMESTAMP")),
            ))
            .execute(conn)?;
        employee.hourly_wage = row.hourly_wage;
        employee.commission_override_pct = row.commission_override_pct;

        let snapshot: EntitySnapshot = employee_snapshot(conn, &employee)?;
        enqueue(conn, OutboxOperation::Update, snapshot, now_ms)?;
        summary.updated += 1;
    }

    info!(
        updated = summary.updated,
        unchanged = summary.unchanged,
        skipped = summary.skipped,
        "Replaced employee settings"
    );
    Ok(summary)
}
