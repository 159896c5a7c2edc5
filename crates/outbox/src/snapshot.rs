// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{EntityTable, OutboxError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shiftbook_domain::{
    ActiveBonus, BonusTransaction, Employee, EmployeeRank, FortnightSettlement, Shift,
    format_date, format_datetime,
};
use time::{OffsetDateTime, PrimitiveDateTime};

/// Entity state carried by an outbox event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "entity", rename_all = "snake_case")]
pub enum EntitySnapshot {
    Shift(ShiftSnapshot),
    ActiveBonus(BonusSnapshot),
    Employee(EmployeeSnapshot),
    Settlement(SettlementSnapshot),
    Rank(RankSnapshot),
    BonusTransaction(BonusTransactionSnapshot),
}

impl EntitySnapshot {
    /// The table this snapshot belongs to.
    #[must_use]
    pub const fn table(&self) -> EntityTable {
        match self {
            Self::Shift(_) => EntityTable::Shifts,
            Self::ActiveBonus(_) => EntityTable::ActiveBonuses,
            Self::Employee(_) => EntityTable::Employees,
            Self::Settlement(_) => EntityTable::EmployeeFortnights,
            Self::Rank(_) => EntityTable::EmployeeRanks,
            Self::BonusTransaction(_) => EntityTable::BonusTransactions,
        }
    }

    /// The entity's identifier as text; also the mirror row key.
    #[must_use]
    pub fn entity_id(&self) -> String {
        match self {
            Self::Shift(s) => s.shift_id.to_string(),
            Self::ActiveBonus(b) => b.bonus_id.to_string(),
            Self::Employee(e) => e.employee_id.to_string(),
            Self::Settlement(s) => s.settlement_id.to_string(),
            Self::Rank(r) => r.rank_key.clone(),
            Self::BonusTransaction(t) => t.transaction_id.to_string(),
        }
    }
}

/// One product column of a shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductLine {
    pub product: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftSnapshot {
    pub shift_id: i64,
    pub employee_id: i64,
    pub employee_name: String,
    pub shift_date: String,
    pub clock_in: String,
    pub clock_out: Option<String>,
    pub status: String,
    pub worked_hours: Decimal,
    pub total_sales: Decimal,
    pub net_sales: Decimal,
    pub commission_pct: Decimal,
    pub total_hourly: Decimal,
    pub commission_amount: Decimal,
    pub flat_bonus: Decimal,
    pub total_made: Decimal,
    pub rolling_average: Option<Decimal>,
    pub bonus_counter: bool,
    pub products: Vec<ProductLine>,
}

impl ShiftSnapshot {
    /// Snapshots a persisted shift.
    ///
    /// # Errors
    ///
    /// Returns `OutboxError::MissingEntityId` if the shift has no identifier.
    pub fn from_shift(shift: &Shift, employee_name: &str) -> Result<Self, OutboxError> {
        let shift_id: i64 = shift
            .shift_id
            .ok_or(OutboxError::MissingEntityId("shift"))?;
        let figures = &shift.figures;
        Ok(Self {
            shift_id,
            employee_id: shift.employee_id,
            employee_name: employee_name.to_string(),
            shift_date: format_date(shift.shift_date),
            clock_in: format_datetime(shift.clock_in),
            clock_out: shift.clock_out.map(format_datetime),
            status: shift.status.as_str().to_string(),
            worked_hours: figures.worked_hours,
            total_sales: figures.total_sales,
            net_sales: figures.net_sales,
            commission_pct: figures.commission_pct,
            total_hourly: figures.total_hourly,
            commission_amount: figures.commission_amount,
            flat_bonus: figures.flat_bonus,
            total_made: figures.total_made,
            rolling_average: figures.rolling_average,
            bonus_counter: figures.bonus_counter,
            products: shift
                .product_sales
                .iter()
                .map(|p| ProductLine {
                    product: p.product.clone(),
                    amount: p.amount,
                })
                .collect(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeSnapshot {
    pub employee_id: i64,
    pub name: String,
    pub hourly_wage: Decimal,
    pub commission_tier: Option<String>,
    pub commission_override_pct: Option<Decimal>,
    pub bonus_balance: Decimal,
    pub is_active: bool,
}

impl EmployeeSnapshot {
    /// Snapshots a persisted employee.
    ///
    /// # Errors
    ///
    /// Returns `OutboxError::MissingEntityId` if the employee has no identifier.
    pub fn from_employee(
        employee: &Employee,
        tier_name: Option<&str>,
    ) -> Result<Self, OutboxError> {
        Ok(Self {
            employee_id: employee
                .employee_id
                .ok_or(OutboxError::MissingEntityId("employee"))?,
            name: employee.name.clone(),
            hourly_wage: employee.hourly_wage,
            commission_tier: tier_name.map(str::to_string),
            commission_override_pct: employee.commission_override_pct,
            bonus_balance: employee.bonus_balance,
            is_active: employee.is_active,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusSnapshot {
    pub bonus_id: i64,
    pub employee_id: i64,
    pub employee_name: String,
    pub kind: String,
    pub value: Decimal,
    pub applied: bool,
    pub shift_id: Option<i64>,
}

impl BonusSnapshot {
    /// Snapshots a persisted bonus.
    ///
    /// # Errors
    ///
    /// Returns `OutboxError::MissingEntityId` if the bonus has no identifier.
    pub fn from_bonus(bonus: &ActiveBonus, employee_name: &str) -> Result<Self, OutboxError> {
        Ok(Self {
            bonus_id: bonus
                .bonus_id
                .ok_or(OutboxError::MissingEntityId("active bonus"))?,
            employee_id: bonus.employee_id,
            employee_name: employee_name.to_string(),
            kind: bonus.kind.as_str().to_string(),
            value: bonus.value,
            applied: bonus.applied,
            shift_id: bonus.shift_id,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementSnapshot {
    pub settlement_id: i64,
    pub employee_id: i64,
    pub employee_name: String,
    pub year: i32,
    pub month: u8,
    pub half: u8,
    pub total_shifts: i64,
    pub total_worked_hours: Decimal,
    pub total_sales: Decimal,
    pub total_commissions: Decimal,
    pub total_hourly_pay: Decimal,
    pub total_made: Decimal,
    pub bonus_counter_true_count: i64,
    pub bonus_amount: Decimal,
    pub total_salary: Decimal,
    pub payment_date: String,
    pub is_paid: bool,
}

impl SettlementSnapshot {
    /// Snapshots a persisted settlement.
    ///
    /// # Errors
    ///
    /// Returns `OutboxError::MissingEntityId` if the settlement has no identifier.
    pub fn from_settlement(
        settlement: &FortnightSettlement,
        employee_name: &str,
    ) -> Result<Self, OutboxError> {
        Ok(Self {
            settlement_id: settlement
                .settlement_id
                .ok_or(OutboxError::MissingEntityId("settlement"))?,
            employee_id: settlement.employee_id,
            employee_name: employee_name.to_string(),
            year: settlement.period.year(),
            month: settlement.period.month_number(),
            half: settlement.period.half().number(),
            total_shifts: settlement.total_shifts,
            total_worked_hours: settlement.total_worked_hours,
            total_sales: settlement.total_sales,
            total_commissions: settlement.total_commissions,
            total_hourly_pay: settlement.total_hourly_pay,
            total_made: settlement.total_made,
            bonus_counter_true_count: settlement.bonus_counter_true_count,
            bonus_amount: settlement.bonus_amount,
            total_salary: settlement.total_salary,
            payment_date: format_date(settlement.payment_date),
            is_paid: settlement.is_paid,
        })
    }
}

/// UTC timestamp text for unix milliseconds; the raw number when out of range.
fn format_millis(millis: i64) -> String {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000).map_or_else(
        |_| millis.to_string(),
        |t| format_datetime(PrimitiveDateTime::new(t.date(), t.time())),
    )
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankSnapshot {
    /// `{employee_id}-{year}-{month}`, zero padded.
    pub rank_key: String,
    pub employee_id: i64,
    pub employee_name: String,
    pub year: i32,
    pub month: u8,
    pub total_sales: Decimal,
    pub current_rank: String,
    pub previous_rank: Option<String>,
    pub best_rank: String,
    pub updated_at: String,
}

impl RankSnapshot {
    #[must_use]
    pub fn from_rank(rank: &EmployeeRank, employee_name: &str) -> Self {
        Self {
            rank_key: format!("{}-{:04}-{:02}", rank.employee_id, rank.year, rank.month),
            employee_id: rank.employee_id,
            employee_name: employee_name.to_string(),
            year: rank.year,
            month: rank.month,
            total_sales: rank.total_sales,
            current_rank: rank.current_rank.clone(),
            previous_rank: rank.previous_rank.clone(),
            best_rank: rank.best_rank.clone(),
            updated_at: format_millis(rank.updated_at),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusTransactionSnapshot {
    pub transaction_id: i64,
    pub employee_id: i64,
    pub employee_name: String,
    pub amount: Decimal,
    pub kind: String,
    pub description: String,
    pub rank_name: Option<String>,
    pub balance_after: Decimal,
    pub created_at: String,
}

impl BonusTransactionSnapshot {
    /// Snapshots a persisted bonus transaction.
    ///
    /// # Errors
    ///
    /// Returns `OutboxError::MissingEntityId` if the transaction has no identifier.
    pub fn from_transaction(
        transaction: &BonusTransaction,
        employee_name: &str,
    ) -> Result<Self, OutboxError> {
        Ok(Self {
            transaction_id: transaction
                .transaction_id
                .ok_or(OutboxError::MissingEntityId("bonus transaction"))?,
            employee_id: transaction.employee_id,
            employee_name: employee_name.to_string(),
            amount: transaction.amount,
            kind: transaction.kind.as_str().to_string(),
            description: transaction.description.clone(),
            rank_name: transaction.rank_name.clone(),
            balance_after: transaction.balance_after,
            created_at: format_millis(transaction.created_at),
        })
    }
}
