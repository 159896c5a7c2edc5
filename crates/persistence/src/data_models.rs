// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Row types and their conversions to and from domain values.
//!
//! Money is stored as TEXT holding a decimal rounded to cents, dates as
//! `YYYY-MM-DD` and wall times as `YYYY-MM-DD HH:MM:SS`.

use diesel::prelude::*;
use rust_decimal::Decimal;
use shiftbook_domain::{
    ActiveBonus, BonusKind, BonusTransaction, BonusTransactionKind, CommissionTier, Employee,
    EmployeeRank, FortnightPeriod, FortnightSettlement, ProductSale, Rank, Shift, ShiftFigures,
    ShiftStatus, format_date, format_datetime, parse_amount, parse_date, parse_datetime,
    round_money,
};
use shiftbook_outbox::{OutboxEvent, decode_payload, encode_payload};
use std::str::FromStr;

use crate::diesel_schema::{
    active_bonuses, bonus_transactions, commission_tiers, employee_fortnights, employee_ranks,
    employees, outbox_events, product_sales, ranks, shifts,
};
use crate::error::PersistenceError;

/// Formats a money value for storage.
pub fn money_text(value: Decimal) -> String {
    round_money(value).to_string()
}

fn money_column(table: &'static str, value: &str) -> Result<Decimal, PersistenceError> {
    parse_amount(value).map_err(|e| corrupt(table, &e))
}

fn corrupt(table: &'static str, err: &impl std::fmt::Display) -> PersistenceError {
    PersistenceError::CorruptRow {
        table,
        reason: err.to_string(),
    }
}

// ============================================================================
// Employees and tiers
// ============================================================================

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = employees)]
pub struct EmployeeRow {
    pub employee_id: i64,
    pub name: String,
    pub hourly_wage: String,
    pub commission_tier_id: Option<i64>,
    pub commission_override_pct: Option<String>,
    pub bonus_balance: String,
    pub is_active: i32,
}

impl EmployeeRow {
    pub fn into_domain(self) -> Result<Employee, PersistenceError> {
        const TABLE: &str = "employees";
        Ok(Employee {
            employee_id: Some(self.employee_id),
            name: self.name,
            hourly_wage: money_column(TABLE, &self.hourly_wage)?,
            commission_tier_id: self.commission_tier_id,
            commission_override_pct: self
                .commission_override_pct
                .as_deref()
                .map(|v| money_column(TABLE, v))
                .transpose()?,
            bonus_balance: money_column(TABLE, &self.bonus_balance)?,
            is_active: self.is_active != 0,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = employees)]
pub struct NewEmployee {
    pub name: String,
    pub hourly_wage: String,
    pub commission_tier_id: Option<i64>,
    pub commission_override_pct: Option<String>,
    pub bonus_balance: String,
    pub is_active: i32,
}

impl NewEmployee {
    pub fn from_domain(employee: &Employee) -> Self {
        Self {
            name: employee.name.trim().to_string(),
            hourly_wage: money_text(employee.hourly_wage),
            commission_tier_id: employee.commission_tier_id,
            commission_override_pct: employee.commission_override_pct.map(money_text),
            bonus_balance: money_text(employee.bonus_balance),
            is_active: i32::from(employee.is_active),
        }
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = commission_tiers)]
pub struct TierRow {
    pub tier_id: i64,
    pub name: String,
    pub min_amount: String,
    pub max_amount: Option<String>,
    pub percentage: String,
    pub is_active: i32,
}

impl TierRow {
    pub fn into_domain(self) -> Result<CommissionTier, PersistenceError> {
        const TABLE: &str = "commission_tiers";
        Ok(CommissionTier {
            tier_id: Some(self.tier_id),
            name: self.name,
            min_amount: money_column(TABLE, &self.min_amount)?,
            max_amount: self
                .max_amount
                .as_deref()
                .map(|v| money_column(TABLE, v))
                .transpose()?,
            percentage: money_column(TABLE, &self.percentage)?,
            is_active: self.is_active != 0,
        })
    }
}

/// Insert and update values for a tier, keyed by name.
#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = commission_tiers, treat_none_as_null = true)]
pub struct TierValues {
    pub name: String,
    pub min_amount: String,
    pub max_amount: Option<String>,
    pub percentage: String,
    pub is_active: i32,
}

impl TierValues {
    pub fn from_domain(tier: &CommissionTier) -> Self {
        Self {
            name: tier.name.trim().to_string(),
            min_amount: money_text(tier.min_amount),
            max_amount: tier.max_amount.map(money_text),
            percentage: money_text(tier.percentage),
            is_active: i32::from(tier.is_active),
        }
    }
}

// ============================================================================
// Bonuses
// ============================================================================

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = active_bonuses)]
pub struct BonusRow {
    pub bonus_id: i64,
    pub employee_id: i64,
    pub kind: String,
    pub value: String,
    pub applied: i32,
    pub shift_id: Option<i64>,
}

impl BonusRow {
    pub fn into_domain(self) -> Result<ActiveBonus, PersistenceError> {
        const TABLE: &str = "active_bonuses";
        Ok(ActiveBonus {
            bonus_id: Some(self.bonus_id),
            employee_id: self.employee_id,
            kind: BonusKind::from_str(&self.kind).map_err(|e| corrupt(TABLE, &e))?,
            value: money_column(TABLE, &self.value)?,
            applied: self.applied != 0,
            shift_id: self.shift_id,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = active_bonuses)]
pub struct NewBonus {
    pub employee_id: i64,
    pub kind: String,
    pub value: String,
}

impl NewBonus {
    pub fn from_domain(bonus: &ActiveBonus) -> Self {
        Self {
            employee_id: bonus.employee_id,
            kind: bonus.kind.as_str().to_string(),
            value: money_text(bonus.value),
        }
    }
}

// ============================================================================
// Shifts
// ============================================================================

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = shifts)]
pub struct ShiftRow {
    pub shift_id: i64,
    pub employee_id: i64,
    pub shift_date: String,
    pub clock_in: String,
    pub clock_out: Option<String>,
    pub status: String,
    pub worked_hours: String,
    pub total_sales: String,
    pub net_sales: String,
    pub commission_pct: String,
    pub total_hourly: String,
    pub commission_amount: String,
    pub flat_bonus: String,
    pub total_made: String,
    pub rolling_average: Option<String>,
    pub bonus_counter: i32,
}

impl ShiftRow {
    /// Builds the domain shift from this row and its product lines.
    pub fn into_domain(self, lines: Vec<ProductSaleRow>) -> Result<Shift, PersistenceError> {
        const TABLE: &str = "shifts";
        let product_sales: Vec<ProductSale> = lines
            .into_iter()
            .map(|line| {
                Ok(ProductSale {
                    amount: money_column("product_sales", &line.amount)?,
                    product: line.product,
                })
            })
            .collect::<Result<_, PersistenceError>>()?;

        Ok(Shift {
            shift_id: Some(self.shift_id),
            employee_id: self.employee_id,
            shift_date: parse_date(&self.shift_date).map_err(|e| corrupt(TABLE, &e))?,
            clock_in: parse_datetime(&self.clock_in).map_err(|e| corrupt(TABLE, &e))?,
            clock_out: self
                .clock_out
                .as_deref()
                .map(parse_datetime)
                .transpose()
                .map_err(|e| corrupt(TABLE, &e))?,
            status: ShiftStatus::from_str(&self.status).map_err(|e| corrupt(TABLE, &e))?,
            product_sales,
            figures: ShiftFigures {
                worked_hours: money_column(TABLE, &self.worked_hours)?,
                total_sales: money_column(TABLE, &self.total_sales)?,
                net_sales: money_column(TABLE, &self.net_sales)?,
                commission_pct: money_column(TABLE, &self.commission_pct)?,
                total_hourly: money_column(TABLE, &self.total_hourly)?,
                commission_amount: money_column(TABLE, &self.commission_amount)?,
                flat_bonus: money_column(TABLE, &self.flat_bonus)?,
                total_made: money_column(TABLE, &self.total_made)?,
                rolling_average: self
                    .rolling_average
                    .as_deref()
                    .map(|v| money_column(TABLE, v))
                    .transpose()?,
                bonus_counter: self.bonus_counter != 0,
            },
        })
    }
}

/// Insert and update values for a shift.
#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = shifts, treat_none_as_null = true)]
pub struct ShiftValues {
    pub employee_id: i64,
    pub shift_date: String,
    pub clock_in: String,
    pub clock_out: Option<String>,
    pub status: String,
    pub worked_hours: String,
    pub total_sales: String,
    pub net_sales: String,
    pub commission_pct: String,
    pub total_hourly: String,
    pub commission_amount: String,
    pub flat_bonus: String,
    pub total_made: String,
    pub rolling_average: Option<String>,
    pub bonus_counter: i32,
}

impl ShiftValues {
    pub fn from_domain(shift: &Shift) -> Self {
        let figures: &ShiftFigures = &shift.figures;
        Self {
            employee_id: shift.employee_id,
            shift_date: format_date(shift.shift_date),
            clock_in: format_datetime(shift.clock_in),
            clock_out: shift.clock_out.map(format_datetime),
            status: shift.status.as_str().to_string(),
            worked_hours: money_text(figures.worked_hours),
            total_sales: money_text(figures.total_sales),
            net_sales: money_text(figures.net_sales),
            commission_pct: money_text(figures.commission_pct),
            total_hourly: money_text(figures.total_hourly),
            commission_amount: money_text(figures.commission_amount),
            flat_bonus: money_text(figures.flat_bonus),
            total_made: money_text(figures.total_made),
            rolling_average: figures.rolling_average.map(money_text),
            bonus_counter: i32::from(figures.bonus_counter),
        }
    }
}

#[derive(Debug, Queryable, Selectable, Insertable)]
#[diesel(table_name = product_sales)]
pub struct ProductSaleRow {
    pub shift_id: i64,
    pub product: String,
    pub amount: String,
}

impl ProductSaleRow {
    pub fn from_domain(shift_id: i64, sale: &ProductSale) -> Self {
        Self {
            shift_id,
            product: sale.product.trim().to_string(),
            amount: money_text(sale.amount),
        }
    }
}

// ============================================================================
// Settlements
// ============================================================================

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = employee_fortnights)]
pub struct SettlementRow {
    pub settlement_id: i64,
    pub employee_id: i64,
    pub year: i32,
    pub month: i32,
    pub half: i32,
    pub total_shifts: i64,
    pub total_worked_hours: String,
    pub total_sales: String,
    pub total_commissions: String,
    pub total_hourly_pay: String,
    pub total_made: String,
    pub bonus_counter_true_count: i64,
    pub bonus_amount: String,
    pub total_salary: String,
    pub payment_date: String,
    pub is_paid: i32,
}

impl SettlementRow {
    pub fn period(&self) -> Result<FortnightPeriod, PersistenceError> {
        const TABLE: &str = "employee_fortnights";
        let month: u8 = u8::try_from(self.month).map_err(|e| corrupt(TABLE, &e))?;
        let half: u8 = u8::try_from(self.half).map_err(|e| corrupt(TABLE, &e))?;
        FortnightPeriod::new(self.year, month, half).map_err(|e| corrupt(TABLE, &e))
    }

    pub fn into_domain(self) -> Result<FortnightSettlement, PersistenceError> {
        const TABLE: &str = "employee_fortnights";
        Ok(FortnightSettlement {
            settlement_id: Some(self.settlement_id),
            employee_id: self.employee_id,
            period: self.period()?,
            total_shifts: self.total_shifts,
            total_worked_hours: money_column(TABLE, &self.total_worked_hours)?,
            total_sales: money_column(TABLE, &self.total_sales)?,
            total_commissions: money_column(TABLE, &self.total_commissions)?,
            total_hourly_pay: money_column(TABLE, &self.total_hourly_pay)?,
            total_made: money_column(TABLE, &self.total_made)?,
            bonus_counter_true_count: self.bonus_counter_true_count,
            bonus_amount: money_column(TABLE, &self.bonus_amount)?,
            total_salary: money_column(TABLE, &self.total_salary)?,
            payment_date: parse_date(&self.payment_date).map_err(|e| corrupt(TABLE, &e))?,
            is_paid: self.is_paid != 0,
        })
    }
}

/// Insert and update values for a settlement.
#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = employee_fortnights)]
pub struct SettlementValues {
    pub employee_id: i64,
    pub year: i32,
    pub month: i32,
    pub half: i32,
    pub total_shifts: i64,
    pub total_worked_hours: String,
    pub total_sales: String,
    pub total_commissions: String,
    pub total_hourly_pay: String,
    pub total_made: String,
    pub bonus_counter_true_count: i64,
    pub bonus_amount: String,
    pub total_salary: String,
    pub payment_date: String,
    pub is_paid: i32,
}

impl SettlementValues {
    pub fn from_domain(settlement: &FortnightSettlement) -> Self {
        let period: FortnightPeriod = settlement.period;
        Self {
            employee_id: settlement.employee_id,
            year: period.year(),
            month: i32::from(period.month_number()),
            half: i32::from(period.half().number()),
            total_shifts: settlement.total_shifts,
            total_worked_hours: money_text(settlement.total_worked_hours),
            total_sales: money_text(settlement.total_sales),
            total_commissions: money_text(settlement.total_commissions),
            total_hourly_pay: money_text(settlement.total_hourly_pay),
            total_made: money_text(settlement.total_made),
            bonus_counter_true_count: settlement.bonus_counter_true_count,
            bonus_amount: money_text(settlement.bonus_amount),
            total_salary: money_text(settlement.total_salary),
            payment_date: format_date(settlement.payment_date),
            is_paid: i32::from(settlement.is_paid),
        }
    }
}

// ============================================================================
// Ranks
// ============================================================================

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = ranks)]
pub struct RankRow {
    pub rank_id: i64,
    pub name: String,
    pub min_amount: String,
    pub max_amount: Option<String>,
    pub display_order: i32,
    pub reward: String,
    pub is_active: i32,
}

impl RankRow {
    pub fn into_domain(self) -> Result<Rank, PersistenceError> {
        const TABLE: &str = "ranks";
        Ok(Rank {
            rank_id: Some(self.rank_id),
            name: self.name,
            min_amount: money_column(TABLE, &self.min_amount)?,
            max_amount: self
                .max_amount
                .as_deref()
                .map(|v| money_column(TABLE, v))
                .transpose()?,
            display_order: self.display_order,
            reward: money_column(TABLE, &self.reward)?,
            is_active: self.is_active != 0,
        })
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = employee_ranks)]
pub struct EmployeeRankRow {
    pub employee_id: i64,
    pub year: i32,
    pub month: i32,
    pub total_sales: String,
    pub current_rank: String,
    pub previous_rank: Option<String>,
    pub best_rank: String,
    pub updated_at: i64,
}

impl EmployeeRankRow {
    pub fn into_domain(self) -> Result<EmployeeRank, PersistenceError> {
        const TABLE: &str = "employee_ranks";
        Ok(EmployeeRank {
            employee_id: self.employee_id,
            year: self.year,
            month: u8::try_from(self.month).map_err(|e| corrupt(TABLE, &e))?,
            total_sales: money_column(TABLE, &self.total_sales)?,
            current_rank: self.current_rank,
            previous_rank: self.previous_rank,
            best_rank: self.best_rank,
            updated_at: self.updated_at,
        })
    }
}

/// Insert and update values for an employee's monthly rank.
#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = employee_ranks, treat_none_as_null = true)]
pub struct EmployeeRankValues {
    pub employee_id: i64,
    pub year: i32,
    pub month: i32,
    pub total_sales: String,
    pub current_rank: String,
    pub previous_rank: Option<String>,
    pub best_rank: String,
    pub updated_at: i64,
}

impl EmployeeRankValues {
    pub fn from_domain(rank: &EmployeeRank) -> Self {
        Self {
            employee_id: rank.employee_id,
            year: rank.year,
            month: i32::from(rank.month),
            total_sales: money_text(rank.total_sales),
            current_rank: rank.current_rank.clone(),
            previous_rank: rank.previous_rank.clone(),
            best_rank: rank.best_rank.clone(),
            updated_at: rank.updated_at,
        }
    }
}

// ============================================================================
// Bonus transactions
// ============================================================================

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = bonus_transactions)]
pub struct BonusTransactionRow {
    pub transaction_id: i64,
    pub employee_id: i64,
    pub amount: String,
    pub kind: String,
    pub description: String,
    pub rank_name: Option<String>,
    pub balance_after: String,
    pub created_at: i64,
}

impl BonusTransactionRow {
    pub fn into_domain(self) -> Result<BonusTransaction, PersistenceError> {
        const TABLE: &str = "bonus_transactions";
        Ok(BonusTransaction {
            transaction_id: Some(self.transaction_id),
            employee_id: self.employee_id,
            amount: money_column(TABLE, &self.amount)?,
            kind: BonusTransactionKind::from_str(&self.kind).map_err(|e| corrupt(TABLE, &e))?,
            description: self.description,
            rank_name: self.rank_name,
            balance_after: money_column(TABLE, &self.balance_after)?,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = bonus_transactions)]
pub struct NewBonusTransaction {
    pub employee_id: i64,
    pub amount: String,
    pub kind: String,
    pub description: String,
    pub rank_name: Option<String>,
    pub balance_after: String,
    pub created_at: i64,
}

impl NewBonusTransaction {
    pub fn from_domain(transaction: &BonusTransaction) -> Self {
        Self {
            employee_id: transaction.employee_id,
            amount: money_text(transaction.amount),
            kind: transaction.kind.as_str().to_string(),
            description: transaction.description.clone(),
            rank_name: transaction.rank_name.clone(),
            balance_after: money_text(transaction.balance_after),
            created_at: transaction.created_at,
        }
    }
}

// ============================================================================
// Outbox
// ============================================================================

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = outbox_events)]
pub struct OutboxRow {
    pub event_id: i64,
    pub entity_table: String,
    pub entity_id: String,
    pub operation: String,
    pub payload: String,
    pub priority: i32,
    pub enqueued_at: i64,
    pub available_at: i64,
    pub attempts: i32,
    pub rate_limit_hits: i32,
    pub status: String,
    pub last_error: Option<String>,
    pub processed_at: Option<i64>,
}

impl OutboxRow {
    pub fn into_domain(self) -> Result<OutboxEvent, PersistenceError> {
        const TABLE: &str = "outbox_events";
        Ok(OutboxEvent {
            event_id: Some(self.event_id),
            entity_table: self.entity_table.parse().map_err(|e| corrupt(TABLE, &e))?,
            entity_id: self.entity_id,
            operation: self.operation.parse().map_err(|e| corrupt(TABLE, &e))?,
            payload: decode_payload(&self.payload).map_err(|e| corrupt(TABLE, &e))?,
            priority: self.priority,
            enqueued_at: self.enqueued_at,
            available_at: self.available_at,
            attempts: u32::try_from(self.attempts).map_err(|e| corrupt(TABLE, &e))?,
            rate_limit_hits: u32::try_from(self.rate_limit_hits)
                .map_err(|e| corrupt(TABLE, &e))?,
            status: self.status.parse().map_err(|e| corrupt(TABLE, &e))?,
            last_error: self.last_error,
            processed_at: self.processed_at,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = outbox_events)]
pub struct NewOutboxEvent {
    pub entity_table: String,
    pub entity_id: String,
    pub operation: String,
    pub payload: String,
    pub priority: i32,
    pub enqueued_at: i64,
    pub available_at: i64,
    pub status: String,
}

impl NewOutboxEvent {
    pub fn from_domain(event: &OutboxEvent) -> Result<Self, PersistenceError> {
        Ok(Self {
            entity_table: event.entity_table.as_str().to_string(),
            entity_id: event.entity_id.clone(),
            operation: event.operation.as_str().to_string(),
            payload: encode_payload(&event.payload)?,
            priority: event.priority,
            enqueued_at: event.enqueued_at,
            available_at: event.available_at,
            status: event.status.as_str().to_string(),
        })
    }
}
