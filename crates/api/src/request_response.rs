// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.
//!
//! Dates travel as `YYYY-MM-DD` and wall-clock times as
//! `YYYY-MM-DD HH:MM:SS`. Money travels as decimal strings.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shiftbook_domain::{
    ActiveBonus, BonusTransaction, Employee, EmployeeRank, FortnightSettlement, ProductSale,
    Shift, format_date, format_datetime,
};
use shiftbook_outbox::OutboxEvent;

/// One product line of a shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSaleInfo {
    /// Product name.
    pub product: String,
    /// Gross sales amount.
    pub amount: Decimal,
}

impl From<&ProductSale> for ProductSaleInfo {
    fn from(sale: &ProductSale) -> Self {
        Self {
            product: sale.product.clone(),
            amount: sale.amount,
        }
    }
}

impl From<ProductSaleInfo> for ProductSale {
    fn from(info: ProductSaleInfo) -> Self {
        Self {
            product: info.product,
            amount: info.amount,
        }
    }
}

/// API request to register an employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateEmployeeRequest {
    /// Display name.
    pub name: String,
    /// Hourly wage in dollars.
    pub hourly_wage: Decimal,
}

/// API request to record a complete shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateShiftRequest {
    /// The employee who worked the shift.
    pub employee_id: i64,
    /// Business date.
    pub shift_date: String,
    /// Clock-in wall time.
    pub clock_in: String,
    /// Clock-out wall time.
    pub clock_out: String,
    /// Per-product sales.
    #[serde(default)]
    pub product_sales: Vec<ProductSaleInfo>,
}

/// API request to clock an employee in.
///
/// Omitted times default to the current business wall clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenShiftRequest {
    /// The employee clocking in.
    pub employee_id: i64,
    /// Business date; defaults to the clock-in date.
    #[serde(default)]
    pub shift_date: Option<String>,
    /// Clock-in wall time; defaults to now.
    #[serde(default)]
    pub clock_in: Option<String>,
}

/// API request to close an open shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloseShiftRequest {
    /// Clock-out wall time; defaults to now.
    #[serde(default)]
    pub clock_out: Option<String>,
    /// Per-product sales.
    #[serde(default)]
    pub product_sales: Vec<ProductSaleInfo>,
}

/// API request to correct a closed shift. Omitted fields are unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AmendShiftRequest {
    /// Corrected business date.
    #[serde(default)]
    pub shift_date: Option<String>,
    /// Corrected clock-in.
    #[serde(default)]
    pub clock_in: Option<String>,
    /// Corrected clock-out.
    #[serde(default)]
    pub clock_out: Option<String>,
    /// Replacement product lines.
    #[serde(default)]
    pub product_sales: Option<Vec<ProductSaleInfo>>,
}

/// API request to grant a bonus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantBonusRequest {
    /// `percent_next`, `double_commission`, `flat` or `flat_immediate`.
    pub kind: String,
    /// Percentage points or dollars depending on `kind`.
    pub value: Decimal,
}

/// API request to adjust the bonus-currency balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditBonusBalanceRequest {
    /// Amount to add; negative to debit.
    pub amount: Decimal,
    /// Recorded on the bonus transaction. Defaults to "Manual credit" or
    /// "Manual debit".
    #[serde(default)]
    pub description: Option<String>,
}

/// An employee as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeResponse {
    /// The canonical identifier.
    pub employee_id: i64,
    /// Display name.
    pub name: String,
    /// Hourly wage.
    pub hourly_wage: Decimal,
    /// Tier last resolved for the employee.
    pub commission_tier_id: Option<i64>,
    /// Mirror-managed commission override.
    pub commission_override_pct: Option<Decimal>,
    /// Bonus-currency balance.
    pub bonus_balance: Decimal,
    /// Whether the employee can record shifts.
    pub is_active: bool,
}

impl EmployeeResponse {
    pub(crate) fn from_employee(employee: &Employee, employee_id: i64) -> Self {
        Self {
            employee_id,
            name: employee.name.clone(),
            hourly_wage: employee.hourly_wage,
            commission_tier_id: employee.commission_tier_id,
            commission_override_pct: employee.commission_override_pct,
            bonus_balance: employee.bonus_balance,
            is_active: employee.is_active,
        }
    }
}

/// A shift with its derived figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftResponse {
    /// The canonical identifier.
    pub shift_id: i64,
    /// The employee who worked the shift.
    pub employee_id: i64,
    /// Business date.
    pub shift_date: String,
    /// Clock-in wall time.
    pub clock_in: String,
    /// Clock-out wall time; absent while open.
    pub clock_out: Option<String>,
    /// `open` or `closed`.
    pub status: String,
    /// Per-product sales.
    pub product_sales: Vec<ProductSaleInfo>,
    /// Hours worked.
    pub worked_hours: Decimal,
    /// Sum of product sales.
    pub total_sales: Decimal,
    /// Sales after the fixed deduction.
    pub net_sales: Decimal,
    /// Effective commission percentage.
    pub commission_pct: Decimal,
    /// Hourly pay.
    pub total_hourly: Decimal,
    /// Commission pay.
    pub commission_amount: Decimal,
    /// Flat bonus dollars.
    pub flat_bonus: Decimal,
    /// Total pay for the shift.
    pub total_made: Decimal,
    /// Trailing weighted average; absent without enough history.
    pub rolling_average: Option<Decimal>,
    /// Whether the shift beat the average.
    pub bonus_counter: bool,
}

impl ShiftResponse {
    pub(crate) fn from_shift(shift: &Shift, shift_id: i64) -> Self {
        let figures = &shift.figures;
        Self {
            shift_id,
            employee_id: shift.employee_id,
            shift_date: format_date(shift.shift_date),
            clock_in: format_datetime(shift.clock_in),
            clock_out: shift.clock_out.map(format_datetime),
            status: shift.status.as_str().to_string(),
            product_sales: shift.product_sales.iter().map(ProductSaleInfo::from).collect(),
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
        }
    }
}

/// Recent shifts of one employee, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListShiftsResponse {
    /// The employee.
    pub employee_id: i64,
    /// The shifts.
    pub shifts: Vec<ShiftResponse>,
}

/// A fortnight settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementResponse {
    /// The canonical identifier.
    pub settlement_id: Option<i64>,
    /// The employee being paid.
    pub employee_id: i64,
    /// Calendar year.
    pub year: i32,
    /// Calendar month, 1-12.
    pub month: u8,
    /// Half of the month, 1 or 2.
    pub half: u8,
    /// Number of closed shifts in the period.
    pub total_shifts: i64,
    /// Hours worked.
    pub total_worked_hours: Decimal,
    /// Gross sales.
    pub total_sales: Decimal,
    /// Commission pay.
    pub total_commissions: Decimal,
    /// Hourly pay.
    pub total_hourly_pay: Decimal,
    /// Sum of shift totals.
    pub total_made: Decimal,
    /// Shifts that beat their rolling average.
    pub bonus_counter_true_count: i64,
    /// Fortnight bonus.
    pub bonus_amount: Decimal,
    /// `total_made` + `bonus_amount`.
    pub total_salary: Decimal,
    /// Date the settlement is paid out.
    pub payment_date: String,
    /// Whether the settlement has been paid.
    pub is_paid: bool,
}

impl From<&FortnightSettlement> for SettlementResponse {
    fn from(settlement: &FortnightSettlement) -> Self {
        Self {
            settlement_id: settlement.settlement_id,
            employee_id: settlement.employee_id,
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
        }
    }
}

/// An employee's rank for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankResponse {
    pub employee_id: i64,
    pub year: i32,
    pub month: u8,
    /// Sales of the month's closed shifts.
    pub total_sales: Decimal,
    pub current_rank: String,
    pub previous_rank: Option<String>,
    /// Best rank reached during the month.
    pub best_rank: String,
    /// Unix milliseconds.
    pub updated_at: i64,
}

impl From<&EmployeeRank> for RankResponse {
    fn from(rank: &EmployeeRank) -> Self {
        Self {
            employee_id: rank.employee_id,
            year: rank.year,
            month: rank.month,
            total_sales: rank.total_sales,
            current_rank: rank.current_rank.clone(),
            previous_rank: rank.previous_rank.clone(),
            best_rank: rank.best_rank.clone(),
            updated_at: rank.updated_at,
        }
    }
}

/// One change to an employee's bonus balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusTransactionResponse {
    pub transaction_id: Option<i64>,
    /// Signed; debits are negative.
    pub amount: Decimal,
    /// `credit`, `debit` or `rank_reward`.
    pub kind: String,
    pub description: String,
    pub rank_name: Option<String>,
    pub balance_after: Decimal,
    /// Unix milliseconds.
    pub created_at: i64,
}

impl From<&BonusTransaction> for BonusTransactionResponse {
    fn from(transaction: &BonusTransaction) -> Self {
        Self {
            transaction_id: transaction.transaction_id,
            amount: transaction.amount,
            kind: transaction.kind.as_str().to_string(),
            description: transaction.description.clone(),
            rank_name: transaction.rank_name.clone(),
            balance_after: transaction.balance_after,
            created_at: transaction.created_at,
        }
    }
}

/// An employee's bonus transactions, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListBonusTransactionsResponse {
    pub employee_id: i64,
    pub transactions: Vec<BonusTransactionResponse>,
}

/// A bonus held by an employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusResponse {
    /// The canonical identifier.
    pub bonus_id: Option<i64>,
    /// Owner of the bonus.
    pub employee_id: i64,
    /// Bonus kind.
    pub kind: String,
    /// Percentage points or dollars.
    pub value: Decimal,
    /// Whether a shift consumed the bonus.
    pub applied: bool,
}

impl From<&ActiveBonus> for BonusResponse {
    fn from(bonus: &ActiveBonus) -> Self {
        Self {
            bonus_id: bonus.bonus_id,
            employee_id: bonus.employee_id,
            kind: bonus.kind.as_str().to_string(),
            value: bonus.value,
            applied: bonus.applied,
        }
    }
}

/// Unconsumed bonuses of an employee, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListBonusesResponse {
    /// The employee.
    pub employee_id: i64,
    /// The bonuses.
    pub bonuses: Vec<BonusResponse>,
}

/// The commission tier a sales total falls into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveTierResponse {
    /// The sales total that was resolved.
    pub sales: Decimal,
    /// The chosen tier.
    pub tier_id: Option<i64>,
    /// Tier name.
    pub name: String,
    /// Commission percentage.
    pub percentage: Decimal,
    /// True when no band contained the total and the lowest band was used.
    pub fallback: bool,
}

/// A permanently failed replication event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedEventInfo {
    /// The event.
    pub event_id: Option<i64>,
    /// Mirror sheet of the entity.
    pub sheet: String,
    /// Entity identifier.
    pub entity_id: String,
    /// `insert`, `update` or `delete`.
    pub operation: String,
    /// Delivery attempts made.
    pub attempts: u32,
    /// Times the mirror throttled the event.
    pub rate_limit_hits: u32,
    /// Last delivery error.
    pub last_error: Option<String>,
}

impl From<&OutboxEvent> for FailedEventInfo {
    fn from(event: &OutboxEvent) -> Self {
        Self {
            event_id: event.event_id,
            sheet: event.entity_table.sheet_name().to_string(),
            entity_id: event.entity_id.clone(),
            operation: event.operation.as_str().to_string(),
            attempts: event.attempts,
            rate_limit_hits: event.rate_limit_hits,
            last_error: event.last_error.clone(),
        }
    }
}

/// Replication events that need operator attention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedEventsResponse {
    /// Total failed events.
    pub failed_count: i64,
    /// The most recent failed events.
    pub events: Vec<FailedEventInfo>,
}
