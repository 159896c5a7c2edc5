// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::fortnight::FortnightPeriod;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::{Date, PrimitiveDateTime};

/// Lifecycle state of a shift.
///
/// `Amended` is transient: an amendment re-enters the recompute path and
/// the shift is persisted as `Closed` again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ShiftStatus {
    /// Clock-in recorded, clock-out pending.
    #[default]
    Open,
    /// Clock-out and sales recorded, derived fields computed.
    Closed,
    /// Inputs changed after close; recompute in progress.
    Amended,
}

impl FromStr for ShiftStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            "amended" => Ok(Self::Amended),
            _ => Err(DomainError::InvalidShiftStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for ShiftStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ShiftStatus {
    /// Converts this status to its persisted string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Amended => "amended",
        }
    }

    /// Checks if a transition from this status to another is valid.
    ///
    /// Valid transitions are:
    /// - `Open` → `Closed`
    /// - `Closed` → `Amended`
    /// - `Amended` → `Closed`
    #[must_use]
    pub const fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Open | Self::Amended, Self::Closed) | (Self::Closed, Self::Amended)
        )
    }

    /// Validates a transition, returning the target status.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidShiftTransition` if the move is not allowed.
    pub const fn transition_to(self, target: Self) -> Result<Self, DomainError> {
        if self.can_transition_to(target) {
            Ok(target)
        } else {
            Err(DomainError::InvalidShiftTransition {
                from: self,
                to: target,
            })
        }
    }

    /// Whether the shift contributes to payroll aggregates.
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

/// An employee as known to the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// Database identifier. `None` until persisted.
    pub employee_id: Option<i64>,
    /// Display name.
    pub name: String,
    /// Hourly wage in dollars.
    pub hourly_wage: Decimal,
    /// Tier the employee was last resolved into.
    pub commission_tier_id: Option<i64>,
    /// Mirror-managed percentage that replaces the tier percentage when set.
    pub commission_override_pct: Option<Decimal>,
    /// Virtual bonus-currency balance.
    pub bonus_balance: Decimal,
    /// Inactive employees cannot record new shifts.
    pub is_active: bool,
}

impl Employee {
    /// Creates a new, unpersisted, active employee with a zero bonus balance.
    #[must_use]
    pub fn new(name: &str, hourly_wage: Decimal) -> Self {
        Self {
            employee_id: None,
            name: name.to_string(),
            hourly_wage,
            commission_tier_id: None,
            commission_override_pct: None,
            bonus_balance: Decimal::ZERO,
            is_active: true,
        }
    }
}

/// A sales-volume band with a flat commission percentage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionTier {
    /// Database identifier. `None` until persisted.
    pub tier_id: Option<i64>,
    /// Natural key (e.g. "Tier A").
    pub name: String,
    /// Inclusive lower bound.
    pub min_amount: Decimal,
    /// Inclusive upper bound. `None` means unbounded.
    pub max_amount: Option<Decimal>,
    /// Commission percentage (6 means 6%).
    pub percentage: Decimal,
    /// Inactive tiers are ignored by resolution.
    pub is_active: bool,
}

impl CommissionTier {
    /// Creates a new, unpersisted, active tier.
    #[must_use]
    pub fn new(
        name: &str,
        min_amount: Decimal,
        max_amount: Option<Decimal>,
        percentage: Decimal,
    ) -> Self {
        Self {
            tier_id: None,
            name: name.to_string(),
            min_amount,
            max_amount,
            percentage,
            is_active: true,
        }
    }

    /// Whether the closed band `[min_amount, max_amount]` contains `amount`.
    #[must_use]
    pub fn contains(&self, amount: Decimal) -> bool {
        amount >= self.min_amount && self.max_amount.is_none_or(|max| amount <= max)
    }
}

/// A monthly sales band employees climb through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rank {
    /// Database identifier. `None` until persisted.
    pub rank_id: Option<i64>,
    /// Natural key (e.g. "Hustler").
    pub name: String,
    /// Inclusive lower bound of monthly sales.
    pub min_amount: Decimal,
    /// Inclusive upper bound. `None` means unbounded.
    pub max_amount: Option<Decimal>,
    /// Position in the ladder; higher is better.
    pub display_order: i32,
    /// Bonus balance credited the first time the rank is reached in a month.
    pub reward: Decimal,
    /// Inactive ranks are ignored by resolution.
    pub is_active: bool,
}

impl Rank {
    /// Creates a new, unpersisted, active rank.
    #[must_use]
    pub fn new(
        name: &str,
        min_amount: Decimal,
        max_amount: Option<Decimal>,
        display_order: i32,
        reward: Decimal,
    ) -> Self {
        Self {
            rank_id: None,
            name: name.to_string(),
            min_amount,
            max_amount,
            display_order,
            reward,
            is_active: true,
        }
    }

    /// Whether the closed band `[min_amount, max_amount]` contains `amount`.
    #[must_use]
    pub fn contains(&self, amount: Decimal) -> bool {
        amount >= self.min_amount && self.max_amount.is_none_or(|max| amount <= max)
    }
}

/// An employee's rank for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeRank {
    pub employee_id: i64,
    pub year: i32,
    /// Calendar month, 1-12.
    pub month: u8,
    /// Sales of the month's closed and amended shifts.
    pub total_sales: Decimal,
    /// Rank for `total_sales`.
    pub current_rank: String,
    /// Rank held before the last change, if it ever changed.
    pub previous_rank: Option<String>,
    /// Best rank reached during the month.
    pub best_rank: String,
    /// Last recompute in unix milliseconds.
    pub updated_at: i64,
}

/// Why an employee's bonus balance changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BonusTransactionKind {
    /// Manual credit.
    Credit,
    /// Manual debit.
    Debit,
    /// Reward for reaching a new best rank in a month.
    RankReward,
}

impl BonusTransactionKind {
    /// Converts this kind to its persisted string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Credit => "credit",
            Self::Debit => "debit",
            Self::RankReward => "rank_reward",
        }
    }
}

impl FromStr for BonusTransactionKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "credit" => Ok(Self::Credit),
            "debit" => Ok(Self::Debit),
            "rank_reward" => Ok(Self::RankReward),
            _ => Err(DomainError::InvalidTransactionKind(s.to_string())),
        }
    }
}

impl std::fmt::Display for BonusTransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One change to an employee's bonus balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusTransaction {
    /// Database identifier. `None` until persisted.
    pub transaction_id: Option<i64>,
    pub employee_id: i64,
    /// Signed change; debits are negative.
    pub amount: Decimal,
    pub kind: BonusTransactionKind,
    pub description: String,
    /// The rank that earned a reward.
    pub rank_name: Option<String>,
    /// Balance once the change was applied.
    pub balance_after: Decimal,
    /// Unix milliseconds.
    pub created_at: i64,
}

/// Kind of one-shot bonus an employee can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BonusKind {
    /// Adds `value` percentage points to the next shift's commission.
    PercentNext,
    /// Doubles the commission percentage accumulated so far.
    DoubleCommission,
    /// Adds `value` dollars to the next shift's total.
    Flat,
    /// Same as `Flat`; granted for immediate payout.
    FlatImmediate,
}

impl FromStr for BonusKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "percent_next" => Ok(Self::PercentNext),
            "double_commission" => Ok(Self::DoubleCommission),
            "flat" => Ok(Self::Flat),
            "flat_immediate" => Ok(Self::FlatImmediate),
            _ => Err(DomainError::InvalidBonusKind(s.to_string())),
        }
    }
}

impl std::fmt::Display for BonusKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl BonusKind {
    /// Converts this kind to its persisted string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PercentNext => "percent_next",
            Self::DoubleCommission => "double_commission",
            Self::Flat => "flat",
            Self::FlatImmediate => "flat_immediate",
        }
    }
}

/// A bonus granted to an employee, consumed by the next shift written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveBonus {
    /// Database identifier. `None` until persisted.
    pub bonus_id: Option<i64>,
    /// Owner of the bonus.
    pub employee_id: i64,
    /// What the bonus does.
    pub kind: BonusKind,
    /// Percentage points or dollars depending on `kind`.
    pub value: Decimal,
    /// Whether a shift has consumed the bonus.
    pub applied: bool,
    /// The shift that consumed the bonus.
    pub shift_id: Option<i64>,
}

impl ActiveBonus {
    /// Creates a new, unpersisted, unapplied bonus.
    #[must_use]
    pub const fn new(employee_id: i64, kind: BonusKind, value: Decimal) -> Self {
        Self {
            bonus_id: None,
            employee_id,
            kind,
            value,
            applied: false,
            shift_id: None,
        }
    }
}

/// Sales of one product within a shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSale {
    /// Product name; doubles as the mirror column name.
    pub product: String,
    /// Gross sales amount.
    pub amount: Decimal,
}

impl ProductSale {
    /// Creates a product sale line.
    #[must_use]
    pub fn new(product: &str, amount: Decimal) -> Self {
        Self {
            product: product.to_string(),
            amount,
        }
    }
}

/// Derived pay figures of a shift. Computed, never edited directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ShiftFigures {
    /// Hours between clock-in and clock-out, two decimals.
    pub worked_hours: Decimal,
    /// Sum of product sales.
    pub total_sales: Decimal,
    /// `total_sales` × 0.8.
    pub net_sales: Decimal,
    /// Base percentage plus bonus adjustments.
    pub commission_pct: Decimal,
    /// `worked_hours` × hourly wage.
    pub total_hourly: Decimal,
    /// `net_sales` × `commission_pct` / 100.
    pub commission_amount: Decimal,
    /// Flat bonus dollars added to this shift.
    pub flat_bonus: Decimal,
    /// `total_hourly` + `commission_amount` + `flat_bonus`.
    pub total_made: Decimal,
    /// Weighted trailing average, absent without enough history.
    pub rolling_average: Option<Decimal>,
    /// Whether `total_sales` met or exceeded `rolling_average`.
    pub bonus_counter: bool,
}

/// A recorded shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shift {
    /// Database identifier. `None` until persisted.
    pub shift_id: Option<i64>,
    /// Employee who worked the shift.
    pub employee_id: i64,
    /// Business date of the shift.
    pub shift_date: Date,
    /// Clock-in wall time.
    pub clock_in: PrimitiveDateTime,
    /// Clock-out wall time. `None` while open.
    pub clock_out: Option<PrimitiveDateTime>,
    /// Lifecycle state.
    pub status: ShiftStatus,
    /// Per-product sales.
    pub product_sales: Vec<ProductSale>,
    /// Derived pay figures.
    pub figures: ShiftFigures,
}

impl Shift {
    /// The fortnight this shift settles into.
    #[must_use]
    pub fn period(&self) -> FortnightPeriod {
        FortnightPeriod::containing(self.shift_date)
    }
}

/// Biweekly payroll totals for one employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FortnightSettlement {
    /// Database identifier. `None` until persisted.
    pub settlement_id: Option<i64>,
    /// Employee being paid.
    pub employee_id: i64,
    /// Year, month and half.
    pub period: FortnightPeriod,
    /// Number of closed shifts in the period.
    pub total_shifts: i64,
    /// Sum of worked hours.
    pub total_worked_hours: Decimal,
    /// Sum of gross sales.
    pub total_sales: Decimal,
    /// Sum of commission amounts.
    pub total_commissions: Decimal,
    /// Sum of hourly pay.
    pub total_hourly_pay: Decimal,
    /// Sum of `total_made`.
    pub total_made: Decimal,
    /// Number of shifts with the bonus counter set.
    pub bonus_counter_true_count: i64,
    /// `bonus_counter_true_count` × `total_commissions` × bonus rate.
    pub bonus_amount: Decimal,
    /// `total_made` + `bonus_amount`.
    pub total_salary: Decimal,
    /// When the settlement is paid out.
    pub payment_date: Date,
    /// Whether payroll has been paid.
    pub is_paid: bool,
}
