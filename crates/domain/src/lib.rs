// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod clock;
mod commission;
mod error;
mod fortnight;
mod money;
mod payroll;
mod rank;
mod rolling_average;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use clock::{
    BusinessClock, DEFAULT_TIMEZONE, format_date, format_datetime, parse_date, parse_datetime,
};
pub use commission::{PartitionIssue, ResolvedTier, resolve_tier, validate_tier_partition};
pub use fortnight::{FortnightPeriod, Half, month_range, previous_month_range};
pub use money::{
    DEFAULT_BONUS_RATE, MONEY_DECIMAL_PLACES, NET_SALES_RATIO, parse_amount,
    require_non_negative, round_money,
};
pub use payroll::{BonusEffect, PayInputs, apply_bonuses, compute_pay, total_sales, worked_hours};
pub use rank::{RankOutcome, evaluate_rank, resolve_rank};
pub use rolling_average::{
    ROLLING_WINDOW_DAYS, SalesHistory, SalesHistoryEntry, compute_bonus_counter,
    compute_rolling_average, window_start,
};

// Re-export public types
pub use error::DomainError;
pub use types::{
    ActiveBonus, BonusKind, BonusTransaction, BonusTransactionKind, CommissionTier, Employee,
    EmployeeRank, FortnightSettlement, ProductSale, Rank, Shift, ShiftFigures, ShiftStatus,
};
pub use validation::{
    validate_bonus, validate_employee_fields, validate_product_sales, validate_time_range,
};
