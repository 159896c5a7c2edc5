// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Conversion between entity snapshots and mirror rows.
//!
//! Pushed rows start with an `ID` column. Each product sold on a shift
//! becomes its own column, named after the product, between the hours and
//! the sales totals.

use crate::error::ReplicationError;
use crate::mirror::MirrorRow;
use crate::pull::ReferenceTable;
use rust_decimal::Decimal;
use shiftbook_domain::{CommissionTier, parse_amount};
use shiftbook_outbox::{
    BonusSnapshot, BonusTransactionSnapshot, EmployeeSnapshot, EntitySnapshot, RankSnapshot,
    SettlementSnapshot, ShiftSnapshot,
};
use shiftbook_persistence::EmployeeSettings;

fn money(value: Decimal) -> String {
    format!("{value:.2}")
}

fn optional_money(value: Option<Decimal>) -> String {
    value.map(money).unwrap_or_default()
}

const fn flag(value: bool) -> &'static str {
    if value { "TRUE" } else { "FALSE" }
}

/// Builds the mirror row describing `snapshot`.
#[must_use]
pub fn to_mirror_row(snapshot: &EntitySnapshot) -> MirrorRow {
    match snapshot {
        EntitySnapshot::Shift(shift) => shift_row(shift),
        EntitySnapshot::ActiveBonus(bonus) => bonus_row(bonus),
        EntitySnapshot::Employee(employee) => employee_row(employee),
        EntitySnapshot::Settlement(settlement) => settlement_row(settlement),
        EntitySnapshot::Rank(rank) => rank_row(rank),
        EntitySnapshot::BonusTransaction(transaction) => transaction_row(transaction),
    }
}

fn shift_row(shift: &ShiftSnapshot) -> MirrorRow {
    let mut row: MirrorRow = MirrorRow::new()
        .with("ID", shift.shift_id.to_string())
        .with("Date", shift.shift_date.clone())
        .with("EmployeeID", shift.employee_id.to_string())
        .with("EmployeeName", shift.employee_name.clone())
        .with("ClockIn", shift.clock_in.clone())
        .with("ClockOut", shift.clock_out.clone().unwrap_or_default())
        .with("WorkedHours", money(shift.worked_hours));

    for line in &shift.products {
        row.set(&line.product, money(line.amount));
    }

    row.with("TotalSales", money(shift.total_sales))
        .with("NetSales", money(shift.net_sales))
        .with("CommissionPct", money(shift.commission_pct))
        .with("TotalHourly", money(shift.total_hourly))
        .with("Commissions", money(shift.commission_amount))
        .with("FlatBonus", money(shift.flat_bonus))
        .with("TotalMade", money(shift.total_made))
        .with("RollingAverage", optional_money(shift.rolling_average))
        .with("BonusCounter", flag(shift.bonus_counter))
        .with("Status", shift.status.clone())
}

fn bonus_row(bonus: &BonusSnapshot) -> MirrorRow {
    MirrorRow::new()
        .with("ID", bonus.bonus_id.to_string())
        .with("EmployeeID", bonus.employee_id.to_string())
        .with("EmployeeName", bonus.employee_name.clone())
        .with("Kind", bonus.kind.clone())
        .with("Value", money(bonus.value))
        .with("Applied", flag(bonus.applied))
        .with(
            "ShiftID",
            bonus.shift_id.map(|id| id.to_string()).unwrap_or_default(),
        )
}

fn employee_row(employee: &EmployeeSnapshot) -> MirrorRow {
    MirrorRow::new()
        .with("ID", employee.employee_id.to_string())
        .with("Name", employee.name.clone())
        .with("HourlyWage", money(employee.hourly_wage))
        .with(
            "CommissionTier",
            employee.commission_tier.clone().unwrap_or_default(),
        )
        .with(
            "CommissionOverridePct",
            optional_money(employee.commission_override_pct),
        )
        .with("BonusBalance", money(employee.bonus_balance))
        .with("Active", flag(employee.is_active))
}

fn settlement_row(settlement: &SettlementSnapshot) -> MirrorRow {
    MirrorRow::new()
        .with("ID", settlement.settlement_id.to_string())
        .with("EmployeeID", settlement.employee_id.to_string())
        .with("EmployeeName", settlement.employee_name.clone())
        .with("Year", settlement.year.to_string())
        .with("Month", settlement.month.to_string())
        .with("Half", settlement.half.to_string())
        .with("TotalShifts", settlement.total_shifts.to_string())
        .with("TotalWorkedHours", money(settlement.total_worked_hours))
        .with("TotalSales", money(settlement.total_sales))
        .with("TotalCommissions", money(settlement.total_commissions))
        .with("TotalHourlyPay", money(settlement.total_hourly_pay))
        .with("TotalMade", money(settlement.total_made))
        .with(
            "BonusCounterTrueCount",
            settlement.bonus_counter_true_count.to_string(),
        )
        .with("BonusAmount", money(settlement.bonus_amount))
        .with("TotalSalary", money(settlement.total_salary))
        .with("PaymentDate", settlement.payment_date.clone())
        .with("Paid", flag(settlement.is_paid))
}

fn rank_row(rank: &RankSnapshot) -> MirrorRow {
    MirrorRow::new()
        .with("ID", rank.rank_key.clone())
        .with("EmployeeID", rank.employee_id.to_string())
        .with("EmployeeName", rank.employee_name.clone())
        .with("Year", rank.year.to_string())
        .with("Month", rank.month.to_string())
        .with("TotalSales", money(rank.total_sales))
        .with("CurrentRank", rank.current_rank.clone())
        .with("PreviousRank", rank.previous_rank.clone().unwrap_or_default())
        .with("BestRank", rank.best_rank.clone())
        .with("UpdatedAt", rank.updated_at.clone())
}

fn transaction_row(transaction: &BonusTransactionSnapshot) -> MirrorRow {
    MirrorRow::new()
        .with("ID", transaction.transaction_id.to_string())
        .with("EmployeeID", transaction.employee_id.to_string())
        .with("EmployeeName", transaction.employee_name.clone())
        .with("Amount", money(transaction.amount))
        .with("Kind", transaction.kind.clone())
        .with("Description", transaction.description.clone())
        .with("RankName", transaction.rank_name.clone().unwrap_or_default())
        .with("BalanceAfter", money(transaction.balance_after))
        .with("CreatedAt", transaction.created_at.clone())
}

/// Reads one reference sheet, remembering the row number for errors.
struct SheetReader {
    sheet: &'static str,
    row: usize,
}

impl SheetReader {
    fn invalid(&self, reason: String) -> ReplicationError {
        ReplicationError::InvalidRow {
            sheet: self.sheet,
            row: self.row,
            reason,
        }
    }

    fn required<'a>(&self, row: &'a MirrorRow, column: &str) -> Result<&'a str, ReplicationError> {
        row.get(column)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| self.invalid(format!("missing {column}")))
    }

    fn optional<'a>(row: &'a MirrorRow, column: &str) -> Option<&'a str> {
        row.get(column)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    fn amount(&self, column: &str, value: &str) -> Result<Decimal, ReplicationError> {
        parse_amount(value).map_err(|e| self.invalid(format!("{column}: {e}")))
    }

    fn flag(&self, column: &str, value: Option<&str>) -> Result<bool, ReplicationError> {
        match value.map(str::to_ascii_lowercase).as_deref() {
            None | Some("true" | "1" | "yes") => Ok(true),
            Some("false" | "0" | "no") => Ok(false),
            Some(other) => Err(self.invalid(format!("{column}: '{other}' is not a boolean"))),
        }
    }
}

fn is_blank(row: &MirrorRow) -> bool {
    row.columns()
        .all(|column| row.get(column).is_none_or(|value| value.trim().is_empty()))
}

/// Parses the `EmployeeSettings` sheet.
///
/// Columns: `EmployeeID`, `HourlyWage`, `CommissionOverridePct` (blank for
/// none). Blank rows are ignored.
///
/// # Errors
///
/// Returns `ReplicationError::InvalidRow` for the first malformed row.
pub fn parse_employee_settings(
    rows: &[MirrorRow],
) -> Result<Vec<EmployeeSettings>, ReplicationError> {
    let mut settings: Vec<EmployeeSettings> = Vec::new();

    for (index, row) in rows.iter().enumerate() {
        if is_blank(row) {
            continue;
        }
        let reader: SheetReader = SheetReader {
            sheet: ReferenceTable::EmployeeSettings.sheet_name(),
            row: index + 1,
        };

        let id_text: &str = reader.required(row, "EmployeeID")?;
        let employee_id: i64 = id_text
            .parse()
            .map_err(|_| reader.invalid(format!("EmployeeID: '{id_text}' is not an integer")))?;
        let hourly_wage: Decimal =
            reader.amount("HourlyWage", reader.required(row, "HourlyWage")?)?;
        let commission_override_pct: Option<Decimal> =
            SheetReader::optional(row, "CommissionOverridePct")
                .map(|value| reader.amount("CommissionOverridePct", value))
                .transpose()?;

        settings.push(EmployeeSettings {
            employee_id,
            hourly_wage,
            commission_override_pct,
        });
    }

    Ok(settings)
}

/// Parses the `CommissionTiers` sheet.
///
/// Columns: `Name`, `MinAmount`, `MaxAmount` (blank for unbounded),
/// `Percentage`, `Active` (optional, defaults to active). Blank rows are
/// ignored.
///
/// # Errors
///
/// Returns `ReplicationError::InvalidRow` for the first malformed row.
pub fn parse_commission_tiers(
    rows: &[MirrorRow],
) -> Result<Vec<CommissionTier>, ReplicationError> {
    let mut tiers: Vec<CommissionTier> = Vec::new();

    for (index, row) in rows.iter().enumerate() {
        if is_blank(row) {
            continue;
        }
        let reader: SheetReader = SheetReader {
            sheet: ReferenceTable::CommissionTiers.sheet_name(),
            row: index + 1,
        };

        let name: &str = reader.required(row, "Name")?;
        let min_amount: Decimal = reader.amount("MinAmount", reader.required(row, "MinAmount")?)?;
        let max_amount: Option<Decimal> = SheetReader::optional(row, "MaxAmount")
            .map(|value| reader.amount("MaxAmount", value))
            .transpose()?;
        let percentage: Decimal =
            reader.amount("Percentage", reader.required(row, "Percentage")?)?;

        let mut tier: CommissionTier = CommissionTier::new(name, min_amount, max_amount, percentage);
        tier.is_active = reader.flag("Active", SheetReader::optional(row, "Active"))?;
        tiers.push(tier);
    }

    Ok(tiers)
}
