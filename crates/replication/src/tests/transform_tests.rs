// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::{at, create_test_date, dec};
use crate::{
    MirrorRow, ReplicationError, parse_commission_tiers, parse_employee_settings, to_mirror_row,
};
use shiftbook_domain::{
    BonusTransaction, BonusTransactionKind, CommissionTier, EmployeeRank, ProductSale, Shift,
    ShiftFigures, ShiftStatus,
};
use shiftbook_outbox::{BonusTransactionSnapshot, EntitySnapshot, RankSnapshot, ShiftSnapshot};
use shiftbook_persistence::EmployeeSettings;

fn create_test_snapshot() -> EntitySnapshot {
    let day = create_test_date();
    let shift: Shift = Shift {
        shift_id: Some(12),
        employee_id: 3,
        shift_date: day,
        clock_in: at(day, 9),
        clock_out: Some(at(day, 17)),
        status: ShiftStatus::Closed,
        product_sales: vec![
            ProductSale::new("Widget", dec("300")),
            ProductSale::new("Gadget", dec("200")),
        ],
        figures: ShiftFigures {
            worked_hours: dec("8"),
            total_sales: dec("500"),
            net_sales: dec("400"),
            commission_pct: dec("6"),
            total_hourly: dec("160"),
            commission_amount: dec("24"),
            flat_bonus: dec("0"),
            total_made: dec("184"),
            rolling_average: None,
            bonus_counter: true,
        },
    };
    EntitySnapshot::Shift(ShiftSnapshot::from_shift(&shift, "Alice").unwrap())
}

#[test]
fn test_shift_row_expands_products_into_columns() {
    let row: MirrorRow = to_mirror_row(&create_test_snapshot());
    let columns: Vec<&str> = row.columns().collect();

    assert_eq!(row.key(), Some("12"));
    assert_eq!(
        columns[..9],
        [
            "ID",
            "Date",
            "EmployeeID",
            "EmployeeName",
            "ClockIn",
            "ClockOut",
            "WorkedHours",
            "Widget",
            "Gadget"
        ]
    );
    assert_eq!(row.get("Widget"), Some("300.00"));
    assert_eq!(row.get("TotalMade"), Some("184.00"));
    assert_eq!(row.get("RollingAverage"), Some(""));
    assert_eq!(row.get("BonusCounter"), Some("TRUE"));
    assert_eq!(row.get("Status"), Some("closed"));
}

fn create_test_tier_row(name: &str, min: &str, max: &str, pct: &str) -> MirrorRow {
    MirrorRow::new()
        .with("Name", name)
        .with("MinAmount", min)
        .with("MaxAmount", max)
        .with("Percentage", pct)
}

#[test]
fn test_parse_commission_tiers() {
    let rows: Vec<MirrorRow> = vec![
        create_test_tier_row("Tier C", "0", "49999.99", "6"),
        create_test_tier_row("", "", "", ""),
        create_test_tier_row("Tier A", "50000", "", "4").with("Active", "FALSE"),
    ];

    let tiers: Vec<CommissionTier> = parse_commission_tiers(&rows).unwrap();

    assert_eq!(tiers.len(), 2);
    assert_eq!(tiers[0].max_amount, Some(dec("49999.99")));
    assert!(tiers[0].is_active);
    assert_eq!(tiers[1].max_amount, None);
    assert!(!tiers[1].is_active);
}

#[test]
fn test_parse_commission_tiers_reports_bad_row() {
    let rows: Vec<MirrorRow> = vec![
        create_test_tier_row("Tier C", "0", "", "6"),
        create_test_tier_row("Tier B", "lots", "", "5"),
    ];

    let result = parse_commission_tiers(&rows);
    assert!(matches!(
        result,
        Err(ReplicationError::InvalidRow { row: 2, .. })
    ));
}

#[test]
fn test_parse_employee_settings() {
    let rows: Vec<MirrorRow> = vec![
        MirrorRow::new()
            .with("EmployeeID", "4")
            .with("HourlyWage", "22.5")
            .with("CommissionOverridePct", ""),
        MirrorRow::new()
            .with("EmployeeID", "5")
            .with("HourlyWage", "18")
            .with("CommissionOverridePct", "7.5"),
    ];

    let settings: Vec<EmployeeSettings> = parse_employee_settings(&rows).unwrap();

    assert_eq!(
        settings,
        vec![
            EmployeeSettings {
                employee_id: 4,
                hourly_wage: dec("22.5"),
                commission_override_pct: None,
            },
            EmployeeSettings {
                employee_id: 5,
                hourly_wage: dec("18"),
                commission_override_pct: Some(dec("7.5")),
            },
        ]
    );
}

#[test]
fn test_parse_employee_settings_requires_wage() {
    let rows: Vec<MirrorRow> = vec![MirrorRow::new().with("EmployeeID", "4")];

    let result = parse_employee_settings(&rows);
    assert!(matches!(
        result,
        Err(ReplicationError::InvalidRow { row: 1, .. })
    ));
}

#[test]
fn test_rank_row_is_keyed_by_employee_and_month() {
    let rank = EmployeeRank {
        employee_id: 3,
        year: 2026,
        month: 3,
        total_sales: dec("6000"),
        current_rank: "Hustler".to_string(),
        previous_rank: None,
        best_rank: "Hustler".to_string(),
        updated_at: 0,
    };
    let row: MirrorRow = to_mirror_row(&EntitySnapshot::Rank(RankSnapshot::from_rank(&rank, "Alice")));

    assert_eq!(row.key(), Some("3-2026-03"));
    assert_eq!(row.get("TotalSales"), Some("6000.00"));
    assert_eq!(row.get("PreviousRank"), Some(""));
    assert_eq!(row.get("BestRank"), Some("Hustler"));
}

#[test]
fn test_transaction_row_keeps_sign_of_debit() {
    let transaction = BonusTransaction {
        transaction_id: Some(9),
        employee_id: 3,
        amount: dec("-5"),
        kind: BonusTransactionKind::Debit,
        description: "Manual debit".to_string(),
        rank_name: None,
        balance_after: dec("20.5"),
        created_at: 0,
    };
    let snapshot = BonusTransactionSnapshot::from_transaction(&transaction, "Alice").unwrap();
    let row: MirrorRow = to_mirror_row(&EntitySnapshot::BonusTransaction(snapshot));

    assert_eq!(row.key(), Some("9"));
    assert_eq!(row.get("Amount"), Some("-5.00"));
    assert_eq!(row.get("Kind"), Some("debit"));
    assert_eq!(row.get("BalanceAfter"), Some("20.50"));
}
