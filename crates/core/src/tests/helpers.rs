// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::LedgerState;
use rust_decimal::Decimal;
use shiftbook_domain::{
    CommissionTier, Employee, ProductSale, SalesHistory, SalesHistoryEntry, Shift, ShiftFigures,
    ShiftStatus,
};
use std::str::FromStr;
use time::{Date, Month, PrimitiveDateTime, Time};

pub fn dec(value: &str) -> Decimal {
    Decimal::from_str(value).unwrap()
}

pub fn date(year: i32, month: u8, day: u8) -> Date {
    Date::from_calendar_date(year, Month::try_from(month).unwrap(), day).unwrap()
}

pub fn at(day: Date, hour: u8, minute: u8) -> PrimitiveDateTime {
    PrimitiveDateTime::new(day, Time::from_hms(hour, minute, 0).unwrap())
}

pub fn create_test_employee() -> Employee {
    let mut employee: Employee = Employee::new("Test Employee", dec("20"));
    employee.employee_id = Some(1);
    employee
}

pub fn create_test_tiers() -> Vec<CommissionTier> {
    let mut tier_c = CommissionTier::new("Tier C", dec("0"), Some(dec("49999.99")), dec("6"));
    tier_c.tier_id = Some(3);
    let mut tier_b =
        CommissionTier::new("Tier B", dec("50000"), Some(dec("99999.99")), dec("5"));
    tier_b.tier_id = Some(2);
    let mut tier_a = CommissionTier::new("Tier A", dec("100000"), None, dec("4"));
    tier_a.tier_id = Some(1);
    vec![tier_c, tier_b, tier_a]
}

/// State for employee 1 at $20/h with the default tier table.
pub fn create_test_state() -> LedgerState {
    let mut state: LedgerState = LedgerState::new(create_test_employee());
    state.tiers = create_test_tiers();
    state
}

/// History whose weighted average for 2026-03-10 is exactly 450.
pub fn create_history_averaging_450() -> SalesHistory {
    let first: Date = date(2026, 3, 3);
    let second: Date = date(2026, 3, 9);
    SalesHistory {
        first_shift_date: Some(first),
        entries: vec![
            SalesHistoryEntry {
                shift_id: 10,
                shift_date: first,
                clock_in: at(first, 9, 0),
                total_sales: dec("300"),
            },
            SalesHistoryEntry {
                shift_id: 11,
                shift_date: second,
                clock_in: at(second, 9, 0),
                // (1*300 + 2*525) / 3 = 450
                total_sales: dec("525"),
            },
        ],
    }
}

pub fn create_test_closed_shift(shift_id: i64, day: Date, sales: &str) -> Shift {
    Shift {
        shift_id: Some(shift_id),
        employee_id: 1,
        shift_date: day,
        clock_in: at(day, 9, 0),
        clock_out: Some(at(day, 17, 0)),
        status: ShiftStatus::Closed,
        product_sales: vec![ProductSale::new("Widget", dec(sales))],
        figures: ShiftFigures {
            worked_hours: dec("8"),
            total_sales: dec(sales),
            net_sales: dec(sales) * dec("0.8"),
            commission_pct: dec("6"),
            total_hourly: dec("160"),
            commission_amount: dec(sales) * dec("0.048"),
            flat_bonus: Decimal::ZERO,
            total_made: dec("160") + dec(sales) * dec("0.048"),
            rolling_average: None,
            bonus_counter: false,
        },
    }
}
