// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod settlement_tests;

use crate::Persistence;
use rust_decimal::Decimal;
use shiftbook_domain::{Employee, ProductSale, Shift};
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

pub fn create_test_persistence() -> Persistence {
    Persistence::new_in_memory().expect("Failed to create in-memory database")
}

/// Persists an active employee earning $20/h and returns its identifier.
pub fn create_test_employee(persistence: &mut Persistence, name: &str) -> i64 {
    let employee: Employee = persistence
        .create_employee(&Employee::new(name, dec("20")))
        .expect("Failed to create employee");
    employee.employee_id.expect("Employee should have an ID")
}

/// Records a 09:00-17:00 shift with a single product line.
pub fn create_test_shift(
    persistence: &mut Persistence,
    employee_id: i64,
    day: Date,
    sales: &str,
) -> Shift {
    persistence
        .create_shift(
            employee_id,
            day,
            at(day, 9, 0),
            at(day, 17, 0),
            vec![ProductSale::new("Widget", dec(sales))],
        )
        .expect("Failed to create shift")
}
