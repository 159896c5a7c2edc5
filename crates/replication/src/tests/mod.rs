// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod transform_tests;

use crate::{ReplicationConfig, SharedPersistence};
use rust_decimal::Decimal;
use shiftbook_domain::{Employee, ProductSale};
use shiftbook_persistence::Persistence;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use time::{Date, Month, PrimitiveDateTime, Time};
use tokio::sync::Mutex;

pub fn dec(value: &str) -> Decimal {
    Decimal::from_str(value).unwrap()
}

pub fn at(day: Date, hour: u8) -> PrimitiveDateTime {
    PrimitiveDateTime::new(day, Time::from_hms(hour, 0, 0).unwrap())
}

pub fn create_test_date() -> Date {
    Date::from_calendar_date(2026, Month::March, 10).unwrap()
}

/// Retries immediately so a second pass sees rescheduled events.
pub fn create_test_config() -> ReplicationConfig {
    ReplicationConfig {
        batch_size: 10,
        poll_interval: Duration::from_millis(10),
        backoff_base: Duration::ZERO,
        backoff_jitter: Duration::ZERO,
        rate_limit_backoff: Duration::ZERO,
        apply_timeout: Duration::from_secs(5),
        ..ReplicationConfig::default()
    }
}

pub fn create_test_shared() -> SharedPersistence {
    Arc::new(Mutex::new(
        Persistence::new_in_memory().expect("Failed to create in-memory database"),
    ))
}

/// Queues four events: employee insert, shift insert, employee tier update
/// and settlement insert. Returns the employee and shift IDs.
pub async fn create_test_queue(persistence: &SharedPersistence) -> (i64, i64) {
    let mut store = persistence.lock().await;
    let employee_id: i64 = store
        .create_employee(&Employee::new("Alice", dec("20")))
        .unwrap()
        .employee_id
        .unwrap();
    let day: Date = create_test_date();
    let shift_id: i64 = store
        .create_shift(
            employee_id,
            day,
            at(day, 9),
            at(day, 17),
            vec![
                ProductSale::new("Widget", dec("300")),
                ProductSale::new("Gadget", dec("200")),
            ],
        )
        .unwrap()
        .shift_id
        .unwrap();
    (employee_id, shift_id)
}
