// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test module for the API crate.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod cache_tests;
mod service_tests;

use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;
use shiftbook_persistence::Persistence;
use shiftbook_replication::SharedPersistence;
use tokio::sync::Mutex;

use crate::{
    CreateEmployeeRequest, CreateShiftRequest, PayrollConfig, ProductSaleInfo, ShiftResponse,
    ShiftService,
};

pub fn dec(value: &str) -> Decimal {
    Decimal::from_str(value).unwrap()
}

pub fn create_test_shared() -> SharedPersistence {
    Arc::new(Mutex::new(
        Persistence::new_in_memory().expect("Failed to create in-memory database"),
    ))
}

pub fn create_test_service() -> (ShiftService, SharedPersistence) {
    let shared: SharedPersistence = create_test_shared();
    let service: ShiftService = ShiftService::new(Arc::clone(&shared), &PayrollConfig::default())
        .expect("Failed to create service");
    (service, shared)
}

/// Registers an active employee earning $20/h and returns its identifier.
pub async fn create_test_employee(service: &ShiftService, name: &str) -> i64 {
    service
        .create_employee(&CreateEmployeeRequest {
            name: name.to_string(),
            hourly_wage: dec("20"),
        })
        .await
        .expect("Failed to create employee")
        .employee_id
}

pub fn create_test_shift_request(employee_id: i64, day: &str, sales: &str) -> CreateShiftRequest {
    CreateShiftRequest {
        employee_id,
        shift_date: day.to_string(),
        clock_in: format!("{day} 09:00:00"),
        clock_out: format!("{day} 17:00:00"),
        product_sales: vec![ProductSaleInfo {
            product: String::from("Widget"),
            amount: dec(sales),
        }],
    }
}

pub async fn create_test_shift(
    service: &ShiftService,
    employee_id: i64,
    day: &str,
    sales: &str,
) -> ShiftResponse {
    service
        .create_shift(create_test_shift_request(employee_id, day, sales))
        .await
        .expect("Failed to create shift")
}
