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
#![allow(clippy::multiple_crate_versions)]

//! API boundary for the shift ledger.
//!
//! Callers hand in request DTOs and receive response DTOs or an `ApiError`.
//! Domain, core and persistence errors never cross this boundary untranslated.

mod cache;
mod config;
mod error;
mod request_response;
mod service;

#[cfg(test)]
mod tests;

pub use cache::ReferenceCache;
pub use config::PayrollConfig;
pub use error::{
    ApiError, translate_core_error, translate_domain_error, translate_persistence_error,
};
pub use request_response::{
    AmendShiftRequest, BonusResponse, BonusTransactionResponse, CloseShiftRequest,
    CreateEmployeeRequest, CreateShiftRequest, CreditBonusBalanceRequest, EmployeeResponse,
    FailedEventInfo, FailedEventsResponse, GrantBonusRequest, ListBonusTransactionsResponse,
    ListBonusesResponse, ListShiftsResponse, OpenShiftRequest, ProductSaleInfo, RankResponse,
    ResolveTierResponse, SettlementResponse, ShiftResponse,
};
pub use service::{DEFAULT_SHIFT_LIST_LIMIT, DEFAULT_TRANSACTION_LIST_LIMIT, ShiftService};
