// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only queries for the persistence layer.
//!
//! ## Module Organization
//!
//! - `employees`: Employees, commission tiers and bonuses
//! - `shifts`: Shifts, product lines and the history views the ledger reads
//! - `settlements`: Fortnight settlements and paid periods
//! - `ranks`: Rank ladder, monthly ranks and bonus transactions
//! - `outbox`: Outbox inspection for operators and tests
//!
//! Every function takes a plain `SqliteConnection`, so it can run inside the
//! caller's transaction.

pub mod employees;
pub mod outbox;
pub mod ranks;
pub mod settlements;
pub mod shifts;
