// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! State-changing operations for the persistence layer.
//!
//! ## Module Organization
//!
//! - `ledger`: Shift create/open/close/amend transactions
//! - `settlements`: Fortnight recomputation and payment
//! - `outbox`: Outbox producer and queue state changes
//! - `ranks`: Monthly rank recomputation and rank rewards
//! - `reference`: Employees, bonuses and mirror-authoritative tables
//!
//! None of these functions open a transaction; the `Persistence` adapter
//! wraps each public operation in one.

pub mod ledger;
pub mod outbox;
pub mod ranks;
pub mod reference;
pub mod settlements;

pub use reference::{EmployeeSettings, ReplaceSummary};
