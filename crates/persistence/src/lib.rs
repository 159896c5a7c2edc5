// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the shiftbook ledger.
//!
//! This crate owns every transaction in the system. It stores employees,
//! commission tiers, shifts, bonuses, fortnight settlements, monthly ranks,
//! bonus transactions and the outbox in `SQLite` through Diesel.
//!
//! ## Transactions
//!
//! Every ledger operation runs in a single `BEGIN IMMEDIATE` transaction:
//! the history it reads, the shift it writes, consumed bonuses, settlement
//! and rank recomputation and the outbox events describing all of it commit
//! together or not at all. Taking the write lock up front means two writers for the
//! same employee can never compute from the same stale history.
//!
//! ## Migrations
//!
//! Migrations live in `migrations/` and are embedded at compile time. They
//! run on every open, so a fresh file or in-memory database is immediately
//! usable.
//!
//! ## Testing
//!
//! `Persistence::new_in_memory()` gives each caller its own shared-cache
//! in-memory database, so tests never observe each other's rows.

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

use diesel::SqliteConnection;
use rust_decimal::Decimal;
use shiftbook::{Command, ShiftAmendment};
use shiftbook_domain::{
    ActiveBonus, BonusTransaction, CommissionTier, DEFAULT_BONUS_RATE, Employee, EmployeeRank,
    FortnightPeriod, FortnightSettlement, ProductSale, Rank, Shift,
};
use shiftbook_outbox::{EntityTable, OutboxEvent, OutboxStatus, now_millis};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use time::{Date, PrimitiveDateTime};

/// Atomic counter for generating unique in-memory database names.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;

#[cfg(test)]
mod tests;

pub use error::PersistenceError;
pub use mutations::{EmployeeSettings, ReplaceSummary};

/// Persistence adapter over a single `SQLite` connection.
///
/// Callers share it behind a mutex; every method takes `&mut self`.
pub struct Persistence {
    conn: SqliteConnection,
    bonus_rate: Decimal,
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite` database.
    ///
    /// Each call receives a unique database instance via atomic counter.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url: String = format!("file:shiftbook_memdb_{db_id}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(&shared_memory_url)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self {
            conn,
            bonus_rate: DEFAULT_BONUS_RATE,
        })
    }

    /// Creates a new persistence adapter with a file-based `SQLite` database.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(path_str)?;
        backend::sqlite::enable_wal_mode(&mut conn)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self {
            conn,
            bonus_rate: DEFAULT_BONUS_RATE,
        })
    }

    /// Sets the rate applied per bonus-counter hit when settling fortnights.
    #[must_use]
    pub const fn with_bonus_rate(mut self, bonus_rate: Decimal) -> Self {
        self.bonus_rate = bonus_rate;
        self
    }

    /// The settlement bonus rate in use.
    #[must_use]
    pub const fn bonus_rate(&self) -> Decimal {
        self.bonus_rate
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        backend::sqlite::verify_foreign_key_enforcement(&mut self.conn)
    }

    // ========================================================================
    // Employees, Tiers & Bonuses
    // ========================================================================

    /// Creates an employee and enqueues its replication.
    ///
    /// # Errors
    ///
    /// Returns an error if the fields are invalid or persistence fails.
    pub fn create_employee(&mut self, employee: &Employee) -> Result<Employee, PersistenceError> {
        self.conn.immediate_transaction(|conn| {
            mutations::reference::create_employee(conn, employee, now_millis())
        })
    }

    /// Retrieves an employee by ID.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::EmployeeNotFound` if the employee does not exist.
    pub fn get_employee(&mut self, employee_id: i64) -> Result<Employee, PersistenceError> {
        queries::employees::get_employee(&mut self.conn, employee_id)
    }

    /// Lists every employee.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_employees(&mut self) -> Result<Vec<Employee>, PersistenceError> {
        queries::employees::list_employees(&mut self.conn)
    }

    /// Adds `amount` (negative to debit) to an employee's bonus balance and
    /// records the change as a bonus transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the employee does not exist or the balance would go negative.
    pub fn credit_bonus_balance(
        &mut self,
        employee_id: i64,
        amount: Decimal,
        description: Option<&str>,
    ) -> Result<Employee, PersistenceError> {
        self.conn.immediate_transaction(|conn| {
            mutations::reference::credit_bonus_balance(
                conn,
                employee_id,
                amount,
                description,
                now_millis(),
            )
        })
    }

    /// An employee's most recent bonus transactions, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_bonus_transactions(
        &mut self,
        employee_id: i64,
        limit: i64,
    ) -> Result<Vec<BonusTransaction>, PersistenceError> {
        queries::ranks::list_bonus_transactions(&mut self.conn, employee_id, limit)
    }

    /// The rank ladder in display order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_ranks(&mut self) -> Result<Vec<Rank>, PersistenceError> {
        queries::ranks::list_ranks(&mut self.conn)
    }

    /// An employee's rank record for a calendar month, if any shift placed one.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_employee_rank(
        &mut self,
        employee_id: i64,
        year: i32,
        month: u8,
    ) -> Result<Option<EmployeeRank>, PersistenceError> {
        queries::ranks::find_employee_rank(&mut self.conn, employee_id, year, month)
    }

    /// Grants a bonus to be consumed by the employee's next shift.
    ///
    /// # Errors
    ///
    /// Returns an error if the bonus is invalid or the employee is inactive.
    pub fn grant_bonus(&mut self, bonus: &ActiveBonus) -> Result<ActiveBonus, PersistenceError> {
        self.conn.immediate_transaction(|conn| {
            mutations::reference::grant_bonus(conn, bonus, now_millis())
        })
    }

    /// Bonuses the employee holds that no shift has consumed yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_active_bonuses(
        &mut self,
        employee_id: i64,
    ) -> Result<Vec<ActiveBonus>, PersistenceError> {
        queries::employees::list_unapplied_bonuses(&mut self.conn, employee_id)
    }

    /// Every commission tier, ordered by lower bound.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_tiers(&mut self) -> Result<Vec<CommissionTier>, PersistenceError> {
        queries::employees::list_tiers(&mut self.conn)
    }

    /// Replaces the commission tier table with the mirror's copy.
    ///
    /// # Errors
    ///
    /// Returns an error if the table is refused or persistence fails.
    pub fn replace_commission_tiers(
        &mut self,
        tiers: &[CommissionTier],
    ) -> Result<ReplaceSummary, PersistenceError> {
        self.conn.immediate_transaction(|conn| {
            mutations::reference::replace_commission_tiers(conn, tiers)
        })
    }

    /// Applies the mirror's employee settings.
    ///
    /// # Errors
    ///
    /// Returns an error if a value is refused or persistence fails.
    pub fn replace_employee_settings(
        &mut self,
        settings: &[EmployeeSettings],
    ) -> Result<ReplaceSummary, PersistenceError> {
        self.conn.immediate_transaction(|conn| {
            mutations::reference::replace_employee_settings(conn, settings, now_millis())
        })
    }

    // ========================================================================
    // Shift Ledger
    // ========================================================================

    /// Records a complete shift.
    ///
    /// # Arguments
    ///
    /// * `employee_id` - The employee who worked the shift
    /// * `shift_date` - Business date
    /// * `clock_in` - Clock-in wall time
    /// * `clock_out` - Clock-out wall time
    /// * `product_sales` - Per-product sales
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger refuses the shift or persistence fails.
    /// Nothing is written on error.
    pub fn create_shift(
        &mut self,
        employee_id: i64,
        shift_date: Date,
        clock_in: PrimitiveDateTime,
        clock_out: PrimitiveDateTime,
        product_sales: Vec<ProductSale>,
    ) -> Result<Shift, PersistenceError> {
        let bonus_rate: Decimal = self.bonus_rate;
        let command: Command = Command::CreateShift {
            shift_date,
            clock_in,
            clock_out,
            product_sales,
        };
        self.conn.immediate_transaction(|conn| {
            mutations::ledger::record_new_shift(conn, employee_id, command, bonus_rate, now_millis())
        })
    }

    /// Records a clock-in. The shift stays open until closed.
    ///
    /// # Errors
    ///
    /// Returns an error if the employee is unknown or inactive.
    pub fn open_shift(
        &mut self,
        employee_id: i64,
        shift_date: Date,
        clock_in: PrimitiveDateTime,
    ) -> Result<Shift, PersistenceError> {
        let bonus_rate: Decimal = self.bonus_rate;
        let command: Command = Command::OpenShift {
            shift_date,
            clock_in,
        };
        self.conn.immediate_transaction(|conn| {
            mutations::ledger::record_new_shift(conn, employee_id, command, bonus_rate, now_millis())
        })
    }

    /// Records clock-out and sales for an open shift.
    ///
    /// # Errors
    ///
    /// Returns an error if the shift is unknown or not open, or the ledger refuses the change.
    pub fn close_shift(
        &mut self,
        shift_id: i64,
        clock_out: PrimitiveDateTime,
        product_sales: Vec<ProductSale>,
    ) -> Result<Shift, PersistenceError> {
        let bonus_rate: Decimal = self.bonus_rate;
        let command: Command = Command::CloseShift {
            shift_id,
            clock_out,
            product_sales,
        };
        self.conn.immediate_transaction(|conn| {
            mutations::ledger::change_shift(conn, shift_id, command, bonus_rate, now_millis())
        })
    }

    /// Corrects a closed shift and recomputes everything derived from it.
    ///
    /// # Errors
    ///
    /// Returns an error if the shift is unknown or not closed, a touched
    /// settlement is paid, or the ledger refuses the change.
    pub fn amend_shift(
        &mut self,
        shift_id: i64,
        changes: ShiftAmendment,
    ) -> Result<Shift, PersistenceError> {
        let bonus_rate: Decimal = self.bonus_rate;
        let command: Command = Command::AmendShift { shift_id, changes };
        self.conn.immediate_transaction(|conn| {
            mutations::ledger::change_shift(conn, shift_id, command, bonus_rate, now_millis())
        })
    }

    /// Retrieves a shift with its product lines.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::ShiftNotFound` if the shift does not exist.
    pub fn get_shift(&mut self, shift_id: i64) -> Result<Shift, PersistenceError> {
        queries::shifts::get_shift(&mut self.conn, shift_id)
    }

    /// Most recent shifts of an employee, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_shifts_for_employee(
        &mut self,
        employee_id: i64,
        limit: i64,
    ) -> Result<Vec<Shift>, PersistenceError> {
        queries::shifts::list_shifts_for_employee(&mut self.conn, employee_id, limit)
    }

    // ========================================================================
    // Fortnight Settlements
    // ========================================================================

    /// Retrieves a settlement, if the period has one.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_settlement(
        &mut self,
        employee_id: i64,
        period: FortnightPeriod,
    ) -> Result<Option<FortnightSettlement>, PersistenceError> {
        queries::settlements::find_settlement(&mut self.conn, employee_id, period)
    }

    /// Rebuilds a settlement from its shifts.
    ///
    /// # Errors
    ///
    /// Returns an error if the employee does not exist or persistence fails.
    pub fn recompute_settlement(
        &mut self,
        employee_id: i64,
        period: FortnightPeriod,
    ) -> Result<Option<FortnightSettlement>, PersistenceError> {
        let bonus_rate: Decimal = self.bonus_rate;
        self.conn.immediate_transaction(|conn| {
            let employee: Employee = queries::employees::get_employee(conn, employee_id)?;
            mutations::settlements::recompute_settlement(
                conn,
                &employee,
                period,
                bonus_rate,
                now_millis(),
            )
        })
    }

    /// Marks a settlement as paid.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::SettlementNotFound` if the settlement does not exist.
    pub fn mark_settlement_paid(
        &mut self,
        employee_id: i64,
        period: FortnightPeriod,
    ) -> Result<FortnightSettlement, PersistenceError> {
        self.conn.immediate_transaction(|conn| {
            mutations::settlements::mark_settlement_paid(conn, employee_id, period, now_millis())
        })
    }

    // ========================================================================
    // Outbox Queue
    // ========================================================================

    /// Claims up to `limit` deliverable events and marks them in flight.
    ///
    /// # Errors
    ///
    /// Returns an error if persistence fails.
    pub fn claim_outbox_batch(
        &mut self,
        now_ms: i64,
        limit: usize,
    ) -> Result<Vec<OutboxEvent>, PersistenceError> {
        self.conn
            .immediate_transaction(|conn| mutations::outbox::claim_batch(conn, now_ms, limit))
    }

    /// Marks an event as delivered.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::EventNotFound` if the event does not exist.
    pub fn mark_event_done(&mut self, event_id: i64, now_ms: i64) -> Result<(), PersistenceError> {
        mutations::outbox::mark_done(&mut self.conn, event_id, now_ms)
    }

    /// Returns an event to the queue with updated counters and a delay.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::EventNotFound` if the event does not exist.
    pub fn reschedule_event(
        &mut self,
        event_id: i64,
        attempts: u32,
        rate_limit_hits: u32,
        available_at: i64,
        error: &str,
    ) -> Result<(), PersistenceError> {
        mutations::outbox::reschedule(
            &mut self.conn,
            event_id,
            attempts,
            rate_limit_hits,
            available_at,
            error,
        )
    }

    /// Gives up on an event.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::EventNotFound` if the event does not exist.
    pub fn mark_event_failed(
        &mut self,
        event_id: i64,
        attempts: u32,
        rate_limit_hits: u32,
        now_ms: i64,
        error: &str,
    ) -> Result<(), PersistenceError> {
        mutations::outbox::mark_failed(
            &mut self.conn,
            event_id,
            attempts,
            rate_limit_hits,
            now_ms,
            error,
        )
    }

    /// Returns claimed events to pending without touching their counters.
    ///
    /// # Errors
    ///
    /// Returns an error if persistence fails.
    pub fn release_events(&mut self, event_ids: &[i64]) -> Result<usize, PersistenceError> {
        mutations::outbox::release(&mut self.conn, event_ids)
    }

    /// Returns every in-flight event to pending. Run once at startup.
    ///
    /// # Errors
    ///
    /// Returns an error if persistence fails.
    pub fn reap_in_flight_events(&mut self) -> Result<usize, PersistenceError> {
        mutations::outbox::reap_in_flight(&mut self.conn)
    }

    /// Puts a failed event back in the queue unless a newer event for the
    /// same entity exists.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::EventNotFound` if no failed event has this
    /// ID, or `PersistenceError::EventSuperseded` if it is stale.
    pub fn retry_failed_event(&mut self, event_id: i64) -> Result<(), PersistenceError> {
        self.conn.immediate_transaction(|conn| {
            mutations::outbox::retry_failed_event(conn, event_id, now_millis())
        })
    }

    /// Retrieves an outbox event by ID.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::EventNotFound` if the event does not exist.
    pub fn get_outbox_event(&mut self, event_id: i64) -> Result<OutboxEvent, PersistenceError> {
        queries::outbox::get_event(&mut self.conn, event_id)
    }

    /// Number of events in a status.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count_events(&mut self, status: OutboxStatus) -> Result<i64, PersistenceError> {
        queries::outbox::count_by_status(&mut self.conn, status)
    }

    /// Number of events the worker gave up on.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count_failed_events(&mut self) -> Result<i64, PersistenceError> {
        self.count_events(OutboxStatus::Failed)
    }

    /// Failed events, most recent first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_failed_events(&mut self, limit: i64) -> Result<Vec<OutboxEvent>, PersistenceError> {
        queries::outbox::list_failed_events(&mut self.conn, limit)
    }

    /// Every event recorded for one entity, in enqueue order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_events_for_entity(
        &mut self,
        table: EntityTable,
        entity_id: &str,
    ) -> Result<Vec<OutboxEvent>, PersistenceError> {
        queries::outbox::list_events_for_entity(&mut self.conn, table, entity_id)
    }
}
