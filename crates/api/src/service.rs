// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The caller-facing shift ledger service.
//!
//! Every operation takes the persistence lock for exactly one store call, so
//! ledger writes are serialized and the replication worker interleaves
//! between them.

use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;
use shiftbook::ShiftAmendment;
use shiftbook_domain::{
    ActiveBonus, BonusKind, BonusTransaction, BusinessClock, CommissionTier, Employee,
    EmployeeRank, FortnightPeriod, FortnightSettlement, ProductSale, ResolvedTier, Shift,
    month_range, parse_date, parse_datetime, resolve_tier,
};
use shiftbook_outbox::OutboxEvent;
use shiftbook_replication::SharedPersistence;
use time::{Date, PrimitiveDateTime};
use tracing::info;

use crate::cache::ReferenceCache;
use crate::config::PayrollConfig;
use crate::error::{ApiError, translate_domain_error, translate_persistence_error};
use crate::request_response::{
    AmendShiftRequest, BonusResponse, BonusTransactionResponse, CloseShiftRequest,
    CreateEmployeeRequest, CreateShiftRequest, CreditBonusBalanceRequest, EmployeeResponse,
    FailedEventInfo, FailedEventsResponse, GrantBonusRequest, ListBonusTransactionsResponse,
    ListBonusesResponse, ListShiftsResponse, OpenShiftRequest, ProductSaleInfo, RankResponse,
    ResolveTierResponse, SettlementResponse, ShiftResponse,
};

/// Shifts returned by `list_shifts_for_employee` when no limit is given.
pub const DEFAULT_SHIFT_LIST_LIMIT: i64 = 50;

/// Transactions returned by `list_bonus_transactions` when no limit is given.
pub const DEFAULT_TRANSACTION_LIST_LIMIT: i64 = 50;

/// Failed events returned by `list_failed_events` when no limit is given.
const DEFAULT_FAILED_EVENT_LIMIT: i64 = 100;

/// Shift ledger operations exposed to callers.
#[derive(Clone)]
pub struct ShiftService {
    persistence: SharedPersistence,
    cache: Arc<ReferenceCache>,
    clock: BusinessClock,
}

impl ShiftService {
    /// Creates a service over a shared store.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Internal` if the configured timezone is unknown.
    pub fn new(persistence: SharedPersistence, config: &PayrollConfig) -> Result<Self, ApiError> {
        Ok(Self {
            persistence,
            cache: Arc::new(ReferenceCache::new()),
            clock: config.clock()?,
        })
    }

    /// The reference cache, for registration with the pull task.
    #[must_use]
    pub fn cache(&self) -> Arc<ReferenceCache> {
        Arc::clone(&self.cache)
    }

    /// The business clock used to default omitted times.
    #[must_use]
    pub const fn clock(&self) -> BusinessClock {
        self.clock
    }

    // ========================================================================
    // Employees
    // ========================================================================

    /// Registers an employee.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` if the name or wage is invalid.
    pub async fn create_employee(
        &self,
        request: &CreateEmployeeRequest,
    ) -> Result<EmployeeResponse, ApiError> {
        let employee: Employee = Employee::new(&request.name, request.hourly_wage);
        let created: Employee = self
            .persistence
            .lock()
            .await
            .create_employee(&employee)
            .map_err(translate_persistence_error)?;
        let employee_id: i64 = stored_id("employee", created.employee_id)?;

        info!(employee_id, name = %created.name, "Registered employee");
        Ok(EmployeeResponse::from_employee(&created, employee_id))
    }

    /// Retrieves an employee.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the employee does not exist.
    pub async fn get_employee(&self, employee_id: i64) -> Result<EmployeeResponse, ApiError> {
        let employee: Employee = self.load_employee(employee_id).await?;
        Ok(EmployeeResponse::from_employee(&employee, employee_id))
    }

    /// Adds to (or, with a negative amount, debits) the bonus-currency balance.
    ///
    /// # Errors
    ///
    /// Returns an error if the employee does not exist or the balance would
    /// go negative.
    pub async fn credit_bonus_balance(
        &self,
        employee_id: i64,
        request: &CreditBonusBalanceRequest,
    ) -> Result<EmployeeResponse, ApiError> {
        let employee: Employee = self
            .persistence
            .lock()
            .await
            .credit_bonus_balance(employee_id, request.amount, request.description.as_deref())
            .map_err(translate_persistence_error)?;

        info!(
            employee_id,
            amount = %request.amount,
            balance = %employee.bonus_balance,
            "Adjusted bonus balance"
        );
        Ok(EmployeeResponse::from_employee(&employee, employee_id))
    }

    /// An employee's bonus transactions, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the employee does not exist and
    /// `ApiError::Validation` for a non-positive limit.
    pub async fn list_bonus_transactions(
        &self,
        employee_id: i64,
        limit: Option<i64>,
    ) -> Result<ListBonusTransactionsResponse, ApiError> {
        let limit: i64 = limit.unwrap_or(DEFAULT_TRANSACTION_LIST_LIMIT);
        if limit <= 0 {
            return Err(ApiError::validation("limit", "must be positive"));
        }
        self.load_employee(employee_id).await?;

        let transactions: Vec<BonusTransaction> = self
            .persistence
            .lock()
            .await
            .list_bonus_transactions(employee_id, limit)
            .map_err(translate_persistence_error)?;

        Ok(ListBonusTransactionsResponse {
            employee_id,
            transactions: transactions
                .iter()
                .map(BonusTransactionResponse::from)
                .collect(),
        })
    }

    /// The employee's rank for a calendar month.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` for an invalid month and
    /// `ApiError::NotFound` if no closed shift ranked the month.
    pub async fn get_employee_rank(
        &self,
        employee_id: i64,
        year: i32,
        month: u8,
    ) -> Result<RankResponse, ApiError> {
        month_range(year, month).map_err(translate_domain_error)?;
        let rank: Option<EmployeeRank> = self
            .persistence
            .lock()
            .await
            .find_employee_rank(employee_id, year, month)
            .map_err(translate_persistence_error)?;

        rank.as_ref().map(RankResponse::from).ok_or_else(|| {
            ApiError::not_found(
                "Rank",
                format!("no rank for employee {employee_id} in {year:04}-{month:02}"),
            )
        })
    }

    // ========================================================================
    // Bonuses & Tiers
    // ========================================================================

    /// Grants a bonus that the employee's next shift consumes.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` for an unknown kind, a negative value or
    /// an inactive employee.
    pub async fn grant_bonus(
        &self,
        employee_id: i64,
        request: &GrantBonusRequest,
    ) -> Result<BonusResponse, ApiError> {
        let kind: BonusKind = BonusKind::from_str(&request.kind).map_err(translate_domain_error)?;
        let bonus: ActiveBonus = ActiveBonus::new(employee_id, kind, request.value);
        let granted: ActiveBonus = self
            .persistence
            .lock()
            .await
            .grant_bonus(&bonus)
            .map_err(translate_persistence_error)?;

        info!(employee_id, kind = %kind, value = %request.value, "Granted bonus");
        Ok(BonusResponse::from(&granted))
    }

    /// Bonuses the employee holds that no shift has consumed yet.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the employee does not exist.
    pub async fn get_active_bonuses(
        &self,
        employee_id: i64,
    ) -> Result<ListBonusesResponse, ApiError> {
        self.load_employee(employee_id).await?;
        let bonuses: Vec<ActiveBonus> = self
            .persistence
            .lock()
            .await
            .list_active_bonuses(employee_id)
            .map_err(translate_persistence_error)?;

        Ok(ListBonusesResponse {
            employee_id,
            bonuses: bonuses.iter().map(BonusResponse::from).collect(),
        })
    }

    /// Resolves the commission tier for a trailing-month sales total.
    ///
    /// The tier table is served from the reference cache and reloaded after
    /// a pull invalidates it.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` for negative sales and
    /// `ApiError::NotFound` when no tier is active.
    pub async fn resolve_tier(&self, sales: Decimal) -> Result<ResolveTierResponse, ApiError> {
        let tiers: Vec<CommissionTier> = match self.cache.tiers() {
            Some(tiers) => tiers,
            None => {
                let generation: u64 = self.cache.generation();
                let tiers: Vec<CommissionTier> = self
                    .persistence
                    .lock()
                    .await
                    .list_tiers()
                    .map_err(translate_persistence_error)?;
                self.cache.store_tiers(generation, tiers.clone());
                tiers
            }
        };

        let resolved: ResolvedTier = resolve_tier(&tiers, sales).map_err(translate_domain_error)?;
        Ok(ResolveTierResponse {
            sales,
            tier_id: resolved.tier_id,
            name: resolved.name,
            percentage: resolved.percentage,
            fallback: resolved.fallback,
        })
    }

    // ========================================================================
    // Shifts
    // ========================================================================

    /// Records a complete shift and everything derived from it.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` if the input or a ledger rule is
    /// violated, `ApiError::NotFound` if the employee does not exist and
    /// `ApiError::TransientIo` if the store failed. Nothing is written on error.
    pub async fn create_shift(
        &self,
        request: CreateShiftRequest,
    ) -> Result<ShiftResponse, ApiError> {
        let shift_date: Date = parse_date(&request.shift_date).map_err(translate_domain_error)?;
        let clock_in: PrimitiveDateTime =
            parse_datetime(&request.clock_in).map_err(translate_domain_error)?;
        let clock_out: PrimitiveDateTime =
            parse_datetime(&request.clock_out).map_err(translate_domain_error)?;
        let product_sales: Vec<ProductSale> = to_sales(request.product_sales);

        let shift: Shift = self
            .persistence
            .lock()
            .await
            .create_shift(
                request.employee_id,
                shift_date,
                clock_in,
                clock_out,
                product_sales,
            )
            .map_err(translate_persistence_error)?;

        shift_response(&shift)
    }

    /// Clocks an employee in. Omitted times default to now.
    ///
    /// # Errors
    ///
    /// Returns an error if the employee is unknown or inactive.
    pub async fn open_shift(&self, request: &OpenShiftRequest) -> Result<ShiftResponse, ApiError> {
        let clock_in: PrimitiveDateTime = self.time_or_now(request.clock_in.as_deref())?;
        let shift_date: Date = match request.shift_date.as_deref() {
            Some(value) => parse_date(value).map_err(translate_domain_error)?,
            None => clock_in.date(),
        };

        let shift: Shift = self
            .persistence
            .lock()
            .await
            .open_shift(request.employee_id, shift_date, clock_in)
            .map_err(translate_persistence_error)?;

        shift_response(&shift)
    }

    /// Closes an open shift. An omitted clock-out defaults to now.
    ///
    /// # Errors
    ///
    /// Returns an error if the shift is unknown or not open, or the ledger
    /// refuses the change.
    pub async fn close_shift(
        &self,
        shift_id: i64,
        request: CloseShiftRequest,
    ) -> Result<ShiftResponse, ApiError> {
        let clock_out: PrimitiveDateTime = self.time_or_now(request.clock_out.as_deref())?;
        let product_sales: Vec<ProductSale> = to_sales(request.product_sales);

        let shift: Shift = self
            .persistence
            .lock()
            .await
            .close_shift(shift_id, clock_out, product_sales)
            .map_err(translate_persistence_error)?;

        shift_response(&shift)
    }

    /// Corrects a closed shift and recomputes everything derived from it.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` if the request changes nothing, the
    /// shift is not closed, or a touched settlement is paid.
    pub async fn amend_shift(
        &self,
        shift_id: i64,
        request: AmendShiftRequest,
    ) -> Result<ShiftResponse, ApiError> {
        let changes: ShiftAmendment = ShiftAmendment {
            shift_date: request
                .shift_date
                .as_deref()
                .map(parse_date)
                .transpose()
                .map_err(translate_domain_error)?,
            clock_in: request
                .clock_in
                .as_deref()
                .map(parse_datetime)
                .transpose()
                .map_err(translate_domain_error)?,
            clock_out: request
                .clock_out
                .as_deref()
                .map(parse_datetime)
                .transpose()
                .map_err(translate_domain_error)?,
            product_sales: request.product_sales.map(to_sales),
        };
        if changes.is_empty() {
            return Err(ApiError::validation(
                "amendment",
                "at least one field must change",
            ));
        }

        let shift: Shift = self
            .persistence
            .lock()
            .await
            .amend_shift(shift_id, changes)
            .map_err(translate_persistence_error)?;

        info!(shift_id, "Amended shift");
        shift_response(&shift)
    }

    /// Retrieves a shift.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the shift does not exist.
    pub async fn get_shift(&self, shift_id: i64) -> Result<ShiftResponse, ApiError> {
        let shift: Shift = self
            .persistence
            .lock()
            .await
            .get_shift(shift_id)
            .map_err(translate_persistence_error)?;
        shift_response(&shift)
    }

    /// Most recent shifts of an employee, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the employee does not exist and
    /// `ApiError::Validation` for a non-positive limit.
    pub async fn list_shifts_for_employee(
        &self,
        employee_id: i64,
        limit: Option<i64>,
    ) -> Result<ListShiftsResponse, ApiError> {
        let limit: i64 = limit.unwrap_or(DEFAULT_SHIFT_LIST_LIMIT);
        if limit <= 0 {
            return Err(ApiError::validation("limit", "must be positive"));
        }
        self.load_employee(employee_id).await?;

        let shifts: Vec<Shift> = self
            .persistence
            .lock()
            .await
            .list_shifts_for_employee(employee_id, limit)
            .map_err(translate_persistence_error)?;

        Ok(ListShiftsResponse {
            employee_id,
            shifts: shifts
                .iter()
                .map(shift_response)
                .collect::<Result<Vec<ShiftResponse>, ApiError>>()?,
        })
    }

    // ========================================================================
    // Settlements
    // ========================================================================

    /// Retrieves the settlement of one half-month period.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` for an invalid period and
    /// `ApiError::NotFound` if the period has no closed shifts.
    pub async fn get_settlement(
        &self,
        employee_id: i64,
        year: i32,
        month: u8,
        half: u8,
    ) -> Result<SettlementResponse, ApiError> {
        let period: FortnightPeriod =
            FortnightPeriod::new(year, month, half).map_err(translate_domain_error)?;
        let settlement: Option<FortnightSettlement> = self
            .persistence
            .lock()
            .await
            .get_settlement(employee_id, period)
            .map_err(translate_persistence_error)?;

        settlement.as_ref().map(SettlementResponse::from).ok_or_else(|| {
            ApiError::not_found(
                "Settlement",
                format!("no settlement for employee {employee_id} in {period}"),
            )
        })
    }

    /// Marks a settlement as paid. Paying twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the settlement does not exist.
    pub async fn mark_settlement_paid(
        &self,
        employee_id: i64,
        year: i32,
        month: u8,
        half: u8,
    ) -> Result<SettlementResponse, ApiError> {
        let period: FortnightPeriod =
            FortnightPeriod::new(year, month, half).map_err(translate_domain_error)?;
        let settlement: FortnightSettlement = self
            .persistence
            .lock()
            .await
            .mark_settlement_paid(employee_id, period)
            .map_err(translate_persistence_error)?;

        info!(employee_id, %period, "Marked settlement paid");
        Ok(SettlementResponse::from(&settlement))
    }

    // ========================================================================
    // Replication status
    // ========================================================================

    /// Number of replication events that failed permanently.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub async fn failed_event_count(&self) -> Result<i64, ApiError> {
        self.persistence
            .lock()
            .await
            .count_failed_events()
            .map_err(translate_persistence_error)
    }

    /// The most recent permanently failed events and the total count.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub async fn list_failed_events(
        &self,
        limit: Option<i64>,
    ) -> Result<FailedEventsResponse, ApiError> {
        let limit: i64 = limit.unwrap_or(DEFAULT_FAILED_EVENT_LIMIT);
        if limit <= 0 {
            return Err(ApiError::validation("limit", "must be positive"));
        }
        let failed_count: i64 = self.failed_event_count().await?;
        let events: Vec<OutboxEvent> = self
            .persistence
            .lock()
            .await
            .list_failed_events(limit)
            .map_err(translate_persistence_error)?;

        Ok(FailedEventsResponse {
            failed_count,
            events: events.iter().map(FailedEventInfo::from).collect(),
        })
    }

    /// Returns a failed event to the queue with fresh counters.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if no failed event has that identifier.
    pub async fn retry_failed_event(&self, event_id: i64) -> Result<(), ApiError> {
        self.persistence
            .lock()
            .await
            .retry_failed_event(event_id)
            .map_err(translate_persistence_error)?;

        info!(event_id, "Requeued failed replication event");
        Ok(())
    }

    async fn load_employee(&self, employee_id: i64) -> Result<Employee, ApiError> {
        self.persistence
            .lock()
            .await
            .get_employee(employee_id)
            .map_err(translate_persistence_error)
    }

    fn time_or_now(&self, value: Option<&str>) -> Result<PrimitiveDateTime, ApiError> {
        match value {
            Some(value) => parse_datetime(value).map_err(translate_domain_error),
            None => self.clock.now().map_err(translate_domain_error),
        }
    }
}

fn to_sales(lines: Vec<ProductSaleInfo>) -> Vec<ProductSale> {
    lines.into_iter().map(ProductSale::from).collect()
}

fn shift_response(shift: &Shift) -> Result<ShiftResponse, ApiError> {
    let shift_id: i64 = stored_id("shift", shift.shift_id)?;
    Ok(ShiftResponse::from_shift(shift, shift_id))
}

fn stored_id(entity: &str, id: Option<i64>) -> Result<i64, ApiError> {
    id.ok_or_else(|| ApiError::Internal {
        message: format!("stored {entity} has no identifier"),
    })
}
