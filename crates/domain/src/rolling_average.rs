// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Weighted trailing sales average and the bonus counter derived from it.
//!
//! ## Algorithm
//!
//! Shifts dated in `[shift_date - 7 days, shift_date)` are ordered oldest to
//! newest and weighted `1..=N`. The average is
//! `sum(weight * total_sales) / sum(weight)`, rounded to cents.
//!
//! ## Invariants
//!
//! - The shift being computed never contributes to its own average
//! - An employee whose first recorded shift is later than `shift_date - 7 days`
//!   has no average
//! - An empty window has no average; absence is never coerced to zero

use crate::error::DomainError;
use crate::money::round_money;
use rust_decimal::Decimal;
use time::{Date, Duration, PrimitiveDateTime};

/// Length of the trailing window in calendar days.
pub const ROLLING_WINDOW_DAYS: i64 = 7;

/// One committed shift as seen by the rolling-average engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalesHistoryEntry {
    /// The shift's identifier.
    pub shift_id: i64,
    /// Business date.
    pub shift_date: Date,
    /// Clock-in, used to order shifts on the same day.
    pub clock_in: PrimitiveDateTime,
    /// Gross sales.
    pub total_sales: Decimal,
}

/// Committed sales history for one employee.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SalesHistory {
    /// Date of the employee's earliest committed shift, excluding the one being computed.
    pub first_shift_date: Option<Date>,
    /// Shifts near the target date. Entries outside the window are ignored.
    pub entries: Vec<SalesHistoryEntry>,
}

/// First day of the trailing window for `shift_date`.
///
/// # Errors
///
/// Returns `DomainError::DateArithmeticOverflow` if the date cannot be represented.
pub fn window_start(shift_date: Date) -> Result<Date, DomainError> {
    shift_date
        .checked_sub(Duration::days(ROLLING_WINDOW_DAYS))
        .ok_or_else(|| DomainError::DateArithmeticOverflow {
            operation: format!("{shift_date} minus {ROLLING_WINDOW_DAYS} days"),
        })
}

/// Computes the weighted rolling average for a shift on `shift_date`.
///
/// # Arguments
///
/// * `history` - The employee's committed shifts
/// * `shift_date` - Date of the shift being computed
/// * `exclude_shift_id` - The shift being computed, when it already exists
///
/// # Returns
///
/// `None` when the employee has less than a full window of history or no
/// shifts fall inside the window.
///
/// # Errors
///
/// Returns an error if the window start cannot be computed.
pub fn compute_rolling_average(
    history: &SalesHistory,
    shift_date: Date,
    exclude_shift_id: Option<i64>,
) -> Result<Option<Decimal>, DomainError> {
    let start: Date = window_start(shift_date)?;

    match history.first_shift_date {
        Some(first) if first <= start => {}
        _ => return Ok(None),
    }

    let mut window: Vec<&SalesHistoryEntry> = history
        .entries
        .iter()
        .filter(|e| Some(e.shift_id) != exclude_shift_id)
        .filter(|e| e.shift_date >= start && e.shift_date < shift_date)
        .collect();
    if window.is_empty() {
        return Ok(None);
    }
    window.sort_by(|a, b| {
        (a.shift_date, a.clock_in, a.shift_id).cmp(&(b.shift_date, b.clock_in, b.shift_id))
    });

    let mut weighted_sum: Decimal = Decimal::ZERO;
    let mut weight_total: Decimal = Decimal::ZERO;
    for (weight, entry) in (1_u32..).zip(window.iter()) {
        let weight: Decimal = Decimal::from(weight);
        weighted_sum += weight * entry.total_sales;
        weight_total += weight;
    }

    Ok(Some(round_money(weighted_sum / weight_total)))
}

/// Whether a shift's sales met or exceeded the rolling average.
///
/// The comparison is inclusive. A missing average always yields `false`.
#[must_use]
pub fn compute_bonus_counter(total_sales: Decimal, rolling_average: Option<Decimal>) -> bool {
    rolling_average.is_some_and(|average| total_sales >= average)
}
