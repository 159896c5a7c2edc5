// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Monthly sales ranks.
//!
//! An employee's calendar-month sales place them on a rank ladder. Rewards
//! are paid the first time a rank above the month's previous best is
//! reached, so amending a shift down and back up never pays twice.

use crate::error::DomainError;
use crate::money::require_non_negative;
use crate::types::{EmployeeRank, Rank};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Resolves the rank whose band contains `monthly_sales`.
///
/// Values outside every band fall back to the lowest active rank.
///
/// # Errors
///
/// Returns an error if `monthly_sales` is negative or no rank is active.
pub fn resolve_rank(ranks: &[Rank], monthly_sales: Decimal) -> Result<Rank, DomainError> {
    require_non_negative("monthly_sales", monthly_sales)?;

    let mut active: Vec<&Rank> = ranks.iter().filter(|r| r.is_active).collect();
    active.sort_by(|a, b| b.min_amount.cmp(&a.min_amount));

    active
        .iter()
        .find(|r| r.contains(monthly_sales))
        .or_else(|| active.last())
        .map(|r| (*r).clone())
        .ok_or(DomainError::NoActiveRanks)
}

/// Result of re-ranking an employee for a month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankOutcome {
    /// Rank for the month's current sales.
    pub rank: Rank,
    /// Value for `EmployeeRank::previous_rank`.
    pub previous: Option<String>,
    /// Value for `EmployeeRank::best_rank`.
    pub best: String,
    /// Current rank differs from the stored one (always true for a first record).
    pub changed: bool,
    /// Bonus to credit; zero unless a new monthly best was reached.
    pub reward: Decimal,
}

/// Re-ranks an employee against their stored record for the month.
///
/// # Errors
///
/// Returns an error if `monthly_sales` is negative or no rank is active.
pub fn evaluate_rank(
    ranks: &[Rank],
    monthly_sales: Decimal,
    stored: Option<&EmployeeRank>,
) -> Result<RankOutcome, DomainError> {
    let rank: Rank = resolve_rank(ranks, monthly_sales)?;
    let lowest: &Rank = ranks
        .iter()
        .filter(|r| r.is_active)
        .min_by_key(|r| r.display_order)
        .ok_or(DomainError::NoActiveRanks)?;

    let order_of = |name: &str| -> i32 {
        ranks
            .iter()
            .find(|r| r.name == name)
            .map_or(lowest.display_order, |r| r.display_order)
    };

    let (best_name, best_order, previous, changed) = match stored {
        Some(record) => {
            let changed: bool = record.current_rank != rank.name;
            let previous: Option<String> = if changed {
                Some(record.current_rank.clone())
            } else {
                record.previous_rank.clone()
            };
            (
                record.best_rank.clone(),
                order_of(&record.best_rank),
                previous,
                changed,
            )
        }
        None => (lowest.name.clone(), lowest.display_order, None, true),
    };

    let new_high: bool = rank.display_order > best_order;
    Ok(RankOutcome {
        reward: if new_high { rank.reward } else { Decimal::ZERO },
        best: if new_high { rank.name.clone() } else { best_name },
        previous,
        changed,
        rank,
    })
}
