// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Commission tier resolution.
//!
//! Maps a trailing-month sales total to exactly one tier. Resolution is a
//! pure function over a tier-table snapshot held by the caller.
//!
//! ## Invariants
//!
//! - Negative sales totals are rejected
//! - Only active tiers participate
//! - Bands are closed intervals scanned by `min_amount` descending
//! - A value outside every band resolves to the lowest band and is logged

use crate::error::DomainError;
use crate::money::require_non_negative;
use crate::types::CommissionTier;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Smallest step between adjacent bands.
const BAND_STEP: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// The outcome of resolving a sales total against the tier table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTier {
    /// Identifier of the chosen tier.
    pub tier_id: Option<i64>,
    /// Name of the chosen tier.
    pub name: String,
    /// Commission percentage of the chosen tier.
    pub percentage: Decimal,
    /// True when no band contained the input and the lowest band was used.
    pub fallback: bool,
}

impl ResolvedTier {
    fn from_tier(tier: &CommissionTier, fallback: bool) -> Self {
        Self {
            tier_id: tier.tier_id,
            name: tier.name.clone(),
            percentage: tier.percentage,
            fallback,
        }
    }
}

/// Resolves the tier whose band contains `trailing_month_sales`.
///
/// # Arguments
///
/// * `tiers` - Tier table snapshot (inactive tiers are ignored)
/// * `trailing_month_sales` - Sales total for the previous calendar month
///
/// # Returns
///
/// The matching tier, or the lowest band flagged as a fallback when no band
/// contains the value.
///
/// # Errors
///
/// Returns an error if:
/// - `trailing_month_sales` is negative
/// - The table has no active tiers
pub fn resolve_tier(
    tiers: &[CommissionTier],
    trailing_month_sales: Decimal,
) -> Result<ResolvedTier, DomainError> {
    require_non_negative("trailing_month_sales", trailing_month_sales)?;

    let mut active: Vec<&CommissionTier> = tiers.iter().filter(|t| t.is_active).collect();
    if active.is_empty() {
        return Err(DomainError::NoActiveTiers);
    }
    active.sort_by(|a, b| b.min_amount.cmp(&a.min_amount));

    if let Some(tier) = active.iter().find(|t| t.contains(trailing_month_sales)) {
        return Ok(ResolvedTier::from_tier(tier, false));
    }

    // Sorted descending, so the last entry is the lowest band.
    let Some(lowest) = active.last() else {
        return Err(DomainError::NoActiveTiers);
    };
    warn!(
        sales = %trailing_month_sales,
        fallback_tier = %lowest.name,
        "Sales total outside every commission band; using lowest tier"
    );
    Ok(ResolvedTier::from_tier(lowest, true))
}

/// A structural defect in a tier table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartitionIssue {
    /// Values in `[from, to]` are covered by no band. `to = None` means unbounded.
    Gap {
        /// First uncovered value.
        from: Decimal,
        /// Last uncovered value.
        to: Option<Decimal>,
    },
    /// Two bands share at least one value.
    Overlap {
        /// Lower band name.
        lower: String,
        /// Upper band name.
        upper: String,
    },
}

impl std::fmt::Display for PartitionIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gap { from, to: Some(to) } => write!(f, "gap [{from}, {to}]"),
            Self::Gap { from, to: None } => write!(f, "gap [{from}, ∞)"),
            Self::Overlap { lower, upper } => write!(f, "'{lower}' overlaps '{upper}'"),
        }
    }
}

/// Validates each tier and reports how well the active tiers partition `[0, ∞)`.
///
/// Malformed tiers are errors. Gaps and overlaps are returned as issues so
/// the caller can decide whether to log or reject them.
///
/// # Errors
///
/// Returns `DomainError::InvalidTier` if a tier has a negative bound,
/// `max_amount < min_amount`, a negative percentage or an empty name.
pub fn validate_tier_partition(
    tiers: &[CommissionTier],
) -> Result<Vec<PartitionIssue>, DomainError> {
    for tier in tiers {
        validate_tier(tier)?;
    }

    let mut active: Vec<&CommissionTier> = tiers.iter().filter(|t| t.is_active).collect();
    active.sort_by(|a, b| a.min_amount.cmp(&b.min_amount));

    let mut issues: Vec<PartitionIssue> = Vec::new();
    let Some(first) = active.first() else {
        return Err(DomainError::NoActiveTiers);
    };
    if first.min_amount > Decimal::ZERO {
        issues.push(PartitionIssue::Gap {
            from: Decimal::ZERO,
            to: Some(first.min_amount - BAND_STEP),
        });
    }

    for pair in active.windows(2) {
        let (lower, upper) = (pair[0], pair[1]);
        match lower.max_amount {
            None => issues.push(PartitionIssue::Overlap {
                lower: lower.name.clone(),
                upper: upper.name.clone(),
            }),
            Some(max) if upper.min_amount <= max => issues.push(PartitionIssue::Overlap {
                lower: lower.name.clone(),
                upper: upper.name.clone(),
            }),
            Some(max) if upper.min_amount > max + BAND_STEP => issues.push(PartitionIssue::Gap {
                from: max + BAND_STEP,
                to: Some(upper.min_amount - BAND_STEP),
            }),
            Some(_) => {}
        }
    }

    if let Some(max) = active.last().and_then(|last| last.max_amount) {
        issues.push(PartitionIssue::Gap {
            from: max + BAND_STEP,
            to: None,
        });
    }

    Ok(issues)
}

fn validate_tier(tier: &CommissionTier) -> Result<(), DomainError> {
    let invalid = |reason: &str| DomainError::InvalidTier {
        name: tier.name.clone(),
        reason: reason.to_string(),
    };
    if tier.name.trim().is_empty() {
        return Err(invalid("name must not be empty"));
    }
    if tier.min_amount.is_sign_negative() && !tier.min_amount.is_zero() {
        return Err(invalid("min_amount must be non-negative"));
    }
    if tier.max_amount.is_some_and(|max| max < tier.min_amount) {
        return Err(invalid("max_amount must not be below min_amount"));
    }
    if tier.percentage.is_sign_negative() && !tier.percentage.is_zero() {
        return Err(invalid("percentage must be non-negative"));
    }
    Ok(())
}
