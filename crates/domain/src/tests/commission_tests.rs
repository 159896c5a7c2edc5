// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{create_test_tiers, dec};
use crate::{
    CommissionTier, DomainError, PartitionIssue, ResolvedTier, resolve_tier,
    validate_tier_partition,
};
use rust_decimal::Decimal;

#[test]
fn test_resolve_tier_picks_lowest_band_for_zero() {
    let resolved: ResolvedTier = resolve_tier(&create_test_tiers(), Decimal::ZERO).unwrap();
    assert_eq!(resolved.name, "Tier C");
    assert_eq!(resolved.percentage, dec("6"));
    assert!(!resolved.fallback);
}

#[test]
fn test_resolve_tier_band_bounds_are_inclusive() {
    let tiers: Vec<CommissionTier> = create_test_tiers();

    assert_eq!(resolve_tier(&tiers, dec("49999.99")).unwrap().name, "Tier C");
    assert_eq!(resolve_tier(&tiers, dec("50000")).unwrap().name, "Tier B");
    assert_eq!(resolve_tier(&tiers, dec("99999.99")).unwrap().name, "Tier B");
    assert_eq!(resolve_tier(&tiers, dec("100000")).unwrap().name, "Tier A");
}

#[test]
fn test_resolve_tier_unbounded_top_band() {
    let resolved: ResolvedTier = resolve_tier(&create_test_tiers(), dec("9999999")).unwrap();
    assert_eq!(resolved.name, "Tier A");
    assert_eq!(resolved.percentage, dec("4"));
    assert_eq!(resolved.tier_id, Some(1));
}

#[test]
fn test_resolve_tier_chosen_band_contains_input() {
    let tiers: Vec<CommissionTier> = create_test_tiers();
    let mut amount: Decimal = Decimal::ZERO;
    let step: Decimal = dec("1234.57");

    while amount < dec("250000") {
        let resolved: ResolvedTier = resolve_tier(&tiers, amount).unwrap();
        let matches: Vec<&CommissionTier> = tiers.iter().filter(|t| t.contains(amount)).collect();
        assert_eq!(matches.len(), 1, "exactly one band must contain {amount}");
        assert_eq!(resolved.name, matches[0].name);
        assert!(!resolved.fallback);
        amount += step;
    }
}

#[test]
fn test_resolve_tier_rejects_negative_input() {
    let result: Result<ResolvedTier, DomainError> =
        resolve_tier(&create_test_tiers(), dec("-0.01"));
    assert!(matches!(result, Err(DomainError::NegativeAmount { .. })));
}

#[test]
fn test_resolve_tier_falls_back_to_lowest_band_on_gap() {
    let tiers: Vec<CommissionTier> = vec![
        CommissionTier::new("Low", dec("0"), Some(dec("100")), dec("6")),
        CommissionTier::new("High", dec("200"), None, dec("4")),
    ];

    let resolved: ResolvedTier = resolve_tier(&tiers, dec("150")).unwrap();
    assert_eq!(resolved.name, "Low");
    assert!(resolved.fallback);
}

#[test]
fn test_resolve_tier_ignores_inactive_tiers() {
    let mut tiers: Vec<CommissionTier> = create_test_tiers();
    tiers[2].is_active = false;

    // Tier A is inactive, so nothing contains 150000 and the lowest band wins.
    let resolved: ResolvedTier = resolve_tier(&tiers, dec("150000")).unwrap();
    assert_eq!(resolved.name, "Tier C");
    assert!(resolved.fallback);
}

#[test]
fn test_resolve_tier_without_active_tiers_fails() {
    let mut tiers: Vec<CommissionTier> = create_test_tiers();
    for tier in &mut tiers {
        tier.is_active = false;
    }
    assert_eq!(
        resolve_tier(&tiers, dec("10")),
        Err(DomainError::NoActiveTiers)
    );
}

#[test]
fn test_partition_of_default_tiers_is_clean() {
    let issues: Vec<PartitionIssue> = validate_tier_partition(&create_test_tiers()).unwrap();
    assert!(issues.is_empty(), "unexpected issues: {issues:?}");
}

#[test]
fn test_partition_reports_gap_and_overlap() {
    let tiers: Vec<CommissionTier> = vec![
        CommissionTier::new("A", dec("10"), Some(dec("100")), dec("6")),
        CommissionTier::new("B", dec("50"), Some(dec("200")), dec("5")),
        CommissionTier::new("C", dec("300"), Some(dec("400")), dec("4")),
    ];

    let issues: Vec<PartitionIssue> = validate_tier_partition(&tiers).unwrap();
    assert!(issues.contains(&PartitionIssue::Gap {
        from: dec("0"),
        to: Some(dec("9.99")),
    }));
    assert!(issues.contains(&PartitionIssue::Overlap {
        lower: String::from("A"),
        upper: String::from("B"),
    }));
    assert!(issues.contains(&PartitionIssue::Gap {
        from: dec("200.01"),
        to: Some(dec("299.99")),
    }));
    assert!(issues.contains(&PartitionIssue::Gap {
        from: dec("400.01"),
        to: None,
    }));
}

#[test]
fn test_partition_rejects_inverted_band() {
    let tiers: Vec<CommissionTier> = vec![CommissionTier::new(
        "Broken",
        dec("100"),
        Some(dec("50")),
        dec("5"),
    )];
    assert!(matches!(
        validate_tier_partition(&tiers),
        Err(DomainError::InvalidTier { .. })
    ));
}

#[test]
fn test_partition_rejects_negative_percentage() {
    let tiers: Vec<CommissionTier> =
        vec![CommissionTier::new("Broken", dec("0"), None, dec("-1"))];
    assert!(matches!(
        validate_tier_partition(&tiers),
        Err(DomainError::InvalidTier { .. })
    ));
}
