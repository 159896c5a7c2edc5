// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::sync::Arc;

use super::{create_test_service, dec};
use crate::ReferenceCache;
use shiftbook_domain::CommissionTier;
use shiftbook_replication::{
    CacheInvalidation, InMemoryMirror, MirrorRow, ReferenceTable, pull_reference_table,
};
use std::time::Duration;

fn create_test_tier_row(name: &str, min: &str, max: &str, pct: &str) -> MirrorRow {
    MirrorRow::new()
        .with("Name", name)
        .with("MinAmount", min)
        .with("MaxAmount", max)
        .with("Percentage", pct)
}

#[test]
fn test_invalidate_drops_tiers_only() {
    let cache: ReferenceCache = ReferenceCache::new();
    assert_eq!(cache.tiers(), None);

    let generation: u64 = cache.generation();
    assert!(cache.store_tiers(
        generation,
        vec![CommissionTier::new("Tier C", dec("0"), None, dec("6"))]
    ));
    cache.invalidate(ReferenceTable::EmployeeSettings);
    assert_eq!(cache.tiers().map(|t| t.len()), Some(1));

    cache.invalidate(ReferenceTable::CommissionTiers);
    assert_eq!(cache.tiers(), None);
}

#[test]
fn test_tiers_loaded_before_invalidation_are_not_stored() {
    let cache: ReferenceCache = ReferenceCache::new();
    let generation: u64 = cache.generation();

    // A pull lands between the store read and the cache write.
    cache.invalidate(ReferenceTable::CommissionTiers);
    let stored: bool = cache.store_tiers(
        generation,
        vec![CommissionTier::new("Tier C", dec("0"), None, dec("6"))],
    );

    assert!(!stored);
    assert_eq!(cache.tiers(), None);
    assert!(cache.store_tiers(cache.generation(), Vec::new()));
}

#[tokio::test]
async fn test_resolve_tier_sees_pulled_tiers() {
    let (service, shared) = create_test_service();
    assert_eq!(service.resolve_tier(dec("1200")).await.unwrap().name, "Tier C");
    assert!(service.cache().tiers().is_some());

    let mirror: InMemoryMirror = InMemoryMirror::new();
    mirror
        .load_sheet(
            ReferenceTable::CommissionTiers.sheet_name(),
            vec![
                create_test_tier_row("Starter", "0", "9999.99", "3"),
                create_test_tier_row("Pro", "10000", "", "8"),
            ],
        )
        .await;

    let caches: Vec<Arc<dyn CacheInvalidation>> = vec![service.cache()];
    pull_reference_table(
        &shared,
        &mirror,
        &caches,
        ReferenceTable::CommissionTiers,
        Duration::from_secs(5),
    )
    .await
    .unwrap();

    let resolved = service.resolve_tier(dec("1200")).await.unwrap();
    assert_eq!(resolved.name, "Starter");
    assert_eq!(resolved.percentage, dec("3"));
}
