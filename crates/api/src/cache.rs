// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-mostly copy of mirror-managed reference data.

use shiftbook_domain::CommissionTier;
use shiftbook_replication::{CacheInvalidation, ReferenceTable};
use std::sync::{PoisonError, RwLock};
use tracing::debug;

#[derive(Debug, Default)]
struct TierSlot {
    generation: u64,
    tiers: Option<Vec<CommissionTier>>,
}

/// Cached commission tiers, dropped wholesale whenever a pull replaces them.
///
/// Every invalidation starts a new generation. A table loaded during an
/// earlier generation is stale and is not stored.
#[derive(Debug, Default)]
pub struct ReferenceCache {
    slot: RwLock<TierSlot>,
}

impl ReferenceCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached tiers, if loaded since the last invalidation.
    #[must_use]
    pub fn tiers(&self) -> Option<Vec<CommissionTier>> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .tiers
            .clone()
    }

    /// The current generation. Read it before loading tiers from the store.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .generation
    }

    /// Stores a tier table loaded during `generation`.
    ///
    /// Returns `false` and keeps the cache empty if an invalidation happened
    /// since.
    pub fn store_tiers(&self, generation: u64, tiers: Vec<CommissionTier>) -> bool {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        if slot.generation != generation {
            debug!(
                loaded = generation,
                current = slot.generation,
                "Discarding tiers loaded before an invalidation"
            );
            return false;
        }
        slot.tiers = Some(tiers);
        true
    }
}

impl CacheInvalidation for ReferenceCache {
    fn invalidate(&self, table: ReferenceTable) {
        match table {
            ReferenceTable::CommissionTiers => {
                let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
                slot.generation = slot.generation.wrapping_add(1);
                slot.tiers = None;
                debug!(%table, generation = slot.generation, "Dropped cached reference table");
            }
            // Employee settings are read through the store on every write.
            ReferenceTable::EmployeeSettings => {}
        }
    }
}
