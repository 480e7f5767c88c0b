//! Cache entry with access tracking
//!
//! Each entry carries the secondary validation key, the value and the two
//! signals the eviction comparator works from: last access time and
//! desirability (a hit counter).

use std::time::Instant;

/// One stored value and its bookkeeping
#[derive(Debug, Clone)]
pub struct CacheEntry<K2, V> {
    pub secondary_key: K2,
    pub value: V,
    pub last_access: Instant,
    pub desirability: u64,
}

impl<K2, V> CacheEntry<K2, V> {
    /// Fresh entry, counted as used once
    pub fn new(secondary_key: K2, value: V, now: Instant) -> Self {
        Self {
            secondary_key,
            value,
            last_access: now,
            desirability: 1,
        }
    }

    /// Record a hit
    #[inline]
    pub fn touch(&mut self, now: Instant) {
        self.last_access = now;
        self.desirability = self.desirability.saturating_add(1);
    }
}

/// Copy of an entry's ordering signals taken while pruning
#[derive(Debug, Clone)]
pub struct EntrySnapshot<K1> {
    pub key: K1,
    pub last_access: Instant,
    pub desirability: u64,
}
