//! Eviction ordering for the two cache policies
//!
//! Entries are ranked so that the "worst" candidate sorts first. Both the
//! capacity pass and the age pass of `prune` walk the ranking from the front.

use std::cmp::Ordering;

use crate::cache::config::EvictionPolicy;
use crate::cache::types::EntrySnapshot;

/// Compare two entries under `policy`, smaller means evicted sooner
pub fn compare<K>(policy: EvictionPolicy, a: &EntrySnapshot<K>, b: &EntrySnapshot<K>) -> Ordering {
    match policy {
        EvictionPolicy::LeastRecent => a
            .last_access
            .cmp(&b.last_access)
            .then(a.desirability.cmp(&b.desirability)),
        EvictionPolicy::LeastUsed => a
            .desirability
            .cmp(&b.desirability)
            .then(a.last_access.cmp(&b.last_access)),
    }
}

/// Sort candidates worst first
pub fn rank_worst_first<K>(policy: EvictionPolicy, candidates: &mut [EntrySnapshot<K>]) {
    candidates.sort_by(|a, b| compare(policy, a, b));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn snap(key: u32, offset_secs: u64, desirability: u64, base: Instant) -> EntrySnapshot<u32> {
        EntrySnapshot {
            key,
            last_access: base + Duration::from_secs(offset_secs),
            desirability,
        }
    }

    #[test]
    fn test_least_recent_orders_by_access_then_use() {
        let base = Instant::now();
        let mut entries = vec![
            snap(1, 30, 1, base),
            snap(2, 10, 9, base),
            snap(3, 10, 2, base),
        ];
        rank_worst_first(EvictionPolicy::LeastRecent, &mut entries);
        let keys: Vec<u32> = entries.iter().map(|e| e.key).collect();
        assert_eq!(keys, vec![3, 2, 1]);
    }

    #[test]
    fn test_least_used_orders_by_use_then_access() {
        let base = Instant::now();
        let mut entries = vec![
            snap(1, 30, 1, base),
            snap(2, 10, 9, base),
            snap(3, 5, 1, base),
        ];
        rank_worst_first(EvictionPolicy::LeastUsed, &mut entries);
        let keys: Vec<u32> = entries.iter().map(|e| e.key).collect();
        assert_eq!(keys, vec![3, 1, 2]);
    }
}
