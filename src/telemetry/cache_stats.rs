//! Cache statistics with atomic coordination
//!
//! Counters are updated on every cache operation and may be read from any
//! thread while operations are in flight. Reads are eventually consistent.

use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_utils::CachePadded;

/// Live counters for one cache instance
#[derive(Debug, Default)]
pub struct CacheStatistics {
    hits: CachePadded<AtomicU64>,
    misses: CachePadded<AtomicU64>,
    /// Entry count after the most recent mutation
    current_size: CachePadded<AtomicU64>,
    peak_size: CachePadded<AtomicU64>,
    capacity_evictions: CachePadded<AtomicU64>,
    age_evictions: CachePadded<AtomicU64>,
    /// Entries dropped because the secondary key no longer matched
    stale_purges: CachePadded<AtomicU64>,
    prune_runs: CachePadded<AtomicU64>,
}

/// Point-in-time copy of [`CacheStatistics`]
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct CacheStatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub current_size: u64,
    pub peak_size: u64,
    pub capacity_evictions: u64,
    pub age_evictions: u64,
    pub stale_purges: u64,
    pub prune_runs: u64,
    pub hit_rate: f64,
}

impl CacheStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn record_stale_purge(&self) {
        self.stale_purges.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_prune(&self, capacity_evicted: u64, age_evicted: u64) {
        self.prune_runs.fetch_add(1, Ordering::Relaxed);
        self.capacity_evictions
            .fetch_add(capacity_evicted, Ordering::Relaxed);
        self.age_evictions.fetch_add(age_evicted, Ordering::Relaxed);
    }

    /// Publish the current entry count with peak tracking
    pub fn update_size(&self, size: usize) {
        let size = size as u64;
        self.current_size.store(size, Ordering::Relaxed);

        let mut peak = self.peak_size.load(Ordering::Relaxed);
        while size > peak {
            match self.peak_size.compare_exchange_weak(
                peak,
                size,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(actual) => peak = actual,
            }
        }
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn current_size(&self) -> u64 {
        self.current_size.load(Ordering::Relaxed)
    }

    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits() as f64;
        let total = hits + self.misses() as f64;
        if total > 0.0 { hits / total } else { 0.0 }
    }

    pub fn snapshot(&self) -> CacheStatsSnapshot {
        CacheStatsSnapshot {
            hits: self.hits(),
            misses: self.misses(),
            current_size: self.current_size(),
            peak_size: self.peak_size.load(Ordering::Relaxed),
            capacity_evictions: self.capacity_evictions.load(Ordering::Relaxed),
            age_evictions: self.age_evictions.load(Ordering::Relaxed),
            stale_purges: self.stale_purges.load(Ordering::Relaxed),
            prune_runs: self.prune_runs.load(Ordering::Relaxed),
            hit_rate: self.hit_rate(),
        }
    }
}
