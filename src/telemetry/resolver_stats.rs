//! Path resolution statistics
//!
//! Per-tier attempt, success and failure counters plus the cumulative latency
//! of management queries. Counters only ever increase.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crossbeam_utils::CachePadded;

use crate::process::path::ResolutionTier;

#[derive(Debug, Default)]
struct TierCounters {
    attempts: AtomicU64,
    successes: AtomicU64,
    failures: AtomicU64,
}

/// Live counters for a [`PathResolver`](crate::process::path::PathResolver)
#[derive(Debug, Default)]
pub struct ResolverStatistics {
    cache_hits: CachePadded<AtomicU64>,
    cache_misses: CachePadded<AtomicU64>,
    tiers: CachePadded<[TierCounters; ResolutionTier::COUNT]>,
    management_timeouts: CachePadded<AtomicU64>,
    management_latency_ns: CachePadded<AtomicU64>,
    unresolved: CachePadded<AtomicU64>,
}

/// Counters for a single tier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct TierStatsSnapshot {
    pub attempts: u64,
    pub successes: u64,
    pub failures: u64,
}

/// Point-in-time copy of [`ResolverStatistics`]
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct ResolverStatsSnapshot {
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub module_info: TierStatsSnapshot,
    pub native_buffer: TierStatsSnapshot,
    pub management: TierStatsSnapshot,
    pub management_timeouts: u64,
    pub management_latency_ms: f64,
    pub unresolved: u64,
}

impl ResolverStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn record_attempt(&self, tier: ResolutionTier) {
        self.tiers[tier.index()]
            .attempts
            .fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn record_success(&self, tier: ResolutionTier) {
        self.tiers[tier.index()]
            .successes
            .fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn record_failure(&self, tier: ResolutionTier) {
        self.tiers[tier.index()]
            .failures
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_management_latency(&self, elapsed: Duration) {
        let elapsed_ns = u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX);
        self.management_latency_ns
            .fetch_add(elapsed_ns, Ordering::Relaxed);
    }

    pub fn record_management_timeout(&self) {
        self.management_timeouts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_unresolved(&self) {
        self.unresolved.fetch_add(1, Ordering::Relaxed);
    }

    pub fn tier(&self, tier: ResolutionTier) -> TierStatsSnapshot {
        let counters = &self.tiers[tier.index()];
        TierStatsSnapshot {
            attempts: counters.attempts.load(Ordering::Relaxed),
            successes: counters.successes.load(Ordering::Relaxed),
            failures: counters.failures.load(Ordering::Relaxed),
        }
    }

    pub fn management_latency(&self) -> Duration {
        Duration::from_nanos(self.management_latency_ns.load(Ordering::Relaxed))
    }

    pub fn snapshot(&self) -> ResolverStatsSnapshot {
        ResolverStatsSnapshot {
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            module_info: self.tier(ResolutionTier::ModuleInfo),
            native_buffer: self.tier(ResolutionTier::NativeBuffer),
            management: self.tier(ResolutionTier::Management),
            management_timeouts: self.management_timeouts.load(Ordering::Relaxed),
            management_latency_ms: self.management_latency().as_secs_f64() * 1000.0,
            unresolved: self.unresolved.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_counters_are_independent() {
        let stats = ResolverStatistics::new();
        stats.record_attempt(ResolutionTier::ModuleInfo);
        stats.record_failure(ResolutionTier::ModuleInfo);
        stats.record_attempt(ResolutionTier::NativeBuffer);
        stats.record_success(ResolutionTier::NativeBuffer);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.module_info.failures, 1);
        assert_eq!(snapshot.native_buffer.successes, 1);
        assert_eq!(snapshot.management, TierStatsSnapshot::default());
    }

    #[test]
    fn test_management_latency_accumulates() {
        let stats = ResolverStatistics::new();
        stats.record_management_latency(Duration::from_millis(120));
        stats.record_management_latency(Duration::from_millis(30));
        assert_eq!(stats.management_latency(), Duration::from_millis(150));
        assert!((stats.snapshot().management_latency_ms - 150.0).abs() < 1e-6);
    }
}
