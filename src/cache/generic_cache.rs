//! Capacity- and age-bounded concurrent cache
//!
//! Entries are keyed by a primary key and carry a secondary validation key.
//! A lookup that supplies a different secondary key is treated as a miss and
//! purges the stored entry, so a recycled primary key (a reused process id)
//! never returns data that belonged to its previous owner.
//!
//! Storage is a sharded [`DashMap`]; `add`, `get` and `drop_key` need no
//! external locking. Pruning runs on a background [`Ticker`] and is
//! single-flight: overlapping runs are dropped, not queued.

use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::cache::config::{CacheConfig, EvictionPolicy, StoreConflictPolicy};
use crate::cache::eviction::rank_worst_first;
use crate::cache::traits::{CacheKey, CacheValue, ValidationKey};
use crate::cache::types::clock::age_minutes;
use crate::cache::types::{CacheEntry, Clock, EntrySnapshot, SystemClock};
use crate::cache::worker::{TickFlow, Ticker};
use crate::error::GovernorResult;
use crate::telemetry::CacheStatistics;

/// Delay before the first background prune
pub const PRUNE_START_DELAY: Duration = Duration::from_secs(5);

/// Why a prune call did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PruneSkip {
    /// Another prune is running
    InProgress,
    Disposed,
    /// Size is at or below `min_items`
    AtOrBelowMinimum,
    /// `LeastUsed` cache that has not exceeded `max_items`
    WithinCapacity,
}

/// Result of one prune call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PruneOutcome {
    Skipped(PruneSkip),
    /// Dispose was observed part way through
    Aborted,
    Completed {
        capacity_evicted: usize,
        age_evicted: usize,
    },
}

enum Lookup<K2, V> {
    Hit(K2, V),
    Miss,
    Stale,
}

/// Resets the single-flight flag when a prune finishes or unwinds
struct PruneGuard<'a>(&'a AtomicBool);

impl Drop for PruneGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Concurrent cache keyed by `K1`, validated by `K2`, storing `V`
pub struct GenericCache<K1, K2, V>
where
    K1: CacheKey,
    K2: ValidationKey,
    V: CacheValue,
{
    entries: DashMap<K1, CacheEntry<K2, V>>,
    config: CacheConfig,
    clock: Arc<dyn Clock>,
    stats: Arc<CacheStatistics>,
    pruning: AtomicBool,
    disposed: AtomicBool,
    scheduler: Mutex<Option<Ticker>>,
}

impl<K1, K2, V> std::fmt::Debug for GenericCache<K1, K2, V>
where
    K1: CacheKey,
    K2: ValidationKey,
    V: CacheValue,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenericCache")
            .field("len", &self.entries.len())
            .field("config", &self.config)
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

impl<K1, K2, V> GenericCache<K1, K2, V>
where
    K1: CacheKey,
    K2: ValidationKey,
    V: CacheValue,
{
    /// Create a new cache builder with default configuration
    pub fn builder() -> CacheBuilder<K1, K2, V> {
        CacheBuilder::new()
    }

    /// Construct without background pruning
    ///
    /// `config` is expected to be validated already.
    pub fn new(config: CacheConfig, clock: Arc<dyn Clock>, stats: Arc<CacheStatistics>) -> Self {
        Self {
            entries: DashMap::with_capacity(config.max_items as usize),
            config,
            clock,
            stats,
            pruning: AtomicBool::new(false),
            disposed: AtomicBool::new(false),
            scheduler: Mutex::new(None),
        }
    }

    /// Start the recurring background prune
    ///
    /// The ticker only holds a weak reference, so dropping the last `Arc`
    /// ends the schedule.
    pub fn start_pruning(self: &Arc<Self>) -> GovernorResult<()> {
        let mut scheduler = self.scheduler();
        if scheduler.is_some() || self.is_disposed() {
            return Ok(());
        }

        let cache: Weak<Self> = Arc::downgrade(self);
        let ticker = Ticker::spawn(
            "cache-prune",
            PRUNE_START_DELAY,
            self.config.prune_interval,
            move || match cache.upgrade() {
                Some(cache) if !cache.is_disposed() => {
                    cache.prune();
                    TickFlow::Continue
                }
                _ => TickFlow::Stop,
            },
        )?;

        *scheduler = Some(ticker);
        Ok(())
    }

    /// Store a value
    ///
    /// Always counts a miss: an insert means a lookup upstream came up empty.
    /// Returns `false` when the key exists under [`StoreConflictPolicy::Fail`]
    /// or the cache is disposed.
    pub fn add(&self, key1: K1, key2: K2, value: V) -> bool {
        self.stats.record_miss();

        if self.is_disposed() {
            return false;
        }

        let now = self.clock.now();
        let stored = match self.entries.entry(key1) {
            Entry::Occupied(mut occupied) => match self.config.store_conflict_policy {
                StoreConflictPolicy::Fail => {
                    log::trace!("add refused for {:?}: key present", occupied.key());
                    false
                }
                StoreConflictPolicy::ReplaceIfKey2Matches => {
                    if occupied.get().secondary_key != key2 {
                        log::debug!(
                            "replacing {:?}: secondary key {:?} -> {:?}",
                            occupied.key(),
                            occupied.get().secondary_key,
                            key2
                        );
                    }
                    occupied.insert(CacheEntry::new(key2, value, now));
                    true
                }
                StoreConflictPolicy::ReplaceAlways => {
                    occupied.insert(CacheEntry::new(key2, value, now));
                    true
                }
            },
            Entry::Vacant(vacant) => {
                vacant.insert(CacheEntry::new(key2, value, now));
                true
            }
        };

        let size = self.entries.len();
        self.stats.update_size(size);

        let ceiling = self.config.max_items as usize + self.config.overflow_margin() as usize;
        if size > ceiling {
            self.request_prune();
        }

        stored
    }

    /// Look up a value
    ///
    /// With `key2_expected` set, a stored entry whose secondary key differs is
    /// purged and reported as a miss. A hit refreshes the entry's last access
    /// and bumps its desirability.
    pub fn get(&self, key1: &K1, key2_expected: Option<&K2>) -> Option<(K2, V)> {
        if self.is_disposed() {
            self.stats.record_miss();
            return None;
        }

        let now = self.clock.now();
        let lookup = match self.entries.get_mut(key1) {
            None => Lookup::Miss,
            Some(mut entry) => match key2_expected {
                Some(expected) if entry.secondary_key != *expected => Lookup::Stale,
                _ => {
                    entry.touch(now);
                    Lookup::Hit(entry.secondary_key.clone(), entry.value.clone())
                }
            },
        };

        match lookup {
            Lookup::Hit(key2, value) => {
                self.stats.record_hit();
                Some((key2, value))
            }
            Lookup::Miss => {
                self.stats.record_miss();
                None
            }
            Lookup::Stale => {
                self.stats.record_miss();
                if let Some(expected) = key2_expected {
                    let purged = self
                        .entries
                        .remove_if(key1, |_, entry| entry.secondary_key != *expected);
                    if purged.is_some() {
                        log::debug!("purged stale entry for {:?}", key1);
                        self.stats.record_stale_purge();
                        self.stats.update_size(self.entries.len());
                    }
                }
                None
            }
        }
    }

    /// Remove an entry unconditionally; returns whether one was present
    pub fn drop_key(&self, key1: &K1) -> bool {
        let removed = self.entries.remove(key1).is_some();
        self.stats.update_size(self.entries.len());
        removed
    }

    /// Evict down to `max_items`, then evict aged entries
    ///
    /// Both passes walk the policy ranking from the worst end. The age pass
    /// stops at the first entry that is young enough, assuming the ranking is
    /// ordered by age as well.
    pub fn prune(&self) -> PruneOutcome {
        if self.is_disposed() {
            return PruneOutcome::Skipped(PruneSkip::Disposed);
        }

        if self
            .pruning
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            return PruneOutcome::Skipped(PruneSkip::InProgress);
        }
        let _guard = PruneGuard(&self.pruning);

        let outcome = self.prune_exclusive();
        self.stats.update_size(self.entries.len());
        outcome
    }

    fn prune_exclusive(&self) -> PruneOutcome {
        let policy = self.config.eviction_policy;
        let min_items = self.config.min_items as usize;
        let max_items = self.config.max_items as usize;

        let size = self.entries.len();
        if size <= min_items {
            return PruneOutcome::Skipped(PruneSkip::AtOrBelowMinimum);
        }
        if policy == EvictionPolicy::LeastUsed && size <= max_items {
            return PruneOutcome::Skipped(PruneSkip::WithinCapacity);
        }

        let mut ranked: Vec<EntrySnapshot<K1>> = self
            .entries
            .iter()
            .map(|entry| EntrySnapshot {
                key: entry.key().clone(),
                last_access: entry.last_access,
                desirability: entry.desirability,
            })
            .collect();
        rank_worst_first(policy, &mut ranked);

        let mut cursor = 0;
        let mut capacity_evicted = 0;
        while self.entries.len() > max_items && cursor < ranked.len() {
            if self.is_disposed() {
                return PruneOutcome::Aborted;
            }
            if self.entries.remove(&ranked[cursor].key).is_some() {
                capacity_evicted += 1;
            }
            cursor += 1;
        }

        let now = self.clock.now();
        let threshold = self.config.age_threshold_minutes();
        let mut age_evicted = 0;
        for candidate in &ranked[cursor..] {
            if self.is_disposed() {
                return PruneOutcome::Aborted;
            }
            if age_minutes(now, candidate.last_access) <= threshold {
                break;
            }
            // Skip entries refreshed since the snapshot.
            let removed = self.entries.remove_if(&candidate.key, |_, entry| {
                entry.last_access == candidate.last_access
            });
            if removed.is_some() {
                age_evicted += 1;
            }
        }

        self.stats
            .record_prune(capacity_evicted as u64, age_evicted as u64);
        log::debug!(
            "pruned {} by capacity and {} by age ({:?}), {} remain",
            capacity_evicted,
            age_evicted,
            policy,
            self.entries.len()
        );

        PruneOutcome::Completed {
            capacity_evicted,
            age_evicted,
        }
    }

    /// Stop background pruning and clear all entries
    ///
    /// Later operations are no-ops. Safe to call while a prune is running.
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }

        let ticker = self.scheduler().take();
        if let Some(mut ticker) = ticker {
            ticker.stop();
        }

        self.entries.clear();
        self.stats.update_size(0);
        log::debug!("cache disposed");
    }

    #[inline]
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key1: &K1) -> bool {
        self.entries.contains_key(key1)
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn statistics(&self) -> &Arc<CacheStatistics> {
        &self.stats
    }

    fn request_prune(&self) {
        if let Some(ticker) = self.scheduler().as_ref() {
            ticker.wake();
        }
    }

    fn scheduler(&self) -> MutexGuard<'_, Option<Ticker>> {
        self.scheduler.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Fluent construction of a [`GenericCache`]
pub struct CacheBuilder<K1, K2, V> {
    config: CacheConfig,
    clock: Option<Arc<dyn Clock>>,
    stats: Option<Arc<CacheStatistics>>,
    background_pruning: bool,
    _phantom: PhantomData<fn() -> (K1, K2, V)>,
}

impl<K1, K2, V> CacheBuilder<K1, K2, V>
where
    K1: CacheKey,
    K2: ValidationKey,
    V: CacheValue,
{
    /// Create new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: CacheConfig::default(),
            clock: None,
            stats: None,
            background_pruning: true,
            _phantom: PhantomData,
        }
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: CacheConfig) -> Self {
        self.config = config;
        self
    }

    pub fn max_items(mut self, max_items: u32) -> Self {
        self.config.max_items = max_items;
        self
    }

    pub fn min_items(mut self, min_items: u32) -> Self {
        self.config.min_items = min_items;
        self
    }

    pub fn eviction_policy(mut self, policy: EvictionPolicy) -> Self {
        self.config.eviction_policy = policy;
        self
    }

    pub fn store_conflict_policy(mut self, policy: StoreConflictPolicy) -> Self {
        self.config.store_conflict_policy = policy;
        self
    }

    pub fn min_age_minutes(mut self, minutes: f64) -> Self {
        self.config.min_age_minutes = minutes;
        self
    }

    pub fn max_age_minutes(mut self, minutes: f64) -> Self {
        self.config.max_age_minutes = minutes;
        self
    }

    /// Interval between background prunes, raised to at least ten seconds
    pub fn prune_interval(mut self, interval: Duration) -> Self {
        self.config.prune_interval = interval;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Publish counters into an existing statistics sink
    pub fn statistics(mut self, stats: Arc<CacheStatistics>) -> Self {
        self.stats = Some(stats);
        self
    }

    /// Leave pruning to explicit `prune` calls
    pub fn manual_pruning(mut self) -> Self {
        self.background_pruning = false;
        self
    }

    /// Validate the configuration and build the cache
    pub fn build(self) -> GovernorResult<Arc<GenericCache<K1, K2, V>>> {
        let config = self.config.validated()?;
        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(SystemClock) as Arc<dyn Clock>);
        let stats = self.stats.unwrap_or_default();

        let cache = Arc::new(GenericCache::new(config, clock, stats));
        if self.background_pruning {
            cache.start_pruning()?;
        }
        Ok(cache)
    }
}

impl<K1, K2, V> Default for CacheBuilder<K1, K2, V>
where
    K1: CacheKey,
    K2: ValidationKey,
    V: CacheValue,
{
    fn default() -> Self {
        Self::new()
    }
}
