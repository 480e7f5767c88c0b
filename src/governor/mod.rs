//! Explicitly constructed governor context
//!
//! [`GovernorContext`] owns the path cache, the resolver and the affinity
//! context. The host builds one during startup and hands references to the
//! process enumerator, the rule engine and the UI.

pub mod config;
pub mod observer;

pub use config::{AffinityConfig, GovernorConfig};
pub use observer::{ObserverList, StateObserver};

use std::path::PathBuf;
use std::sync::Arc;

use crossbeam_utils::atomic::AtomicCell;
use serde::Serialize;

use crate::affinity::{AffinityContext, AffinityMask, AffinityStrategy};
use crate::cache::Clock;
use crate::error::GovernorResult;
use crate::process::path::{PathCache, PathResolver, ProcessIntrospector, ProcfsIntrospector};
use crate::process::{ProcessHandlingState, ProcessRecord};
use crate::telemetry::{CacheStatistics, CacheStatsSnapshot, ResolverStatsSnapshot};

/// Combined counters for an external statistics sink
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GovernorStatsSnapshot {
    pub path_cache: CacheStatsSnapshot,
    pub resolver: ResolverStatsSnapshot,
}

#[derive(Debug)]
pub struct GovernorContext {
    config: GovernorConfig,
    resolver: PathResolver,
    affinity: AffinityContext,
    strategy: AtomicCell<AffinityStrategy>,
    observers: ObserverList,
}

impl GovernorContext {
    pub fn builder() -> GovernorBuilder {
        GovernorBuilder::new()
    }

    /// Context with background pruning and the given introspector
    pub fn new(
        config: GovernorConfig,
        introspector: Arc<dyn ProcessIntrospector>,
    ) -> GovernorResult<Self> {
        Self::builder()
            .config(config)
            .introspector(introspector)
            .build()
    }

    pub fn config(&self) -> &GovernorConfig {
        &self.config
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    pub fn path_cache(&self) -> &Arc<PathCache> {
        self.resolver.cache()
    }

    pub fn affinity(&self) -> &AffinityContext {
        &self.affinity
    }

    pub fn affinity_strategy(&self) -> AffinityStrategy {
        self.strategy.load()
    }

    /// Switch the strategy used by [`adjust_affinity`](Self::adjust_affinity)
    pub fn set_affinity_strategy(&self, strategy: AffinityStrategy) {
        let previous = self.strategy.swap(strategy);
        if previous != strategy {
            log::info!("affinity strategy {:?} -> {:?}", previous, strategy);
        }
    }

    /// Narrow `target` so it selects no more processors than `source`
    pub fn adjust_affinity(
        &self,
        source: &AffinityMask,
        target: &AffinityMask,
    ) -> GovernorResult<AffinityMask> {
        self.affinity
            .apply(self.affinity_strategy(), source, target)
    }

    /// Register an observer; call before the context is shared
    pub fn register_observer(&mut self, observer: Arc<dyn StateObserver>) {
        self.observers.register(observer);
    }

    /// Fill in the record's executable path
    ///
    /// `Ok(None)` leaves path-based rules unable to match the process.
    pub fn observe(&self, record: &mut ProcessRecord) -> GovernorResult<Option<PathBuf>> {
        Ok(record.resolve_path(&self.resolver)?.map(PathBuf::from))
    }

    /// Move `record` to `state` and notify observers
    pub fn transition(&self, record: &mut ProcessRecord, state: ProcessHandlingState) {
        let previous = record.state();
        record.set_state(state);
        self.observers.notify(record, previous);
    }

    /// Mark the record exited and forget its cached path
    pub fn process_exited(&self, record: &mut ProcessRecord) {
        self.transition(record, ProcessHandlingState::Exited);
        self.resolver.forget(record.pid());
    }

    pub fn statistics(&self) -> GovernorStatsSnapshot {
        GovernorStatsSnapshot {
            path_cache: self.path_cache().statistics().snapshot(),
            resolver: self.resolver.statistics().snapshot(),
        }
    }

    /// Stop background pruning and release cached paths
    pub fn shutdown(&self) {
        self.path_cache().dispose();
    }
}

impl Drop for GovernorContext {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Fluent builder for [`GovernorContext`]
#[derive(Debug, Default)]
pub struct GovernorBuilder {
    config: GovernorConfig,
    introspector: Option<Arc<dyn ProcessIntrospector>>,
    clock: Option<Arc<dyn Clock>>,
    cache_statistics: Option<Arc<CacheStatistics>>,
    background_pruning: bool,
}

impl GovernorBuilder {
    pub fn new() -> Self {
        Self {
            background_pruning: true,
            ..Self::default()
        }
    }

    pub fn config(mut self, config: GovernorConfig) -> Self {
        self.config = config;
        self
    }

    /// Defaults to [`ProcfsIntrospector`]
    pub fn introspector(mut self, introspector: Arc<dyn ProcessIntrospector>) -> Self {
        self.introspector = Some(introspector);
        self
    }

    /// Time source for the path cache
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn cache_statistics(mut self, stats: Arc<CacheStatistics>) -> Self {
        self.cache_statistics = Some(stats);
        self
    }

    /// Leave path cache pruning to explicit `prune` calls
    pub fn manual_pruning(mut self) -> Self {
        self.background_pruning = false;
        self
    }

    pub fn build(self) -> GovernorResult<GovernorContext> {
        let config = self.config.validated()?;
        let affinity = config.affinity.context()?;

        let mut cache = PathCache::builder().config(config.cache.clone());
        if let Some(clock) = self.clock {
            cache = cache.clock(clock);
        }
        if let Some(stats) = self.cache_statistics {
            cache = cache.statistics(stats);
        }
        if !self.background_pruning {
            cache = cache.manual_pruning();
        }
        let cache = cache.build()?;

        let introspector = self
            .introspector
            .unwrap_or_else(|| Arc::new(ProcfsIntrospector::new()) as Arc<dyn ProcessIntrospector>);
        let resolver = PathResolver::new(cache, introspector, config.resolver.clone());

        log::debug!(
            "governor ready: {} logical processors, {:?} affinity, management query {}",
            affinity.logical_processors(),
            config.affinity.strategy,
            if config.resolver.management_query { "enabled" } else { "disabled" }
        );

        Ok(GovernorContext {
            strategy: AtomicCell::new(config.affinity.strategy),
            config,
            resolver,
            affinity,
            observers: ObserverList::new(),
        })
    }
}
