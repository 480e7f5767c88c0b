//! Executable path resolution with a cost-ordered fallback chain
//!
//! The path cache is consulted first, keyed by pid and validated by process
//! name. On a miss the tiers run in fixed order and the first success is
//! written back to the cache. Expected failures fall through to the next
//! tier; only fatal errors leave the resolver.

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, RecvTimeoutError};
use serde::{Deserialize, Serialize};

use super::introspector::{ProcessIdentity, ProcessIntrospector, MAX_PATH_LEN};
use super::tier::ResolutionTier;
use crate::cache::GenericCache;
use crate::error::{GovernorError, GovernorResult};
use crate::telemetry::ResolverStatistics;

/// Path cache: pid to executable path, validated by process name
pub type PathCache = GenericCache<i32, String, PathBuf>;

/// Default bound on a single management query
pub const DEFAULT_MANAGEMENT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Allow the expensive management tier
    pub management_query: bool,
    #[serde(
        rename = "management_timeout_secs",
        with = "crate::serde_util::duration_secs"
    )]
    pub management_timeout: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            management_query: false,
            management_timeout: DEFAULT_MANAGEMENT_TIMEOUT,
        }
    }
}

#[derive(Debug)]
pub struct PathResolver {
    cache: Arc<PathCache>,
    introspector: Arc<dyn ProcessIntrospector>,
    config: ResolverConfig,
    stats: Arc<ResolverStatistics>,
}

impl PathResolver {
    pub fn new(
        cache: Arc<PathCache>,
        introspector: Arc<dyn ProcessIntrospector>,
        config: ResolverConfig,
    ) -> Self {
        Self {
            cache,
            introspector,
            config,
            stats: Arc::new(ResolverStatistics::new()),
        }
    }

    /// Publish counters into an existing statistics sink
    pub fn with_statistics(mut self, stats: Arc<ResolverStatistics>) -> Self {
        self.stats = stats;
        self
    }

    /// Executable path of `process`, `None` when every tier failed
    pub fn resolve(&self, process: &ProcessIdentity) -> GovernorResult<Option<PathBuf>> {
        if let Some((_, path)) = self.cache.get(&process.pid, Some(&process.name)) {
            self.stats.record_cache_hit();
            return Ok(Some(path));
        }
        self.stats.record_cache_miss();

        for tier in ResolutionTier::ORDER {
            if tier == ResolutionTier::Management && !self.config.management_query {
                continue;
            }

            self.stats.record_attempt(tier);
            match self.query(tier, process) {
                Ok(path) => {
                    self.stats.record_success(tier);
                    log::trace!("{} ({}) resolved by {}: {}", process.name, process.pid, tier, path.display());
                    self.cache
                        .add(process.pid, process.name.clone(), path.clone());
                    return Ok(Some(path));
                }
                Err(e) if e.is_fatal() => {
                    self.stats.record_failure(tier);
                    log::error!("{} tier failed fatally for pid {}: {}", tier, process.pid, e);
                    return Err(e);
                }
                Err(e) => {
                    self.stats.record_failure(tier);
                    log::trace!("{} tier failed for pid {}: {}", tier, process.pid, e);
                }
            }
        }

        self.stats.record_unresolved();
        log::debug!("no path for {} ({})", process.name, process.pid);
        Ok(None)
    }

    /// Forget the cached path of a process that has gone away
    pub fn forget(&self, pid: i32) -> bool {
        self.cache.drop_key(&pid)
    }

    pub fn cache(&self) -> &Arc<PathCache> {
        &self.cache
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn statistics(&self) -> &Arc<ResolverStatistics> {
        &self.stats
    }

    fn query(&self, tier: ResolutionTier, process: &ProcessIdentity) -> GovernorResult<PathBuf> {
        match tier {
            ResolutionTier::ModuleInfo => self.introspector.module_file_name(process),
            ResolutionTier::NativeBuffer => {
                self.introspector.image_file_name(process, MAX_PATH_LEN)
            }
            ResolutionTier::Management => self.query_management(process),
        }
    }

    /// Run the management query on its own thread, bounded by the timeout
    ///
    /// A query that hangs keeps its worker until its own timeout elapses; the
    /// caller stops waiting at the deadline either way.
    fn query_management(&self, process: &ProcessIdentity) -> GovernorResult<PathBuf> {
        let timeout = self.config.management_timeout;
        let (result_sender, result_receiver) = bounded(1);
        let introspector = self.introspector.clone();
        let identity = process.clone();

        let started = Instant::now();
        thread::Builder::new()
            .name("path-management-query".to_string())
            .spawn(move || {
                // Receiver may be gone after a timeout.
                let _ = result_sender.send(introspector.management_query(&identity, timeout));
            })
            .map_err(|e| {
                GovernorError::resource_exhausted(format!("management query worker: {}", e))
            })?;

        match result_receiver.recv_timeout(timeout) {
            Ok(Ok(path)) => {
                self.stats.record_management_latency(started.elapsed());
                Ok(path)
            }
            Ok(Err(e @ GovernorError::Timeout(_))) => {
                self.stats.record_management_timeout();
                log::warn!("management query for pid {} timed out: {}", process.pid, e);
                Err(e)
            }
            Ok(Err(e)) => Err(e),
            Err(RecvTimeoutError::Timeout) => {
                self.stats.record_management_timeout();
                log::warn!(
                    "management query for pid {} exceeded {:?}",
                    process.pid,
                    timeout
                );
                Err(GovernorError::Timeout(timeout))
            }
            Err(RecvTimeoutError::Disconnected) => Err(GovernorError::Io(
                "management query worker ended without a result".to_string(),
            )),
        }
    }
}
