//! Core configuration types and enums
//!
//! Defines the eviction and store-conflict policies along with the bounded
//! [`CacheConfig`] used by every cache instance.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{GovernorError, GovernorResult};

/// Shortest allowed interval between background prunes
pub const MIN_PRUNE_INTERVAL: Duration = Duration::from_secs(10);

/// Which entries are considered worst when the cache must shrink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvictionPolicy {
    /// Fewest hits first, oldest access breaks ties
    #[serde(rename = "least_used")]
    LeastUsed,
    /// Oldest access first, fewest hits breaks ties
    #[serde(rename = "least_recent")]
    LeastRecent,
}

impl Default for EvictionPolicy {
    fn default() -> Self {
        Self::LeastRecent
    }
}

/// What `add` does when the primary key is already stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreConflictPolicy {
    #[serde(rename = "replace_always")]
    ReplaceAlways,
    /// Replace, logging when the secondary key changed underneath
    #[serde(rename = "replace_if_key2_matches")]
    ReplaceIfKey2Matches,
    /// Keep the stored entry and report failure
    #[serde(rename = "fail")]
    Fail,
}

impl Default for StoreConflictPolicy {
    fn default() -> Self {
        Self::ReplaceIfKey2Matches
    }
}

/// Bounds and policies for one cache instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub eviction_policy: EvictionPolicy,
    pub store_conflict_policy: StoreConflictPolicy,
    pub max_items: u32,
    pub min_items: u32,
    /// Age threshold used by the `LeastUsed` age pass
    pub min_age_minutes: f64,
    /// Age threshold used by the `LeastRecent` age pass
    pub max_age_minutes: f64,
    #[serde(rename = "prune_interval_secs", with = "crate::serde_util::duration_secs")]
    pub prune_interval: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            eviction_policy: EvictionPolicy::LeastRecent,
            store_conflict_policy: StoreConflictPolicy::ReplaceIfKey2Matches,
            max_items: 100,
            min_items: 10,
            min_age_minutes: 5.0,
            max_age_minutes: 60.0,
            prune_interval: Duration::from_secs(60),
        }
    }
}

impl CacheConfig {
    /// Tolerated growth above `max_items` before an early prune is requested
    #[inline]
    pub fn overflow_margin(&self) -> u32 {
        (self.max_items / 2).clamp(2, 50)
    }

    /// Age threshold applied by the age pass of `prune`
    #[inline]
    pub fn age_threshold_minutes(&self) -> f64 {
        match self.eviction_policy {
            EvictionPolicy::LeastRecent => self.max_age_minutes,
            EvictionPolicy::LeastUsed => self.min_age_minutes,
        }
    }

    /// Clamp soft bounds and reject contradictory ones
    pub fn validated(mut self) -> GovernorResult<Self> {
        if self.max_items < self.min_items {
            return Err(GovernorError::invalid_configuration(format!(
                "max_items ({}) must not be smaller than min_items ({})",
                self.max_items, self.min_items
            )));
        }

        if !(self.min_age_minutes >= 0.0) || !(self.max_age_minutes >= 0.0) {
            return Err(GovernorError::invalid_configuration(
                "age thresholds must be non-negative numbers",
            ));
        }

        if self.prune_interval < MIN_PRUNE_INTERVAL {
            log::debug!(
                "prune interval {:?} raised to {:?}",
                self.prune_interval,
                MIN_PRUNE_INTERVAL
            );
            self.prune_interval = MIN_PRUNE_INTERVAL;
        }

        Ok(self)
    }
}
