//! Statistics consumed by an external observability sink
//!
//! Every component publishes its counters through an `Arc` shared with the
//! owner; snapshots are serializable.

pub mod cache_stats;
pub mod resolver_stats;

pub use cache_stats::{CacheStatistics, CacheStatsSnapshot};
pub use resolver_stats::{ResolverStatistics, ResolverStatsSnapshot, TierStatsSnapshot};
