//! Cache system module
//!
//! Generic, concurrency-safe cache bounded by capacity and entry age, with a
//! secondary validation key checked on every lookup.

pub mod config;
pub mod eviction;
pub mod generic_cache;
pub mod traits;
pub mod types;
pub mod worker;

pub use config::{CacheConfig, EvictionPolicy, StoreConflictPolicy};
pub use generic_cache::{CacheBuilder, GenericCache, PruneOutcome, PruneSkip};
pub use types::{Clock, ManualClock, SystemClock};
