//! Cache configuration with production defaults
//!
//! Bounds, eviction and conflict policies for [`GenericCache`](crate::cache::GenericCache).
//! Values deserialize from the `[cache]` table of the governor configuration.

pub mod types;

pub use types::{CacheConfig, EvictionPolicy, StoreConflictPolicy};
