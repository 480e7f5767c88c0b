//! Key and value bounds for the generic cache
//!
//! The cache never inspects its type parameters at runtime; every capability
//! it needs is expressed here as a trait bound with a blanket implementation.

use std::fmt::Debug;
use std::hash::Hash;

/// Primary lookup key (a process id in the path cache)
pub trait CacheKey: Clone + Send + Sync + Debug + Hash + Eq + 'static {}

impl<T> CacheKey for T where T: Clone + Send + Sync + Debug + Hash + Eq + 'static {}

/// Secondary validation key stored alongside each value
///
/// A lookup that supplies an expected secondary key only hits when the stored
/// one compares equal. Process names fill this role for pid keyed entries.
pub trait ValidationKey: Clone + Send + Sync + Debug + PartialEq + 'static {}

impl<T> ValidationKey for T where T: Clone + Send + Sync + Debug + PartialEq + 'static {}

/// Cached value
pub trait CacheValue: Clone + Send + Sync + Debug + 'static {}

impl<T> CacheValue for T where T: Clone + Send + Sync + Debug + 'static {}
