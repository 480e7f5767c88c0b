//! Trait bounds shared by cache instances

pub mod core;

pub use core::{CacheKey, CacheValue, ValidationKey};
