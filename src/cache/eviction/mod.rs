//! Eviction ranking used by cache pruning

pub mod ordering;

pub use ordering::{compare, rank_worst_first};
