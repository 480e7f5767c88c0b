//! Entry and time types used by the cache

pub mod clock;
pub mod entry;

pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::{CacheEntry, EntrySnapshot};
