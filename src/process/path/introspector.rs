//! Operating system seam for executable path queries

use std::path::PathBuf;
use std::time::Duration;

use crate::error::GovernorResult;

/// Longest path the native buffer tier will accept
#[cfg(windows)]
pub const MAX_PATH_LEN: usize = 32_767;
#[cfg(not(windows))]
pub const MAX_PATH_LEN: usize = 4096;

/// Process as seen by the resolver
///
/// The name doubles as the cache validation key, so a recycled pid with a
/// different name never matches a cached path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProcessIdentity {
    pub pid: i32,
    pub name: String,
}

impl ProcessIdentity {
    pub fn new(pid: i32, name: impl Into<String>) -> Self {
        Self {
            pid,
            name: name.into(),
        }
    }
}

/// Per-tier path queries against the live system
///
/// Implementations report expected failures as `PermissionDenied`,
/// `NotFound` or `Timeout` and reserve `ResourceExhausted` for conditions the
/// caller must not swallow.
pub trait ProcessIntrospector: Send + Sync + std::fmt::Debug {
    /// Cheap module information lookup
    fn module_file_name(&self, process: &ProcessIdentity) -> GovernorResult<PathBuf>;

    /// Lower-level image name query into a buffer of `capacity` bytes
    fn image_file_name(&self, process: &ProcessIdentity, capacity: usize) -> GovernorResult<PathBuf>;

    /// Expensive management query, expected to give up after `timeout`
    ///
    /// Runs on a dedicated worker thread; blocking here is fine.
    fn management_query(&self, process: &ProcessIdentity, timeout: Duration)
        -> GovernorResult<PathBuf>;
}
