//! Executable path resolution

pub mod introspector;
pub mod procfs;
pub mod resolver;
pub mod tier;

pub use introspector::{ProcessIdentity, ProcessIntrospector, MAX_PATH_LEN};
pub use procfs::ProcfsIntrospector;
pub use resolver::{PathCache, PathResolver, ResolverConfig, DEFAULT_MANAGEMENT_TIMEOUT};
pub use tier::ResolutionTier;
