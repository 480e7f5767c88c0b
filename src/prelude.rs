//! Convenient imports for hosts embedding the governor core

pub use crate::affinity::{AffinityContext, AffinityMask, AffinityStrategy};
pub use crate::cache::{
    CacheBuilder, CacheConfig, Clock, EvictionPolicy, GenericCache, PruneOutcome,
    StoreConflictPolicy, SystemClock,
};
pub use crate::error::{GovernorError, GovernorResult};
pub use crate::governor::{GovernorConfig, GovernorContext, StateObserver};
pub use crate::process::path::{
    PathCache, PathResolver, ProcessIdentity, ProcessIntrospector, ProcfsIntrospector,
    ResolutionTier, ResolverConfig,
};
pub use crate::process::{ProcessHandlingState, ProcessRecord, RecordTimer};
pub use crate::telemetry::{CacheStatistics, ResolverStatistics};
