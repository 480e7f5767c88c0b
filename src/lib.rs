//! taskwarden - process identity resolution and caching core
//!
//! The pieces a process governor needs between enumerating processes and
//! applying rules to them:
//!
//! - [`GenericCache`]: concurrent two-key cache bounded by size and age, with
//!   single-flight background pruning
//! - [`PathResolver`]: executable path lookup through a cost-ordered fallback
//!   chain, guarded against pid reuse by the process name
//! - [`AffinityStrategy`]: transforms that narrow a CPU affinity mask
//! - [`ProcessRecord`]: per-process lifecycle record and its state machine
//!
//! [`GovernorContext`] ties them together and is passed explicitly to every
//! consumer.
//!
//! ```no_run
//! use taskwarden::prelude::*;
//!
//! let config = GovernorConfig::from_toml_str("[resolver]\nmanagement_query = true\n")?;
//! let governor = GovernorContext::builder().config(config).build()?;
//!
//! let mut record = ProcessRecord::new(4242, "encoder");
//! if let Some(path) = governor.observe(&mut record)? {
//!     println!("{} runs {}", record.name(), path.display());
//! }
//! # Ok::<(), GovernorError>(())
//! ```

pub mod affinity;
pub mod cache;
pub mod error;
pub mod governor;
pub mod prelude;
pub mod process;
pub mod telemetry;

mod serde_util;

pub use affinity::{AffinityContext, AffinityMask, AffinityStrategy};
pub use cache::{CacheBuilder, CacheConfig, EvictionPolicy, GenericCache, StoreConflictPolicy};
pub use error::{ErrorCategory, GovernorError, GovernorResult};
pub use governor::{GovernorBuilder, GovernorConfig, GovernorContext};
pub use process::path::{PathResolver, ProcessIdentity, ProcessIntrospector, ResolverConfig};
pub use process::{ProcessHandlingState, ProcessRecord};
