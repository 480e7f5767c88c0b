//! Per-process bookkeeping: lifecycle records and path resolution

pub mod path;
pub mod record;
pub mod state;
pub mod timer;

pub use path::{PathResolver, ProcessIdentity, ProcessIntrospector, ResolutionTier};
pub use record::ProcessRecord;
pub use state::ProcessHandlingState;
pub use timer::RecordTimer;
