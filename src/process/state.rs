//! Handling states of an observed process

/// Where the governor is with one process
///
/// Transitions are unguarded; the governor driving them decides the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProcessHandlingState {
    #[default]
    Invalid,
    Unmodified,
    Modified,
    AccessDenied,
    Finished,
    Abandoned,
    Exited,
}

impl ProcessHandlingState {
    /// States that mark the record as handled and stop its timer
    pub fn settles_record(self) -> bool {
        !matches!(self, Self::Modified | Self::Exited)
    }
}

impl std::fmt::Display for ProcessHandlingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid => write!(f, "invalid"),
            Self::Unmodified => write!(f, "unmodified"),
            Self::Modified => write!(f, "modified"),
            Self::AccessDenied => write!(f, "access_denied"),
            Self::Finished => write!(f, "finished"),
            Self::Abandoned => write!(f, "abandoned"),
            Self::Exited => write!(f, "exited"),
        }
    }
}
