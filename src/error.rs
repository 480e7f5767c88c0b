//! Error taxonomy shared by the cache, resolver and affinity components
//!
//! Recoverable conditions (not found, permission denied, timeout) are absorbed
//! at component boundaries and turned into `None`/`false` results. Only
//! resource exhaustion is treated as fatal and propagated.

use std::time::Duration;

/// Broad classification used to decide whether an error may be absorbed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Lookup produced nothing
    NotFound,
    /// Operating system refused access
    Permission,
    /// Operation exceeded its deadline
    Timing,
    /// Memory or handle exhaustion
    Resource,
    /// Caller supplied invalid input
    Argument,
    /// Invalid configuration values
    Configuration,
    /// Other I/O failure
    Io,
}

/// Error type for all governor operations
#[derive(Debug, Clone, PartialEq)]
pub enum GovernorError {
    NotFound,
    PermissionDenied(String),
    Timeout(Duration),
    ResourceExhausted(String),
    InvalidArgument(String),
    InvalidConfiguration(String),
    Io(String),
}

impl std::fmt::Display for GovernorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GovernorError::NotFound => write!(f, "Not found"),
            GovernorError::PermissionDenied(msg) => write!(f, "Permission denied: {}", msg),
            GovernorError::Timeout(after) => {
                write!(f, "Operation timed out after {} ms", after.as_millis())
            }
            GovernorError::ResourceExhausted(msg) => write!(f, "Resource exhausted: {}", msg),
            GovernorError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            GovernorError::InvalidConfiguration(msg) => {
                write!(f, "Invalid configuration: {}", msg)
            }
            GovernorError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for GovernorError {}

impl GovernorError {
    #[inline(always)]
    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::PermissionDenied(msg.into())
    }

    #[inline(always)]
    pub fn resource_exhausted(msg: impl Into<String>) -> Self {
        Self::ResourceExhausted(msg.into())
    }

    #[inline(always)]
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    #[inline(always)]
    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound => ErrorCategory::NotFound,
            Self::PermissionDenied(_) => ErrorCategory::Permission,
            Self::Timeout(_) => ErrorCategory::Timing,
            Self::ResourceExhausted(_) => ErrorCategory::Resource,
            Self::InvalidArgument(_) => ErrorCategory::Argument,
            Self::InvalidConfiguration(_) => ErrorCategory::Configuration,
            Self::Io(_) => ErrorCategory::Io,
        }
    }

    /// Fatal errors must never be swallowed by a fallback chain
    pub fn is_fatal(&self) -> bool {
        self.category() == ErrorCategory::Resource
    }
}

impl From<std::io::Error> for GovernorError {
    fn from(error: std::io::Error) -> Self {
        use std::io::ErrorKind;

        match error.kind() {
            ErrorKind::NotFound => GovernorError::NotFound,
            ErrorKind::PermissionDenied => GovernorError::PermissionDenied(error.to_string()),
            ErrorKind::TimedOut => GovernorError::Timeout(Duration::ZERO),
            ErrorKind::OutOfMemory => GovernorError::ResourceExhausted(error.to_string()),
            _ => GovernorError::Io(error.to_string()),
        }
    }
}

impl From<toml::de::Error> for GovernorError {
    fn from(error: toml::de::Error) -> Self {
        GovernorError::InvalidConfiguration(error.to_string())
    }
}

pub type GovernorResult<T> = Result<T, GovernorError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_io_error_mapping() {
        let denied: GovernorError = io::Error::new(io::ErrorKind::PermissionDenied, "elevated").into();
        assert_eq!(denied.category(), ErrorCategory::Permission);
        assert!(!denied.is_fatal());

        let missing: GovernorError = io::Error::new(io::ErrorKind::NotFound, "gone").into();
        assert_eq!(missing, GovernorError::NotFound);

        let oom: GovernorError = io::Error::new(io::ErrorKind::OutOfMemory, "oom").into();
        assert!(oom.is_fatal());
    }

    #[test]
    fn test_display() {
        let err = GovernorError::Timeout(Duration::from_secs(60));
        assert_eq!(err.to_string(), "Operation timed out after 60000 ms");
        assert_eq!(
            GovernorError::invalid_argument("width").to_string(),
            "Invalid argument: width"
        );
    }
}
