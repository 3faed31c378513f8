//! Error types for sd-core
//!
//! Provides a unified error type that can be converted to appropriate exit codes.
//! The resolver never recovers from any of these locally; every condition reaches
//! the caller as it was raised.

use thiserror::Error;

/// Result type alias for sd-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for sd-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// A path segment could not be matched at some resolution phase
    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    /// A parent/child combination violates the containment rules
    #[error("Invalid hierarchy: {0}")]
    InvalidHierarchy(String),

    /// The target entity lacks the requested capability
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// A required name or target is missing or empty
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The raw backend operation failed below the resolver
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    /// A sibling with the same name already exists
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Invalid drive path format
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Drive not found
    #[error("Drive not found: {0}")]
    DriveNotFound(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl Error {
    /// Get the appropriate exit code for this error
    pub const fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidPath(_) | Error::Config(_) | Error::InvalidArgument(_) => 2, // UsageError
            Error::BackendUnavailable(_) => 3, // BackendError
            Error::ObjectNotFound(_) | Error::DriveNotFound(_) => 5, // NotFound
            Error::Conflict(_) | Error::InvalidHierarchy(_) => 6, // Conflict
            Error::UnsupportedOperation(_) => 7, // UnsupportedOperation
            _ => 1,                              // GeneralError
        }
    }

    /// Whether this error only reports that something is absent
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Error::ObjectNotFound(_))
    }

    /// Same error with `context` appended to its message
    ///
    /// Errors wrapping a foreign error are returned unchanged.
    pub fn with_context(self, context: &str) -> Self {
        let extend = |message: String| format!("{message} ({context})");
        match self {
            Error::ObjectNotFound(m) => Error::ObjectNotFound(extend(m)),
            Error::InvalidHierarchy(m) => Error::InvalidHierarchy(extend(m)),
            Error::UnsupportedOperation(m) => Error::UnsupportedOperation(extend(m)),
            Error::InvalidArgument(m) => Error::InvalidArgument(extend(m)),
            Error::BackendUnavailable(m) => Error::BackendUnavailable(extend(m)),
            Error::Conflict(m) => Error::Conflict(extend(m)),
            Error::InvalidPath(m) => Error::InvalidPath(extend(m)),
            Error::Config(m) => Error::Config(extend(m)),
            Error::DriveNotFound(m) => Error::DriveNotFound(extend(m)),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_exit_codes() {
        assert_eq!(Error::InvalidPath("test".into()).exit_code(), 2);
        assert_eq!(Error::Config("test".into()).exit_code(), 2);
        assert_eq!(Error::InvalidArgument("test".into()).exit_code(), 2);
        assert_eq!(Error::BackendUnavailable("test".into()).exit_code(), 3);
        assert_eq!(Error::ObjectNotFound("test".into()).exit_code(), 5);
        assert_eq!(Error::DriveNotFound("test".into()).exit_code(), 5);
        assert_eq!(Error::Conflict("test".into()).exit_code(), 6);
        assert_eq!(Error::InvalidHierarchy("test".into()).exit_code(), 6);
        assert_eq!(Error::UnsupportedOperation("test".into()).exit_code(), 7);
        let io = std::io::Error::other("disk");
        assert_eq!(Error::Io(io).exit_code(), 1);
    }

    #[test]
    fn test_error_display() {
        let err = Error::DriveNotFound("demo".into());
        assert_eq!(err.to_string(), "Drive not found: demo");

        let err = Error::ObjectNotFound("Site/Missing".into());
        assert_eq!(err.to_string(), "Object not found: Site/Missing");
    }

    #[test]
    fn test_with_context_keeps_the_kind() {
        let err = Error::Conflict("Item with the same name found: a".into())
            .with_context("moved to Docs/a");
        assert_eq!(err.exit_code(), 6);
        assert_eq!(
            err.to_string(),
            "Conflict: Item with the same name found: a (moved to Docs/a)"
        );

        let err = Error::Io(std::io::Error::other("disk")).with_context("ignored");
        assert_eq!(err.to_string(), "IO error: disk");
    }

    #[test]
    fn test_is_not_found() {
        assert!(Error::ObjectNotFound("x".into()).is_not_found());
        assert!(!Error::BackendUnavailable("x".into()).is_not_found());
    }
}
