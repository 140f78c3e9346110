use std::fmt;
use std::io;

/// Result alias used throughout the library.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Categorized traversal and cache failures.
///
/// Every variant names the path (or capability) that failed so callers can
/// report it without pattern matching on the underlying I/O error.
#[derive(Debug)]
pub enum Error {
    /// Container or source path does not exist
    NotFound {
        /// Path that could not be opened or read
        path: String,
    },
    /// Open, read, or write failure other than not-found (permissions, I/O)
    Access {
        /// Path the operation was attempted on
        path: String,
        /// Underlying I/O failure
        source: io::Error,
    },
    /// Structured data (source descriptor or compiled artifact) is malformed
    Decode {
        /// Path of the malformed file
        path: String,
        /// Parser diagnostic
        reason: String,
    },
    /// No recognized handler for the request (e.g. unknown descriptor format)
    Unsupported(String),
}

impl Error {
    /// Classify an I/O error raised while operating on `path`.
    #[must_use]
    pub fn from_io(path: impl Into<String>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            Self::NotFound { path }
        } else {
            Self::Access { path, source }
        }
    }

    /// Shorthand for [`Error::NotFound`].
    #[must_use]
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Shorthand for [`Error::Decode`].
    #[must_use]
    pub fn decode(path: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::Decode {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Returns the path associated with the error, if any.
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::NotFound { path } | Self::Access { path, .. } | Self::Decode { path, .. } => {
                Some(path)
            }
            Self::Unsupported(_) => None,
        }
    }

    /// Whether the failure means the path does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Get a short error category label
    #[must_use]
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not found",
            Self::Access { .. } => "access",
            Self::Decode { .. } => "decode",
            Self::Unsupported(_) => "unsupported",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { path } => write!(f, "'{path}' does not exist"),
            Self::Access { path, source } => write!(f, "cannot access '{path}': {source}"),
            Self::Decode { path, reason } => write!(f, "failed to decode '{path}': {reason}"),
            Self::Unsupported(what) => write!(f, "unsupported: {what}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Access { source, .. } => Some(source),
            _ => None,
        }
    }
}
