//! Error types and handling for `bale_rust`.
//!
//! # Design
//!
//! - Uses `thiserror` for derive-based error types
//! - Supports `anyhow` integration at the binary edge
//! - Provides recovery hints for user-facing errors
//!
//! Lookup never produces an error: an unset key resolves to a typed
//! absent value. Only mutations (local writes without a project root,
//! non-absolute configuration URIs) and file I/O propagate errors.

use thiserror::Error;

/// Primary error type for `bale_rust` operations.
#[derive(Error, Debug)]
pub enum BaleError {
    // === Configuration Errors ===
    /// A local-layer write was attempted without a known project root.
    #[error("No project root found: local configuration requires a .bale directory")]
    ProjectRootMissing,

    /// A configuration URI was not an absolute http(s) URI.
    #[error("Configuration URIs must be absolute ({uri})")]
    InvalidUri { uri: String },

    /// Configuration file error.
    #[error("Configuration error: {0}")]
    Config(String),

    // === I/O Errors ===
    /// File system I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Wrapped errors ===
    /// Error with additional context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Wrapped anyhow error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BaleError {
    /// Can the user fix this without code changes?
    #[must_use]
    pub const fn is_user_recoverable(&self) -> bool {
        matches!(self, Self::ProjectRootMissing | Self::InvalidUri { .. })
    }

    /// Human-friendly suggestion for fixing this error.
    #[must_use]
    pub const fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::ProjectRootMissing => {
                Some("Run inside a project with a .bale directory, or use --global")
            }
            Self::InvalidUri { .. } => {
                Some("Use a fully qualified http(s) URI, e.g. https://example.org")
            }
            _ => None,
        }
    }

    /// Get the exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        1
    }

    /// Create an `InvalidUri` error from anything URI-like.
    #[must_use]
    pub fn invalid_uri(uri: impl Into<String>) -> Self {
        Self::InvalidUri { uri: uri.into() }
    }
}

/// Result type using `BaleError`.
pub type Result<T> = std::result::Result<T, BaleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BaleError::invalid_uri("ftp://x");
        assert_eq!(
            err.to_string(),
            "Configuration URIs must be absolute (ftp://x)"
        );
    }

    #[test]
    fn test_user_recoverable() {
        assert!(BaleError::ProjectRootMissing.is_user_recoverable());
        let io = BaleError::Io(std::io::Error::other("boom"));
        assert!(!io.is_user_recoverable());
    }

    #[test]
    fn test_suggestion() {
        let err = BaleError::ProjectRootMissing;
        assert_eq!(
            err.suggestion(),
            Some("Run inside a project with a .bale directory, or use --global")
        );
    }
}
