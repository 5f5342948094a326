//! Error types for model-metrics
//!
//! Errors are raised before any side effect whenever a request can be
//! rejected up front. Races inside the registry query are never errors.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// model-metrics error types
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or contradictory request
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Strict lookup found no object at the key
    #[error("Did not find key: {0}")]
    NotFound(String),

    /// Strict lookup found an object of the wrong kind
    #[error("Expected {expected} for key: {key}; got a {found}")]
    TypeMismatch {
        /// Key that was looked up
        key: String,
        /// Kind the caller asked for
        expected: String,
        /// Kind actually stored at the key
        found: String,
    },

    /// Schema version missing from the dispatch table.
    ///
    /// This is a deployment error: the call path must be aborted, not retried.
    #[error("Bad version for {schema} schema: {version}")]
    UnsupportedVersion {
        /// Logical schema shape
        schema: &'static str,
        /// Requested version
        version: u32,
    },

    /// Failure reported by a model's scoring capability
    #[error("Scoring failed: {0}")]
    Scoring(String),

    /// Configuration rejected at build time
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Wire payload could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Arrow error while building a derived artifact
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

impl Error {
    /// Shorthand for [`Error::InvalidArgument`].
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Whether the error must abort the whole call path.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::UnsupportedVersion { .. } | Self::Config(_))
    }
}
