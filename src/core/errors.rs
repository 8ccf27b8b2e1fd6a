//! Shared error types for the engine

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Main error type for buildmend operations
#[derive(Debug, Error)]
pub enum Error {
    /// The project model provider could not produce a model. The raw
    /// diagnostic from the external tool is always attached; a partial
    /// model is never returned in its place.
    #[error("project unreadable at {path}: {diagnostic}")]
    ProjectUnreadable { path: PathBuf, diagnostic: String },

    /// Checkpoint creation or restore failed
    #[error("checkpoint failure: {0}")]
    Checkpoint(String),

    /// An external invocation exceeded its caller-supplied timeout
    #[error("{operation} timed out after {timeout:?}")]
    Timeout {
        operation: String,
        timeout: Duration,
    },

    /// Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Fixed categories refired at fixed locations after apply
    #[error("verification failed: {refired} finding(s) refired after apply")]
    Verification { refired: usize },

    /// IO errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a project-unreadable error carrying the provider's diagnostic
    pub fn project_unreadable(path: impl Into<PathBuf>, diagnostic: impl Into<String>) -> Self {
        Self::ProjectUnreadable {
            path: path.into(),
            diagnostic: diagnostic.into(),
        }
    }

    /// Create a checkpoint failure
    pub fn checkpoint(message: impl Into<String>) -> Self {
        Self::Checkpoint(message.into())
    }

    /// Create a timeout error for a named operation
    pub fn timeout(operation: impl Into<String>, timeout: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            timeout,
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, Error>;
