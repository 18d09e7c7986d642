//! Error types for the Enrich client.
//!
//! Library crates use [`EnrichError`] via `thiserror`.
//! App crates (cli/tui) wrap this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all Enrich client operations.
#[derive(Debug, thiserror::Error)]
pub enum EnrichError {
    /// Caller-side, pre-flight error (empty/malformed URL, missing id,
    /// invalid page numbers). Never reaches the network.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Network or HTTP failure, including timeouts and non-2xx responses
    /// not otherwise classified. `status` is absent for connection-level
    /// failures that never produced a response.
    #[error("transport error: {message}")]
    Transport {
        status: Option<u16>,
        message: String,
    },

    /// A 404 on an entity lookup (article or processing task).
    #[error("not found: {0}")]
    NotFound(String),

    /// A processing task that reached the `failed` state; carries the
    /// backend-provided error text.
    #[error("processing task failed: {0}")]
    TaskFailed(String),

    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error (config file handling).
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, EnrichError>;

impl EnrichError {
    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Create a transport error without an HTTP status (connection-level).
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport {
            status: None,
            message: msg.into(),
        }
    }

    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error should render as a "not found" view rather than
    /// a generic failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
