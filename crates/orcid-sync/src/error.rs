//! Error types for the ORCID sync engine.
//!
//! Uses `thiserror` for structured error handling with automatic `From` implementations.

/// Errors from the registry HTTP layer.
#[derive(thiserror::Error, Debug)]
pub enum RegistryError {
    /// HTTP transport error (connection, DNS, TLS, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Middleware error, including retry exhaustion on the read side.
    #[error("Middleware error: {0}")]
    Middleware(#[from] reqwest_middleware::Error),

    /// Malformed response body.
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Response status the engine has no handling for. Carries the full body
    /// so operators see what the registry actually said.
    #[error("Unexpected status {status}: {body}")]
    UnexpectedStatus {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },
}

impl RegistryError {
    /// Create an unexpected-status error.
    #[must_use]
    pub fn unexpected(status: u16, body: impl Into<String>) -> Self {
        Self::UnexpectedStatus { status, body: body.into() }
    }

    /// Returns true if this error is a connect or read timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Http(err) => err.is_timeout() || err.is_connect(),
            Self::Middleware(reqwest_middleware::Error::Reqwest(err)) => {
                err.is_timeout() || err.is_connect()
            }
            _ => false,
        }
    }
}

/// Errors from the sync job and its collaborators.
#[derive(thiserror::Error, Debug)]
pub enum SyncError {
    /// Filesystem failure in a durable store.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed durable document.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Collaborator-specific failure.
    #[error("Store error: {0}")]
    Store(String),
}

impl SyncError {
    /// Create a collaborator failure.
    #[must_use]
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store(message.into())
    }
}

/// Result type alias for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Result type alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;
