//! Error types for the transport layer.

use thiserror::Error;

/// Errors raised while setting up or running a transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Binding the listening socket failed.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// A generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The HTTP client could not be built.
    #[cfg(feature = "http-client")]
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Result type alias for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Reasons a webhook request fails signature verification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    /// A required header is absent or not valid UTF-8.
    #[error("missing header {0}")]
    MissingHeader(&'static str),

    /// The timestamp header is not an integer.
    #[error("invalid request timestamp")]
    InvalidTimestamp,

    /// The timestamp is outside the accepted window.
    #[error("request timestamp is too old")]
    Stale,

    /// The signature does not match the body.
    #[error("signature mismatch")]
    Mismatch,
}
