//! Error types for Docker Engine API access.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Primary error type for engine connections and remote calls.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The daemon address could not be parsed.
    #[error("invalid daemon address '{host}': {reason}")]
    InvalidHost {
        /// Address as supplied by the caller.
        host: String,
        /// Human-readable parse failure.
        reason: String,
    },
    /// A TLS file could not be read.
    #[error("failed to read TLS material from {}: {source}", path.display())]
    TlsRead {
        /// File that failed to load.
        path: PathBuf,
        /// Underlying I/O failure.
        source: io::Error,
    },
    /// TLS material was read but is empty or malformed.
    #[error("invalid TLS material: {reason}")]
    TlsMaterial {
        /// Description of the rejected material.
        reason: String,
    },
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {reason}")]
    ClientBuild {
        /// Builder failure detail.
        reason: String,
    },
    /// The request never produced a response.
    #[error("{operation} request failed: {source}")]
    Transport {
        /// Engine operation being performed.
        operation: &'static str,
        /// Underlying transport error.
        source: reqwest::Error,
    },
    /// The daemon answered with a non-success status.
    #[error("{operation} failed with status {status}: {message}")]
    Status {
        /// Engine operation being performed.
        operation: &'static str,
        /// HTTP status code returned by the daemon.
        status: u16,
        /// Message extracted from the error body.
        message: String,
    },
    /// The daemon's response body could not be decoded.
    #[error("failed to decode {operation} response: {source}")]
    Decode {
        /// Engine operation being performed.
        operation: &'static str,
        /// Underlying decode error.
        source: reqwest::Error,
    },
}

/// Convenience alias for engine results.
pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    /// Whether the failure happened before any request was sent.
    #[must_use]
    pub const fn is_connection(&self) -> bool {
        matches!(
            self,
            Self::InvalidHost { .. }
                | Self::TlsRead { .. }
                | Self::TlsMaterial { .. }
                | Self::ClientBuild { .. }
        )
    }
}
