//! Error types for the remote configuration boundary.

use thiserror::Error;

/// Failures reported by a [`ConfigService`](crate::ConfigService).
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The endpoint answered with a non-success HTTP status.
    #[error("{operation} failed: {url} returned HTTP {status}")]
    Status {
        operation: &'static str,
        url: String,
        status: u16,
    },

    /// The endpoint could not be reached or the exchange broke off.
    #[error("{operation} failed: {message}")]
    Transport {
        operation: &'static str,
        message: String,
    },

    /// The endpoint answered successfully but with nothing usable.
    #[error("{operation} returned an empty response")]
    Empty { operation: &'static str },

    /// The endpoint URI could not be turned into a request URL.
    #[error("invalid service URI '{uri}': {message}")]
    InvalidUri { uri: String, message: String },
}
