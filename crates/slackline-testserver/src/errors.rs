//! Fake server errors.

use thiserror::Error;

/// Failure starting or running the fake server.
#[derive(Debug, Error)]
pub enum TestServerError {
    /// The listener could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Requested address.
        addr: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// `start()` was called on a running server.
    #[error("server already started")]
    AlreadyStarted,
}
