//! Session error types.

use std::time::Duration;

use thiserror::Error;

/// Failure of the physical transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Could not establish the connection.
    #[error("connect failed: {0}")]
    Connect(String),
    /// Reading a frame failed.
    #[error("read failed: {0}")]
    Read(String),
    /// Writing a frame failed.
    #[error("write failed: {0}")]
    Write(String),
    /// WebSocket protocol error.
    #[error("websocket: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
}

/// Why a connection ended or could not be made.
///
/// Only [`Self::RetriesExhausted`] and [`Self::Closed`] end a session. The
/// rest drive reconnection and surface through logs, or through
/// [`Self::Dropped`] on a send ticket.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConnectionError {
    /// The connector reported an error.
    #[error("handshake failed: {0}")]
    Handshake(String),
    /// The connector did not finish within the open timeout.
    #[error("handshake timed out after {0:?}")]
    Timeout(Duration),
    /// A read or write on a live connection failed.
    #[error("transport failed: {0}")]
    Transport(String),
    /// Nothing arrived from the peer for too long.
    #[error("no activity for {0:?}")]
    HeartbeatTimeout(Duration),
    /// The peer closed the connection.
    #[error("remote closed the connection")]
    RemoteClosed,
    /// Reconnection gave up.
    #[error("gave up after {attempts} reconnect attempts: {last}")]
    RetriesExhausted {
        /// Attempts made.
        attempts: u32,
        /// Error of the final attempt.
        last: Box<ConnectionError>,
    },
    /// The frame was still queued when its connection was lost.
    #[error("frame dropped with its connection")]
    Dropped,
    /// The session was closed by the caller.
    #[error("session closed")]
    Closed,
}

impl From<TransportError> for ConnectionError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Connect(msg) => Self::Handshake(msg),
            other => Self::Transport(other.to_string()),
        }
    }
}

/// Why a frame was not queued.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum SendError {
    /// The outbound queue is full.
    #[error("outbound queue full ({capacity} frames)")]
    Backpressure {
        /// Queue capacity.
        capacity: usize,
    },
    /// The session is not open.
    #[error("session is not open")]
    NotOpen,
}
