//! Session lifecycle states.

use std::fmt;

/// Where a session is in its lifecycle.
///
/// Explicit close: `Open → Draining → Disconnected`, terminal.
/// Unexpected drop: `Open → Disconnected → Reconnecting → Connecting → Open`,
/// looping back to `Reconnecting` while attempts fail.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// No live connection.
    #[default]
    Disconnected,
    /// Handshake in progress.
    Connecting,
    /// Pumps running; `send` accepted.
    Open,
    /// Closing; queued frames are being flushed.
    Draining,
    /// Waiting out the backoff before the next attempt.
    Reconnecting,
}

impl SessionState {
    /// Lowercase name for logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Open => "open",
            Self::Draining => "draining",
            Self::Reconnecting => "reconnecting",
        }
    }

    /// Numeric value for the `session_state` gauge.
    pub fn as_gauge(self) -> f64 {
        match self {
            Self::Disconnected => 0.0,
            Self::Connecting => 1.0,
            Self::Open => 2.0,
            Self::Draining => 3.0,
            Self::Reconnecting => 4.0,
        }
    }

    /// Whether `send` is accepted.
    pub fn is_open(self) -> bool {
        self == Self::Open
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One state transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StateChange {
    /// Previous state.
    pub from: SessionState,
    /// New state.
    pub to: SessionState,
}
