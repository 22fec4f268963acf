//! Connection-level control frames.

use serde::{Deserialize, Serialize};

/// Greeting sent by the server once the connection is ready.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HelloEvent {
    /// Number of open connections for this app.
    pub num_connections: u32,
    /// Present on socket-mode connections.
    pub connection_info: Option<ConnectionInfo>,
    /// Present on socket-mode connections.
    pub debug_info: Option<DebugInfo>,
}

/// Which app a socket-mode connection belongs to.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionInfo {
    /// App id.
    pub app_id: String,
}

/// Server-side diagnostics in a hello frame.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugInfo {
    /// Serving host.
    pub host: String,
    /// Server build.
    pub build_number: u64,
    /// Expected connection lifetime in seconds.
    pub approximate_connection_time: u64,
}

/// Server is about to close the connection; clients should reconnect.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoodbyeEvent {
    /// Optional reason, e.g. `warning` or `refresh_requested`.
    pub reason: String,
}

/// Reply to a liveness probe.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PongEvent {
    /// Probe id being answered.
    pub id: u64,
    /// Outbound message id being acknowledged, when the server echoes one.
    pub reply_to: u64,
}
