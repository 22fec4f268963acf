//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase", default)]` so partial
//! JSON files deserialize with compiled defaults for missing fields.

mod logging;
mod session;
mod test_server;

pub use logging::*;
pub use session::*;
pub use test_server::*;

use serde::{Deserialize, Serialize};
use slackline_core::retry::RetryConfig;

/// Root settings type.
///
/// Loaded from `~/.slackline/settings.json` with defaults applied for
/// missing fields. Example:
///
/// ```json
/// {
///   "session": { "outboundQueueDepth": 128 },
///   "reconnect": { "maxAttempts": 0 }
/// }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SlacklineSettings {
    /// Duplex session queue sizes, timeouts and heartbeat.
    pub session: SessionSettings,
    /// Reconnect attempt limit and backoff.
    pub reconnect: RetryConfig,
    /// Log level and output format.
    pub logging: LoggingSettings,
    /// Fake chat server defaults.
    pub test_server: TestServerSettings,
}
