use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Duplex session tuning.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionSettings {
    /// Capacity of the outbound frame queue. `send` fails with backpressure beyond it.
    pub outbound_queue_depth: usize,
    /// Per-subscriber buffer of pending updates.
    pub subscriber_buffer: usize,
    /// Bound on connection establishment, for the first open and every reconnect.
    pub open_timeout_ms: u64,
    /// Grace period for flushing queued frames on close.
    pub drain_timeout_ms: u64,
    /// Interval between liveness probes.
    pub ping_interval_ms: u64,
    /// Silence after which the connection is considered dead.
    pub pong_timeout_ms: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            outbound_queue_depth: 64,
            subscriber_buffer: 256,
            open_timeout_ms: 10_000,
            drain_timeout_ms: 5_000,
            ping_interval_ms: 30_000,
            pong_timeout_ms: 90_000,
        }
    }
}

impl SessionSettings {
    /// [`Self::open_timeout_ms`] as a `Duration`.
    pub fn open_timeout(&self) -> Duration {
        Duration::from_millis(self.open_timeout_ms)
    }

    /// [`Self::drain_timeout_ms`] as a `Duration`.
    pub fn drain_timeout(&self) -> Duration {
        Duration::from_millis(self.drain_timeout_ms)
    }

    /// [`Self::ping_interval_ms`] as a `Duration`.
    pub fn ping_interval(&self) -> Duration {
        Duration::from_millis(self.ping_interval_ms)
    }

    /// [`Self::pong_timeout_ms`] as a `Duration`.
    pub fn pong_timeout(&self) -> Duration {
        Duration::from_millis(self.pong_timeout_ms)
    }
}
