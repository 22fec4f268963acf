//! Runtime configuration of a [`DuplexSession`](crate::DuplexSession).

use std::time::Duration;

use slackline_core::retry::RetryConfig;
use slackline_settings::SessionSettings;

use crate::backoff::ReconnectPolicy;

/// Session tuning resolved from settings.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Outbound queue capacity.
    pub outbound_queue_depth: usize,
    /// Per-subscriber buffer.
    pub subscriber_buffer: usize,
    /// Bound on each connection attempt.
    pub open_timeout: Duration,
    /// Grace period for flushing on close.
    pub drain_timeout: Duration,
    /// Interval between liveness probes.
    pub ping_interval: Duration,
    /// Silence after which the link is declared dead.
    pub pong_timeout: Duration,
    /// Reconnection behaviour.
    pub reconnect: ReconnectPolicy,
}

impl SessionConfig {
    /// Build from loaded settings.
    pub fn from_settings(session: &SessionSettings, reconnect: &RetryConfig) -> Self {
        Self {
            outbound_queue_depth: session.outbound_queue_depth.max(1),
            subscriber_buffer: session.subscriber_buffer.max(1),
            open_timeout: session.open_timeout(),
            drain_timeout: session.drain_timeout(),
            ping_interval: session.ping_interval(),
            pong_timeout: session.pong_timeout(),
            reconnect: ReconnectPolicy::from_retry_config(reconnect),
        }
    }

    /// Replace the reconnect policy.
    #[must_use]
    pub fn with_reconnect(mut self, reconnect: ReconnectPolicy) -> Self {
        self.reconnect = reconnect;
        self
    }

    /// Replace the outbound queue capacity.
    #[must_use]
    pub fn with_queue_depth(mut self, depth: usize) -> Self {
        self.outbound_queue_depth = depth.max(1);
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from_settings(&SessionSettings::default(), &RetryConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_default_settings() {
        let config = SessionConfig::default();
        assert_eq!(config.outbound_queue_depth, 64);
        assert_eq!(config.subscriber_buffer, 256);
        assert_eq!(config.ping_interval, Duration::from_secs(30));
        assert_eq!(config.reconnect.max_attempts, 5);
    }

    #[test]
    fn zero_depth_clamped() {
        let settings = SessionSettings {
            outbound_queue_depth: 0,
            ..SessionSettings::default()
        };
        let config = SessionConfig::from_settings(&settings, &RetryConfig::default());
        assert_eq!(config.outbound_queue_depth, 1);
        assert_eq!(config.with_queue_depth(0).outbound_queue_depth, 1);
    }
}
