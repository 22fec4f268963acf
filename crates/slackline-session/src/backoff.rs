//! Delay strategies between reconnect attempts.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use slackline_core::retry::RetryConfig;

/// Delay before a zero-based reconnect attempt.
pub trait BackoffStrategy: Send + Sync + fmt::Debug {
    /// Delay before `attempt` (0 for the first retry).
    fn delay(&self, attempt: u32) -> Duration;
}

/// `base × 2^attempt`, capped, with symmetric jitter.
#[derive(Clone, Debug)]
pub struct ExponentialBackoff {
    config: RetryConfig,
}

impl ExponentialBackoff {
    /// Backoff using the bounds and jitter of `config`.
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Largest delay any draw can produce for `attempt`.
    pub fn max_delay(&self, attempt: u32) -> Duration {
        Duration::from_millis(slackline_core::retry::calculate_backoff_delay(
            attempt,
            self.config.base_delay_ms,
            self.config.max_delay_ms,
            self.config.jitter_factor,
        ))
    }
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self::new(RetryConfig::default())
    }
}

impl BackoffStrategy for ExponentialBackoff {
    fn delay(&self, attempt: u32) -> Duration {
        let random: f64 = rand::rng().random();
        self.config.delay_for(attempt, random)
    }
}

/// Same delay every time.
#[derive(Clone, Copy, Debug)]
pub struct ConstantBackoff(pub Duration);

impl BackoffStrategy for ConstantBackoff {
    fn delay(&self, _attempt: u32) -> Duration {
        self.0
    }
}

/// How many times to retry and how long to wait in between.
#[derive(Clone, Debug)]
pub struct ReconnectPolicy {
    /// Attempt limit; `0` retries forever.
    pub max_attempts: u32,
    /// Delay strategy.
    pub backoff: Arc<dyn BackoffStrategy>,
}

impl ReconnectPolicy {
    /// Policy from a [`RetryConfig`], with exponential backoff.
    pub fn from_retry_config(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            backoff: Arc::new(ExponentialBackoff::new(config.clone())),
        }
    }

    /// Replace the attempt limit.
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Replace the delay strategy.
    #[must_use]
    pub fn with_backoff(mut self, backoff: impl BackoffStrategy + 'static) -> Self {
        self.backoff = Arc::new(backoff);
        self
    }

    /// Whether attempt number `attempts_made + 1` may run.
    pub fn allows(&self, attempts_made: u32) -> bool {
        self.max_attempts == 0 || attempts_made < self.max_attempts
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::from_retry_config(&RetryConfig::default())
    }
}
