//! Reconnect configuration and backoff calculation.
//!
//! Only the portable math lives here. The async reconnect loop that sleeps
//! between attempts lives in `slackline-session`.
//!
//! - [`RetryConfig`]: attempt limit, backoff bounds, jitter
//! - [`calculate_backoff_delay`]: upper bound of the jittered exponential delay
//! - [`calculate_backoff_delay_with_random`]: jittered delay for a given random draw

use std::time::Duration;

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Default maximum reconnect attempts.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
/// Default base delay in milliseconds.
pub const DEFAULT_BASE_DELAY_MS: u64 = 500;
/// Default maximum delay in milliseconds.
pub const DEFAULT_MAX_DELAY_MS: u64 = 30_000;
/// Default jitter factor (0.0–1.0).
pub const DEFAULT_JITTER_FACTOR: f64 = 0.2;

/// Configuration for reconnect attempts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryConfig {
    /// Maximum number of reconnect attempts. `0` means retry forever.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Base delay for exponential backoff in ms.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Maximum delay between attempts in ms.
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    /// Jitter factor 0.0–1.0, applied symmetrically.
    #[serde(default = "default_jitter_factor")]
    pub jitter_factor: f64,
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}
fn default_base_delay_ms() -> u64 {
    DEFAULT_BASE_DELAY_MS
}
fn default_max_delay_ms() -> u64 {
    DEFAULT_MAX_DELAY_MS
}
fn default_jitter_factor() -> f64 {
    DEFAULT_JITTER_FACTOR
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
            max_delay_ms: DEFAULT_MAX_DELAY_MS,
            jitter_factor: DEFAULT_JITTER_FACTOR,
        }
    }
}

impl RetryConfig {
    /// Whether attempts are unlimited.
    pub fn is_unbounded(&self) -> bool {
        self.max_attempts == 0
    }

    /// Whether another attempt is allowed after `attempts_made` failures.
    pub fn allows_attempt(&self, attempts_made: u32) -> bool {
        self.is_unbounded() || attempts_made < self.max_attempts
    }

    /// Jittered delay before zero-based `attempt`, for a random draw in `[0, 1)`.
    pub fn delay_for(&self, attempt: u32, random: f64) -> Duration {
        Duration::from_millis(calculate_backoff_delay_with_random(
            attempt,
            self.base_delay_ms,
            self.max_delay_ms,
            self.jitter_factor,
            random,
        ))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Backoff calculation
// ─────────────────────────────────────────────────────────────────────────────

/// Upper bound of the exponential backoff delay.
///
/// Formula: `min(max_delay, base_delay * 2^attempt) * (1 + jitter)`
///
/// Useful for sizing timeouts in tests: no jittered draw exceeds it.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn calculate_backoff_delay(
    attempt: u32,
    base_delay_ms: u64,
    max_delay_ms: u64,
    jitter_factor: f64,
) -> u64 {
    let exponential = base_delay_ms.saturating_mul(1u64 << attempt.min(31));
    let capped = exponential.min(max_delay_ms);

    let jitter_range = (capped as f64) * jitter_factor;
    ((capped as f64) + jitter_range).round() as u64
}

/// Backoff delay with explicit randomness.
///
/// `random` should be a value in `[0.0, 1.0)` from a PRNG.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn calculate_backoff_delay_with_random(
    attempt: u32,
    base_delay_ms: u64,
    max_delay_ms: u64,
    jitter_factor: f64,
    random: f64,
) -> u64 {
    let exponential = base_delay_ms.saturating_mul(1u64 << attempt.min(31));
    let capped = exponential.min(max_delay_ms);

    // Maps random [0,1) to [-jitter, +jitter]
    let jitter = 1.0 + (random * 2.0 - 1.0) * jitter_factor;
    ((capped as f64) * jitter).round().max(0.0) as u64
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // -- RetryConfig --

    #[test]
    fn retry_config_defaults() {
        let config = RetryConfig::default();
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.base_delay_ms, 500);
        assert_eq!(config.max_delay_ms, 30_000);
        assert!((config.jitter_factor - 0.2).abs() < f64::EPSILON);
    }

    #[test]
    fn retry_config_serde_defaults() {
        let config: RetryConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, RetryConfig::default());
    }

    #[test]
    fn retry_config_camel_case() {
        let config: RetryConfig =
            serde_json::from_str(r#"{"maxAttempts": 0, "baseDelayMs": 10}"#).unwrap();
        assert!(config.is_unbounded());
        assert_eq!(config.base_delay_ms, 10);
    }

    #[test]
    fn bounded_allows_up_to_max() {
        let config = RetryConfig {
            max_attempts: 3,
            ..RetryConfig::default()
        };
        assert!(config.allows_attempt(0));
        assert!(config.allows_attempt(2));
        assert!(!config.allows_attempt(3));
    }

    #[test]
    fn unbounded_always_allows() {
        let config = RetryConfig {
            max_attempts: 0,
            ..RetryConfig::default()
        };
        assert!(config.allows_attempt(u32::MAX));
    }

    #[test]
    fn delay_for_uses_random_draw() {
        let config = RetryConfig {
            max_attempts: 3,
            base_delay_ms: 100,
            max_delay_ms: 10_000,
            jitter_factor: 0.5,
        };
        assert_eq!(config.delay_for(0, 0.5), Duration::from_millis(100));
        assert_eq!(config.delay_for(2, 0.0), Duration::from_millis(200));
    }

    // -- calculate_backoff_delay --

    #[test]
    fn backoff_exponential_growth() {
        assert_eq!(calculate_backoff_delay(0, 1000, 60_000, 0.0), 1000);
        assert_eq!(calculate_backoff_delay(1, 1000, 60_000, 0.0), 2000);
        assert_eq!(calculate_backoff_delay(2, 1000, 60_000, 0.0), 4000);
        assert_eq!(calculate_backoff_delay(3, 1000, 60_000, 0.0), 8000);
    }

    #[test]
    fn backoff_caps_at_max() {
        assert_eq!(calculate_backoff_delay(10, 1000, 60_000, 0.0), 60_000);
    }

    #[test]
    fn backoff_high_attempt_no_overflow() {
        let delay = calculate_backoff_delay(100, 1000, 60_000, 0.2);
        assert_eq!(delay, 72_000);
    }

    // -- calculate_backoff_delay_with_random --

    #[test]
    fn backoff_with_random_zero() {
        // random = 0.0 → jitter = 1 - 0.2
        assert_eq!(calculate_backoff_delay_with_random(0, 1000, 60_000, 0.2, 0.0), 800);
    }

    #[test]
    fn backoff_with_random_half() {
        assert_eq!(calculate_backoff_delay_with_random(0, 1000, 60_000, 0.2, 0.5), 1000);
    }

    #[test]
    fn backoff_with_random_capped() {
        assert_eq!(calculate_backoff_delay_with_random(20, 1000, 60_000, 0.2, 0.5), 60_000);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn jittered_never_exceeds_upper_bound(
                attempt in 0u32..64,
                base in 1u64..10_000,
                jitter in 0.0f64..1.0,
                random in 0.0f64..1.0,
            ) {
                let max = 120_000;
                let drawn = calculate_backoff_delay_with_random(attempt, base, max, jitter, random);
                prop_assert!(drawn <= calculate_backoff_delay(attempt, base, max, jitter));
            }
        }
    }
}
