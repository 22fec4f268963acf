//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`SlacklineSettings::default()`]
//! 2. If the settings file exists, deep-merge its values over defaults
//! 3. Apply `SLACKLINE_*` environment overrides (highest priority)
//! 4. Validate
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use slackline_core::logging::LogFormat;
use tracing::debug;

use crate::errors::{Result, SettingsError};
use crate::types::SlacklineSettings;

/// Resolve the path to the settings file.
///
/// `SLACKLINE_SETTINGS` wins; otherwise `~/.slackline/settings.json`.
pub fn settings_path() -> PathBuf {
    if let Some(explicit) = read_env_string("SLACKLINE_SETTINGS") {
        return PathBuf::from(explicit);
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".slackline").join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<SlacklineSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// A missing file yields defaults. Invalid JSON or out-of-range values are
/// errors.
pub fn load_settings_from_path(path: &Path) -> Result<SlacklineSettings> {
    let defaults = serde_json::to_value(SlacklineSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    let mut settings: SlacklineSettings = serde_json::from_value(merged)?;
    apply_env_overrides(&mut settings);
    validate(&settings)?;
    Ok(settings)
}

/// Recursive deep merge of two JSON values.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Reject settings that would make a session unusable.
pub fn validate(settings: &SlacklineSettings) -> Result<()> {
    let session = &settings.session;
    if session.outbound_queue_depth == 0 {
        return Err(SettingsError::InvalidValue(
            "session.outboundQueueDepth must be at least 1".into(),
        ));
    }
    if session.subscriber_buffer == 0 {
        return Err(SettingsError::InvalidValue(
            "session.subscriberBuffer must be at least 1".into(),
        ));
    }
    if session.ping_interval_ms == 0 {
        return Err(SettingsError::InvalidValue(
            "session.pingIntervalMs must be at least 1".into(),
        ));
    }
    if session.pong_timeout_ms < session.ping_interval_ms {
        return Err(SettingsError::InvalidValue(format!(
            "session.pongTimeoutMs ({}) must not be shorter than pingIntervalMs ({})",
            session.pong_timeout_ms, session.ping_interval_ms
        )));
    }
    let reconnect = &settings.reconnect;
    if !(0.0..=1.0).contains(&reconnect.jitter_factor) {
        return Err(SettingsError::InvalidValue(format!(
            "reconnect.jitterFactor must be within 0.0..=1.0, got {}",
            reconnect.jitter_factor
        )));
    }
    if reconnect.base_delay_ms > reconnect.max_delay_ms {
        return Err(SettingsError::InvalidValue(
            "reconnect.baseDelayMs must not exceed maxDelayMs".into(),
        ));
    }
    Ok(())
}

/// Apply environment variable overrides to loaded settings.
///
/// Invalid values are warned about and ignored (falling back to file/default).
pub fn apply_env_overrides(settings: &mut SlacklineSettings) {
    // ── Session ─────────────────────────────────────────────────────
    if let Some(v) = read_env_usize("SLACKLINE_QUEUE_DEPTH", 1, 1_000_000) {
        settings.session.outbound_queue_depth = v;
    }
    if let Some(v) = read_env_usize("SLACKLINE_SUBSCRIBER_BUFFER", 1, 1_000_000) {
        settings.session.subscriber_buffer = v;
    }
    if let Some(v) = read_env_u64("SLACKLINE_OPEN_TIMEOUT_MS", 1, 600_000) {
        settings.session.open_timeout_ms = v;
    }
    if let Some(v) = read_env_u64("SLACKLINE_DRAIN_TIMEOUT_MS", 0, 600_000) {
        settings.session.drain_timeout_ms = v;
    }
    if let Some(v) = read_env_u64("SLACKLINE_PING_INTERVAL_MS", 100, 3_600_000) {
        settings.session.ping_interval_ms = v;
    }
    if let Some(v) = read_env_u64("SLACKLINE_PONG_TIMEOUT_MS", 100, 3_600_000) {
        settings.session.pong_timeout_ms = v;
    }

    // ── Reconnect ───────────────────────────────────────────────────
    if let Some(v) = read_env_u32("SLACKLINE_RECONNECT_MAX_ATTEMPTS", 0, 10_000) {
        settings.reconnect.max_attempts = v;
    }
    if let Some(v) = read_env_u64("SLACKLINE_RECONNECT_BASE_DELAY_MS", 1, 600_000) {
        settings.reconnect.base_delay_ms = v;
    }
    if let Some(v) = read_env_u64("SLACKLINE_RECONNECT_MAX_DELAY_MS", 1, 3_600_000) {
        settings.reconnect.max_delay_ms = v;
    }

    // ── Logging ─────────────────────────────────────────────────────
    if let Some(v) = read_env_string("SLACKLINE_LOG_LEVEL") {
        settings.logging.level = v;
    }
    if let Some(v) = read_env_string("SLACKLINE_LOG_FORMAT") {
        match parse_log_format(&v) {
            Some(format) => settings.logging.format = format,
            None => tracing::warn!(key = "SLACKLINE_LOG_FORMAT", value = %v, "invalid log format, ignoring"),
        }
    }

    // ── Fake server ─────────────────────────────────────────────────
    if let Some(v) = read_env_string("SLACKLINE_TEST_SERVER_HOST") {
        settings.test_server.host = v;
    }
    if let Some(v) = read_env_u16("SLACKLINE_TEST_SERVER_PORT", 0, 65535) {
        settings.test_server.port = v;
    }
}

// ── Pure parsing functions (testable without env vars) ──────────────────────

/// Parse a log format name (case-insensitive).
pub fn parse_log_format(val: &str) -> Option<LogFormat> {
    match val.to_lowercase().as_str() {
        "compact" | "text" => Some(LogFormat::Compact),
        "json" => Some(LogFormat::Json),
        _ => None,
    }
}

/// Parse a string as a `u16` within a range.
pub fn parse_u16_range(val: &str, min: u16, max: u16) -> Option<u16> {
    let n: u16 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a string as a `u32` within a range.
pub fn parse_u32_range(val: &str, min: u32, max: u32) -> Option<u32> {
    let n: u32 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a string as a `u64` within a range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a string as a `usize` within a range.
pub fn parse_usize_range(val: &str, min: usize, max: usize) -> Option<usize> {
    let n: usize = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

// ── Env var readers (thin wrappers) ─────────────────────────────────────────

fn read_env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn read_env_u16(name: &str, min: u16, max: u16) -> Option<u16> {
    let val = std::env::var(name).ok()?;
    let result = parse_u16_range(&val, min, max);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid u16 env var, ignoring");
    }
    result
}

fn read_env_u32(name: &str, min: u32, max: u32) -> Option<u32> {
    let val = std::env::var(name).ok()?;
    let result = parse_u32_range(&val, min, max);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid u32 env var, ignoring");
    }
    result
}

fn read_env_u64(name: &str, min: u64, max: u64) -> Option<u64> {
    let val = std::env::var(name).ok()?;
    let result = parse_u64_range(&val, min, max);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid u64 env var, ignoring");
    }
    result
}

fn read_env_usize(name: &str, min: usize, max: usize) -> Option<usize> {
    let val = std::env::var(name).ok()?;
    let result = parse_usize_range(&val, min, max);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid usize env var, ignoring");
    }
    result
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    // ── deep_merge ──────────────────────────────────────────────────

    #[test]
    fn merge_nested_override() {
        let target = serde_json::json!({"session": {"a": 1, "b": 2}});
        let source = serde_json::json!({"session": {"a": 10}});
        let merged = deep_merge(target, source);
        assert_eq!(merged["session"]["a"], 10);
        assert_eq!(merged["session"]["b"], 2);
    }

    #[test]
    fn merge_null_preserves_target() {
        let target = serde_json::json!({"a": 1});
        let merged = deep_merge(target, serde_json::json!({"a": null}));
        assert_eq!(merged["a"], 1);
    }

    #[test]
    fn merge_array_replace() {
        let target = serde_json::json!({"items": [1, 2, 3]});
        let merged = deep_merge(target, serde_json::json!({"items": [4]}));
        assert_eq!(merged["items"], serde_json::json!([4]));
    }

    #[test]
    fn merge_primitive_replaces_object() {
        let target = serde_json::json!({"a": {"nested": true}});
        let merged = deep_merge(target, serde_json::json!({"a": 42}));
        assert_eq!(merged["a"], 42);
    }

    // ── load_settings_from_path ─────────────────────────────────────

    #[test]
    fn load_missing_file_returns_defaults() {
        let settings = load_settings_from_path(Path::new("/nonexistent/settings.json")).unwrap();
        assert_eq!(settings.session, crate::SessionSettings::default());
    }

    #[test]
    fn load_partial_json_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"session": {"outboundQueueDepth": 8}, "reconnect": {"maxAttempts": 0}}"#,
        )
        .unwrap();

        let settings = load_settings_from_path(&path).unwrap();
        assert_eq!(settings.session.outbound_queue_depth, 8);
        assert_eq!(settings.session.subscriber_buffer, 256);
        assert!(settings.reconnect.is_unbounded());
        assert_eq!(settings.reconnect.base_delay_ms, 500);
    }

    #[test]
    fn load_invalid_json_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "not valid json").unwrap();

        assert_matches!(load_settings_from_path(&path), Err(SettingsError::Json(_)));
    }

    #[test]
    fn load_zero_queue_depth_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"session": {"outboundQueueDepth": 0}}"#).unwrap();

        assert_matches!(
            load_settings_from_path(&path),
            Err(SettingsError::InvalidValue(msg)) if msg.contains("outboundQueueDepth")
        );
    }

    // ── validate ────────────────────────────────────────────────────

    #[test]
    fn defaults_validate() {
        assert!(validate(&SlacklineSettings::default()).is_ok());
    }

    #[test]
    fn pong_timeout_shorter_than_interval_is_invalid() {
        let mut settings = SlacklineSettings::default();
        settings.session.ping_interval_ms = 10_000;
        settings.session.pong_timeout_ms = 5_000;
        assert_matches!(validate(&settings), Err(SettingsError::InvalidValue(_)));
    }

    #[test]
    fn jitter_out_of_range_is_invalid() {
        let mut settings = SlacklineSettings::default();
        settings.reconnect.jitter_factor = 1.5;
        assert_matches!(validate(&settings), Err(SettingsError::InvalidValue(_)));
    }

    // ── parsing ─────────────────────────────────────────────────────

    #[test]
    fn parse_log_format_variants() {
        assert_eq!(parse_log_format("JSON"), Some(LogFormat::Json));
        assert_eq!(parse_log_format("compact"), Some(LogFormat::Compact));
        assert_eq!(parse_log_format("text"), Some(LogFormat::Compact));
        assert_eq!(parse_log_format("yaml"), None);
    }

    #[test]
    fn parse_ranges() {
        assert_eq!(parse_u16_range("8080", 1, 65535), Some(8080));
        assert_eq!(parse_u16_range("0", 1, 65535), None);
        assert_eq!(parse_u32_range("0", 0, 10), Some(0));
        assert_eq!(parse_u64_range("abc", 0, 10), None);
        assert_eq!(parse_usize_range("11", 0, 10), None);
    }
}
