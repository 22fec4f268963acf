//! # slackline-settings
//!
//! Layered configuration for slackline.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`SlacklineSettings::default()`]
//! 2. **User file**: `~/.slackline/settings.json` (deep-merged over defaults)
//! 3. **Environment variables**: `SLACKLINE_*` overrides (highest priority)

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, load_settings, load_settings_from_path, settings_path};
pub use types::*;

use std::sync::OnceLock;

static SETTINGS: OnceLock<SlacklineSettings> = OnceLock::new();

/// Get the global settings instance.
///
/// Loads on first call and caches. Falls back to compiled defaults (with a
/// warning) when loading fails.
pub fn get_settings() -> &'static SlacklineSettings {
    SETTINGS.get_or_init(|| {
        load_settings().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "failed to load settings, using defaults");
            SlacklineSettings::default()
        })
    })
}

/// Initialize the global settings with a specific value.
///
/// Returns the value back if the global was already initialized.
#[allow(clippy::result_large_err)]
pub fn init_settings(settings: SlacklineSettings) -> std::result::Result<(), SlacklineSettings> {
    SETTINGS.set(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_are_valid() {
        let settings = SlacklineSettings::default();
        assert_eq!(settings.session.outbound_queue_depth, 64);
        assert_eq!(settings.reconnect.max_attempts, 5);
        assert_eq!(settings.logging.level, "info");
        assert_eq!(settings.test_server.bot_name, "TestSlackBot");
    }

    #[test]
    fn settings_path_ends_with_file_name() {
        assert!(settings_path().ends_with("settings.json"));
    }

    #[test]
    fn serde_roundtrip_is_stable() {
        let settings = SlacklineSettings::default();
        let json = serde_json::to_value(&settings).unwrap();
        assert!(json["session"]["outboundQueueDepth"].is_number());
        let back: SlacklineSettings = serde_json::from_value(json).unwrap();
        assert_eq!(back, settings);
    }
}
