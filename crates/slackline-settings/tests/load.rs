//! Loading complete settings files from disk.

use assert_matches::assert_matches;
use slackline_core::logging::LogFormat;
use slackline_settings::{SettingsError, SlacklineSettings, load_settings_from_path};

fn write(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, contents).unwrap();
    (dir, path)
}

#[test]
fn every_section_can_be_overridden() {
    let (_dir, path) = write(
        r#"{
            "session": { "outboundQueueDepth": 4, "pingIntervalMs": 1000, "pongTimeoutMs": 3000 },
            "reconnect": { "maxAttempts": 2, "baseDelayMs": 10, "maxDelayMs": 100 },
            "logging": { "level": "debug", "format": "json" },
            "testServer": { "port": 8181, "botName": "deploybot" }
        }"#,
    );

    let settings = load_settings_from_path(&path).unwrap();
    assert_eq!(settings.session.outbound_queue_depth, 4);
    assert_eq!(settings.session.ping_interval().as_millis(), 1000);
    assert_eq!(settings.reconnect.max_attempts, 2);
    assert_eq!(settings.logging.format, LogFormat::Json);
    assert_eq!(settings.test_server.port, 8181);
    assert_eq!(settings.test_server.bot_name, "deploybot");
    assert_eq!(settings.test_server.bot_id, "U0BOT00001");
}

#[test]
fn saved_defaults_load_back_unchanged() {
    let json = serde_json::to_string_pretty(&SlacklineSettings::default()).unwrap();
    let (_dir, path) = write(&json);
    let loaded = load_settings_from_path(&path).unwrap();
    assert_eq!(loaded.session, SlacklineSettings::default().session);
    assert_eq!(loaded.test_server, SlacklineSettings::default().test_server);
}

#[test]
fn base_delay_above_max_is_rejected() {
    let (_dir, path) = write(r#"{"reconnect": {"baseDelayMs": 5000, "maxDelayMs": 100}}"#);
    assert_matches!(
        load_settings_from_path(&path),
        Err(SettingsError::InvalidValue(msg)) if msg.contains("baseDelayMs")
    );
}

#[test]
fn wrong_type_is_a_json_error() {
    let (_dir, path) = write(r#"{"session": {"outboundQueueDepth": "lots"}}"#);
    assert_matches!(load_settings_from_path(&path), Err(SettingsError::Json(_)));
}
