use serde::{Deserialize, Serialize};

/// Defaults for the fake chat server.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TestServerSettings {
    /// Bind address.
    pub host: String,
    /// Bind port. `0` picks a free port.
    pub port: u16,
    /// Display name of the bot user.
    pub bot_name: String,
    /// User id of the bot user.
    pub bot_id: String,
}

impl Default for TestServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            bot_name: "TestSlackBot".to_string(),
            bot_id: "U0BOT00001".to_string(),
        }
    }
}
