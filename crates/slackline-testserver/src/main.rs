//! Standalone fake chat server, for pointing a bot at during development.

#![deny(unsafe_code)]

use anyhow::{Context, Result};
use clap::Parser;
use slackline_core::logging::{LogFormat, init_subscriber};
use slackline_testserver::TestServerBuilder;

/// Fake chat server.
#[derive(Parser, Debug)]
#[command(name = "slackline-testserver", about = "Fake chat server for bot testing")]
struct Cli {
    /// Host to bind (overrides settings).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind, 0 for auto-assign (overrides settings).
    #[arg(long)]
    port: Option<u16>,

    /// Display name of the bot (overrides settings).
    #[arg(long)]
    bot_name: Option<String>,

    /// User id of the bot (overrides settings).
    #[arg(long)]
    bot_id: Option<String>,

    /// Log filter, e.g. `debug` or `slackline_testserver=trace`.
    #[arg(long)]
    log_level: Option<String>,

    /// Emit logs as JSON.
    #[arg(long)]
    json_logs: bool,
}

impl Cli {
    fn builder(&self, settings: &slackline_settings::TestServerSettings) -> TestServerBuilder {
        let mut builder = TestServerBuilder::from_settings(settings);
        if let Some(host) = &self.host {
            builder = builder.host(host.clone());
        }
        if let Some(port) = self.port {
            builder = builder.port(port);
        }
        if let Some(name) = &self.bot_name {
            builder = builder.bot_name(name.clone());
        }
        if let Some(id) = &self.bot_id {
            builder = builder.bot_id(id.clone());
        }
        builder
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    let settings = slackline_settings::get_settings();

    let level = args.log_level.as_deref().unwrap_or(&settings.logging.level);
    let format = if args.json_logs {
        LogFormat::Json
    } else {
        settings.logging.format
    };
    init_subscriber(level, format);

    let server = args.builder(&settings.test_server).build();
    let addr = server.start().await.context("Failed to start fake server")?;
    tracing::info!(
        %addr,
        api = %server.api_url(),
        ws = %server.ws_url(),
        bot = %server.bot_name(),
        "fake server ready"
    );

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;

    tracing::info!("Shutting down...");
    server.stop().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use slackline_settings::TestServerSettings;

    #[test]
    fn defaults_come_from_settings() {
        let cli = Cli::parse_from(["slackline-testserver"]);
        assert!(cli.host.is_none());
        assert!(!cli.json_logs);
        let server = cli.builder(&TestServerSettings::default()).build();
        assert_eq!(server.bot_name(), "TestSlackBot");
        assert_eq!(server.ws_url(), "ws://127.0.0.1:0/ws");
    }

    #[test]
    fn flags_override_settings() {
        let cli = Cli::parse_from([
            "slackline-testserver",
            "--host",
            "0.0.0.0",
            "--port",
            "8181",
            "--bot-name",
            "deploybot",
            "--bot-id",
            "UDEPLOY",
            "--json-logs",
        ]);
        assert!(cli.json_logs);
        let server = cli.builder(&TestServerSettings::default()).build();
        assert_eq!(server.api_url(), "http://0.0.0.0:8181/");
        assert_eq!(server.bot_name(), "deploybot");
        assert_eq!(server.bot_id(), "UDEPLOY");
    }

    #[test]
    fn rejects_bad_port() {
        assert!(Cli::try_parse_from(["slackline-testserver", "--port", "99999"]).is_err());
    }
}
