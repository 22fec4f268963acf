//! Response shapes of the fake server's REST endpoints.
//!
//! Every response carries `ok`. When it is `false`, `error` names the reason
//! and [`ApiResponse::into_result`] turns the response into an [`ApiError`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// `ok: false` from an endpoint.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("api error: {0}")]
pub struct ApiError(pub String);

/// Common envelope of every REST response.
pub trait ApiResponse: Sized {
    /// The `ok` flag.
    fn ok(&self) -> bool;

    /// The `error` string, empty on success.
    fn error(&self) -> &str;

    /// `Err` when the endpoint reported failure.
    fn into_result(self) -> Result<Self, ApiError> {
        if self.ok() {
            Ok(self)
        } else {
            Err(ApiError(self.error().to_owned()))
        }
    }
}

macro_rules! api_response {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl ApiResponse for $ty {
                fn ok(&self) -> bool {
                    self.ok
                }

                fn error(&self) -> &str {
                    &self.error
                }
            }
        )+
    };
}

fn is_empty(s: &str) -> bool {
    s.is_empty()
}

/// Result of rotating a refresh token.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenResponse {
    /// Success flag.
    pub ok: bool,
    /// Failure reason.
    #[serde(skip_serializing_if = "is_empty")]
    pub error: String,
    /// New access token.
    pub token: String,
    /// New refresh token.
    pub refresh_token: String,
    /// Workspace of the token.
    pub team_id: String,
    /// User the token acts as.
    pub user_id: String,
    /// Issued at, unix seconds.
    pub iat: i64,
    /// Expires at, unix seconds.
    pub exp: i64,
}

/// Answer to `rtm.connect` and `apps.connections.open`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectResponse {
    /// Success flag.
    pub ok: bool,
    /// Failure reason.
    #[serde(skip_serializing_if = "is_empty")]
    pub error: String,
    /// WebSocket URL to dial.
    pub url: String,
    /// Identity of the connecting bot, on `rtm.connect`.
    #[serde(rename = "self", skip_serializing_if = "Option::is_none")]
    pub bot: Option<Identity>,
    /// Workspace, on `rtm.connect`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<Identity>,
}

/// Id and display name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Identity {
    /// Id.
    pub id: String,
    /// Display name.
    pub name: String,
}

/// Answer to `auth.test`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthTestResponse {
    /// Success flag.
    pub ok: bool,
    /// Failure reason.
    #[serde(skip_serializing_if = "is_empty")]
    pub error: String,
    /// Workspace URL.
    pub url: String,
    /// Workspace name.
    pub team: String,
    /// Bot user name.
    pub user: String,
    /// Workspace id.
    pub team_id: String,
    /// Bot user id.
    pub user_id: String,
}

/// Answer to `chat.postMessage`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostMessageResponse {
    /// Success flag.
    pub ok: bool,
    /// Failure reason.
    #[serde(skip_serializing_if = "is_empty")]
    pub error: String,
    /// Conversation posted to.
    pub channel: String,
    /// Timestamp assigned to the message.
    pub ts: String,
}

api_response!(TokenResponse, ConnectResponse, AuthTestResponse, PostMessageResponse);

impl TokenResponse {
    /// Failure with `error`.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            ..Self::default()
        }
    }
}

impl PostMessageResponse {
    /// Failure with `error`.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn ok_response_passes_through() {
        let resp = TokenResponse {
            ok: true,
            token: "xoxe.xoxp-1".into(),
            ..TokenResponse::default()
        };
        assert_eq!(resp.clone().into_result(), Ok(resp));
    }

    #[test]
    fn failed_response_is_error() {
        let resp = TokenResponse::failed("invalid_refresh_token");
        assert_matches!(resp.into_result(), Err(ApiError(e)) if e == "invalid_refresh_token");
    }

    #[test]
    fn error_omitted_when_empty() {
        let json = serde_json::to_value(PostMessageResponse {
            ok: true,
            channel: "C1".into(),
            ts: "1".into(),
            ..PostMessageResponse::default()
        })
        .unwrap();
        assert!(json.get("error").is_none());
    }

    #[test]
    fn connect_response_reads_self_field() {
        let resp: ConnectResponse = serde_json::from_str(
            r#"{"ok":true,"url":"ws://x/ws","self":{"id":"U1","name":"bot"}}"#,
        )
        .unwrap();
        assert_eq!(resp.bot.unwrap().name, "bot");
        assert!(resp.team.is_none());
    }

    #[test]
    fn missing_fields_default() {
        let resp: AuthTestResponse = serde_json::from_str(r#"{"ok":false,"error":"not_authed"}"#).unwrap();
        assert_matches!(resp.into_result(), Err(ApiError(e)) if e == "not_authed");
    }
}
