//! Outer envelope of events delivered over HTTP.
//!
//! Each POST carries one envelope. A callback wraps an inner event that is
//! decoded with the same [`EnvelopeDecoder`] used for socket frames.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::envelope::{Decoded, EnvelopeDecoder};
use crate::errors::DecodeError;

/// Discriminator of a URL verification handshake.
pub const URL_VERIFICATION: &str = "url_verification";
/// Discriminator of a wrapped event.
pub const EVENT_CALLBACK: &str = "event_callback";
/// Discriminator of a rate-limit notice.
pub const APP_RATE_LIMITED: &str = "app_rate_limited";

/// A decoded webhook body.
#[derive(Clone, Debug, PartialEq)]
pub enum WebhookEvent {
    /// Endpoint ownership check; answer with [`ChallengeResponse`].
    UrlVerification {
        /// Verification token.
        token: String,
        /// Value to echo back.
        challenge: String,
    },
    /// A wrapped inner event.
    Callback(Box<CallbackEvent>),
    /// Deliveries are being dropped for this app.
    RateLimited {
        /// Team.
        team_id: String,
        /// Minute bucket that hit the limit.
        minute_rate_limited: i64,
        /// App.
        api_app_id: String,
    },
    /// Outer discriminator not known; the raw body is kept.
    Unrecognized {
        /// Discriminator.
        envelope_type: String,
        /// Whole body.
        raw: Value,
    },
}

/// An `event_callback` envelope and its decoded inner event.
#[derive(Clone, Debug, PartialEq)]
pub struct CallbackEvent {
    /// Verification token.
    pub token: String,
    /// Team.
    pub team_id: String,
    /// App.
    pub api_app_id: String,
    /// Delivery id, stable across retries.
    pub event_id: String,
    /// Epoch seconds.
    pub event_time: i64,
    /// Users the event is visible to.
    pub authed_users: Vec<String>,
    /// Inner event.
    pub inner: Decoded,
}

/// Reply body for [`WebhookEvent::UrlVerification`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeResponse {
    /// Echoed challenge.
    pub challenge: String,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct VerificationFields {
    token: String,
    challenge: String,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct CallbackFields {
    token: String,
    team_id: String,
    api_app_id: String,
    event_id: String,
    event_time: i64,
    authed_users: Vec<String>,
    event: Option<Value>,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct RateLimitedFields {
    team_id: String,
    minute_rate_limited: i64,
    api_app_id: String,
}

impl EnvelopeDecoder<'_> {
    /// Decode an HTTP-delivered envelope.
    pub fn decode_webhook(&self, body: &[u8]) -> Result<WebhookEvent, DecodeError> {
        let envelope = Self::parse(body)?;
        let shape_err = |discriminator: &str, e: serde_json::Error, doc: &Value| {
            DecodeError::ShapeMismatch {
                discriminator: discriminator.to_owned(),
                message: e.to_string(),
                snippet: crate::errors::snippet(&doc.to_string()),
            }
        };

        match envelope.discriminator.as_str() {
            URL_VERIFICATION => {
                let f = VerificationFields::deserialize(&envelope.document)
                    .map_err(|e| shape_err(URL_VERIFICATION, e, &envelope.document))?;
                Ok(WebhookEvent::UrlVerification {
                    token: f.token,
                    challenge: f.challenge,
                })
            }
            EVENT_CALLBACK => {
                let f = CallbackFields::deserialize(&envelope.document)
                    .map_err(|e| shape_err(EVENT_CALLBACK, e, &envelope.document))?;
                let inner = self.decode_value(f.event.unwrap_or(Value::Null))?;
                Ok(WebhookEvent::Callback(Box::new(CallbackEvent {
                    token: f.token,
                    team_id: f.team_id,
                    api_app_id: f.api_app_id,
                    event_id: f.event_id,
                    event_time: f.event_time,
                    authed_users: f.authed_users,
                    inner,
                })))
            }
            APP_RATE_LIMITED => {
                let f = RateLimitedFields::deserialize(&envelope.document)
                    .map_err(|e| shape_err(APP_RATE_LIMITED, e, &envelope.document))?;
                Ok(WebhookEvent::RateLimited {
                    team_id: f.team_id,
                    minute_rate_limited: f.minute_rate_limited,
                    api_app_id: f.api_app_id,
                })
            }
            _ => {
                tracing::debug!(envelope_type = %envelope.discriminator, "unrecognized webhook envelope");
                Ok(WebhookEvent::Unrecognized {
                    envelope_type: envelope.discriminator,
                    raw: envelope.document,
                })
            }
        }
    }
}

/// Decode a webhook body with the process-wide catalogue.
pub fn decode_webhook(body: &[u8]) -> Result<WebhookEvent, DecodeError> {
    EnvelopeDecoder::default().decode_webhook(body)
}

impl WebhookEvent {
    /// Reply for a verification handshake, `None` for anything else.
    #[must_use]
    pub fn challenge_response(&self) -> Option<ChallengeResponse> {
        match self {
            Self::UrlVerification { challenge, .. } => Some(ChallengeResponse {
                challenge: challenge.clone(),
            }),
            _ => None,
        }
    }
}
