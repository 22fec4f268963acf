//! Envelope decoding: raw frame → discriminator → typed event.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::catalogue::{Catalogue, catalogue};
use crate::errors::{DecodeError, snippet};
use crate::kinds::{TypedEvent, UnrecognizedEvent};

/// Field carrying the discriminator.
pub const DISCRIMINATOR_FIELD: &str = "type";

/// A decoded frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Decoded {
    /// Discriminator as read from the frame.
    pub discriminator: String,
    /// Typed event, or the fallback for unknown discriminators.
    pub event: TypedEvent,
}

/// A parsed frame whose discriminator has been extracted but whose body has
/// not yet been decoded into a typed shape.
#[derive(Clone, Debug, PartialEq)]
pub struct RawEnvelope {
    /// Discriminator.
    pub discriminator: String,
    /// Whole document.
    pub document: Value,
}

impl RawEnvelope {
    /// Integer field of the document, if present.
    #[must_use]
    pub fn u64_field(&self, name: &str) -> Option<u64> {
        self.document.get(name).and_then(Value::as_u64)
    }
}

/// Turns raw frames into [`Decoded`] events against a catalogue.
#[derive(Clone, Copy, Debug)]
pub struct EnvelopeDecoder<'c> {
    catalogue: &'c Catalogue,
}

impl Default for EnvelopeDecoder<'static> {
    fn default() -> Self {
        Self::new(catalogue())
    }
}

impl<'c> EnvelopeDecoder<'c> {
    /// Decoder over `catalogue`.
    #[must_use]
    pub fn new(catalogue: &'c Catalogue) -> Self {
        Self { catalogue }
    }

    /// Parse and decode in one step.
    pub fn decode(&self, raw: &[u8]) -> Result<Decoded, DecodeError> {
        let envelope = Self::parse(raw)?;
        self.decode_envelope(envelope)
    }

    /// Decode an already-parsed document.
    pub fn decode_value(&self, document: Value) -> Result<Decoded, DecodeError> {
        let envelope = RawEnvelope::try_from(document)?;
        self.decode_envelope(envelope)
    }

    /// Parse a frame and extract its discriminator.
    pub fn parse(raw: &[u8]) -> Result<RawEnvelope, DecodeError> {
        let document: Value =
            serde_json::from_slice(raw).map_err(|e| DecodeError::MalformedFrame {
                line: e.line(),
                column: e.column(),
                message: strip_position(&e),
                snippet: snippet(&String::from_utf8_lossy(raw)),
            })?;
        RawEnvelope::try_from(document)
    }

    /// Decode a parsed envelope into its typed shape.
    pub fn decode_envelope(&self, envelope: RawEnvelope) -> Result<Decoded, DecodeError> {
        let RawEnvelope {
            discriminator,
            document,
        } = envelope;

        let Some(entry) = self.catalogue.lookup(&discriminator) else {
            debug!(discriminator = %discriminator, "unrecognized event kind");
            return Ok(Decoded {
                event: TypedEvent::Unrecognized(UnrecognizedEvent {
                    event_type: discriminator.clone(),
                    raw: document,
                }),
                discriminator,
            });
        };

        let document = match entry.normalize {
            Some(normalize) => normalize(document),
            None => document,
        };

        match (entry.decode)(&document) {
            Ok(event) => Ok(Decoded {
                discriminator,
                event,
            }),
            Err(e) => Err(DecodeError::ShapeMismatch {
                message: e.to_string(),
                snippet: document_snippet(&document),
                discriminator,
            }),
        }
    }
}

impl TryFrom<Value> for RawEnvelope {
    type Error = DecodeError;

    fn try_from(document: Value) -> Result<Self, Self::Error> {
        let discriminator = document
            .as_object()
            .and_then(|obj| obj.get(DISCRIMINATOR_FIELD))
            .and_then(Value::as_str)
            .map(str::to_owned);
        match discriminator {
            Some(discriminator) => Ok(Self {
                discriminator,
                document,
            }),
            None => Err(DecodeError::MissingDiscriminator {
                snippet: document_snippet(&document),
            }),
        }
    }
}

/// Decode with the process-wide catalogue.
pub fn decode(raw: &[u8]) -> Result<Decoded, DecodeError> {
    EnvelopeDecoder::default().decode(raw)
}

/// Decode with the process-wide catalogue, sharing the result.
pub fn decode_shared(raw: &[u8]) -> Result<Arc<Decoded>, DecodeError> {
    decode(raw).map(Arc::new)
}

fn document_snippet(document: &Value) -> String {
    snippet(&document.to_string())
}

/// serde_json appends " at line L column C" to syntax errors; the position is
/// carried separately.
fn strip_position(err: &serde_json::Error) -> String {
    let full = err.to_string();
    match full.rfind(" at line ") {
        Some(idx) => full[..idx].to_owned(),
        None => full,
    }
}
