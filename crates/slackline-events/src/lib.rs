//! # slackline-events
//!
//! Typed decoding of chat event frames.
//!
//! - [`catalogue`]: discriminator → decode function registry, built once
//! - [`kinds`]: [`EventKind`], [`TypedEvent`] and the catalogue table
//! - [`envelope`]: raw frame → [`Decoded`]
//! - [`normalize`]: per-kind rewrites for kinds whose payload moves around
//! - [`payloads`]: typed payload shapes
//! - [`webhook`]: outer envelope of HTTP-delivered events
//!
//! Unknown discriminators are not errors. They decode to
//! [`TypedEvent::Unrecognized`] with the raw document attached.

#![deny(unsafe_code)]

#[macro_use]
mod macros;

pub mod catalogue;
pub mod envelope;
pub mod errors;
pub mod kinds;
pub mod normalize;
pub mod payloads;
pub mod webhook;

pub use catalogue::{Catalogue, CatalogueBuilder, CatalogueEntry, catalogue};
pub use envelope::{Decoded, EnvelopeDecoder, RawEnvelope, decode};
pub use errors::DecodeError;
pub use kinds::{ALL_EVENT_KINDS, EventKind, TypedEvent, UnrecognizedEvent};
pub use webhook::{CallbackEvent, ChallengeResponse, WebhookEvent, decode_webhook};
