//! # slackline-testserver
//!
//! In-process fake of the chat service for integration tests.
//!
//! - [`server`]: [`TestServer`], its builder and the built-in endpoints
//! - [`api`]: response shapes of the REST endpoints
//! - [`errors`]: start-up failures
//!
//! A client calls `rtm.connect` (or `apps.connections.open`) for the
//! WebSocket URL, dials it and receives `hello`. Frames queued with the
//! `send_*` methods are pushed to every connected client; frames clients
//! send are recorded for the `saw_*` assertions.

#![deny(unsafe_code)]

pub mod api;
pub mod errors;
mod hub;
pub mod server;

pub use api::{
    ApiError, ApiResponse, AuthTestResponse, ConnectResponse, Identity, PostMessageResponse,
    TokenResponse,
};
pub use errors::TestServerError;
pub use server::{
    DEFAULT_NON_BOT_USER_ID, DIRECT_MESSAGE_CHANNEL, TEAM_ID, TEAM_NAME, TestServer,
    TestServerBuilder,
};
