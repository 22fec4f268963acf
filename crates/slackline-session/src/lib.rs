//! # slackline-session
//!
//! Long-lived duplex sessions over a frame transport.
//!
//! - [`session`]: [`DuplexSession`], its pumps and the reconnect supervisor
//! - [`transport`]: the [`Connector`] seam and the WebSocket implementation
//! - [`subscriber`]: fan-out of decoded events and state changes
//! - [`observe`]: per-direction record of traffic, queryable by text
//! - [`backoff`]: reconnect policy and delay strategies
//! - [`testing`]: in-memory connector for driving sessions in tests
//!
//! Inbound frames are decoded with `slackline-events`. Sends never block:
//! a full queue is reported as [`SendError::Backpressure`].

#![deny(unsafe_code)]

pub mod backoff;
pub mod config;
pub mod errors;
pub mod observe;
pub mod session;
pub mod state;
pub mod subscriber;
pub mod testing;
pub mod transport;

pub use backoff::{BackoffStrategy, ConstantBackoff, ExponentialBackoff, ReconnectPolicy};
pub use config::SessionConfig;
pub use errors::{ConnectionError, SendError, TransportError};
pub use observe::{Direction, ObservationLog, ObservationRecord};
pub use session::{DuplexSession, SendTicket};
pub use state::{SessionState, StateChange};
pub use subscriber::{SessionUpdate, Subscription};
pub use transport::{Connection, Connector, FrameReader, FrameWriter, WebSocketConnector};
