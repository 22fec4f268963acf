//! # slackline-core
//!
//! Foundation utilities shared by every slackline crate.
//!
//! - **Branded IDs**: [`ids::SessionId`] and [`ids::ConnectionId`] as newtypes for type safety
//! - **Retry**: [`retry::RetryConfig`] and exponential backoff with jitter
//! - **Logging**: `tracing` subscriber setup and an in-memory capture layer for tests

#![deny(unsafe_code)]

pub mod ids;
pub mod logging;
pub mod retry;
