//! Typed payload shapes, one module per domain.
//!
//! Every struct is `#[serde(default)]`: missing fields decode to their zero
//! value and unknown fields are ignored. A field present with the wrong JSON
//! type is still a decode error.

pub mod app;
pub mod channel;
pub mod common;
pub mod connection;
pub mod file;
pub mod item;
pub mod message;
pub mod shared_channel;
pub mod subteam;
pub mod team;
pub mod user;
