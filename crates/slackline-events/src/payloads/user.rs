//! User record changes.

use serde::{Deserialize, Serialize};

use super::common::User;

/// A user record changed: profile, status, huddle, or anything else.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserChangeEvent {
    /// Updated record.
    pub user: User,
    /// Cache version.
    pub cache_ts: i64,
    /// Event timestamp.
    pub event_ts: String,
}

/// User joined or left a huddle.
pub type UserHuddleChangedEvent = UserChangeEvent;
/// Profile fields changed.
pub type UserProfileChangedEvent = UserChangeEvent;
/// Status text or emoji changed.
pub type UserStatusChangedEvent = UserChangeEvent;
