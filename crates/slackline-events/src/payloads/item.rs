//! Reactions, pins and stars on items.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::common::Item;

/// Reaction added or removed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReactionEvent {
    /// Reacting user.
    pub user: String,
    /// Emoji name without colons.
    pub reaction: String,
    /// Author of the reacted item.
    pub item_user: String,
    /// Reacted item.
    pub item: Item,
    /// Event timestamp.
    pub event_ts: String,
}

/// Reaction added.
pub type ReactionAddedEvent = ReactionEvent;
/// Reaction removed.
pub type ReactionRemovedEvent = ReactionEvent;

/// Item pinned or unpinned.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PinEvent {
    /// Acting user.
    pub user: String,
    /// Pinned item.
    pub item: Item,
    /// Conversation.
    pub channel_id: String,
    /// Event timestamp.
    pub event_ts: String,
    /// Whether the conversation still has pins.
    pub has_pins: bool,
}

/// Item pinned.
pub type PinAddedEvent = PinEvent;
/// Item unpinned.
pub type PinRemovedEvent = PinEvent;

/// Item starred or unstarred. The item shape varies widely and is kept opaque.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StarEvent {
    /// Acting user.
    pub user: String,
    /// Starred item.
    pub item: Value,
    /// Event timestamp.
    pub event_ts: String,
}

/// Item starred.
pub type StarAddedEvent = StarEvent;
/// Item unstarred.
pub type StarRemovedEvent = StarEvent;
