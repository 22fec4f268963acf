//! Public channels, private groups, direct messages and membership.
//!
//! Several kinds share one shape; aliases keep the catalogue table readable.

use serde::{Deserialize, Serialize};

/// A channel-scoped event with an acting user: archive, unarchive.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelUserEvent {
    /// Channel id.
    pub channel: String,
    /// Acting user.
    pub user: String,
    /// Event timestamp.
    pub event_ts: String,
}

/// Channel archived.
pub type ChannelArchiveEvent = ChannelUserEvent;
/// Channel unarchived.
pub type ChannelUnarchiveEvent = ChannelUserEvent;

/// A channel-scoped event without an actor: deleted, left, and group variants.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelRefEvent {
    /// Channel id.
    pub channel: String,
    /// Event timestamp.
    pub event_ts: String,
}

/// Channel deleted.
pub type ChannelDeletedEvent = ChannelRefEvent;
/// The bot left a channel.
pub type ChannelLeftEvent = ChannelRefEvent;
/// Private channel archived.
pub type GroupArchiveEvent = ChannelRefEvent;
/// Private channel unarchived.
pub type GroupUnarchiveEvent = ChannelRefEvent;
/// Private channel deleted.
pub type GroupDeletedEvent = ChannelRefEvent;
/// The bot left a private channel.
pub type GroupLeftEvent = ChannelRefEvent;

/// Channel created.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelCreatedEvent {
    /// The new channel.
    pub channel: ChannelCreatedInfo,
    /// Event timestamp.
    pub event_ts: String,
}

/// Channel in a [`ChannelCreatedEvent`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelCreatedInfo {
    /// Channel id.
    pub id: String,
    /// Public channel.
    pub is_channel: bool,
    /// Name.
    pub name: String,
    /// Creation time.
    pub created: i64,
    /// Creator.
    pub creator: String,
}

/// Channel renamed. `group_rename` shares the shape.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelRenameEvent {
    /// The renamed channel.
    pub channel: RenamedChannel,
    /// Event timestamp.
    pub event_ts: String,
}

/// Private channel renamed.
pub type GroupRenameEvent = ChannelRenameEvent;

/// Channel after a rename.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenamedChannel {
    /// Channel id.
    pub id: String,
    /// New name.
    pub name: String,
    /// Creation time.
    pub created: i64,
}

/// Bulk history changes; clients should refetch. Shared by channels, groups and IMs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryChangedEvent {
    /// Latest affected timestamp.
    pub latest: String,
    /// Timestamp.
    pub ts: String,
    /// Event timestamp.
    pub event_ts: String,
}

/// Channel history changed.
pub type ChannelHistoryChangedEvent = HistoryChangedEvent;
/// Private channel history changed.
pub type GroupHistoryChangedEvent = HistoryChangedEvent;
/// DM history changed.
pub type ImHistoryChangedEvent = HistoryChangedEvent;

/// Channel id changed, e.g. after an org migration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelIdChangedEvent {
    /// Previous id.
    pub old_channel_id: String,
    /// New id.
    pub new_channel_id: String,
    /// Event timestamp.
    pub event_ts: String,
}

/// Channel shared with another workspace.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelSharedEvent {
    /// Newly connected team.
    pub connected_team_id: String,
    /// Channel id.
    pub channel: String,
    /// Event timestamp.
    pub event_ts: String,
}

/// Channel no longer shared with a workspace.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelUnsharedEvent {
    /// Team that was disconnected.
    pub previously_connected_team_id: String,
    /// Channel id.
    pub channel: String,
    /// Still shared with other external teams.
    pub is_ext_shared: bool,
    /// Event timestamp.
    pub event_ts: String,
}

/// A user opened or closed a conversation in their sidebar.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationToggleEvent {
    /// User.
    pub user: String,
    /// Conversation id.
    pub channel: String,
}

/// Private channel closed.
pub type GroupCloseEvent = ConversationToggleEvent;
/// Private channel opened.
pub type GroupOpenEvent = ConversationToggleEvent;
/// DM closed.
pub type ImCloseEvent = ConversationToggleEvent;
/// DM opened.
pub type ImOpenEvent = ConversationToggleEvent;

/// DM created.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImCreatedEvent {
    /// User on the other side.
    pub user: String,
    /// The new DM.
    pub channel: super::common::ObjectRef,
}

/// A user joined a channel.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemberJoinedChannelEvent {
    /// Joining user.
    pub user: String,
    /// Channel id.
    pub channel: String,
    /// `C` for public, `G` for private.
    pub channel_type: String,
    /// Team of the joining user.
    pub team: String,
    /// Inviting user, when invited.
    pub inviter: String,
    /// Event timestamp.
    pub event_ts: String,
}

/// A user left a channel.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemberLeftChannelEvent {
    /// Leaving user.
    pub user: String,
    /// Channel id.
    pub channel: String,
    /// `C` for public, `G` for private.
    pub channel_type: String,
    /// Team of the leaving user.
    pub team: String,
    /// Event timestamp.
    pub event_ts: String,
}
