//! Workspace-wide changes: team settings, grid migration, invites, tokens,
//! emoji, slash commands and do-not-disturb.

use serde::{Deserialize, Serialize};

use super::common::{TeamRef, User};

/// Team gained or lost access to a shared resource.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamAccessEvent {
    /// Affected teams.
    pub team_ids: Vec<String>,
}

/// Access granted.
pub type TeamAccessGrantedEvent = TeamAccessEvent;
/// Access revoked.
pub type TeamAccessRevokedEvent = TeamAccessEvent;

/// Workspace domain changed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamDomainChangeEvent {
    /// New URL.
    pub url: String,
    /// New domain.
    pub domain: String,
    /// Team id.
    pub team_id: String,
}

/// Workspace renamed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamRenameEvent {
    /// New name.
    pub name: String,
    /// Team id.
    pub team_id: String,
}

/// New member joined the workspace.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamJoinEvent {
    /// The new member.
    pub user: Option<User>,
    /// Event timestamp.
    pub event_ts: String,
}

/// Enterprise grid migration started or finished.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridMigrationEvent {
    /// Enterprise being migrated into.
    pub enterprise_id: String,
}

/// Migration started.
pub type GridMigrationStartedEvent = GridMigrationEvent;
/// Migration finished.
pub type GridMigrationFinishedEvent = GridMigrationEvent;

/// Allowed email domain changed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailDomainChangedEvent {
    /// New domain.
    pub email_domain: String,
    /// Event timestamp.
    pub event_ts: String,
}

/// Someone asked for a user to be invited.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InviteRequestedEvent {
    /// The request.
    pub invite_request: InviteRequest,
}

/// Body of an [`InviteRequestedEvent`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InviteRequest {
    /// Request id.
    pub id: String,
    /// Invitee email.
    pub email: String,
    /// Creation time.
    pub date_created: i64,
    /// Requesting users.
    pub requester_ids: Vec<String>,
    /// Channels to join.
    pub channel_ids: Vec<String>,
    /// `full_member`, `restricted`…
    pub invite_type: String,
    /// Invitee name.
    pub real_name: String,
    /// Expiry.
    pub date_expire: i64,
    /// Justification.
    pub request_reason: String,
    /// Team.
    pub team: TeamRef,
}

/// Tokens revoked for this app.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokensRevokedEvent {
    /// Revoked tokens by kind.
    pub tokens: RevokedTokens,
    /// Event timestamp.
    pub event_ts: String,
}

/// User ids whose tokens were revoked.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevokedTokens {
    /// User tokens.
    pub oauth: Vec<String>,
    /// Bot tokens.
    pub bot: Vec<String>,
}

/// Slash commands changed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandsChangedEvent {
    /// Event timestamp.
    pub event_ts: String,
}

/// Custom emoji added, removed or renamed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmojiChangedEvent {
    /// `add`, `remove` or `rename`.
    pub subtype: String,
    /// Event timestamp.
    pub event_ts: String,
    /// Added emoji.
    pub name: String,
    /// Removed emoji.
    pub names: Vec<String>,
    /// Name before a rename.
    pub old_name: String,
    /// Name after a rename.
    pub new_name: String,
    /// Image URL or `alias:` target.
    pub value: String,
}

/// Do-not-disturb settings changed for the current user.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DndUpdatedEvent {
    /// User.
    pub user: String,
    /// New state.
    pub dnd_status: DndStatus,
}

/// Do-not-disturb settings changed for a workspace member.
pub type DndUpdatedUserEvent = DndUpdatedEvent;

/// Do-not-disturb state. Snooze fields are only sent to the owning user.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DndStatus {
    /// DnD on.
    pub dnd_enabled: bool,
    /// Next scheduled start.
    pub next_dnd_start_ts: i64,
    /// Next scheduled end.
    pub next_dnd_end_ts: i64,
    /// Snoozing.
    pub snooze_enabled: bool,
    /// Snooze end.
    pub snooze_endtime: i64,
}
