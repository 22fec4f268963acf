//! Invitations to channels shared between workspaces.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::common::{EventTeam, EventUser};

/// Channel in an invitation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SharedChannel {
    /// Channel id.
    pub id: String,
    /// Private channel.
    pub is_private: bool,
    /// Direct message.
    pub is_im: bool,
    /// Name.
    pub name: String,
}

/// An invitation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SharedInvite {
    /// Invite id.
    pub id: String,
    /// Creation time.
    pub date_created: i64,
    /// Expiry.
    pub date_invalid: i64,
    /// Inviting team.
    pub inviting_team: Option<EventTeam>,
    /// Inviting user.
    pub inviting_user: Option<EventUser>,
    /// Invitee email.
    pub recipient_email: String,
    /// Invitee user.
    pub recipient_user_id: String,
    /// Sponsored invite.
    pub is_sponsored: bool,
    /// Limited external access.
    pub is_external_limited: bool,
}

/// Invitation accepted by the recipient.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SharedChannelInviteAcceptedEvent {
    /// Admin approval still pending.
    pub approval_required: bool,
    /// The invitation.
    pub invite: Option<SharedInvite>,
    /// The channel.
    pub channel: Option<SharedChannel>,
    /// Teams now in the channel.
    pub teams_in_channel: Vec<EventTeam>,
    /// Accepting user.
    pub accepting_user: Option<EventUser>,
    /// Event timestamp.
    pub event_ts: String,
    /// Sponsorship needed.
    pub requires_sponsorship: bool,
}

/// Invitation approved by an admin.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SharedChannelInviteApprovedEvent {
    /// The invitation.
    pub invite: Option<SharedInvite>,
    /// The channel (full conversation object, kept opaque).
    pub channel: Option<Value>,
    /// Approving team.
    pub approving_team_id: String,
    /// Teams now in the channel.
    pub teams_in_channel: Vec<EventTeam>,
    /// Approving user.
    pub approving_user: Option<EventUser>,
    /// Event timestamp.
    pub event_ts: String,
}

/// Invitation declined.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SharedChannelInviteDeclinedEvent {
    /// The invitation.
    pub invite: Option<SharedInvite>,
    /// The channel.
    pub channel: Option<SharedChannel>,
    /// Declining team.
    pub declining_team_id: String,
    /// Teams in the channel.
    pub teams_in_channel: Vec<EventTeam>,
    /// Declining user.
    pub declining_user: Option<EventUser>,
    /// Event timestamp.
    pub event_ts: String,
}

/// Invitation received.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SharedChannelInviteReceivedEvent {
    /// The invitation.
    pub invite: Option<SharedInvite>,
    /// The channel.
    pub channel: Option<SharedChannel>,
    /// Event timestamp.
    pub event_ts: String,
}

/// A member asked for an external invitation to be sent.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SharedChannelInviteRequestedEvent {
    /// Requesting user.
    pub actor: Actor,
    /// Channel id.
    pub channel_id: String,
    /// Request type.
    pub event_type: String,
    /// Channel name.
    pub channel_name: String,
    /// Channel type.
    pub channel_type: String,
    /// Invitees.
    pub target_users: Vec<TargetUser>,
    /// Teams in the channel.
    pub teams_in_channel: Vec<EventTeam>,
    /// Limited external access.
    pub is_external_limited: bool,
    /// Channel creation time.
    pub channel_date_created: i64,
    /// Latest counted message timestamp.
    pub channel_message_latest_counted_timestamp: i64,
}

/// Requesting user in a [`SharedChannelInviteRequestedEvent`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Actor {
    /// User id.
    pub id: String,
    /// Handle.
    pub name: String,
    /// Bot user.
    pub is_bot: bool,
    /// Team.
    pub team_id: String,
    /// Time zone.
    pub timezone: String,
    /// Real name.
    pub real_name: String,
    /// Display name.
    pub display_name: String,
}

/// Invitee.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetUser {
    /// Email.
    pub email: String,
    /// Invite id.
    pub invite_id: String,
}
