//! Shapes shared by several event kinds.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Edit marker on a message.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Edited {
    /// User who edited.
    pub user: String,
    /// Edit timestamp.
    pub ts: String,
}

/// Custom icon of a bot message.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Icon {
    /// Image URL.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub icon_url: String,
    /// Emoji shortcode.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub icon_emoji: String,
}

/// Message content as it appears nested in message events.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Msg {
    /// Always `"message"` when present.
    #[serde(rename = "type")]
    pub msg_type: String,
    /// Channel the message lives in.
    pub channel: String,
    /// Author.
    pub user: String,
    /// Message text.
    pub text: String,
    /// Message timestamp (also its id within the channel).
    pub ts: String,
    /// Parent thread timestamp.
    pub thread_ts: String,
    /// Message subtype.
    pub subtype: String,
    /// Present when the message was edited.
    pub edited: Option<Edited>,
    /// Bot author.
    pub bot_id: String,
    /// Bot display name.
    pub username: String,
    /// Author's team.
    pub team: String,
    /// Number of replies in the thread.
    pub reply_count: u32,
    /// Block Kit layout, kept opaque.
    pub blocks: Vec<Value>,
    /// Legacy attachments, kept opaque.
    pub attachments: Vec<Value>,
    /// Attached files.
    pub files: Vec<File>,
    /// Client-generated message id.
    pub client_msg_id: String,
}

/// Reference to a file or conversation by id.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectRef {
    /// Object id.
    pub id: String,
}

/// File metadata.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct File {
    /// File id.
    pub id: String,
    /// Creation time (unix seconds).
    pub created: i64,
    /// Upload time (unix seconds).
    pub timestamp: i64,
    /// File name.
    pub name: String,
    /// Title.
    pub title: String,
    /// MIME type.
    pub mimetype: String,
    /// File type short name.
    pub filetype: String,
    /// Human-readable type.
    pub pretty_type: String,
    /// Uploader.
    pub user: String,
    /// Size in bytes.
    pub size: i64,
    /// Hosting mode.
    pub mode: String,
    /// Whether the file is hosted externally.
    pub is_external: bool,
    /// Whether the file is public.
    pub is_public: bool,
    /// Private URL.
    pub url_private: String,
    /// Private download URL.
    pub url_private_download: String,
    /// Permalink.
    pub permalink: String,
}

/// File comment.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Comment {
    /// Comment id.
    pub id: String,
    /// Creation time.
    pub created: i64,
    /// Timestamp.
    pub timestamp: i64,
    /// Author.
    pub user: String,
    /// Comment body.
    pub comment: String,
}

/// Target of a reaction, pin or star.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Item {
    /// Item type (`message`, `file`, `file_comment`).
    #[serde(rename = "type")]
    pub item_type: String,
    /// Channel of a message item.
    pub channel: String,
    /// Message item.
    pub message: Option<ItemMessage>,
    /// File item.
    pub file: Option<File>,
    /// Comment item.
    pub comment: Option<Comment>,
    /// Message timestamp.
    pub ts: String,
}

/// Message embedded in an [`Item`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemMessage {
    /// Message type.
    #[serde(rename = "type")]
    pub msg_type: String,
    /// Author.
    pub user: String,
    /// Text.
    pub text: String,
    /// Timestamp.
    pub ts: String,
    /// Channels the message is pinned to.
    pub pinned_to: Vec<String>,
    /// Whether the message replaces the original.
    pub replace_original: bool,
    /// Whether the original is deleted.
    pub delete_original: bool,
}

/// Full user record.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    /// User id.
    pub id: String,
    /// Team id.
    pub team_id: String,
    /// Handle.
    pub name: String,
    /// Whether the account is deactivated.
    pub deleted: bool,
    /// Display colour.
    pub color: String,
    /// Real name.
    pub real_name: String,
    /// Time zone name.
    pub tz: String,
    /// Time zone label.
    pub tz_label: String,
    /// Offset from UTC in seconds.
    pub tz_offset: i64,
    /// Profile fields.
    pub profile: Profile,
    /// Workspace admin.
    pub is_admin: bool,
    /// Workspace owner.
    pub is_owner: bool,
    /// Primary owner.
    pub is_primary_owner: bool,
    /// Guest account.
    pub is_restricted: bool,
    /// Single-channel guest.
    pub is_ultra_restricted: bool,
    /// Bot user.
    pub is_bot: bool,
    /// App user.
    pub is_app_user: bool,
    /// Last update (unix seconds).
    pub updated: i64,
    /// Whether the email is confirmed.
    pub is_email_confirmed: bool,
    /// Contact card sharing policy.
    pub who_can_share_contact_card: String,
    /// Locale.
    pub locale: String,
}

/// User profile.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    /// Job title.
    pub title: String,
    /// Phone.
    pub phone: String,
    /// Skype handle.
    pub skype: String,
    /// Real name.
    pub real_name: String,
    /// Normalized real name.
    pub real_name_normalized: String,
    /// Display name.
    pub display_name: String,
    /// Normalized display name.
    pub display_name_normalized: String,
    /// Custom profile fields, kept opaque.
    pub fields: BTreeMap<String, Value>,
    /// Status text.
    pub status_text: String,
    /// Status emoji.
    pub status_emoji: String,
    /// Status expiry (unix seconds).
    pub status_expiration: i64,
    /// Avatar hash.
    pub avatar_hash: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Email address.
    pub email: String,
    /// 48px avatar.
    pub image_48: String,
    /// 192px avatar.
    pub image_192: String,
    /// Team id.
    pub team: String,
}

/// Team as described in shared channel events.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventTeam {
    /// Team id.
    pub id: String,
    /// Team name.
    pub name: String,
    /// Team icon.
    pub icon: Option<TeamIcon>,
    /// Avatar base URL.
    pub avatar_base_url: String,
    /// Verified organisation.
    pub is_verified: bool,
    /// Workspace domain.
    pub domain: String,
    /// Creation time (unix seconds).
    pub date_created: i64,
    /// Whether sponsorship is required.
    pub requires_sponsorship: bool,
}

/// Team icon.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamIcon {
    /// Whether the default image is used.
    pub image_default: bool,
    /// 34px image.
    pub image_34: String,
    /// 68px image.
    pub image_68: String,
    /// 132px image.
    pub image_132: String,
}

/// Compact user as described in shared channel events.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventUser {
    /// User id.
    pub id: String,
    /// Team id.
    pub team_id: String,
    /// Handle.
    pub name: String,
    /// Last update.
    pub updated: i64,
    /// Profile.
    pub profile: Option<Profile>,
    /// Contact card sharing policy.
    pub who_can_share_contact_card: String,
}

/// Minimal `{id, name, domain}` team reference.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamRef {
    /// Team id.
    pub id: String,
    /// Team name.
    pub name: String,
    /// Workspace domain.
    pub domain: String,
}

/// Structured metadata attached to a message.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageMetadata {
    /// Application-defined event type.
    pub event_type: String,
    /// Application-defined payload.
    pub event_payload: Value,
}
