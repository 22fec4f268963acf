//! User groups.

use serde::{Deserialize, Serialize};

/// A user group created or updated.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubteamEvent {
    /// The group.
    pub subteam: Subteam,
}

/// Group created.
pub type SubteamCreatedEvent = SubteamEvent;
/// Group updated.
pub type SubteamUpdatedEvent = SubteamEvent;

/// User group.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Subteam {
    /// Group id.
    pub id: String,
    /// Team.
    pub team_id: String,
    /// Always true for user groups.
    pub is_usergroup: bool,
    /// Name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Mention handle.
    pub handle: String,
    /// Managed by an external directory.
    pub is_external: bool,
    /// Creation time.
    pub date_create: i64,
    /// Last update.
    pub date_update: i64,
    /// Deletion time, 0 when active.
    pub date_delete: i64,
    /// `admin`, `owner` or empty.
    pub auto_type: String,
    /// Creator.
    pub created_by: String,
    /// Last updater.
    pub updated_by: String,
    /// Deleter.
    pub deleted_by: String,
    /// Default channels.
    pub prefs: SubteamPrefs,
    /// Members.
    pub users: Vec<String>,
    /// Member count.
    pub user_count: u32,
}

/// Default conversations of a group.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubteamPrefs {
    /// Public channels.
    pub channels: Vec<String>,
    /// Private channels.
    pub groups: Vec<String>,
}

/// Membership of a group changed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubteamMembersChangedEvent {
    /// Group id.
    pub subteam_id: String,
    /// Team.
    pub team_id: String,
    /// Previous update time.
    pub date_previous_update: i64,
    /// This update time.
    pub date_update: i64,
    /// Added members.
    pub added_users: Vec<String>,
    /// Count of added members.
    pub added_users_count: u32,
    /// Removed members.
    pub removed_users: Vec<String>,
    /// Count of removed members.
    pub removed_users_count: u32,
}

/// The current user joined or left a group.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubteamSelfEvent {
    /// Group id.
    pub subteam_id: String,
}

/// Self added.
pub type SubteamSelfAddedEvent = SubteamSelfEvent;
/// Self removed.
pub type SubteamSelfRemovedEvent = SubteamSelfEvent;
