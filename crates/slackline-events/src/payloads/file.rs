//! File lifecycle.

use serde::{Deserialize, Serialize};

use super::common::ObjectRef;

/// A file event that names the file twice (id and `{id}`): change, created,
/// public, unshared.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRefEvent {
    /// File id.
    pub file_id: String,
    /// The file.
    pub file: ObjectRef,
}

/// File changed.
pub type FileChangeEvent = FileRefEvent;
/// File created.
pub type FileCreatedEvent = FileRefEvent;
/// File made public.
pub type FilePublicEvent = FileRefEvent;
/// File unshared.
pub type FileUnsharedEvent = FileRefEvent;

/// File deleted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDeletedEvent {
    /// File id.
    pub file_id: String,
    /// Event timestamp.
    pub event_ts: String,
}

/// File shared into a conversation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSharedEvent {
    /// Target conversation.
    pub channel_id: String,
    /// File id.
    pub file_id: String,
    /// Sharing user.
    pub user_id: String,
    /// The file.
    pub file: ObjectRef,
    /// Event timestamp.
    pub event_ts: String,
}
