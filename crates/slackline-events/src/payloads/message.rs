//! Messages, message metadata, and link unfurl requests.

use serde::{Deserialize, Serialize};

use super::common::{Icon, MessageMetadata, Msg};

/// Subtype marking a deletion notification.
pub const SUBTYPE_MESSAGE_DELETED: &str = "message_deleted";
/// Subtype marking an edit notification.
pub const SUBTYPE_MESSAGE_CHANGED: &str = "message_changed";

/// A message posted, edited, or deleted in a conversation.
///
/// The root carries whatever the wire put there. [`Self::message`] is the
/// canonical content after normalization: the nested payload for edits, the
/// root copied down for plain posts, and `None` for deletions.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageEvent {
    /// Client-generated id.
    pub client_msg_id: String,
    /// Author.
    pub user: String,
    /// Text.
    pub text: String,
    /// Parent thread timestamp.
    pub thread_ts: String,
    /// Message timestamp.
    pub ts: String,
    /// Conversation id.
    pub channel: String,
    /// `channel`, `group`, `im` or `mpim`.
    pub channel_type: String,
    /// Event timestamp.
    pub event_ts: String,
    /// Author's team.
    pub user_team: String,
    /// Originating team.
    pub source_team: String,
    /// Canonical content.
    pub message: Option<Msg>,
    /// Thread parent, on thread broadcasts.
    pub root: Option<Msg>,
    /// Content before an edit or deletion.
    pub previous_message: Option<Msg>,
    /// Timestamp of the deleted message.
    pub deleted_ts: String,
    /// Message subtype.
    pub subtype: String,
    /// Bot author.
    pub bot_id: String,
    /// Bot display name.
    pub username: String,
    /// Bot icon override.
    pub icons: Option<Icon>,
}

impl MessageEvent {
    /// Canonical content, `None` for deletions.
    pub fn content(&self) -> Option<&Msg> {
        self.message.as_ref()
    }

    /// Whether the canonical content carries an edit marker.
    pub fn is_edited(&self) -> bool {
        self.message.as_ref().is_some_and(|m| m.edited.is_some())
    }

    /// Whether this notification removes a message.
    pub fn is_deletion(&self) -> bool {
        self.subtype == SUBTYPE_MESSAGE_DELETED || self.message.is_none()
    }
}

/// Metadata attached to a newly posted message.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageMetadataPostedEvent {
    /// App that posted.
    pub app_id: String,
    /// Bot that posted.
    pub bot_id: String,
    /// User that posted.
    pub user_id: String,
    /// Team.
    pub team_id: String,
    /// Conversation.
    pub channel_id: String,
    /// The metadata.
    pub metadata: Option<MessageMetadata>,
    /// Message timestamp.
    pub message_ts: String,
    /// Event timestamp.
    pub event_ts: String,
}

/// Metadata on a message was replaced.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageMetadataUpdatedEvent {
    /// Conversation.
    pub channel_id: String,
    /// Event timestamp.
    pub event_ts: String,
    /// Metadata before the update.
    pub previous_metadata: Option<MessageMetadata>,
    /// App that updated.
    pub app_id: String,
    /// Bot that updated.
    pub bot_id: String,
    /// User that updated.
    pub user_id: String,
    /// Team.
    pub team_id: String,
    /// Message timestamp.
    pub message_ts: String,
    /// Metadata after the update.
    pub metadata: Option<MessageMetadata>,
}

/// A message carrying metadata was deleted.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageMetadataDeletedEvent {
    /// Conversation.
    pub channel_id: String,
    /// Event timestamp.
    pub event_ts: String,
    /// Metadata that was removed.
    pub previous_metadata: Option<MessageMetadata>,
    /// App.
    pub app_id: String,
    /// Bot.
    pub bot_id: String,
    /// User.
    pub user_id: String,
    /// Team.
    pub team_id: String,
    /// Message timestamp.
    pub message_ts: String,
    /// Deletion timestamp.
    pub deleted_ts: String,
}

/// A message contains links on domains the app unfurls.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkSharedEvent {
    /// Author.
    pub user: String,
    /// Timestamp.
    pub ts: String,
    /// Conversation.
    pub channel: String,
    /// Message containing the links.
    pub message_ts: String,
    /// Parent thread timestamp.
    pub thread_ts: String,
    /// Links to unfurl.
    pub links: Vec<SharedLink>,
    /// Event timestamp.
    pub event_ts: String,
}

/// One link in a [`LinkSharedEvent`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SharedLink {
    /// Registered domain.
    pub domain: String,
    /// Full URL.
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payloads::common::Edited;

    #[test]
    fn deletion_without_content() {
        let e = MessageEvent {
            subtype: SUBTYPE_MESSAGE_DELETED.into(),
            ..MessageEvent::default()
        };
        assert!(e.is_deletion());
        assert!(e.content().is_none());
        assert!(!e.is_edited());
    }

    #[test]
    fn edited_content() {
        let e = MessageEvent {
            subtype: SUBTYPE_MESSAGE_CHANGED.into(),
            message: Some(Msg {
                text: "edited".into(),
                edited: Some(Edited {
                    user: "U1".into(),
                    ts: "1.2".into(),
                }),
                ..Msg::default()
            }),
            ..MessageEvent::default()
        };
        assert!(e.is_edited());
        assert!(!e.is_deletion());
        assert_eq!(e.content().map(|m| m.text.as_str()), Some("edited"));
    }
}
