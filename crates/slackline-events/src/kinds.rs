//! The event catalogue table.
//!
//! Everything here is produced by [`define_events!`] from the table below.
//! Add a kind by adding a line; the enum, the typed event, the catalogue
//! entry and the domain helpers follow.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::normalize;
use crate::payloads::{
    app, channel, connection, file, item, message, shared_channel, subteam, team, user,
};

/// Fallback for a discriminator the catalogue does not know.
#[derive(Clone, Debug, PartialEq)]
pub struct UnrecognizedEvent {
    /// The discriminator as it appeared on the wire.
    pub event_type: String,
    /// The whole document, untouched.
    pub raw: Value,
}

define_events! {
    events {
        // ── connection ──
        /// Connection is ready.
        Hello => "hello" => connection::HelloEvent,
        /// Server will close the connection.
        Goodbye => "goodbye" => connection::GoodbyeEvent,
        /// Reply to a liveness probe.
        Pong => "pong" => connection::PongEvent,

        // ── app ──
        /// App deleted.
        AppDeleted => "app_deleted" => app::AppDeletedEvent,
        /// App home tab opened.
        AppHomeOpened => "app_home_opened" => app::AppHomeOpenedEvent,
        /// App installed.
        AppInstalled => "app_installed" => app::AppInstalledEvent,
        /// App mentioned.
        AppMention => "app_mention" => app::AppMentionEvent,
        /// App approval requested.
        AppRequested => "app_requested" => app::AppRequestedEvent,
        /// App uninstalled.
        AppUninstalled => "app_uninstalled" => app::AppUninstalledEvent,
        /// App uninstalled from one team.
        AppUninstalledTeam => "app_uninstalled_team" => app::AppUninstalledTeamEvent,
        /// Assistant thread context changed.
        AssistantThreadContextChanged => "assistant_thread_context_changed" => app::AssistantThreadContextChangedEvent,
        /// Assistant thread started.
        AssistantThreadStarted => "assistant_thread_started" => app::AssistantThreadEvent,
        /// Call rejected.
        CallRejected => "call_rejected" => app::CallRejectedEvent,
        /// Workflow function invoked.
        FunctionExecuted => "function_executed" => app::FunctionExecutedEvent,

        // ── channel ──
        /// Channel archived.
        ChannelArchive => "channel_archive" => channel::ChannelArchiveEvent,
        /// Channel created.
        ChannelCreated => "channel_created" => channel::ChannelCreatedEvent,
        /// Channel deleted.
        ChannelDeleted => "channel_deleted" => channel::ChannelDeletedEvent,
        /// Channel history changed.
        ChannelHistoryChanged => "channel_history_changed" => channel::ChannelHistoryChangedEvent,
        /// Channel id changed.
        ChannelIdChanged => "channel_id_changed" => channel::ChannelIdChangedEvent,
        /// Left a channel.
        ChannelLeft => "channel_left" => channel::ChannelLeftEvent,
        /// Channel renamed.
        ChannelRename => "channel_rename" => channel::ChannelRenameEvent,
        /// Channel shared externally.
        ChannelShared => "channel_shared" => channel::ChannelSharedEvent,
        /// Channel unarchived.
        ChannelUnarchive => "channel_unarchive" => channel::ChannelUnarchiveEvent,
        /// Channel unshared.
        ChannelUnshared => "channel_unshared" => channel::ChannelUnsharedEvent,
        /// Member joined a channel.
        MemberJoinedChannel => "member_joined_channel" => channel::MemberJoinedChannelEvent,
        /// Member left a channel.
        MemberLeftChannel => "member_left_channel" => channel::MemberLeftChannelEvent,

        // ── group ──
        /// Private channel archived.
        GroupArchive => "group_archive" => channel::GroupArchiveEvent,
        /// Private channel closed.
        GroupClose => "group_close" => channel::GroupCloseEvent,
        /// Private channel deleted.
        GroupDeleted => "group_deleted" => channel::GroupDeletedEvent,
        /// Private channel history changed.
        GroupHistoryChanged => "group_history_changed" => channel::GroupHistoryChangedEvent,
        /// Left a private channel.
        GroupLeft => "group_left" => channel::GroupLeftEvent,
        /// Private channel opened.
        GroupOpen => "group_open" => channel::GroupOpenEvent,
        /// Private channel renamed.
        GroupRename => "group_rename" => channel::GroupRenameEvent,
        /// Private channel unarchived.
        GroupUnarchive => "group_unarchive" => channel::GroupUnarchiveEvent,

        // ── im ──
        /// DM closed.
        ImClose => "im_close" => channel::ImCloseEvent,
        /// DM created.
        ImCreated => "im_created" => channel::ImCreatedEvent,
        /// DM history changed.
        ImHistoryChanged => "im_history_changed" => channel::ImHistoryChangedEvent,
        /// DM opened.
        ImOpen => "im_open" => channel::ImOpenEvent,

        // ── file ──
        /// File changed.
        FileChange => "file_change" => file::FileChangeEvent,
        /// File created.
        FileCreated => "file_created" => file::FileCreatedEvent,
        /// File deleted.
        FileDeleted => "file_deleted" => file::FileDeletedEvent,
        /// File made public.
        FilePublic => "file_public" => file::FilePublicEvent,
        /// File shared.
        FileShared => "file_shared" => file::FileSharedEvent,
        /// File unshared.
        FileUnshared => "file_unshared" => file::FileUnsharedEvent,

        // ── message ──
        /// Message posted, edited or deleted.
        Message => "message" => message::MessageEvent => normalize::message,
        /// Message metadata deleted.
        MessageMetadataDeleted => "message_metadata_deleted" => message::MessageMetadataDeletedEvent,
        /// Message metadata posted.
        MessageMetadataPosted => "message_metadata_posted" => message::MessageMetadataPostedEvent,
        /// Message metadata updated.
        MessageMetadataUpdated => "message_metadata_updated" => message::MessageMetadataUpdatedEvent,
        /// Links shared for unfurling.
        LinkShared => "link_shared" => message::LinkSharedEvent,

        // ── item ──
        /// Item pinned.
        PinAdded => "pin_added" => item::PinAddedEvent,
        /// Item unpinned.
        PinRemoved => "pin_removed" => item::PinRemovedEvent,
        /// Reaction added.
        ReactionAdded => "reaction_added" => item::ReactionAddedEvent,
        /// Reaction removed.
        ReactionRemoved => "reaction_removed" => item::ReactionRemovedEvent,
        /// Item starred.
        StarAdded => "star_added" => item::StarAddedEvent,
        /// Item unstarred.
        StarRemoved => "star_removed" => item::StarRemovedEvent,

        // ── shared channel invites ──
        /// Invite accepted.
        SharedChannelInviteAccepted => "shared_channel_invite_accepted" => shared_channel::SharedChannelInviteAcceptedEvent,
        /// Invite approved.
        SharedChannelInviteApproved => "shared_channel_invite_approved" => shared_channel::SharedChannelInviteApprovedEvent,
        /// Invite declined.
        SharedChannelInviteDeclined => "shared_channel_invite_declined" => shared_channel::SharedChannelInviteDeclinedEvent,
        /// Invite received.
        SharedChannelInviteReceived => "shared_channel_invite_received" => shared_channel::SharedChannelInviteReceivedEvent,
        /// Invite requested.
        SharedChannelInviteRequested => "shared_channel_invite_requested" => shared_channel::SharedChannelInviteRequestedEvent,

        // ── subteam ──
        /// User group created.
        SubteamCreated => "subteam_created" => subteam::SubteamCreatedEvent,
        /// User group membership changed.
        SubteamMembersChanged => "subteam_members_changed" => subteam::SubteamMembersChangedEvent,
        /// Joined a user group.
        SubteamSelfAdded => "subteam_self_added" => subteam::SubteamSelfAddedEvent,
        /// Left a user group.
        SubteamSelfRemoved => "subteam_self_removed" => subteam::SubteamSelfRemovedEvent,
        /// User group updated.
        SubteamUpdated => "subteam_updated" => subteam::SubteamUpdatedEvent,

        // ── team ──
        /// Slash commands changed.
        CommandsChanged => "commands_changed" => team::CommandsChangedEvent,
        /// Own do-not-disturb changed.
        DndUpdated => "dnd_updated" => team::DndUpdatedEvent,
        /// Member do-not-disturb changed.
        DndUpdatedUser => "dnd_updated_user" => team::DndUpdatedUserEvent,
        /// Email domain changed.
        EmailDomainChanged => "email_domain_changed" => team::EmailDomainChangedEvent,
        /// Custom emoji changed.
        EmojiChanged => "emoji_changed" => team::EmojiChangedEvent,
        /// Grid migration finished.
        GridMigrationFinished => "grid_migration_finished" => team::GridMigrationFinishedEvent,
        /// Grid migration started.
        GridMigrationStarted => "grid_migration_started" => team::GridMigrationStartedEvent,
        /// Invite requested.
        InviteRequested => "invite_requested" => team::InviteRequestedEvent,
        /// Team access granted.
        TeamAccessGranted => "team_access_granted" => team::TeamAccessGrantedEvent,
        /// Team access revoked.
        TeamAccessRevoked => "team_access_revoked" => team::TeamAccessRevokedEvent,
        /// Team domain changed.
        TeamDomainChange => "team_domain_change" => team::TeamDomainChangeEvent,
        /// New member joined.
        TeamJoin => "team_join" => team::TeamJoinEvent,
        /// Team renamed.
        TeamRename => "team_rename" => team::TeamRenameEvent,
        /// Tokens revoked.
        TokensRevoked => "tokens_revoked" => team::TokensRevokedEvent,

        // ── user ──
        /// User record changed.
        UserChange => "user_change" => user::UserChangeEvent,
        /// Huddle state changed.
        UserHuddleChanged => "user_huddle_changed" => user::UserHuddleChangedEvent,
        /// Profile changed.
        UserProfileChanged => "user_profile_changed" => user::UserProfileChangedEvent,
        /// Status changed.
        UserStatusChanged => "user_status_changed" => user::UserStatusChangedEvent,
    }
    domain_groups {
        /// Connection control frames.
        is_connection_type => [Hello, Goodbye, Pong],
        /// App lifecycle and app-directed events.
        is_app_type => [
            AppDeleted, AppHomeOpened, AppInstalled, AppMention, AppRequested,
            AppUninstalled, AppUninstalledTeam, AssistantThreadContextChanged,
            AssistantThreadStarted, CallRejected, FunctionExecuted,
        ],
        /// Public channel events.
        is_channel_type => [
            ChannelArchive, ChannelCreated, ChannelDeleted, ChannelHistoryChanged,
            ChannelIdChanged, ChannelLeft, ChannelRename, ChannelShared,
            ChannelUnarchive, ChannelUnshared, MemberJoinedChannel, MemberLeftChannel,
        ],
        /// Private channel events.
        is_group_type => [
            GroupArchive, GroupClose, GroupDeleted, GroupHistoryChanged,
            GroupLeft, GroupOpen, GroupRename, GroupUnarchive,
        ],
        /// Direct message events.
        is_im_type => [ImClose, ImCreated, ImHistoryChanged, ImOpen],
        /// File events.
        is_file_type => [FileChange, FileCreated, FileDeleted, FilePublic, FileShared, FileUnshared],
        /// Message events.
        is_message_type => [
            Message, MessageMetadataDeleted, MessageMetadataPosted,
            MessageMetadataUpdated, LinkShared,
        ],
        /// Reaction, pin and star events.
        is_item_type => [PinAdded, PinRemoved, ReactionAdded, ReactionRemoved, StarAdded, StarRemoved],
        /// Shared channel invitation events.
        is_shared_channel_type => [
            SharedChannelInviteAccepted, SharedChannelInviteApproved,
            SharedChannelInviteDeclined, SharedChannelInviteReceived,
            SharedChannelInviteRequested,
        ],
        /// User group events.
        is_subteam_type => [
            SubteamCreated, SubteamMembersChanged, SubteamSelfAdded,
            SubteamSelfRemoved, SubteamUpdated,
        ],
        /// Workspace-wide events.
        is_team_type => [
            CommandsChanged, DndUpdated, DndUpdatedUser, EmailDomainChanged, EmojiChanged,
            GridMigrationFinished, GridMigrationStarted, InviteRequested, TeamAccessGranted,
            TeamAccessRevoked, TeamDomainChange, TeamJoin, TeamRename, TokensRevoked,
        ],
        /// User record events.
        is_user_type => [UserChange, UserHuddleChanged, UserProfileChanged, UserStatusChanged],
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogue_size() {
        assert_eq!(ALL_EVENT_KINDS.len(), 83);
    }

    #[test]
    fn wire_strings_roundtrip() {
        for kind in ALL_EVENT_KINDS {
            let parsed: EventKind = kind.as_str().parse().unwrap();
            assert_eq!(parsed, kind);
            assert_eq!(kind.to_string(), kind.as_str());
        }
    }

    #[test]
    fn serde_uses_wire_string() {
        let json = serde_json::to_string(&EventKind::ReactionAdded).unwrap();
        assert_eq!(json, "\"reaction_added\"");
        let back: EventKind = serde_json::from_str("\"channel_id_changed\"").unwrap();
        assert_eq!(back, EventKind::ChannelIdChanged);
    }

    #[test]
    fn unknown_kind_does_not_parse() {
        let err = "workflow_step_execute".parse::<EventKind>().unwrap_err();
        assert_eq!(err, "unknown event kind: workflow_step_execute");
    }

    #[test]
    fn every_kind_in_exactly_one_group() {
        for kind in ALL_EVENT_KINDS {
            let groups = [
                kind.is_connection_type(),
                kind.is_app_type(),
                kind.is_channel_type(),
                kind.is_group_type(),
                kind.is_im_type(),
                kind.is_file_type(),
                kind.is_message_type(),
                kind.is_item_type(),
                kind.is_shared_channel_type(),
                kind.is_subteam_type(),
                kind.is_team_type(),
                kind.is_user_type(),
            ];
            let n = groups.iter().filter(|g| **g).count();
            assert_eq!(n, 1, "{kind} is in {n} groups");
        }
    }

    #[test]
    fn only_message_is_normalized() {
        let normalized: Vec<_> = ALL_EVENT_KINDS
            .into_iter()
            .filter(|k| k.is_normalized())
            .collect();
        assert_eq!(normalized, vec![EventKind::Message]);
    }

    #[test]
    fn discriminator_of_fallback() {
        let event = TypedEvent::Unrecognized(UnrecognizedEvent {
            event_type: "future_thing".into(),
            raw: serde_json::json!({"type": "future_thing"}),
        });
        assert_eq!(event.discriminator(), "future_thing");
        assert_eq!(event.kind(), None);
    }
}
