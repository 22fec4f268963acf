//! App lifecycle, assistant threads, calls and workflow functions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::common::{Edited, TeamRef};

/// App deleted from the workspace.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppDeletedEvent {
    /// App id.
    pub app_id: String,
    /// App name.
    pub app_name: String,
    /// Owner user id.
    pub app_owner_id: String,
    /// Team id.
    pub team_id: String,
    /// Team domain.
    pub team_domain: String,
    /// Event timestamp.
    pub event_ts: String,
}

/// App installed into a workspace. `app_uninstalled_team` shares the shape.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppInstalledEvent {
    /// App id.
    pub app_id: String,
    /// App name.
    pub app_name: String,
    /// Owner user id.
    pub app_owner_id: String,
    /// Installing user.
    pub user_id: String,
    /// Team id.
    pub team_id: String,
    /// Team domain.
    pub team_domain: String,
    /// Event timestamp.
    pub event_ts: String,
}

/// App removed from a single team.
pub type AppUninstalledTeamEvent = AppInstalledEvent;

/// App uninstalled. Carries nothing but its discriminator.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppUninstalledEvent {}

/// User opened the app home tab.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppHomeOpenedEvent {
    /// User who opened the tab.
    pub user: String,
    /// App DM channel.
    pub channel: String,
    /// Event timestamp.
    pub event_ts: String,
    /// `home` or `messages`.
    pub tab: String,
    /// Published view, kept opaque.
    pub view: Option<Value>,
}

/// The app was mentioned in a message.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppMentionEvent {
    /// Author.
    pub user: String,
    /// Message text including the mention.
    pub text: String,
    /// Message timestamp.
    pub ts: String,
    /// Parent thread timestamp.
    pub thread_ts: String,
    /// Channel.
    pub channel: String,
    /// Event timestamp.
    pub event_ts: String,
    /// Author's team.
    pub user_team: String,
    /// Originating team.
    pub source_team: String,
    /// Set when a bot mentioned the app.
    pub bot_id: String,
    /// Present on edited mentions.
    pub edited: Option<Edited>,
}

/// A user asked for the app to be approved.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppRequestedEvent {
    /// The request.
    pub app_request: AppRequest,
}

/// Body of an [`AppRequestedEvent`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppRequest {
    /// Request id.
    pub id: String,
    /// Requested app.
    pub app: RequestedApp,
    /// Outcome of an earlier request for the same app.
    pub previous_resolution: Option<PreviousResolution>,
    /// Requesting user.
    pub user: RequestUser,
    /// Requesting team.
    pub team: TeamRef,
    /// Enterprise, when on an org.
    pub enterprise: Option<Value>,
    /// Requested scopes.
    pub scopes: Vec<Scope>,
    /// Free-text justification.
    pub message: String,
}

/// App described in an [`AppRequest`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestedApp {
    /// App id.
    pub id: String,
    /// Name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Help page.
    pub help_url: String,
    /// Privacy policy.
    pub privacy_policy_url: String,
    /// Homepage.
    pub app_homepage_url: String,
    /// Directory listing.
    pub app_directory_url: String,
    /// Listed in the app directory.
    pub is_app_directory_approved: bool,
    /// Built for this org only.
    pub is_internal: bool,
    /// Extra information.
    pub additional_info: String,
}

/// Earlier decision on an app request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviousResolution {
    /// `approved`, `restricted`…
    pub status: String,
    /// Scopes the decision covered.
    pub scopes: Vec<Scope>,
}

/// OAuth scope.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scope {
    /// Scope name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Whether it exposes sensitive data.
    pub is_sensitive: bool,
    /// `bot` or `user`.
    pub token_type: String,
}

/// Requesting user.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestUser {
    /// User id.
    pub id: String,
    /// Name.
    pub name: String,
    /// Email.
    pub email: String,
}

/// Assistant thread opened. `assistant_thread_context_changed` shares the shape.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantThreadEvent {
    /// The thread.
    pub assistant_thread: AssistantThread,
    /// Event timestamp.
    pub event_ts: String,
}

/// Assistant thread context changed.
pub type AssistantThreadContextChangedEvent = AssistantThreadEvent;

/// Assistant thread state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantThread {
    /// User the assistant talks to.
    pub user_id: String,
    /// Where the user was when the thread started.
    pub context: AssistantThreadContext,
    /// Thread channel.
    pub channel_id: String,
    /// Thread timestamp.
    pub thread_ts: String,
}

/// Context of an assistant thread.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantThreadContext {
    /// Channel the user was viewing.
    pub channel_id: String,
    /// Team.
    pub team_id: String,
    /// Enterprise.
    pub enterprise_id: String,
}

/// A call was rejected. Arrives wrapped in its own outer envelope.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallRejectedEvent {
    /// Verification token.
    pub token: String,
    /// Team id.
    pub team_id: String,
    /// App id.
    pub api_app_id: String,
    /// Call details.
    pub event: CallRejection,
    /// Event id.
    pub event_id: String,
    /// Users the event is visible to.
    pub authed_users: Vec<String>,
}

/// Details of a rejected call.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallRejection {
    /// Call id.
    pub call_id: String,
    /// Rejecting user.
    pub user_id: String,
    /// Channel of the call.
    pub channel_id: String,
    /// Caller-supplied id.
    pub external_unique_id: String,
}

/// A custom workflow step function should run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FunctionExecutedEvent {
    /// Function definition.
    pub function: Function,
    /// Input values by parameter name.
    pub inputs: BTreeMap<String, Value>,
    /// Execution id for completing the function.
    pub function_execution_id: String,
    /// Enclosing workflow execution.
    pub workflow_execution_id: String,
    /// Event timestamp.
    pub event_ts: String,
    /// Short-lived token scoped to this execution.
    pub bot_access_token: String,
}

/// Definition of a workflow function.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Function {
    /// Function id.
    pub id: String,
    /// Callback id the app registered.
    pub callback_id: String,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Function type.
    #[serde(rename = "type")]
    pub function_type: String,
    /// Declared inputs.
    pub input_parameters: Vec<FunctionParameter>,
    /// Declared outputs.
    pub output_parameters: Vec<FunctionParameter>,
    /// Owning app.
    pub app_id: String,
    /// Creation time.
    pub date_created: i64,
    /// Last update.
    pub date_updated: i64,
    /// Deletion time.
    pub date_deleted: i64,
}

/// One declared function parameter.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FunctionParameter {
    /// Parameter type.
    #[serde(rename = "type")]
    pub parameter_type: String,
    /// Name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Title.
    pub title: String,
    /// Required input.
    pub is_required: bool,
}
