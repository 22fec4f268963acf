//! `TestServer`: Axum HTTP + WebSocket fake of the chat service.
//!
//! Frames the server pushes to clients are recorded as outbound; frames
//! clients send (other than liveness probes) and messages posted over REST
//! are recorded as inbound. Assertions read those records.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use axum::Router;
use axum::extract::rejection::FormRejection;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Form, State};
use axum::response::{Json, Response};
use axum::routing::{MethodRouter, any, get};
use futures::{SinkExt, StreamExt};
use parking_lot::{Mutex, RwLock};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use slackline_session::{Direction, ObservationLog};
use slackline_settings::TestServerSettings;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, instrument, warn};

use crate::api::{AuthTestResponse, ConnectResponse, Identity, PostMessageResponse, TokenResponse};
use crate::errors::TestServerError;
use crate::hub::Hub;

/// Author of messages the server sends on behalf of a human.
pub const DEFAULT_NON_BOT_USER_ID: &str = "W012A3CDE";
/// Conversation used for direct messages to the bot.
pub const DIRECT_MESSAGE_CHANNEL: &str = "D024BE91L";
/// Workspace id reported by the fake.
pub const TEAM_ID: &str = "T024BE7LD";
/// Workspace name reported by the fake.
pub const TEAM_NAME: &str = "testteam";

const HELLO: &str = r#"{"type":"hello"}"#;
const TOKEN_TTL_SECS: i64 = 43_200;
const STOP_TIMEOUT: Duration = Duration::from_secs(5);

// ─────────────────────────────────────────────────────────────────────────────
// Shared state
// ─────────────────────────────────────────────────────────────────────────────

/// State reachable from every handler.
pub(crate) struct ServerState {
    bot_name: RwLock<String>,
    bot_id: String,
    configured: String,
    addr: RwLock<Option<SocketAddr>>,
    hub: Hub,
    log: Arc<ObservationLog>,
    ts_counter: AtomicU64,
    tokens_issued: AtomicU64,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    channel: &'a str,
    user: &'a str,
    text: &'a str,
    ts: &'a str,
}

impl ServerState {
    fn host_port(&self) -> String {
        self.addr
            .read()
            .map_or_else(|| self.configured.clone(), |addr| addr.to_string())
    }

    fn api_url(&self) -> String {
        format!("http://{}/", self.host_port())
    }

    fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.host_port())
    }

    /// Unique message timestamp, `seconds.sequence`.
    fn next_ts(&self) -> String {
        let seq = self.ts_counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}.{seq:06}", chrono::Utc::now().timestamp())
    }

    fn message_frame(&self, channel: &str, user: &str, text: &str) -> String {
        let ts = self.next_ts();
        let message = ChatMessage {
            kind: "message",
            channel,
            user,
            text,
            ts: &ts,
        };
        // A struct of strings always serializes.
        serde_json::to_string(&message).unwrap_or_default()
    }

    /// Record as outbound and push to clients.
    fn queue(&self, frame: String) {
        let frame: Arc<str> = frame.into();
        self.log.observe(Direction::Outbound, Arc::clone(&frame));
        self.hub.broadcast(frame);
    }

    /// React to a frame from a client. Returns the reply to send back, if any.
    fn handle_client_frame(&self, text: &str) -> Option<String> {
        let Ok(doc) = serde_json::from_str::<Value>(text) else {
            self.log.observe(Direction::Inbound, text);
            return None;
        };
        match doc.get("type").and_then(Value::as_str) {
            Some("ping") => {
                let mut pong = json!({ "type": "pong" });
                for key in ["id", "reply_to"] {
                    if let Some(value) = doc.get(key) {
                        pong[key] = value.clone();
                    }
                }
                Some(pong.to_string())
            }
            Some("message") => {
                self.log.observe(Direction::Inbound, text);
                let id = doc.get("id")?;
                let ack = json!({
                    "ok": true,
                    "reply_to": id,
                    "ts": self.next_ts(),
                    "text": doc.get("text").cloned().unwrap_or(Value::Null),
                });
                Some(ack.to_string())
            }
            _ => {
                self.log.observe(Direction::Inbound, text);
                None
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Builder
// ─────────────────────────────────────────────────────────────────────────────

/// Configures a [`TestServer`].
pub struct TestServerBuilder {
    host: String,
    port: u16,
    bot_name: String,
    bot_id: String,
    custom: Vec<(String, MethodRouter)>,
}

impl Default for TestServerBuilder {
    fn default() -> Self {
        Self::from_settings(&TestServerSettings::default())
    }
}

impl TestServerBuilder {
    /// Start from loaded settings.
    pub fn from_settings(settings: &TestServerSettings) -> Self {
        Self {
            host: settings.host.clone(),
            port: settings.port,
            bot_name: settings.bot_name.clone(),
            bot_id: settings.bot_id.clone(),
            custom: Vec::new(),
        }
    }

    /// Bind address.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Bind port. `0` picks a free one.
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Display name of the bot.
    #[must_use]
    pub fn bot_name(mut self, name: impl Into<String>) -> Self {
        self.bot_name = name.into();
        self
    }

    /// User id of the bot.
    #[must_use]
    pub fn bot_id(mut self, id: impl Into<String>) -> Self {
        self.bot_id = id.into();
        self
    }

    /// Serve `path` with `handler`.
    ///
    /// Custom routes take precedence over built-in ones. Registering the
    /// same path twice keeps the first handler.
    #[must_use]
    pub fn route(mut self, path: impl Into<String>, handler: MethodRouter) -> Self {
        self.custom.push((path.into(), handler));
        self
    }

    /// Assemble the server. Nothing is bound until [`TestServer::start`].
    pub fn build(self) -> TestServer {
        let configured = format!("{}:{}", self.host, self.port);
        let state = Arc::new(ServerState {
            bot_name: RwLock::new(self.bot_name),
            bot_id: self.bot_id,
            configured: configured.clone(),
            addr: RwLock::new(None),
            hub: Hub::new(),
            log: Arc::new(ObservationLog::new()),
            ts_counter: AtomicU64::new(0),
            tokens_issued: AtomicU64::new(0),
        });

        let mut registered = HashSet::new();
        let mut custom = Router::new();
        for (path, handler) in self.custom {
            if registered.insert(path.clone()) {
                custom = custom.route(&path, handler);
            } else {
                debug!(path, "route already registered");
            }
        }

        let mut builtin = Router::new();
        for (path, handler) in builtin_routes() {
            if registered.insert(path.to_owned()) {
                builtin = builtin.route(path, handler);
            }
        }

        let router = builtin
            .with_state(Arc::clone(&state))
            .merge(custom)
            .layer(TraceLayer::new_for_http());

        TestServer {
            state,
            router,
            bind: configured,
            running: Mutex::new(None),
        }
    }
}

fn builtin_routes() -> Vec<(&'static str, MethodRouter<Arc<ServerState>>)> {
    vec![
        ("/ws", get(ws_handler)),
        ("/rtm.connect", any(rtm_connect)),
        ("/apps.connections.open", any(apps_connections_open)),
        ("/auth.test", any(auth_test)),
        ("/chat.postMessage", any(post_message)),
        ("/tooling.tokens.rotate", any(rotate_token)),
    ]
}

// ─────────────────────────────────────────────────────────────────────────────
// Server
// ─────────────────────────────────────────────────────────────────────────────

struct Running {
    addr: SocketAddr,
    shutdown: CancellationToken,
    task: JoinHandle<()>,
}

/// A fake chat server for tests.
pub struct TestServer {
    state: Arc<ServerState>,
    router: Router,
    bind: String,
    running: Mutex<Option<Running>>,
}

impl Default for TestServer {
    fn default() -> Self {
        Self::new()
    }
}

impl TestServer {
    /// Server with default settings.
    pub fn new() -> Self {
        TestServerBuilder::default().build()
    }

    /// Configure a server.
    pub fn builder() -> TestServerBuilder {
        TestServerBuilder::default()
    }

    /// The complete router, for driving handlers without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Bind and serve in the background.
    pub async fn start(&self) -> Result<SocketAddr, TestServerError> {
        if self.running.lock().is_some() {
            return Err(TestServerError::AlreadyStarted);
        }
        let listener = TcpListener::bind(&self.bind)
            .await
            .map_err(|source| TestServerError::Bind {
                addr: self.bind.clone(),
                source,
            })?;
        let addr = listener.local_addr().map_err(|source| TestServerError::Bind {
            addr: self.bind.clone(),
            source,
        })?;

        let mut running = self.running.lock();
        if running.is_some() {
            return Err(TestServerError::AlreadyStarted);
        }
        *self.state.addr.write() = Some(addr);

        let shutdown = CancellationToken::new();
        let signal = shutdown.clone();
        let router = self.router.clone();
        let task = tokio::spawn(async move {
            let served = axum::serve(listener, router)
                .with_graceful_shutdown(async move { signal.cancelled().await })
                .await;
            if let Err(err) = served {
                warn!(error = %err, "fake server stopped with error");
            }
        });

        *running = Some(Running {
            addr,
            shutdown,
            task,
        });
        info!(%addr, "fake server listening");
        Ok(addr)
    }

    /// Stop serving and disconnect every client. No-op when not running.
    pub async fn stop(&self) {
        let Some(running) = self.running.lock().take() else {
            return;
        };
        running.shutdown.cancel();
        self.state.hub.disconnect_all();
        if tokio::time::timeout(STOP_TIMEOUT, running.task).await.is_err() {
            warn!(addr = %running.addr, "fake server did not stop in time");
        }
        *self.state.addr.write() = None;
        info!(addr = %running.addr, "fake server stopped");
    }

    /// Bound address while running.
    pub fn addr(&self) -> Option<SocketAddr> {
        *self.state.addr.read()
    }

    /// Base URL of the REST endpoints, with a trailing slash.
    pub fn api_url(&self) -> String {
        self.state.api_url()
    }

    /// URL of the WebSocket feed.
    pub fn ws_url(&self) -> String {
        self.state.ws_url()
    }

    /// Connected WebSocket clients.
    pub fn client_count(&self) -> usize {
        self.state.hub.client_count()
    }

    // ── Pushing frames ──

    /// A message in `channel` that mentions the bot.
    pub fn send_message_to_bot(&self, channel: &str, msg: &str) {
        let text = format!("<@{}> {msg}", self.state.bot_id);
        let frame = self
            .state
            .message_frame(channel, DEFAULT_NON_BOT_USER_ID, &text);
        self.state.queue(frame);
    }

    /// A direct message to the bot.
    pub fn send_direct_message_to_bot(&self, msg: &str) {
        let frame = self
            .state
            .message_frame(DIRECT_MESSAGE_CHANNEL, DEFAULT_NON_BOT_USER_ID, msg);
        self.state.queue(frame);
    }

    /// A plain message in `channel`.
    pub fn send_message_to_channel(&self, channel: &str, msg: &str) {
        let frame = self
            .state
            .message_frame(channel, DEFAULT_NON_BOT_USER_ID, msg);
        self.state.queue(frame);
    }

    /// Push `frame` to clients as is.
    pub fn send_to_websocket(&self, frame: impl Into<String>) {
        self.state.queue(frame.into());
    }

    /// Tell the bot it joined a public channel.
    pub fn send_bot_channel_invite(&self) {
        let frame = json!({
            "type": "channel_joined",
            "channel": {
                "id": "C024BE92L",
                "name": "bot-playground",
                "is_channel": true,
                "created": 1_360_782_804,
                "creator": DEFAULT_NON_BOT_USER_ID,
                "is_archived": false,
                "is_general": true,
                "members": [DEFAULT_NON_BOT_USER_ID],
                "topic": { "value": "Fun times", "creator": DEFAULT_NON_BOT_USER_ID, "last_set": 1_360_782_804 },
                "purpose": { "value": "This channel is for fun", "creator": DEFAULT_NON_BOT_USER_ID, "last_set": 1_360_782_804 },
                "is_member": true,
            },
        });
        self.state.queue(frame.to_string());
    }

    /// Tell the bot it joined a private group.
    pub fn send_bot_group_invite(&self) {
        let frame = json!({
            "type": "group_joined",
            "channel": {
                "id": "G024BE91L",
                "name": "secretplans",
                "is_group": true,
                "created": 1_360_782_804,
                "creator": DEFAULT_NON_BOT_USER_ID,
                "is_archived": false,
                "members": [DEFAULT_NON_BOT_USER_ID],
                "topic": { "value": "Secret plans on hold", "creator": DEFAULT_NON_BOT_USER_ID, "last_set": 1_360_782_804 },
                "purpose": { "value": "Discuss secret plans that no-one else should know", "creator": DEFAULT_NON_BOT_USER_ID, "last_set": 1_360_782_804 },
            },
        });
        self.state.queue(frame.to_string());
    }

    // ── Assertions ──

    /// Frames received from clients, excluding probes.
    pub fn seen_inbound_messages(&self) -> Vec<Arc<str>> {
        self.state.log.all(Direction::Inbound)
    }

    /// Frames pushed to clients.
    pub fn seen_outbound_messages(&self) -> Vec<Arc<str>> {
        self.state.log.all(Direction::Outbound)
    }

    /// Whether a client sent a message with exactly this text.
    pub fn saw_incoming_message(&self, text: &str) -> bool {
        self.state.log.saw_text(Direction::Inbound, text)
    }

    /// Whether a client sent a message whose text matches `pattern`.
    ///
    /// An invalid pattern matches nothing.
    pub fn saw_incoming_message_matching(&self, pattern: &str) -> bool {
        self.saw_matching(Direction::Inbound, pattern)
    }

    /// Whether a message with exactly this text was pushed to clients.
    pub fn saw_outgoing_message(&self, text: &str) -> bool {
        self.state.log.saw_text(Direction::Outbound, text)
    }

    /// Whether a message whose text matches `pattern` was pushed to clients.
    pub fn saw_outgoing_message_matching(&self, pattern: &str) -> bool {
        self.saw_matching(Direction::Outbound, pattern)
    }

    fn saw_matching(&self, direction: Direction, pattern: &str) -> bool {
        match Regex::new(pattern) {
            Ok(re) => self.state.log.matches(direction, &re),
            Err(err) => {
                warn!(pattern, error = %err, "invalid pattern");
                false
            }
        }
    }

    /// The underlying traffic record.
    pub fn observations(&self) -> Arc<ObservationLog> {
        Arc::clone(&self.state.log)
    }

    /// Rename the bot.
    pub fn set_bot_name(&self, name: impl Into<String>) {
        *self.state.bot_name.write() = name.into();
    }

    /// Current bot name.
    pub fn bot_name(&self) -> String {
        self.state.bot_name.read().clone()
    }

    /// Bot user id.
    pub fn bot_id(&self) -> &str {
        &self.state.bot_id
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(running) = self.running.lock().take() {
            running.shutdown.cancel();
            self.state.hub.disconnect_all();
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// GET /ws
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<ServerState>>) -> Response {
    ws.on_upgrade(move |socket| client_session(socket, state))
}

#[instrument(skip_all, fields(client = tracing::field::Empty))]
async fn client_session(socket: WebSocket, state: Arc<ServerState>) {
    let (id, mut outbound) = state.hub.register();
    let _ = tracing::Span::current().record("client", id);
    debug!("client connected");
    let (mut tx, mut rx) = socket.split();

    if tx.send(Message::Text(HELLO.to_owned().into())).await.is_ok() {
        loop {
            tokio::select! {
                frame = outbound.recv() => match frame {
                    Some(frame) => {
                        if tx.send(Message::Text(frame.to_string().into())).await.is_err() {
                            break;
                        }
                    }
                    None => {
                        let _ = tx.send(Message::Close(None)).await;
                        break;
                    }
                },
                msg = rx.next() => match msg {
                    Some(Ok(Message::Text(text))) => {
                        if let Some(reply) = state.handle_client_frame(text.as_str()) {
                            if tx.send(Message::Text(reply.into())).await.is_err() {
                                break;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        debug!(error = %err, "client read failed");
                        break;
                    }
                },
            }
        }
    }

    state.hub.remove(id);
    debug!("client disconnected");
}

/// /rtm.connect
async fn rtm_connect(State(state): State<Arc<ServerState>>) -> Json<ConnectResponse> {
    Json(ConnectResponse {
        ok: true,
        url: state.ws_url(),
        bot: Some(Identity {
            id: state.bot_id.clone(),
            name: state.bot_name.read().clone(),
        }),
        team: Some(Identity {
            id: TEAM_ID.to_owned(),
            name: TEAM_NAME.to_owned(),
        }),
        ..ConnectResponse::default()
    })
}

/// /apps.connections.open
async fn apps_connections_open(State(state): State<Arc<ServerState>>) -> Json<ConnectResponse> {
    Json(ConnectResponse {
        ok: true,
        url: state.ws_url(),
        ..ConnectResponse::default()
    })
}

/// /auth.test
async fn auth_test(State(state): State<Arc<ServerState>>) -> Json<AuthTestResponse> {
    Json(AuthTestResponse {
        ok: true,
        url: format!("https://{TEAM_NAME}.slack.com/"),
        team: TEAM_NAME.to_owned(),
        user: state.bot_name.read().clone(),
        team_id: TEAM_ID.to_owned(),
        user_id: state.bot_id.clone(),
        ..AuthTestResponse::default()
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PostMessageForm {
    channel: String,
    text: String,
}

/// /chat.postMessage: record the post and deliver it to clients.
async fn post_message(
    State(state): State<Arc<ServerState>>,
    form: Result<Form<PostMessageForm>, FormRejection>,
) -> Json<PostMessageResponse> {
    let Ok(Form(form)) = form else {
        return Json(PostMessageResponse::failed("invalid_form_data"));
    };
    if form.channel.is_empty() {
        return Json(PostMessageResponse::failed("channel_not_found"));
    }
    let frame = state.message_frame(&form.channel, &state.bot_id, &form.text);
    let ts = serde_json::from_str::<Value>(&frame)
        .ok()
        .and_then(|doc| doc["ts"].as_str().map(str::to_owned))
        .unwrap_or_default();
    state.log.observe(Direction::Inbound, frame.as_str());
    state.queue(frame);
    Json(PostMessageResponse {
        ok: true,
        channel: form.channel,
        ts,
        ..PostMessageResponse::default()
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RotateForm {
    refresh_token: String,
}

/// /tooling.tokens.rotate
async fn rotate_token(
    State(state): State<Arc<ServerState>>,
    form: Result<Form<RotateForm>, FormRejection>,
) -> Json<TokenResponse> {
    let Ok(Form(form)) = form else {
        return Json(TokenResponse::failed("invalid_form_data"));
    };
    if form.refresh_token.is_empty() {
        return Json(TokenResponse::failed("invalid_refresh_token"));
    }
    let n = state.tokens_issued.fetch_add(1, Ordering::Relaxed) + 1;
    let iat = chrono::Utc::now().timestamp();
    Json(TokenResponse {
        ok: true,
        token: format!("xoxe.xoxp-1-rotated{n}"),
        refresh_token: format!("xoxe-1-refresh{n}"),
        team_id: TEAM_ID.to_owned(),
        user_id: state.bot_id.clone(),
        iat,
        exp: iat + TOKEN_TTL_SECS,
        ..TokenResponse::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiResponse;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    async fn call(router: Router, req: Request<Body>) -> (StatusCode, Value) {
        let resp = router.oneshot(req).await.unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), 64 * 1024).await.unwrap();
        let value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, value)
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn form_req(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(body.to_owned()))
            .unwrap()
    }

    #[tokio::test]
    async fn auth_test_reports_bot() {
        let server = TestServer::builder().bot_name("deploybot").bot_id("UDEPLOY").build();
        let (status, body) = call(server.router(), get_req("/auth.test")).await;
        assert_eq!(status, StatusCode::OK);
        let resp: AuthTestResponse = serde_json::from_value(body).unwrap();
        assert_eq!(resp.user, "deploybot");
        assert_eq!(resp.user_id, "UDEPLOY");
        assert_eq!(resp.team_id, TEAM_ID);
    }

    #[tokio::test]
    async fn set_bot_name_visible_in_responses() {
        let server = TestServer::new();
        server.set_bot_name("renamed");
        let (_, body) = call(server.router(), get_req("/rtm.connect")).await;
        assert_eq!(body["self"]["name"], "renamed");
        assert_eq!(server.bot_name(), "renamed");
    }

    #[tokio::test]
    async fn connect_endpoints_return_ws_url() {
        let server = TestServer::builder().port(4321).build();
        for path in ["/rtm.connect", "/apps.connections.open"] {
            let (_, body) = call(server.router(), get_req(path)).await;
            let resp: ConnectResponse = serde_json::from_value(body).unwrap();
            assert_eq!(resp.url, "ws://127.0.0.1:4321/ws", "{path}");
        }
    }

    #[tokio::test]
    async fn custom_route_wins_over_builtin() {
        let server = TestServer::builder()
            .route("/auth.test", get(|| async { Json(json!({"ok": false, "error": "invalid_auth"})) }))
            .route("/auth.test", get(|| async { Json(json!({"ok": true})) }))
            .route("/users.info", get(|| async { Json(json!({"ok": true, "user": {"id": "U1"}})) }))
            .build();

        let (_, body) = call(server.router(), get_req("/auth.test")).await;
        assert_eq!(body["error"], "invalid_auth");
        let (_, body) = call(server.router(), get_req("/users.info")).await;
        assert_eq!(body["user"]["id"], "U1");
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let (status, _) = call(TestServer::new().router(), get_req("/nope")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn post_message_records_and_queues() {
        let server = TestServer::new();
        let (_, body) = call(
            server.router(),
            form_req("/chat.postMessage", "channel=C1&text=build+green"),
        )
        .await;
        let resp: PostMessageResponse = serde_json::from_value(body).unwrap();
        let resp = resp.into_result().unwrap();
        assert_eq!(resp.channel, "C1");
        assert!(!resp.ts.is_empty());

        assert!(server.saw_incoming_message("build green"));
        assert!(server.saw_outgoing_message("build green"));
        assert_eq!(server.seen_outbound_messages().len(), 1);
    }

    #[tokio::test]
    async fn post_message_without_channel_fails() {
        let server = TestServer::new();
        let (_, body) = call(server.router(), form_req("/chat.postMessage", "text=hi")).await;
        assert_eq!(body["ok"], false);
        assert_eq!(body["error"], "channel_not_found");
        assert!(server.seen_inbound_messages().is_empty());
    }

    #[tokio::test]
    async fn rotate_issues_fresh_tokens() {
        let server = TestServer::new();
        let (_, body) = call(
            server.router(),
            form_req("/tooling.tokens.rotate", "refresh_token=xoxe-1-old"),
        )
        .await;
        let first: TokenResponse = serde_json::from_value(body).unwrap();
        let first = first.into_result().unwrap();
        assert_eq!(first.exp - first.iat, TOKEN_TTL_SECS);

        let (_, body) = call(
            server.router(),
            form_req("/tooling.tokens.rotate", "refresh_token=xoxe-1-old"),
        )
        .await;
        let second: TokenResponse = serde_json::from_value(body).unwrap();
        assert_ne!(first.token, second.token);

        let (_, body) = call(server.router(), form_req("/tooling.tokens.rotate", "")).await;
        assert_eq!(body["error"], "invalid_refresh_token");
    }

    #[test]
    fn message_to_bot_mentions_it() {
        let server = TestServer::builder().bot_id("UBOT").build();
        server.send_message_to_bot("C1", "deploy please");
        assert!(server.saw_outgoing_message("<@UBOT> deploy please"));
        assert!(server.saw_outgoing_message_matching(r"^<@UBOT> deploy"));
        assert!(!server.saw_incoming_message("<@UBOT> deploy please"));
    }

    #[test]
    fn direct_message_uses_dm_channel() {
        let server = TestServer::new();
        server.send_direct_message_to_bot("psst");
        let frame: Value = serde_json::from_str(&server.seen_outbound_messages()[0]).unwrap();
        assert_eq!(frame["channel"], DIRECT_MESSAGE_CHANNEL);
        assert_eq!(frame["user"], DEFAULT_NON_BOT_USER_ID);
        assert_eq!(frame["type"], "message");
    }

    #[test]
    fn invites_are_not_messages() {
        let server = TestServer::new();
        server.send_bot_channel_invite();
        server.send_bot_group_invite();
        let types: Vec<String> = server
            .seen_outbound_messages()
            .iter()
            .map(|f| serde_json::from_str::<Value>(f).unwrap()["type"].as_str().unwrap().to_owned())
            .collect();
        assert_eq!(types, ["channel_joined", "group_joined"]);
        assert!(!server.saw_outgoing_message_matching(".*"));
    }

    #[test]
    fn invalid_pattern_matches_nothing() {
        let server = TestServer::new();
        server.send_message_to_channel("C1", "(unbalanced");
        assert!(!server.saw_outgoing_message_matching("(unbalanced"));
        assert!(server.saw_outgoing_message_matching(r"\(unbalanced"));
    }

    #[test]
    fn client_probe_answered_without_recording() {
        let server = TestServer::new();
        let reply = server.state.handle_client_frame(r#"{"type":"ping","id":9}"#).unwrap();
        let reply: Value = serde_json::from_str(&reply).unwrap();
        assert_eq!(reply, json!({"type": "pong", "id": 9}));
        assert!(server.seen_inbound_messages().is_empty());
    }

    #[test]
    fn client_message_acknowledged_and_recorded() {
        let server = TestServer::new();
        let ack = server
            .state
            .handle_client_frame(r#"{"id":3,"type":"message","channel":"C1","text":"hi"}"#)
            .unwrap();
        let ack: Value = serde_json::from_str(&ack).unwrap();
        assert_eq!(ack["reply_to"], 3);
        assert_eq!(ack["ok"], true);
        assert!(server.saw_incoming_message("hi"));

        assert!(server.state.handle_client_frame(r#"{"type":"typing","channel":"C1"}"#).is_none());
        assert!(server.state.handle_client_frame("garbage").is_none());
        assert_eq!(server.seen_inbound_messages().len(), 3);
    }

    #[tokio::test]
    async fn start_twice_rejected_and_stop_idempotent() {
        let server = TestServer::new();
        let addr = server.start().await.unwrap();
        assert_eq!(server.addr(), Some(addr));
        assert_eq!(server.ws_url(), format!("ws://{addr}/ws"));
        assert!(matches!(server.start().await, Err(TestServerError::AlreadyStarted)));

        server.stop().await;
        server.stop().await;
        assert!(server.addr().is_none());
    }
}
