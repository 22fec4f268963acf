//! Duplex session lifecycle.
//!
//! A live connection is driven by two pumps:
//!
//! 1. The read pump reads one frame at a time, answers liveness probes on the
//!    control lane, records and decodes everything else, and publishes the
//!    result to subscribers.
//! 2. The write pump drains the control lane and then the outbound queue, in
//!    order, and sends a probe every `ping_interval`.
//!
//! A supervisor task owns the pumps. When either pump fails it tears the link
//! down and runs the reconnect policy; on `close()` it lets the write pump
//! flush, bounded by `drain_timeout`.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::task::{Context, Poll};
use std::time::Duration;

use metrics::{counter, gauge};
use parking_lot::Mutex;
use serde_json::{Map, Value};
use slackline_core::ids::{ConnectionId, SessionId};
use slackline_events::envelope::RawEnvelope;
use slackline_events::EnvelopeDecoder;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, trace, warn};

use crate::config::SessionConfig;
use crate::errors::{ConnectionError, SendError, TransportError};
use crate::observe::{Direction, ObservationLog};
use crate::state::{SessionState, StateChange};
use crate::subscriber::{SessionUpdate, Subscribers, Subscription};
use crate::transport::{Connection, Connector, FrameReader, FrameWriter};

/// Discriminator of a liveness probe.
pub const PROBE: &str = "ping";
/// Discriminator of a probe reply.
pub const PROBE_REPLY: &str = "pong";

/// Capacity of the control lane carrying probe replies.
const CONTROL_LANE_DEPTH: usize = 16;

// ─────────────────────────────────────────────────────────────────────────────
// Handle
// ─────────────────────────────────────────────────────────────────────────────

/// Caller handle to a duplex session.
///
/// Dropping the handle closes the session in the background.
pub struct DuplexSession {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for DuplexSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DuplexSession")
            .field("id", &self.shared.id)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl DuplexSession {
    /// A session that has not connected yet.
    ///
    /// Use this over [`Self::open`] to subscribe before the first frame can
    /// arrive.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            shared: Arc::new(Shared::new(config, Arc::new(ObservationLog::new()))),
        }
    }

    /// Record traffic into `log` instead of a private one.
    #[must_use]
    pub fn with_observation_log(self, log: Arc<ObservationLog>) -> Self {
        let config = self.shared.config.clone();
        Self {
            shared: Arc::new(Shared::new(config, log)),
        }
    }

    /// Connect and start the pumps.
    pub async fn open(
        connector: impl Connector + 'static,
        config: SessionConfig,
    ) -> Result<Self, ConnectionError> {
        let session = Self::new(config);
        session.connect(connector).await?;
        Ok(session)
    }

    /// Connect a session built with [`Self::new`].
    ///
    /// Fails with [`ConnectionError::Timeout`] when the connector does not
    /// finish within `open_timeout`, and [`ConnectionError::Handshake`] when
    /// it errors or the session was already started.
    #[instrument(skip_all, fields(session_id = %self.shared.id))]
    pub async fn connect(&self, connector: impl Connector + 'static) -> Result<(), ConnectionError> {
        let shared = &self.shared;
        if shared
            .started
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(ConnectionError::Handshake("session already started".into()));
        }
        let connector: Arc<dyn Connector> = Arc::new(connector);

        shared.set_state(SessionState::Connecting);
        let result = tokio::select! {
            () = shared.close.cancelled() => Err(ConnectionError::Closed),
            result = establish(shared, connector.as_ref()) => result,
        };
        match result {
            Ok(link) => {
                info!(connection_id = %link.id, "session open");
                let _ = tokio::spawn(supervise(Arc::clone(shared), connector, link));
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "open failed");
                shared.set_state(SessionState::Disconnected);
                shared.started.store(false, Ordering::SeqCst);
                // A close() that raced this attempt is waiting on the outcome.
                if shared.close.is_cancelled() {
                    shared.terminate(ConnectionError::Closed);
                }
                Err(err)
            }
        }
    }

    /// Queue a frame for the write pump without waiting.
    ///
    /// The returned ticket resolves once the frame is written, or with
    /// [`ConnectionError::Dropped`] if its connection is lost first.
    pub fn send(&self, frame: impl Into<Arc<str>>) -> Result<SendTicket, SendError> {
        let core = self.shared.core.lock();
        let Some(outbound) = core.outbound.as_ref().filter(|_| core.state.is_open()) else {
            return Err(SendError::NotOpen);
        };
        let (done, rx) = oneshot::channel();
        match outbound.try_send(Outbound {
            frame: frame.into(),
            done,
        }) {
            Ok(()) => Ok(SendTicket { rx }),
            Err(mpsc::error::TrySendError::Full(_)) => {
                let capacity = self.shared.config.outbound_queue_depth;
                debug!(capacity, "outbound queue full");
                Err(SendError::Backpressure { capacity })
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Err(SendError::NotOpen),
        }
    }

    /// Serialize `value` and [`send`](Self::send) it.
    pub fn send_json(&self, value: &Value) -> Result<SendTicket, SendError> {
        self.send(value.to_string())
    }

    /// Next id for correlating outbound frames with acknowledgements.
    pub fn next_message_id(&self) -> u64 {
        self.shared.next_message_id()
    }

    /// Register a consumer of updates from this point on.
    pub fn subscribe(&self) -> Subscription {
        self.shared.subscribers.subscribe()
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        *self.shared.state_tx.borrow()
    }

    /// Receiver that observes every state change.
    pub fn watch_state(&self) -> watch::Receiver<SessionState> {
        self.shared.state_tx.subscribe()
    }

    /// Session id.
    pub fn id(&self) -> &SessionId {
        &self.shared.id
    }

    /// Traffic recorded by this session.
    pub fn observations(&self) -> Arc<ObservationLog> {
        Arc::clone(&self.shared.log)
    }

    /// Reconnect attempts made since the last successful connection.
    pub fn reconnect_attempt(&self) -> u32 {
        self.shared.reconnect_attempt.load(Ordering::SeqCst)
    }

    /// Flush queued frames and disconnect. Idempotent.
    ///
    /// Cancels a pending reconnect wait. Returns once the session is
    /// `Disconnected`.
    pub async fn close(&self) {
        self.shared.close.cancel();
        if !self.shared.started.load(Ordering::SeqCst) {
            self.shared.terminate(ConnectionError::Closed);
            return;
        }
        let _ = self.wait_terminated().await;
    }

    /// Wait until the session ends for good.
    ///
    /// Resolves with [`ConnectionError::Closed`] after `close()` and with
    /// [`ConnectionError::RetriesExhausted`] when reconnection gave up.
    pub async fn wait_terminated(&self) -> ConnectionError {
        let mut rx = self.shared.terminal_tx.subscribe();
        rx.wait_for(Option::is_some)
            .await
            .map_or(ConnectionError::Closed, |outcome| {
                outcome.clone().unwrap_or(ConnectionError::Closed)
            })
    }
}

impl Drop for DuplexSession {
    fn drop(&mut self) {
        self.shared.close.cancel();
    }
}

/// Completion of one [`DuplexSession::send`].
#[derive(Debug)]
pub struct SendTicket {
    rx: oneshot::Receiver<Result<(), ConnectionError>>,
}

impl Future for SendTicket {
    type Output = Result<(), ConnectionError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|result| result.unwrap_or(Err(ConnectionError::Dropped)))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Shared state
// ─────────────────────────────────────────────────────────────────────────────

struct Outbound {
    frame: Arc<str>,
    done: oneshot::Sender<Result<(), ConnectionError>>,
}

struct Core {
    state: SessionState,
    outbound: Option<mpsc::Sender<Outbound>>,
}

struct Shared {
    id: SessionId,
    config: SessionConfig,
    core: Mutex<Core>,
    state_tx: watch::Sender<SessionState>,
    terminal_tx: watch::Sender<Option<ConnectionError>>,
    subscribers: Subscribers,
    log: Arc<ObservationLog>,
    message_ids: AtomicU64,
    reconnect_attempt: AtomicU32,
    started: AtomicBool,
    close: CancellationToken,
}

impl Shared {
    fn new(config: SessionConfig, log: Arc<ObservationLog>) -> Self {
        Self {
            id: SessionId::new(),
            subscribers: Subscribers::new(config.subscriber_buffer),
            config,
            core: Mutex::new(Core {
                state: SessionState::Disconnected,
                outbound: None,
            }),
            state_tx: watch::Sender::new(SessionState::Disconnected),
            terminal_tx: watch::Sender::new(None),
            log,
            message_ids: AtomicU64::new(0),
            reconnect_attempt: AtomicU32::new(0),
            started: AtomicBool::new(false),
            close: CancellationToken::new(),
        }
    }

    fn next_message_id(&self) -> u64 {
        self.message_ids.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn set_state(&self, to: SessionState) {
        let from = std::mem::replace(&mut self.core.lock().state, to);
        self.announce(from, to);
    }

    /// Accept sends through `outbound` and become `Open`.
    fn go_open(&self, outbound: mpsc::Sender<Outbound>) {
        let from = {
            let mut core = self.core.lock();
            core.outbound = Some(outbound);
            std::mem::replace(&mut core.state, SessionState::Open)
        };
        self.announce(from, SessionState::Open);
    }

    /// Stop accepting sends and move to `to`. Dropping the queue sender lets
    /// the write pump see the end of the queue.
    fn leave_open(&self, to: SessionState) {
        let (from, _sender) = {
            let mut core = self.core.lock();
            let sender = core.outbound.take();
            (std::mem::replace(&mut core.state, to), sender)
        };
        self.announce(from, to);
    }

    fn announce(&self, from: SessionState, to: SessionState) {
        if from == to {
            return;
        }
        let _ = self.state_tx.send_replace(to);
        gauge!("session_state").set(to.as_gauge());
        info!(session_id = %self.id, %from, %to, "session state changed");
        self.subscribers
            .publish(&SessionUpdate::StateChanged(StateChange { from, to }));
    }

    /// Enter the terminal state once.
    fn terminate(&self, outcome: ConnectionError) {
        if self.terminal_tx.borrow().is_some() {
            return;
        }
        self.leave_open(SessionState::Disconnected);
        match &outcome {
            ConnectionError::Closed => info!(session_id = %self.id, "session closed"),
            other => error!(session_id = %self.id, error = %other, "session terminated"),
        }
        self.subscribers
            .finish(&SessionUpdate::Terminated(Arc::new(outcome.clone())));
        let _ = self.terminal_tx.send_replace(Some(outcome));
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Link: one physical connection and its pumps
// ─────────────────────────────────────────────────────────────────────────────

struct Link {
    id: ConnectionId,
    /// Stops both pumps.
    cancel: CancellationToken,
    /// Stops only the read pump; the write pump keeps flushing.
    read_cancel: CancellationToken,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
    failures: mpsc::Receiver<ConnectionError>,
}

impl Link {
    fn start(shared: &Arc<Shared>, connection: Connection) -> Self {
        let id = ConnectionId::new();
        let (outbound_tx, outbound_rx) = mpsc::channel(shared.config.outbound_queue_depth);
        let (control_tx, control_rx) = mpsc::channel(CONTROL_LANE_DEPTH);
        let (failure_tx, failures) = mpsc::channel(2);
        let liveness = Arc::new(Liveness::new());
        let cancel = CancellationToken::new();
        let read_cancel = cancel.child_token();

        shared.go_open(outbound_tx);

        let reader = tokio::spawn(
            ReadPump {
                shared: Arc::clone(shared),
                connection_id: id.clone(),
                reader: connection.reader,
                control: control_tx,
                liveness: Arc::clone(&liveness),
                cancel: read_cancel.clone(),
                failures: failure_tx.clone(),
            }
            .run(),
        );
        let writer = tokio::spawn(
            WritePump {
                shared: Arc::clone(shared),
                connection_id: id.clone(),
                writer: connection.writer,
                outbound: outbound_rx,
                control: control_rx,
                liveness,
                cancel: cancel.clone(),
                draining: read_cancel.clone(),
                failures: failure_tx,
            }
            .run(),
        );

        Self {
            id,
            cancel,
            read_cancel,
            reader,
            writer,
            failures,
        }
    }

    /// First failure reported by either pump.
    async fn failed(&mut self) -> ConnectionError {
        self.failures
            .recv()
            .await
            .unwrap_or_else(|| ConnectionError::Transport("pumps stopped".into()))
    }

    fn abort(&self) {
        self.cancel.cancel();
        self.reader.abort();
        self.writer.abort();
    }
}

/// Last time anything arrived from the peer.
struct Liveness {
    last_seen: Mutex<Instant>,
}

impl Liveness {
    fn new() -> Self {
        Self {
            last_seen: Mutex::new(Instant::now()),
        }
    }

    fn mark_alive(&self) {
        *self.last_seen.lock() = Instant::now();
    }

    fn silent_for(&self) -> Duration {
        self.last_seen.lock().elapsed()
    }
}

async fn establish(shared: &Arc<Shared>, connector: &dyn Connector) -> Result<Link, ConnectionError> {
    let timeout = shared.config.open_timeout;
    let connection = match time::timeout(timeout, connector.connect()).await {
        Ok(Ok(connection)) => connection,
        Ok(Err(TransportError::Connect(message))) => return Err(ConnectionError::Handshake(message)),
        Ok(Err(other)) => return Err(ConnectionError::Handshake(other.to_string())),
        Err(_) => return Err(ConnectionError::Timeout(timeout)),
    };
    Ok(Link::start(shared, connection))
}

// ─────────────────────────────────────────────────────────────────────────────
// Supervisor
// ─────────────────────────────────────────────────────────────────────────────

#[instrument(skip_all, fields(session_id = %shared.id))]
async fn supervise(shared: Arc<Shared>, connector: Arc<dyn Connector>, mut link: Link) {
    loop {
        let failure = tokio::select! {
            () = shared.close.cancelled() => None,
            failure = link.failed() => Some(failure),
        };

        let Some(failure) = failure else {
            drain(&shared, link).await;
            shared.terminate(ConnectionError::Closed);
            return;
        };

        warn!(connection_id = %link.id, error = %failure, "connection lost");
        shared.leave_open(SessionState::Disconnected);
        link.abort();

        match reconnect(&shared, connector.as_ref(), failure).await {
            Ok(next) => link = next,
            Err(outcome) => {
                shared.terminate(outcome);
                return;
            }
        }
    }
}

/// Stop reading, let the write pump flush what is queued, then disconnect.
async fn drain(shared: &Shared, mut link: Link) {
    shared.leave_open(SessionState::Draining);
    link.read_cancel.cancel();
    if time::timeout(shared.config.drain_timeout, &mut link.writer)
        .await
        .is_err()
    {
        warn!(
            connection_id = %link.id,
            timeout = ?shared.config.drain_timeout,
            "drain timed out, dropping queued frames"
        );
    }
    link.abort();
}

async fn reconnect(
    shared: &Arc<Shared>,
    connector: &dyn Connector,
    cause: ConnectionError,
) -> Result<Link, ConnectionError> {
    let policy = &shared.config.reconnect;
    let mut attempt: u32 = 0;
    let mut last = cause;

    loop {
        if !policy.allows(attempt) {
            return Err(ConnectionError::RetriesExhausted {
                attempts: attempt,
                last: Box::new(last),
            });
        }

        shared.set_state(SessionState::Reconnecting);
        let delay = policy.backoff.delay(attempt);
        info!(attempt = attempt + 1, ?delay, "reconnecting");
        tokio::select! {
            () = shared.close.cancelled() => return Err(ConnectionError::Closed),
            () = time::sleep(delay) => {}
        }

        attempt += 1;
        shared.reconnect_attempt.store(attempt, Ordering::SeqCst);
        counter!("session_reconnects_total").increment(1);
        shared.set_state(SessionState::Connecting);

        let result = tokio::select! {
            () = shared.close.cancelled() => return Err(ConnectionError::Closed),
            result = establish(shared, connector) => result,
        };
        match result {
            Ok(link) => {
                shared.reconnect_attempt.store(0, Ordering::SeqCst);
                info!(attempts = attempt, connection_id = %link.id, "reconnected");
                return Ok(link);
            }
            Err(err) => {
                warn!(attempt, error = %err, "reconnect attempt failed");
                last = err;
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Read pump
// ─────────────────────────────────────────────────────────────────────────────

struct ReadPump {
    shared: Arc<Shared>,
    connection_id: ConnectionId,
    reader: Box<dyn FrameReader>,
    control: mpsc::Sender<Arc<str>>,
    liveness: Arc<Liveness>,
    cancel: CancellationToken,
    failures: mpsc::Sender<ConnectionError>,
}

impl ReadPump {
    #[instrument(skip_all, fields(session_id = %self.shared.id, connection_id = %self.connection_id))]
    async fn run(mut self) {
        let decoder = EnvelopeDecoder::default();
        loop {
            let next = tokio::select! {
                () = self.cancel.cancelled() => {
                    debug!("read pump cancelled");
                    return;
                }
                next = self.reader.next_frame() => next,
            };
            match next {
                Ok(Some(frame)) => {
                    self.liveness.mark_alive();
                    self.handle(&decoder, frame).await;
                }
                Ok(None) => return self.fail(ConnectionError::RemoteClosed),
                Err(err) => return self.fail(err.into()),
            }
        }
    }

    async fn handle(&mut self, decoder: &EnvelopeDecoder<'_>, frame: String) {
        let envelope = EnvelopeDecoder::parse(frame.as_bytes());
        if let Ok(env) = &envelope {
            match env.discriminator.as_str() {
                PROBE => return self.answer_probe(env).await,
                PROBE_REPLY => {
                    trace!(id = ?env.u64_field("id"), "probe answered");
                    return;
                }
                _ => {}
            }
        }

        self.shared.log.observe(Direction::Inbound, frame);
        counter!("session_frames_inbound_total").increment(1);

        match envelope.and_then(|env| decoder.decode_envelope(env)) {
            Ok(decoded) => {
                trace!(discriminator = %decoded.discriminator, "inbound event");
                self.shared
                    .subscribers
                    .publish(&SessionUpdate::Event(Arc::new(decoded)));
            }
            Err(err) => {
                warn!(error = %err, snippet = err.snippet(), "inbound frame failed to decode");
                counter!("session_decode_errors_total", "reason" => err.reason()).increment(1);
                self.shared
                    .subscribers
                    .publish(&SessionUpdate::DecodeFailed(Arc::new(err)));
            }
        }
    }

    /// Echo the probe's id back on the control lane.
    ///
    /// Waits for lane capacity, so a flood of pings slows reading instead
    /// of losing replies.
    async fn answer_probe(&mut self, probe: &RawEnvelope) {
        let mut reply = Map::new();
        let _ = reply.insert("type".to_owned(), Value::from(PROBE_REPLY));
        for key in ["id", "reply_to"] {
            if let Some(value) = probe.document.get(key) {
                let _ = reply.insert(key.to_owned(), value.clone());
            }
        }
        let body: Arc<str> = Value::Object(reply).to_string().into();
        tokio::select! {
            () = self.cancel.cancelled() => {}
            sent = self.control.send(body) => {
                if sent.is_err() {
                    counter!("session_ping_replies_dropped_total").increment(1);
                    debug!("write pump gone, ping reply dropped");
                }
            }
        }
    }

    fn fail(&self, err: ConnectionError) {
        debug!(error = %err, "read pump stopped");
        let _ = self.failures.try_send(err);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Write pump
// ─────────────────────────────────────────────────────────────────────────────

struct WritePump {
    shared: Arc<Shared>,
    connection_id: ConnectionId,
    writer: Box<dyn FrameWriter>,
    outbound: mpsc::Receiver<Outbound>,
    control: mpsc::Receiver<Arc<str>>,
    liveness: Arc<Liveness>,
    cancel: CancellationToken,
    draining: CancellationToken,
    failures: mpsc::Sender<ConnectionError>,
}

impl WritePump {
    #[instrument(skip_all, fields(session_id = %self.shared.id, connection_id = %self.connection_id))]
    async fn run(mut self) {
        let interval = self.shared.config.ping_interval;
        let mut heartbeat = time::interval_at(Instant::now() + interval, interval);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                () = self.cancel.cancelled() => {
                    debug!("write pump cancelled");
                    return;
                }
                Some(frame) = self.control.recv() => {
                    if let Err(err) = self.writer.write_frame(&frame).await {
                        return self.fail(err.into());
                    }
                }
                next = self.outbound.recv() => match next {
                    Some(out) => {
                        if let Err(err) = self.write(out).await {
                            return self.fail(err);
                        }
                    }
                    None => return self.finish().await,
                },
                _ = heartbeat.tick(), if !self.draining.is_cancelled() => {
                    if let Err(err) = self.probe().await {
                        return self.fail(err);
                    }
                }
            }
        }
    }

    async fn write(&mut self, out: Outbound) -> Result<(), ConnectionError> {
        self.writer.write_frame(&out.frame).await?;
        self.shared.log.observe(Direction::Outbound, Arc::clone(&out.frame));
        counter!("session_frames_outbound_total").increment(1);
        let _ = out.done.send(Ok(()));
        Ok(())
    }

    async fn probe(&mut self) -> Result<(), ConnectionError> {
        let timeout = self.shared.config.pong_timeout;
        let silent = self.liveness.silent_for();
        if silent >= timeout {
            warn!(?silent, "peer unresponsive");
            return Err(ConnectionError::HeartbeatTimeout(timeout));
        }
        let id = self.shared.next_message_id();
        let probe = serde_json::json!({ "type": PROBE, "id": id }).to_string();
        trace!(id, "sending probe");
        self.writer.write_frame(&probe).await?;
        Ok(())
    }

    /// The queue ended: every sender is gone, so the session is draining.
    async fn finish(&mut self) {
        debug!("outbound queue flushed");
        if let Err(err) = self.writer.close().await {
            debug!(error = %err, "closing writer failed");
        }
    }

    fn fail(&self, err: ConnectionError) {
        debug!(error = %err, "write pump stopped");
        let _ = self.failures.try_send(err);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
