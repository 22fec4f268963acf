//! In-memory transport for exercising sessions without a network.
//!
//! [`ChannelConnector`] plays back a script of connection attempts. Each
//! accepted attempt hands the test a [`RemotePeer`] that feeds frames to the
//! session and collects what the session wrote.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::errors::TransportError;
use crate::transport::{Connection, Connector, FrameReader, FrameWriter};

/// What the session's reader gets next.
#[derive(Clone, Debug)]
pub enum ReadStep {
    /// A text frame.
    Frame(String),
    /// A read error.
    Fail(String),
    /// Clean close from the peer.
    Close,
}

/// What the session's writer did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WriteRecord {
    /// A frame was written.
    Frame(String),
    /// The writer was closed.
    Closed,
}

enum Attempt {
    Accept(Connection),
    Fail(String),
    Hang,
}

/// Scripted [`Connector`]. Clones share the script.
#[derive(Clone, Default)]
pub struct ChannelConnector {
    script: Arc<Mutex<VecDeque<Attempt>>>,
    attempts: Arc<AtomicU32>,
}

impl std::fmt::Debug for ChannelConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelConnector")
            .field("scripted", &self.script.lock().len())
            .field("attempts", &self.attempts())
            .finish()
    }
}

impl ChannelConnector {
    /// Empty script. Unscripted attempts fail.
    pub fn new() -> Self {
        Self::default()
    }

    /// Next attempt succeeds; returns the peer end of that connection.
    pub fn accept(&self) -> RemotePeer {
        let (connection, peer) = pair();
        self.script.lock().push_back(Attempt::Accept(connection));
        peer
    }

    /// Next attempt fails with `message`.
    pub fn fail(&self, message: impl Into<String>) {
        self.script.lock().push_back(Attempt::Fail(message.into()));
    }

    /// Next attempt never completes.
    pub fn hang(&self) {
        self.script.lock().push_back(Attempt::Hang);
    }

    /// Connection attempts made so far.
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for ChannelConnector {
    async fn connect(&self) -> Result<Connection, TransportError> {
        let _ = self.attempts.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().pop_front();
        match next {
            Some(Attempt::Accept(connection)) => Ok(connection),
            Some(Attempt::Fail(message)) => Err(TransportError::Connect(message)),
            Some(Attempt::Hang) => {
                futures::future::pending::<()>().await;
                Err(TransportError::Connect("unreachable".into()))
            }
            None => Err(TransportError::Connect("no scripted connection".into())),
        }
    }
}

/// The far end of an in-memory connection.
#[derive(Debug)]
pub struct RemotePeer {
    to_session: mpsc::UnboundedSender<ReadStep>,
    from_session: mpsc::UnboundedReceiver<WriteRecord>,
}

impl RemotePeer {
    /// Deliver a text frame to the session.
    pub fn send(&self, frame: impl Into<String>) {
        let _ = self.to_session.send(ReadStep::Frame(frame.into()));
    }

    /// Make the session's next read fail.
    pub fn fail_read(&self, message: impl Into<String>) {
        let _ = self.to_session.send(ReadStep::Fail(message.into()));
    }

    /// Close cleanly from the peer side.
    pub fn close(&self) {
        let _ = self.to_session.send(ReadStep::Close);
    }

    /// Next thing the session wrote, waiting up to `within`.
    pub async fn recv(&mut self, within: Duration) -> Option<WriteRecord> {
        tokio::time::timeout(within, self.from_session.recv())
            .await
            .ok()
            .flatten()
    }

    /// Next written frame, skipping probes, waiting up to `within`.
    pub async fn recv_frame(&mut self, within: Duration) -> Option<String> {
        loop {
            match self.recv(within).await? {
                WriteRecord::Frame(frame) if !is_probe(&frame) => return Some(frame),
                WriteRecord::Frame(_) => {}
                WriteRecord::Closed => return None,
            }
        }
    }

    /// Everything written so far, without waiting.
    pub fn drain(&mut self) -> Vec<WriteRecord> {
        let mut out = Vec::new();
        while let Ok(record) = self.from_session.try_recv() {
            out.push(record);
        }
        out
    }
}

fn is_probe(frame: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(frame)
        .ok()
        .and_then(|v| v.get("type").and_then(|t| t.as_str()).map(|t| t == "ping"))
        .unwrap_or(false)
}

/// A connected in-memory pair.
pub fn pair() -> (Connection, RemotePeer) {
    let (to_session, inbound) = mpsc::unbounded_channel();
    let (outbound, from_session) = mpsc::unbounded_channel();
    let connection = Connection::new(ChannelReader { inbound }, ChannelWriter { outbound });
    (
        connection,
        RemotePeer {
            to_session,
            from_session,
        },
    )
}

struct ChannelReader {
    inbound: mpsc::UnboundedReceiver<ReadStep>,
}

#[async_trait]
impl FrameReader for ChannelReader {
    async fn next_frame(&mut self) -> Result<Option<String>, TransportError> {
        match self.inbound.recv().await {
            Some(ReadStep::Frame(frame)) => Ok(Some(frame)),
            Some(ReadStep::Fail(message)) => Err(TransportError::Read(message)),
            Some(ReadStep::Close) | None => Ok(None),
        }
    }
}

struct ChannelWriter {
    outbound: mpsc::UnboundedSender<WriteRecord>,
}

#[async_trait]
impl FrameWriter for ChannelWriter {
    async fn write_frame(&mut self, frame: &str) -> Result<(), TransportError> {
        self.outbound
            .send(WriteRecord::Frame(frame.to_owned()))
            .map_err(|_| TransportError::Write("peer gone".into()))
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        let _ = self.outbound.send(WriteRecord::Closed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[tokio::test]
    async fn script_plays_in_order() {
        let connector = ChannelConnector::new();
        connector.fail("refused");
        let _peer = connector.accept();

        assert_matches!(connector.connect().await, Err(TransportError::Connect(m)) if m == "refused");
        assert!(connector.connect().await.is_ok());
        assert_matches!(connector.connect().await, Err(TransportError::Connect(_)));
        assert_eq!(connector.attempts(), 3);
    }

    #[tokio::test]
    async fn pair_moves_frames_both_ways() {
        let (mut conn, mut peer) = pair();
        peer.send("in");
        peer.fail_read("boom");
        assert_eq!(conn.reader.next_frame().await.unwrap().as_deref(), Some("in"));
        assert_matches!(conn.reader.next_frame().await, Err(TransportError::Read(_)));

        conn.writer.write_frame("out").await.unwrap();
        conn.writer.close().await.unwrap();
        assert_eq!(
            peer.drain(),
            vec![WriteRecord::Frame("out".into()), WriteRecord::Closed]
        );
    }

    #[tokio::test]
    async fn dropped_peer_reads_as_close() {
        let (mut conn, peer) = pair();
        drop(peer);
        assert!(conn.reader.next_frame().await.unwrap().is_none());
        assert!(conn.writer.write_frame("x").await.is_err());
    }

    #[tokio::test]
    async fn recv_frame_skips_probes() {
        let (mut conn, mut peer) = pair();
        conn.writer.write_frame(r#"{"type":"ping","id":1}"#).await.unwrap();
        conn.writer.write_frame(r#"{"type":"message","text":"x"}"#).await.unwrap();
        assert_eq!(
            peer.recv_frame(Duration::from_millis(50)).await.as_deref(),
            Some(r#"{"type":"message","text":"x"}"#)
        );
    }
}
