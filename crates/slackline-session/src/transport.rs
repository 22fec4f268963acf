//! Physical transport seam.
//!
//! A [`Connector`] produces a [`Connection`]: one reader half and one writer
//! half, each owned by exactly one pump. Frames are text.

use std::fmt;

use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, instrument};

use crate::errors::TransportError;

/// Reading half of a connection.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FrameReader: Send {
    /// Next text frame, or `None` once the peer has closed cleanly.
    async fn next_frame(&mut self) -> Result<Option<String>, TransportError>;
}

/// Writing half of a connection.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FrameWriter: Send {
    /// Write one text frame.
    async fn write_frame(&mut self, frame: &str) -> Result<(), TransportError>;

    /// Close the connection from this side.
    async fn close(&mut self) -> Result<(), TransportError>;
}

/// Establishes connections. Called once per open and once per reconnect attempt.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Connector: Send + Sync {
    /// Open a new connection.
    async fn connect(&self) -> Result<Connection, TransportError>;
}

/// Both halves of a live connection.
pub struct Connection {
    /// Reading half.
    pub reader: Box<dyn FrameReader>,
    /// Writing half.
    pub writer: Box<dyn FrameWriter>,
}

impl Connection {
    /// Pair two halves.
    pub fn new(reader: impl FrameReader + 'static, writer: impl FrameWriter + 'static) -> Self {
        Self {
            reader: Box::new(reader),
            writer: Box::new(writer),
        }
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection").finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// WebSocket
// ─────────────────────────────────────────────────────────────────────────────

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Connects to a WebSocket URL.
#[derive(Clone, Debug)]
pub struct WebSocketConnector {
    url: String,
}

impl WebSocketConnector {
    /// Connector for `url` (`ws://` or `wss://`).
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Target URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Connector for WebSocketConnector {
    #[instrument(skip_all, fields(url = %self.url))]
    async fn connect(&self) -> Result<Connection, TransportError> {
        let (stream, _response) = tokio_tungstenite::connect_async(self.url.as_str())
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?;
        debug!("websocket connected");
        let (sink, stream) = stream.split();
        Ok(Connection::new(WsReader { stream }, WsWriter { sink }))
    }
}

struct WsReader {
    stream: SplitStream<WsStream>,
}

#[async_trait]
impl FrameReader for WsReader {
    async fn next_frame(&mut self) -> Result<Option<String>, TransportError> {
        while let Some(msg) = self.stream.next().await {
            match msg? {
                Message::Text(text) => return Ok(Some(text.to_string())),
                Message::Binary(data) => match String::from_utf8(data.to_vec()) {
                    Ok(text) => return Ok(Some(text)),
                    Err(_) => debug!(len = data.len(), "skipping non-UTF-8 binary frame"),
                },
                Message::Close(_) => return Ok(None),
                // Protocol-level ping/pong is answered by tungstenite.
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
            }
        }
        Ok(None)
    }
}

struct WsWriter {
    sink: SplitSink<WsStream, Message>,
}

#[async_trait]
impl FrameWriter for WsWriter {
    async fn write_frame(&mut self, frame: &str) -> Result<(), TransportError> {
        self.sink.send(Message::text(frame.to_owned())).await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.sink.close().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn connector_keeps_url() {
        let connector = WebSocketConnector::new("ws://127.0.0.1:1/ws");
        assert_eq!(connector.url(), "ws://127.0.0.1:1/ws");
    }

    #[tokio::test]
    async fn unreachable_is_connect_error() {
        // Port 1 on loopback refuses connections.
        let connector = WebSocketConnector::new("ws://127.0.0.1:1/ws");
        assert_matches!(connector.connect().await, Err(TransportError::Connect(_)));
    }

    #[tokio::test]
    async fn connection_from_mocks() {
        let mut reader = MockFrameReader::new();
        let _ = reader
            .expect_next_frame()
            .times(1)
            .returning(|| Ok(Some("{\"type\":\"hello\"}".to_owned())));
        let writer = MockFrameWriter::new();
        let mut conn = Connection::new(reader, writer);
        assert_eq!(
            conn.reader.next_frame().await.unwrap().as_deref(),
            Some("{\"type\":\"hello\"}")
        );
        assert!(format!("{conn:?}").starts_with("Connection"));
    }
}
