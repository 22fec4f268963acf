//! Append-only record of frames seen in each direction.
//!
//! Each direction has its own lock. Appends take the write lock for a single
//! push, so a reader sees either the whole record or none of it. Queries
//! scan in append order.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use regex::Regex;
use serde_json::Value;
use tokio::time::Instant;

/// Traffic direction relative to the recorder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Received from the peer.
    Inbound,
    /// Sent to the peer.
    Outbound,
}

/// One recorded frame.
#[derive(Clone, Debug)]
pub struct ObservationRecord {
    /// Position across both directions.
    pub seq: u64,
    /// When it was recorded.
    pub recorded_at: Instant,
    /// Frame body as seen on the wire.
    pub body: Arc<str>,
}

/// Thread-safe per-direction frame log.
#[derive(Debug, Default)]
pub struct ObservationLog {
    inbound: RwLock<Vec<ObservationRecord>>,
    outbound: RwLock<Vec<ObservationRecord>>,
    next_seq: AtomicU64,
}

impl ObservationLog {
    /// Empty log.
    pub fn new() -> Self {
        Self::default()
    }

    fn side(&self, direction: Direction) -> &RwLock<Vec<ObservationRecord>> {
        match direction {
            Direction::Inbound => &self.inbound,
            Direction::Outbound => &self.outbound,
        }
    }

    /// Append a frame body.
    pub fn observe(&self, direction: Direction, body: impl Into<Arc<str>>) {
        let record = ObservationRecord {
            seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
            recorded_at: Instant::now(),
            body: body.into(),
        };
        self.side(direction).write().push(record);
    }

    /// Bodies in append order.
    pub fn all(&self, direction: Direction) -> Vec<Arc<str>> {
        self.side(direction)
            .read()
            .iter()
            .map(|r| Arc::clone(&r.body))
            .collect()
    }

    /// Full records in append order.
    pub fn records(&self, direction: Direction) -> Vec<ObservationRecord> {
        self.side(direction).read().clone()
    }

    /// Number of recorded frames.
    pub fn len(&self, direction: Direction) -> usize {
        self.side(direction).read().len()
    }

    /// Whether nothing was recorded in `direction`.
    pub fn is_empty(&self, direction: Direction) -> bool {
        self.side(direction).read().is_empty()
    }

    /// Whether a body equal to `body` was recorded.
    pub fn contains(&self, direction: Direction, body: &str) -> bool {
        self.side(direction).read().iter().any(|r| &*r.body == body)
    }

    /// Whether a message with exactly this `text` was recorded.
    ///
    /// Bodies that are not JSON objects with a string `text` are skipped.
    pub fn saw_text(&self, direction: Direction, text: &str) -> bool {
        self.find_text(direction, |t| t == text)
    }

    /// Whether a message whose `text` matches `pattern` was recorded.
    ///
    /// Stops at the first match.
    pub fn matches(&self, direction: Direction, pattern: &Regex) -> bool {
        self.find_text(direction, |t| pattern.is_match(t))
    }

    fn find_text(&self, direction: Direction, mut pred: impl FnMut(&str) -> bool) -> bool {
        self.side(direction).read().iter().any(|record| {
            message_text(&record.body).is_some_and(|text| pred(&text))
        })
    }

    /// Remove everything.
    pub fn clear(&self) {
        self.inbound.write().clear();
        self.outbound.write().clear();
    }
}

fn message_text(body: &str) -> Option<String> {
    let doc: Value = serde_json::from_str(body).ok()?;
    doc.get("text")?.as_str().map(str::to_owned)
}
