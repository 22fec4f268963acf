//! Fan-out of server frames to connected WebSocket clients.
//!
//! Frames queued while nobody is connected are held and handed to the next
//! client that connects.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Per-client send buffer.
const CLIENT_QUEUE_DEPTH: usize = 1024;

#[derive(Default)]
struct Inner {
    next_id: u64,
    clients: HashMap<u64, mpsc::Sender<Arc<str>>>,
    pending: VecDeque<Arc<str>>,
}

/// Connected clients.
#[derive(Default)]
pub(crate) struct Hub {
    inner: Mutex<Inner>,
}

impl Hub {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Add a client. Held frames are delivered to it first.
    pub(crate) fn register(&self) -> (u64, mpsc::Receiver<Arc<str>>) {
        let (tx, rx) = mpsc::channel(CLIENT_QUEUE_DEPTH);
        let mut inner = self.inner.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        while let Some(frame) = inner.pending.pop_front() {
            if let Err(err) = tx.try_send(frame) {
                inner.pending.push_front(err.into_inner());
                warn!(
                    client = id,
                    held = inner.pending.len(),
                    "client queue full while flushing held frames"
                );
                break;
            }
        }
        let _ = inner.clients.insert(id, tx);
        debug!(client = id, clients = inner.clients.len(), "client registered");
        (id, rx)
    }

    pub(crate) fn remove(&self, id: u64) {
        let _ = self.inner.lock().clients.remove(&id);
    }

    /// Send to every client, or hold it when none is connected.
    pub(crate) fn broadcast(&self, frame: Arc<str>) {
        let mut inner = self.inner.lock();
        if inner.clients.is_empty() {
            inner.pending.push_back(frame);
            return;
        }
        inner.clients.retain(|id, tx| match tx.try_send(Arc::clone(&frame)) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(client = id, "client queue full, frame dropped");
                true
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        });
    }

    /// Drop every client's sender so its socket task winds down.
    pub(crate) fn disconnect_all(&self) {
        self.inner.lock().clients.clear();
    }

    pub(crate) fn client_count(&self) -> usize {
        self.inner.lock().clients.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_held_until_a_client_connects() {
        let hub = Hub::new();
        hub.broadcast(Arc::from("one"));
        hub.broadcast(Arc::from("two"));

        let (_id, mut rx) = hub.register();
        assert_eq!(rx.try_recv().unwrap().as_ref(), "one");
        assert_eq!(rx.try_recv().unwrap().as_ref(), "two");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn overflow_stays_held_for_the_next_client() {
        let hub = Hub::new();
        for n in 0..=CLIENT_QUEUE_DEPTH {
            hub.broadcast(Arc::from(n.to_string()));
        }

        let (_a, mut ra) = hub.register();
        let mut delivered = 0;
        while ra.try_recv().is_ok() {
            delivered += 1;
        }
        assert_eq!(delivered, CLIENT_QUEUE_DEPTH);

        let held: Vec<_> = hub.inner.lock().pending.iter().cloned().collect();
        assert_eq!(held, [Arc::<str>::from(CLIENT_QUEUE_DEPTH.to_string())]);
    }

    #[test]
    fn broadcast_reaches_every_client() {
        let hub = Hub::new();
        let (_a, mut ra) = hub.register();
        let (_b, mut rb) = hub.register();
        hub.broadcast(Arc::from("x"));
        assert_eq!(ra.try_recv().unwrap().as_ref(), "x");
        assert_eq!(rb.try_recv().unwrap().as_ref(), "x");
    }

    #[test]
    fn closed_clients_pruned() {
        let hub = Hub::new();
        let (_a, ra) = hub.register();
        let (b, _rb) = hub.register();
        drop(ra);
        hub.broadcast(Arc::from("x"));
        assert_eq!(hub.client_count(), 1);
        hub.remove(b);
        assert_eq!(hub.client_count(), 0);
    }

    #[test]
    fn disconnect_all_ends_receivers() {
        let hub = Hub::new();
        let (_a, mut ra) = hub.register();
        hub.disconnect_all();
        assert!(matches!(
            ra.try_recv(),
            Err(mpsc::error::TryRecvError::Disconnected)
        ));
    }
}
