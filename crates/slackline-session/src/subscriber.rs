//! Fan-out of session updates to subscribers.

use std::pin::Pin;
use std::sync::{Arc, OnceLock};
use std::task::{Context, Poll, ready};

use futures::Stream;
use metrics::counter;
use parking_lot::Mutex;
use slackline_events::{Decoded, DecodeError};
use tokio::sync::mpsc;
use tracing::warn;

use crate::errors::ConnectionError;
use crate::state::StateChange;

/// Something a subscriber is told about.
#[derive(Clone, Debug)]
pub enum SessionUpdate {
    /// A decoded inbound frame.
    Event(Arc<Decoded>),
    /// An inbound frame that failed to decode.
    DecodeFailed(Arc<DecodeError>),
    /// The session changed state.
    StateChanged(StateChange),
    /// The session ended; no further updates follow.
    Terminated(Arc<ConnectionError>),
}

/// Receiving end of a subscription. Also a [`Stream`].
///
/// The terminal update is held outside the buffer, so it arrives even when
/// the buffer was full at the time the session ended.
#[derive(Debug)]
pub struct Subscription {
    rx: mpsc::Receiver<SessionUpdate>,
    terminal: Arc<OnceLock<SessionUpdate>>,
    terminal_seen: bool,
}

impl Subscription {
    /// Next update, or `None` after the terminal update was yielded.
    pub async fn recv(&mut self) -> Option<SessionUpdate> {
        match self.rx.recv().await {
            Some(update) => Some(update),
            None => self.take_terminal(),
        }
    }

    /// Next update if one is already available.
    pub fn try_recv(&mut self) -> Option<SessionUpdate> {
        match self.rx.try_recv() {
            Ok(update) => Some(update),
            Err(mpsc::error::TryRecvError::Empty) => None,
            Err(mpsc::error::TryRecvError::Disconnected) => self.take_terminal(),
        }
    }

    /// Next decoded event, skipping state changes and decode failures.
    pub async fn next_event(&mut self) -> Option<Arc<Decoded>> {
        loop {
            match self.recv().await? {
                SessionUpdate::Event(event) => return Some(event),
                SessionUpdate::Terminated(_) => return None,
                SessionUpdate::DecodeFailed(_) | SessionUpdate::StateChanged(_) => {}
            }
        }
    }

    /// The terminal update, once, after the buffer ran dry.
    fn take_terminal(&mut self) -> Option<SessionUpdate> {
        if self.terminal_seen {
            return None;
        }
        let update = self.terminal.get().cloned()?;
        self.terminal_seen = true;
        Some(update)
    }
}

impl Stream for Subscription {
    type Item = SessionUpdate;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match ready!(self.rx.poll_recv(cx)) {
            Some(update) => Poll::Ready(Some(update)),
            None => Poll::Ready(self.take_terminal()),
        }
    }
}

/// Registered subscribers, each with its own bounded buffer.
#[derive(Debug)]
pub(crate) struct Subscribers {
    buffer: usize,
    senders: Mutex<Vec<mpsc::Sender<SessionUpdate>>>,
    terminal: Arc<OnceLock<SessionUpdate>>,
}

impl Subscribers {
    pub(crate) fn new(buffer: usize) -> Self {
        Self {
            buffer: buffer.max(1),
            senders: Mutex::new(Vec::new()),
            terminal: Arc::new(OnceLock::new()),
        }
    }

    /// After [`Self::finish`] the subscription yields only the terminal
    /// update.
    pub(crate) fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::channel(self.buffer);
        let mut senders = self.senders.lock();
        if self.terminal.get().is_none() {
            senders.push(tx);
        }
        Subscription {
            rx,
            terminal: Arc::clone(&self.terminal),
            terminal_seen: false,
        }
    }

    /// Deliver to every subscriber without waiting.
    ///
    /// A full buffer loses this update for that subscriber only. A dropped
    /// subscription is unregistered.
    pub(crate) fn publish(&self, update: &SessionUpdate) {
        self.senders.lock().retain(|tx| match tx.try_send(update.clone()) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                counter!("session_updates_dropped_total").increment(1);
                warn!("subscriber buffer full, update dropped");
                true
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        });
    }

    /// End every subscription with `update`.
    ///
    /// Each subscriber gets it after whatever its buffer still holds. Only
    /// the first call has an effect.
    pub(crate) fn finish(&self, update: &SessionUpdate) {
        let mut senders = self.senders.lock();
        if self.terminal.set(update.clone()).is_ok() {
            senders.clear();
        }
    }

    pub(crate) fn count(&self) -> usize {
        self.senders.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::SessionState;
    use assert_matches::assert_matches;
    use tokio_stream::StreamExt;

    fn change(to: SessionState) -> SessionUpdate {
        SessionUpdate::StateChanged(StateChange {
            from: SessionState::Disconnected,
            to,
        })
    }

    #[tokio::test]
    async fn every_subscriber_gets_each_update_in_order() {
        let subs = Subscribers::new(8);
        let mut a = subs.subscribe();
        let mut b = subs.subscribe();
        subs.publish(&change(SessionState::Connecting));
        subs.publish(&change(SessionState::Open));

        for sub in [&mut a, &mut b] {
            assert_matches!(sub.recv().await, Some(SessionUpdate::StateChanged(c)) if c.to == SessionState::Connecting);
            assert_matches!(sub.recv().await, Some(SessionUpdate::StateChanged(c)) if c.to == SessionState::Open);
        }
    }

    #[tokio::test]
    async fn full_buffer_drops_for_that_subscriber_only() {
        let subs = Subscribers::new(1);
        let mut slow = subs.subscribe();
        let mut fast = subs.subscribe();

        subs.publish(&change(SessionState::Connecting));
        assert!(fast.try_recv().is_some());
        subs.publish(&change(SessionState::Open));

        assert_matches!(slow.try_recv(), Some(SessionUpdate::StateChanged(c)) if c.to == SessionState::Connecting);
        assert!(slow.try_recv().is_none());
        assert_matches!(fast.try_recv(), Some(SessionUpdate::StateChanged(c)) if c.to == SessionState::Open);
    }

    #[tokio::test]
    async fn dropped_subscription_unregistered() {
        let subs = Subscribers::new(4);
        let sub = subs.subscribe();
        let _keep = subs.subscribe();
        drop(sub);
        subs.publish(&change(SessionState::Open));
        assert_eq!(subs.count(), 1);
    }

    #[tokio::test]
    async fn finish_ends_streams() {
        let subs = Subscribers::new(4);
        let mut sub = subs.subscribe();
        subs.finish(&SessionUpdate::Terminated(Arc::new(ConnectionError::Closed)));
        assert_matches!(sub.next().await, Some(SessionUpdate::Terminated(_)));
        assert!(sub.next().await.is_none());
        assert_eq!(subs.count(), 0);
    }

    #[tokio::test]
    async fn terminal_update_survives_full_buffer() {
        let subs = Subscribers::new(1);
        let mut sub = subs.subscribe();
        subs.publish(&change(SessionState::Connecting));
        subs.publish(&change(SessionState::Open));
        subs.finish(&SessionUpdate::Terminated(Arc::new(ConnectionError::Closed)));

        assert_matches!(sub.recv().await, Some(SessionUpdate::StateChanged(c)) if c.to == SessionState::Connecting);
        assert_matches!(sub.recv().await, Some(SessionUpdate::Terminated(e)) if *e == ConnectionError::Closed);
        assert!(sub.recv().await.is_none());
        assert!(sub.try_recv().is_none());
    }

    #[tokio::test]
    async fn finish_is_once_and_late_subscribers_see_the_end() {
        let subs = Subscribers::new(2);
        subs.finish(&SessionUpdate::Terminated(Arc::new(ConnectionError::Closed)));
        subs.finish(&SessionUpdate::Terminated(Arc::new(ConnectionError::Dropped)));

        let mut late = subs.subscribe();
        assert_eq!(subs.count(), 0);
        assert_matches!(late.try_recv(), Some(SessionUpdate::Terminated(e)) if *e == ConnectionError::Closed);
        assert!(late.next().await.is_none());
    }

    #[tokio::test]
    async fn next_event_skips_state_changes() {
        let subs = Subscribers::new(4);
        let mut sub = subs.subscribe();
        subs.publish(&change(SessionState::Open));
        let decoded = slackline_events::decode(br#"{"type":"hello"}"#).unwrap();
        subs.publish(&SessionUpdate::Event(Arc::new(decoded)));
        let event = sub.next_event().await.unwrap();
        assert_eq!(event.discriminator, "hello");
    }
}
