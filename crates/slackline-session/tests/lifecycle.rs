//! Session lifecycle through the public API and the in-memory connector.

use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use regex::Regex;
use slackline_core::logging::capture_logs;
use slackline_events::TypedEvent;
use slackline_session::testing::{ChannelConnector, RemotePeer};
use slackline_session::{
    ConnectionError, ConstantBackoff, Direction, DuplexSession, ObservationLog, ReconnectPolicy,
    SendError, SessionConfig, SessionState, SessionUpdate, Subscription,
};
use tokio_stream::StreamExt;
use tracing::Level;

const WAIT: Duration = Duration::from_secs(5);

fn config() -> SessionConfig {
    SessionConfig::default().with_reconnect(
        ReconnectPolicy::default()
            .with_max_attempts(5)
            .with_backoff(ConstantBackoff(Duration::from_millis(50))),
    )
}

async fn started(config: SessionConfig) -> (DuplexSession, Subscription, RemotePeer, ChannelConnector) {
    let connector = ChannelConnector::new();
    let peer = connector.accept();
    let session = DuplexSession::new(config);
    let sub = session.subscribe();
    session.connect(connector.clone()).await.unwrap();
    (session, sub, peer, connector)
}

async fn states_until(sub: &mut Subscription, last: SessionState) -> Vec<SessionState> {
    let mut seen = Vec::new();
    while let Ok(Some(update)) = tokio::time::timeout(WAIT, sub.next()).await {
        if let SessionUpdate::StateChanged(change) = update {
            seen.push(change.to);
            if change.to == last {
                break;
            }
        }
    }
    seen
}

#[tokio::test(start_paused = true)]
async fn chat_round_trip_is_observable() {
    let log = Arc::new(ObservationLog::new());
    let connector = ChannelConnector::new();
    let mut peer = connector.accept();
    let session = DuplexSession::new(config()).with_observation_log(Arc::clone(&log));
    let mut sub = session.subscribe();
    session.connect(connector).await.unwrap();

    peer.send(r#"{"type":"hello"}"#);
    assert_eq!(sub.next_event().await.unwrap().discriminator, "hello");

    let id = session.next_message_id();
    let frame = format!(r#"{{"id":{id},"type":"message","channel":"C1","text":"deploy 7 started"}}"#);
    session.send(frame.as_str()).unwrap().await.unwrap();
    assert_eq!(peer.recv_frame(WAIT).await.as_deref(), Some(frame.as_str()));

    peer.send(format!(r#"{{"ok":true,"reply_to":{id},"ts":"1.1","text":"deploy 7 started","type":"message","channel":"C1","user":"UBOT"}}"#));
    let event = sub.next_event().await.unwrap();
    assert_matches!(&event.event, TypedEvent::Message(m) if m.content().is_some());

    assert!(log.contains(Direction::Outbound, &frame));
    assert!(log.saw_text(Direction::Inbound, "deploy 7 started"));
    assert!(log.matches(Direction::Outbound, &Regex::new(r"^deploy \d+").unwrap()));
    assert!(!log.saw_text(Direction::Inbound, "nothing like this"));
}

#[tokio::test(start_paused = true)]
async fn edited_and_deleted_messages_arrive_canonical() {
    let (_session, mut sub, peer, _c) = started(config()).await;

    peer.send(
        r#"{"type":"message","subtype":"message_changed","channel":"C1",
            "message":{"type":"message","user":"U1","text":"fixed","ts":"1.0","edited":{"user":"U1","ts":"2.0"}},
            "previous_message":{"type":"message","user":"U1","text":"fxied","ts":"1.0"}}"#,
    );
    peer.send(r#"{"type":"message","subtype":"message_deleted","channel":"C1","deleted_ts":"1.0"}"#);

    let edited = sub.next_event().await.unwrap();
    assert_matches!(&edited.event, TypedEvent::Message(m) if m.is_edited() && m.content().unwrap().text == "fixed");
    let deleted = sub.next_event().await.unwrap();
    assert_matches!(&deleted.event, TypedEvent::Message(m) if m.content().is_none() && m.deleted_ts == "1.0");
}

#[tokio::test(start_paused = true)]
async fn reconnects_after_drop_and_logs_it() {
    let (logs, _guard) = capture_logs();
    let (session, mut sub, first, connector) = started(config()).await;
    connector.fail("503");
    let mut second = connector.accept();

    let _ = states_until(&mut sub, SessionState::Open).await;

    first.fail_read("connection reset by peer");
    let path = states_until(&mut sub, SessionState::Open).await;
    assert_eq!(path.first(), Some(&SessionState::Disconnected));
    assert_eq!(path.last(), Some(&SessionState::Open));
    assert_eq!(
        path.iter().filter(|s| **s == SessionState::Reconnecting).count(),
        2
    );

    session.send("after").unwrap().await.unwrap();
    assert_eq!(second.recv_frame(WAIT).await.as_deref(), Some("after"));

    assert!(logs.has_event(Level::WARN, "connection lost"));
    assert!(logs.has_event(Level::WARN, "reconnect attempt failed"));
    assert!(logs.has_event(Level::INFO, "reconnected"));
}

#[tokio::test(start_paused = true)]
async fn sends_during_reconnect_are_refused() {
    let config = config().with_reconnect(
        ReconnectPolicy::default()
            .with_max_attempts(0)
            .with_backoff(ConstantBackoff(Duration::from_secs(60))),
    );
    let (session, mut sub, peer, _c) = started(config).await;
    peer.close();

    let _ = states_until(&mut sub, SessionState::Reconnecting).await;
    assert_eq!(session.send("x").unwrap_err(), SendError::NotOpen);
    session.close().await;
}

#[tokio::test(start_paused = true)]
async fn backpressure_recovers_once_drained() {
    let (session, _sub, mut peer, _c) = started(config().with_queue_depth(1)).await;

    let first = session.send("1").unwrap();
    assert_eq!(
        session.send("2").unwrap_err(),
        SendError::Backpressure { capacity: 1 }
    );
    first.await.unwrap();
    session.send("2").unwrap().await.unwrap();

    assert_eq!(peer.recv_frame(WAIT).await.as_deref(), Some("1"));
    assert_eq!(peer.recv_frame(WAIT).await.as_deref(), Some("2"));
}

#[tokio::test(start_paused = true)]
async fn every_subscriber_sees_the_same_stream() {
    let (session, mut a, peer, _c) = started(config()).await;
    let mut b = session.subscribe();

    for i in 0..5 {
        peer.send(format!(r#"{{"type":"member_joined_channel","channel":"C1","user":"U{i}"}}"#));
    }
    for sub in [&mut a, &mut b] {
        for i in 0..5 {
            let event = sub.next_event().await.unwrap();
            assert_matches!(&event.event, TypedEvent::MemberJoinedChannel(j) if j.user == format!("U{i}"));
        }
    }
}

#[tokio::test(start_paused = true)]
async fn terminated_after_retries_and_stream_ends() {
    let config = config().with_reconnect(
        ReconnectPolicy::default()
            .with_max_attempts(2)
            .with_backoff(ConstantBackoff(Duration::from_millis(5))),
    );
    let (session, sub, peer, connector) = started(config).await;
    connector.fail("refused");
    connector.hang();
    peer.fail_read("gone");

    let updates: Vec<_> = sub.collect().await;
    assert_matches!(
        updates.last(),
        Some(SessionUpdate::Terminated(e)) if matches!(
            &**e,
            ConnectionError::RetriesExhausted { attempts: 2, last } if matches!(**last, ConnectionError::Timeout(_))
        )
    );
    assert_eq!(session.state(), SessionState::Disconnected);
    assert_eq!(connector.attempts(), 3);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_handle_closes() {
    let (session, sub, mut peer, _c) = started(config()).await;
    let ticket = session.send("last words").unwrap();
    drop(session);

    assert_eq!(ticket.await, Ok(()));
    assert_eq!(peer.recv_frame(WAIT).await.as_deref(), Some("last words"));
    let updates: Vec<_> = sub.collect().await;
    assert_matches!(updates.last(), Some(SessionUpdate::Terminated(e)) if **e == ConnectionError::Closed);
}
