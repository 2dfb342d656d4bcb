//! Integration tests for heartbeat, reconnection and deliberate close
//!
//! Driven through the in-memory connector under paused time, so delays
//! are exact and nothing depends on the wall clock.

mod common;

use common::*;
use livesockets::testing::MockConnector;
use livesockets::*;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

const RETRY: Duration = Duration::from_secs(5);

fn is_heartbeat(frame: &Outbound) -> bool {
    frame.as_text() == Some(HEARTBEAT_JSON)
}

#[test]
fn test_fixed_delay_default_is_constant() {
    let strategy = FixedDelay::default();
    for attempt in [0, 1, 5, 100] {
        assert_eq!(strategy.next_delay(attempt), Some(RETRY));
    }
}

#[test]
fn test_exponential_backoff_caps() {
    let strategy = ExponentialBackoff::new(Duration::from_secs(1), Duration::from_secs(30), Some(10));
    assert_eq!(strategy.next_delay(0), Some(Duration::from_secs(1)));
    assert_eq!(strategy.next_delay(3), Some(Duration::from_secs(8)));
    assert_eq!(strategy.next_delay(9), Some(Duration::from_secs(30)));
    assert_eq!(strategy.next_delay(10), None);
}

#[tokio::test(start_paused = true)]
async fn test_open_without_credential_is_noop() {
    let (connector, _peers) = MockConnector::new();
    let (mut channel, _) = test_channel(connector.clone());

    assert!(!channel.open(token(""), ChannelScope::Notifications));
    settle().await;

    assert_eq!(connector.connect_count(), 0);
    assert!(!channel.is_active());
    assert_eq!(channel.connection_state(), ConnectionState::Disconnected);
}

#[tokio::test(start_paused = true)]
async fn test_second_open_is_noop() {
    let (connector, mut peers) = MockConnector::new();
    let (mut channel, _) = test_channel(connector.clone());

    assert!(channel.open(token("abc"), ChannelScope::Notifications));
    assert!(!channel.open(token("abc"), ChannelScope::Notifications));
    let _peer = peers.next().await.unwrap();
    settle().await;

    assert!(!channel.open(token("abc"), ChannelScope::chat("7")));
    assert_eq!(connector.connect_count(), 1);
    assert_eq!(channel.scope(), Some(&ChannelScope::Notifications));
}

#[tokio::test(start_paused = true)]
async fn test_send_only_while_open() {
    let (connector, mut peers) = MockConnector::new();
    let (mut channel, _) = test_channel(connector);

    assert!(!channel.send(WsMessage::Text("early".into())));
    assert_eq!(channel.metrics().dropped_outbound, 1);

    channel.open(token("abc"), ChannelScope::Notifications);
    let mut peer = peers.next().await.unwrap();
    settle().await;

    assert!(channel.send_json(&serde_json::json!({ "message": "hello" })));
    settle().await;

    let frame = peer.try_outbound().unwrap();
    assert_eq!(frame.as_text(), Some(r#"{"message":"hello"}"#));
    assert_eq!(channel.metrics().messages_sent, 1);
}

#[tokio::test(start_paused = true)]
async fn test_frames_dispatched_in_order_and_bad_frames_skipped() {
    let (connector, mut peers) = MockConnector::new();
    let (mut channel, seen) = test_channel(connector);

    channel.open(token("abc"), ChannelScope::Notifications);
    let peer = peers.next().await.unwrap();

    peer.push_text(r#"{"type":"connection_success"}"#);
    peer.push_text(text_frame("a"));
    peer.push_text("not json");
    peer.push_text(HEARTBEAT_JSON);
    peer.push_text(r#"{"type":"chat"}"#);
    peer.push_text(text_frame("b"));
    peer.push_text(text_frame("c"));
    settle().await;

    assert_eq!(*seen.lock(), vec!["a", "b", "c"]);

    let metrics = channel.metrics();
    assert_eq!(metrics.messages_received, 7);
    assert_eq!(metrics.malformed_inbound, 2);
    assert!(channel.is_connected());
}

#[tokio::test(start_paused = true)]
async fn test_heartbeat_every_interval_while_open() {
    let (connector, mut peers) = MockConnector::new();
    let (mut channel, _) = test_channel(connector);

    channel.open(token("abc"), ChannelScope::Notifications);
    let mut peer = peers.next().await.unwrap();

    tokio::time::sleep(Duration::from_secs(19)).await;
    assert!(peer.drain_outbound().is_empty());

    tokio::time::sleep(Duration::from_secs(42)).await;
    let frames = peer.drain_outbound();
    assert_eq!(frames.len(), 3);
    assert!(frames.iter().all(is_heartbeat));
    assert_eq!(channel.metrics().heartbeats_sent, 3);

    channel.close(NORMAL_CLOSURE, "done").await;
    let frames = peer.drain_outbound();
    assert_eq!(
        frames,
        vec![Outbound::Close(CloseInfo::new(NORMAL_CLOSURE, "done"))]
    );

    tokio::time::sleep(Duration::from_secs(120)).await;
    assert!(peer.drain_outbound().is_empty());
    assert_eq!(channel.metrics().heartbeats_sent, 3);
}

#[tokio::test(start_paused = true)]
async fn test_abrupt_close_reconnects_once_after_delay() {
    let (connector, mut peers) = MockConnector::new();
    let (mut channel, _) = test_channel(connector.clone());

    channel.open(token("abc"), ChannelScope::Notifications);
    let first = peers.next().await.unwrap();
    settle().await;
    assert!(channel.is_connected());
    let first_url = first.url().to_string();

    let dropped_at = Instant::now();
    first.drop_abruptly();
    settle().await;

    assert!(!channel.is_connected());
    assert!(channel.pending_retry());

    let second = peers.next().await.unwrap();
    let waited = dropped_at.elapsed();
    assert!(waited >= RETRY && waited < RETRY + Duration::from_secs(1));
    assert_eq!(second.url(), first_url);
    settle().await;
    assert!(channel.is_connected());
    assert!(!channel.pending_retry());

    // Exactly one attempt: nothing further while the new connection holds
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(connector.connect_count(), 2);
    assert_eq!(channel.metrics().reconnect_count, 1);

    let events = drain_events(&channel);
    assert!(events.contains(&ChannelEvent::Closed {
        close: CloseInfo::abnormal("stream ended"),
        intentional: false,
    }));
    assert!(events.contains(&ChannelEvent::ReconnectScheduled {
        attempt: 1,
        delay: RETRY,
    }));
    assert_eq!(
        events.iter().filter(|e| **e == ChannelEvent::Opened).count(),
        2
    );
}

#[tokio::test(start_paused = true)]
async fn test_server_close_code_reconnects() {
    let (connector, mut peers) = MockConnector::new();
    let (mut channel, _) = test_channel(connector.clone());

    channel.open(token("abc"), ChannelScope::Notifications);
    let first = peers.next().await.unwrap();
    first.close(4001, "server restart");

    let _second = peers.next().await.unwrap();
    assert_eq!(connector.connect_count(), 2);

    let events = drain_events(&channel);
    assert!(events.contains(&ChannelEvent::Closed {
        close: CloseInfo::new(4001, "server restart"),
        intentional: false,
    }));
}

#[tokio::test(start_paused = true)]
async fn test_deliberate_close_never_reconnects() {
    let (connector, mut peers) = MockConnector::new();
    let (mut channel, _) = test_channel(connector.clone());

    channel.open(token("abc"), ChannelScope::Notifications);
    let mut peer = peers.next().await.unwrap();
    settle().await;

    channel.close(NORMAL_CLOSURE, "logout").await;
    assert_eq!(channel.connection_state(), ConnectionState::Disconnected);

    // The transport reporting the close afterwards changes nothing
    peer.close(NORMAL_CLOSURE, "");
    tokio::time::sleep(Duration::from_secs(60)).await;

    assert_eq!(connector.connect_count(), 1);
    assert!(peers.try_next().is_none());
    assert!(!channel.pending_retry());
    assert!(peer
        .drain_outbound()
        .contains(&Outbound::Close(CloseInfo::normal("logout"))));

    let events = drain_events(&channel);
    assert!(events.contains(&ChannelEvent::Closed {
        close: CloseInfo::normal("logout"),
        intentional: true,
    }));
    assert!(!events
        .iter()
        .any(|e| matches!(e, ChannelEvent::ReconnectScheduled { .. })));
}

#[tokio::test(start_paused = true)]
async fn test_close_racing_peer_close_is_deliberate() {
    let (connector, mut peers) = MockConnector::new();
    let (mut channel, _) = test_channel(connector.clone());

    channel.open(token("abc"), ChannelScope::Notifications);
    let peer = peers.next().await.unwrap();
    settle().await;

    // The peer's close is already queued when the caller lets go
    peer.close(ABNORMAL_CLOSURE, "");
    channel.close(NORMAL_CLOSURE, "logout").await;

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(connector.connect_count(), 1);

    let events = drain_events(&channel);
    assert!(events
        .iter()
        .all(|e| !matches!(e, ChannelEvent::Closed { intentional: false, .. })));
}

#[tokio::test(start_paused = true)]
async fn test_close_cancels_pending_retry() {
    let (connector, mut peers) = MockConnector::new();
    let (mut channel, _) = test_channel(connector.clone());

    channel.open(token("abc"), ChannelScope::Notifications);
    let peer = peers.next().await.unwrap();
    settle().await;

    peer.drop_abruptly();
    settle().await;
    assert!(channel.pending_retry());

    channel.close(NORMAL_CLOSURE, "logout").await;
    assert!(!channel.pending_retry());
    assert!(!channel.is_active());

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(connector.connect_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_withdrawn_credential_abandons_retry() {
    let (connector, mut peers) = MockConnector::new();
    let (mut channel, _) = test_channel(connector.clone());
    let session = SessionToken::new("abc");

    channel.open(Arc::new(session.clone()), ChannelScope::Notifications);
    let peer = peers.next().await.unwrap();
    settle().await;

    session.clear();
    peer.drop_abruptly();
    tokio::time::sleep(RETRY * 3).await;

    assert_eq!(connector.connect_count(), 1);
    assert!(!channel.is_active());
    assert!(drain_events(&channel)
        .contains(&ChannelEvent::ReconnectAbandoned("credential withdrawn".into())));
}

#[tokio::test(start_paused = true)]
async fn test_refused_connections_retry_until_accepted() {
    let (connector, mut peers) = MockConnector::new();
    let (mut channel, _) = test_channel(connector.clone());

    connector.refuse_connections(true);
    channel.open(token("abc"), ChannelScope::Notifications);
    settle().await;
    assert_eq!(connector.connect_count(), 1);
    assert!(channel.pending_retry());

    tokio::time::sleep(RETRY * 2).await;
    assert_eq!(connector.connect_count(), 3);

    connector.refuse_connections(false);
    let _peer = peers.next().await.unwrap();
    settle().await;
    assert!(channel.is_connected());
    assert_eq!(connector.connect_count(), 4);

    let events = drain_events(&channel);
    assert!(events
        .iter()
        .any(|e| matches!(e, ChannelEvent::Error(msg) if msg.contains("connection refused"))));
}

#[tokio::test(start_paused = true)]
async fn test_retry_limit_abandons() {
    let (connector, _peers) = MockConnector::new();
    let (mut channel, _) = test_channel_with(connector.clone(), FixedDelay::new(RETRY, Some(2)));

    connector.refuse_connections(true);
    channel.open(token("abc"), ChannelScope::Notifications);
    tokio::time::sleep(Duration::from_secs(60)).await;

    assert_eq!(connector.connect_count(), 3);
    assert!(!channel.is_active());
    assert!(drain_events(&channel)
        .contains(&ChannelEvent::ReconnectAbandoned("retry limit reached".into())));

    // A finished channel can be opened again
    connector.refuse_connections(false);
    assert!(channel.open(token("abc"), ChannelScope::Notifications));
}
