//! Integration tests for the chat channel

mod common;

use common::*;
use livesockets::{CloseInfo, Outbound};
use notifications::RealtimeConfig;
use std::time::Duration;

fn log(chat: &notifications::ChatChannel) -> Vec<String> {
    chat.messages().into_iter().map(|m| m.message).collect()
}

#[tokio::test(start_paused = true)]
async fn test_chat_url_and_append_order() {
    let (mut chat, _connector, mut peers) = chat(&RealtimeConfig::default());

    assert!(chat.connect("42", "tok").await);
    let peer = peers.next().await.unwrap();
    assert_eq!(peer.url(), "ws://127.0.0.1:8000/ws/chat/42/?token=tok");

    peer.push_text(r#"{"type":"connection_success"}"#);
    peer.push_text(r#"{"message":"Hello","sender":"ana"}"#);
    peer.push_text(r#"{"type":"heartbeat"}"#);
    peer.push_text(r#"{"message":"On my way","sender":7,"is_provider":true}"#);
    peer.push_text(r#"{"message":"Thanks"}"#);
    settle().await;

    assert!(chat.is_connected());
    assert_eq!(log(&chat), vec!["Hello", "On my way", "Thanks"]);

    let messages = chat.messages();
    assert_eq!(messages[0].sender.as_deref(), Some("ana"));
    assert!(!messages[0].is_provider);
    assert_eq!(messages[1].sender.as_deref(), Some("7"));
    assert!(messages[1].is_provider);
}

#[tokio::test(start_paused = true)]
async fn test_send_message() {
    let (mut chat, _connector, mut peers) = chat(&RealtimeConfig::default());

    // Not open yet: dropped, not queued
    assert!(!chat.send_message("early"));

    chat.connect("42", "tok").await;
    let mut peer = peers.next().await.unwrap();
    settle().await;

    assert!(chat.send_message("Is anyone there?"));
    assert!(!chat.send_message(""));
    assert!(!chat.send_message("   \n"));
    settle().await;

    assert_eq!(
        texts(&peer.drain_outbound()),
        vec![r#"{"message":"Is anyone there?"}"#.to_string()]
    );
    // Sent messages come back through the server, not the local log
    assert!(chat.messages().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_conversation_switch_closes_old_connection() {
    let (mut chat, connector, mut peers) = chat(&RealtimeConfig::default());

    chat.connect("42", "tok").await;
    let mut first = peers.next().await.unwrap();
    first.push_text(r#"{"message":"old conversation"}"#);
    settle().await;
    assert_eq!(log(&chat), vec!["old conversation"]);

    assert!(chat.connect("43", "tok").await);
    assert!(first
        .drain_outbound()
        .contains(&Outbound::Close(CloseInfo::normal("conversation switch"))));
    assert!(chat.messages().is_empty());

    let second = peers.next().await.unwrap();
    assert_eq!(second.url(), "ws://127.0.0.1:8000/ws/chat/43/?token=tok");
    assert_eq!(chat.conversation_id(), Some("43"));

    // The old conversation never comes back
    first.close(1000, "");
    second.push_text(r#"{"message":"new conversation"}"#);
    tokio::time::sleep(RETRY * 3).await;

    assert_eq!(connector.connect_count(), 2);
    assert_eq!(log(&chat), vec!["new conversation"]);
}

#[tokio::test(start_paused = true)]
async fn test_same_conversation_is_noop() {
    let (mut chat, connector, mut peers) = chat(&RealtimeConfig::default());

    assert!(chat.connect("42", "tok").await);
    let _peer = peers.next().await.unwrap();
    settle().await;

    assert!(!chat.connect("42", "tok").await);
    assert!(!chat.connect("43", "").await);
    assert_eq!(connector.connect_count(), 1);
    assert_eq!(chat.conversation_id(), Some("42"));
}

#[tokio::test(start_paused = true)]
async fn test_reconnect_keeps_log() {
    let (mut chat, _connector, mut peers) = chat(&RealtimeConfig::default());

    chat.connect("42", "tok").await;
    let first = peers.next().await.unwrap();
    first.push_text(r#"{"message":"one"}"#);
    settle().await;
    first.drop_abruptly();

    let second = peers.next().await.unwrap();
    assert_eq!(second.url(), "ws://127.0.0.1:8000/ws/chat/42/?token=tok");
    second.push_text(r#"{"message":"two"}"#);
    settle().await;

    assert_eq!(log(&chat), vec!["one", "two"]);
}

#[tokio::test(start_paused = true)]
async fn test_disconnect_then_rejoin() {
    let (mut chat, connector, mut peers) = chat(&RealtimeConfig::default());

    chat.connect("42", "tok").await;
    let peer = peers.next().await.unwrap();
    peer.push_text(r#"{"message":"kept"}"#);
    settle().await;

    chat.disconnect().await;
    assert!(!chat.is_connected());
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(connector.connect_count(), 1);

    // Rejoining the same conversation keeps its log
    assert!(chat.connect("42", "tok").await);
    let _again = peers.next().await.unwrap();
    assert_eq!(log(&chat), vec!["kept"]);
}

#[tokio::test(start_paused = true)]
async fn test_invalid_conversation_id_rejected() {
    let (mut chat, connector, _peers) = chat(&RealtimeConfig::default());

    for id in ["42/../admin", "42?token=x", "42#x", "..", "a b"] {
        assert!(!chat.connect(id, "tok").await, "{:?} accepted", id);
    }
    settle().await;

    assert_eq!(connector.connect_count(), 0);
    assert_eq!(chat.conversation_id(), None);
}

#[tokio::test(start_paused = true)]
async fn test_no_heartbeat_on_chat_by_default() {
    let (mut chat, _connector, mut peers) = chat(&RealtimeConfig::default());
    chat.connect("42", "tok").await;
    let mut peer = peers.next().await.unwrap();

    tokio::time::sleep(Duration::from_secs(61)).await;
    assert!(chat.is_connected());
    assert!(peer.drain_outbound().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_chat_heartbeat_opt_in() {
    let config = RealtimeConfig {
        chat_heartbeat: true,
        ..RealtimeConfig::default()
    };
    let (mut chat, _connector, mut peers) = chat(&config);
    chat.connect("42", "tok").await;
    let mut peer = peers.next().await.unwrap();

    tokio::time::sleep(Duration::from_secs(41)).await;
    assert_eq!(
        texts(&peer.drain_outbound()),
        vec![r#"{"type":"heartbeat"}"#.to_string(); 2]
    );
}
