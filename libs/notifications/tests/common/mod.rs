//! Common test utilities for the notifications integration tests

#![allow(dead_code)]

use livesockets::testing::{MockConnector, MockPeers};
use livesockets::{ChannelEvent, Outbound};
use notifications::{
    ChatChannel, NotificationCenter, NotificationObserver, NotificationRecord, RealtimeConfig,
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// Macro for verbose test output (controlled by TEST_VERBOSE env var)
#[macro_export]
macro_rules! verbose_println {
    ($($arg:tt)*) => {
        if std::env::var("TEST_VERBOSE").is_ok() {
            println!($($arg)*);
        }
    };
}

pub const RETRY: Duration = Duration::from_secs(5);

pub fn center(config: &RealtimeConfig) -> (NotificationCenter, Arc<MockConnector>, MockPeers) {
    let (connector, peers) = MockConnector::new();
    let center = NotificationCenter::with_connector(config, connector.clone()).unwrap();
    (center, connector, peers)
}

pub fn chat(config: &RealtimeConfig) -> (ChatChannel, Arc<MockConnector>, MockPeers) {
    let (connector, peers) = MockConnector::new();
    let chat = ChatChannel::with_connector(config, connector.clone()).unwrap();
    (chat, connector, peers)
}

/// Notification frame with a numeric id
pub fn notification(id: i64, message: &str) -> String {
    serde_json::json!({ "id": id, "title": "Request update", "message": message, "type": "info" })
        .to_string()
}

/// Let every ready task run before continuing (paused time)
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

/// Text payloads of everything the client wrote, close frames excluded
pub fn texts(frames: &[Outbound]) -> Vec<String> {
    frames
        .iter()
        .filter_map(|f| f.as_text().map(str::to_string))
        .collect()
}

pub fn drain_events(mut next: impl FnMut() -> Option<ChannelEvent>) -> Vec<ChannelEvent> {
    let mut events = Vec::new();
    while let Some(event) = next() {
        events.push(event);
    }
    events
}

/// Records the message of each new notification, in delivery order
#[derive(Default)]
pub struct MessageRecorder(pub Mutex<Vec<String>>);

impl NotificationObserver for MessageRecorder {
    fn on_notification(&self, record: &NotificationRecord) {
        self.0.lock().push(record.message.clone());
    }
}
