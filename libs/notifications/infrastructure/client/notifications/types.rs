//! Notification channel wire types

use crate::domain::{parse_timestamp, NotificationId, NotificationRecord};
use chrono::{DateTime, Utc};
use livesockets::ChannelError;
use serde::{Deserialize, Serialize};

/// Liveness ping, both directions
pub const HEARTBEAT: &str = "heartbeat";

/// Handshake acknowledgement sent after the server accepts the token
pub const CONNECTION_SUCCESS: &str = "connection_success";

/// Server confirmation of a bulk read
pub const ALL_READ_SUCCESS: &str = "ALL_READ_SUCCESS";

/// Inbound notification-channel frame
///
/// Everything is optional at the wire level; a domain frame without a
/// `message` is rejected when converted into a record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationFrame {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub created_at: Option<serde_json::Value>,
}

impl NotificationFrame {
    /// Build the record for a domain frame received at `received_at`
    pub fn into_record(self, received_at: DateTime<Utc>) -> livesockets::Result<NotificationRecord> {
        let message = self.message.ok_or_else(|| {
            ChannelError::Parse("notification frame without message".to_string())
        })?;

        let id = self
            .id
            .as_ref()
            .and_then(id_from_json)
            .unwrap_or_else(|| NotificationId::synthesize(received_at));

        let created_at = self
            .created_at
            .as_ref()
            .and_then(|v| v.as_str())
            .and_then(parse_timestamp)
            .unwrap_or(received_at);

        let mut record = NotificationRecord::new(id, message).with_created_at(created_at);
        if let Some(title) = self.title.filter(|t| !t.trim().is_empty()) {
            record = record.with_title(title);
        }
        if let Some(kind) = self.kind.filter(|k| !k.trim().is_empty()) {
            record = record.with_kind(kind);
        }
        Ok(record)
    }
}

/// Server-assigned id; `None` for null, blank or non-scalar values
fn id_from_json(value: &serde_json::Value) -> Option<NotificationId> {
    match value {
        serde_json::Value::Number(n) => Some(
            n.as_i64()
                .map(NotificationId::Number)
                .unwrap_or_else(|| NotificationId::Text(n.to_string())),
        ),
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(NotificationId::Text(s.clone())),
        _ => None,
    }
}

/// Parsed notification-channel message
#[derive(Debug)]
pub enum NotificationMessage {
    Heartbeat,
    ConnectionAck,
    /// Server finished a bulk read
    AllRead,
    Notification(NotificationRecord),
}

/// Route key for notification messages
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub enum NotificationRoute {
    /// New record for the store
    Notification,
    /// Bulk read confirmation
    ReadReceipt,
}

/// Outbound control frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum ControlFrame {
    #[serde(rename = "heartbeat")]
    Heartbeat,
    #[serde(rename = "MARK_ALL_AS_READ")]
    MarkAllAsRead,
}
