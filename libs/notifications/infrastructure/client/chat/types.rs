//! Chat channel wire types

use crate::domain::{parse_timestamp, ChatMessageRecord};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Conversation log shared between the chat handler and the UI side,
/// oldest message first
pub type SharedChatLog = Arc<RwLock<Vec<ChatMessageRecord>>>;

/// Inbound chat frame
#[derive(Debug, Clone, Deserialize)]
pub struct ChatFrame {
    pub message: String,
    #[serde(default)]
    pub sender: Option<serde_json::Value>,
    #[serde(default)]
    pub is_provider: Option<bool>,
    #[serde(default)]
    pub created_at: Option<serde_json::Value>,
}

impl ChatFrame {
    pub fn into_record(self, received_at: DateTime<Utc>) -> ChatMessageRecord {
        let mut record = ChatMessageRecord::new(self.message);
        record.created_at = self
            .created_at
            .as_ref()
            .and_then(|v| v.as_str())
            .and_then(parse_timestamp)
            .unwrap_or(received_at);

        // Servers send either a user id or a display name
        let sender = match self.sender {
            Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s),
            Some(serde_json::Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };
        match sender {
            Some(sender) => record.from_sender(sender, self.is_provider.unwrap_or(false)),
            None => {
                record.is_provider = self.is_provider.unwrap_or(false);
                record
            }
        }
    }
}

/// Parsed chat-channel message
#[derive(Debug)]
pub enum ChatMessage {
    Heartbeat,
    ConnectionAck,
    Message(ChatMessageRecord),
}

#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub enum ChatRoute {
    Message,
}

/// Outbound chat send; carries no `type` field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatSend {
    pub message: String,
}

impl ChatSend {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
