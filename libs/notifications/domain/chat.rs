//! Chat message records

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One message in a conversation log
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessageRecord {
    /// Sender identity as reported by the server, if any
    pub sender: Option<String>,
    /// Whether the sender is the service provider side of the conversation
    pub is_provider: bool,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl ChatMessageRecord {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            sender: None,
            is_provider: false,
            message: message.into(),
            created_at: Utc::now(),
        }
    }

    pub fn from_sender(mut self, sender: impl Into<String>, is_provider: bool) -> Self {
        self.sender = Some(sender.into());
        self.is_provider = is_provider;
        self
    }
}
