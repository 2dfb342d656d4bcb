//! Chat channel router and handler
//!
//! Frames from `/ws/chat/<conversation>/` are appended to the
//! conversation log in arrival order.

use super::types::{ChatFrame, ChatMessage, ChatRoute, SharedChatLog};
use crate::infrastructure::client::notifications::{CONNECTION_SUCCESS, HEARTBEAT};
use chrono::Utc;
use livesockets::{ChannelError, MessageHandler, MessageRouter, WsMessage};
use tracing::debug;

// =============================================================================
// Router
// =============================================================================

/// Router for chat frames; anything that is not a control frame is a message
pub struct ChatRouter;

impl ChatRouter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ChatRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageRouter for ChatRouter {
    type Message = ChatMessage;
    type RouteKey = ChatRoute;

    fn parse(&self, message: &WsMessage) -> livesockets::Result<Self::Message> {
        let text = message
            .as_text()
            .ok_or_else(|| ChannelError::Parse("binary frame on chat channel".into()))?;

        let value: serde_json::Value = serde_json::from_str(text)?;
        match value.get("type").and_then(|t| t.as_str()) {
            Some(HEARTBEAT) => Ok(ChatMessage::Heartbeat),
            Some(CONNECTION_SUCCESS) => Ok(ChatMessage::ConnectionAck),
            _ => {
                let frame: ChatFrame = serde_json::from_value(value)?;
                Ok(ChatMessage::Message(frame.into_record(Utc::now())))
            }
        }
    }

    fn route_key(&self, message: &Self::Message) -> Option<Self::RouteKey> {
        match message {
            ChatMessage::Heartbeat | ChatMessage::ConnectionAck => None,
            ChatMessage::Message(_) => Some(ChatRoute::Message),
        }
    }
}

// =============================================================================
// Handler
// =============================================================================

/// Appends chat messages to the shared conversation log
pub struct ChatLogHandler {
    log: SharedChatLog,
}

impl ChatLogHandler {
    pub fn new(log: SharedChatLog) -> Self {
        Self { log }
    }
}

impl MessageHandler<ChatMessage> for ChatLogHandler {
    fn handle(&mut self, message: ChatMessage) -> livesockets::Result<()> {
        if let ChatMessage::Message(record) = message {
            let mut log = self.log.write();
            log.push(record);
            debug!("[Chat WS] Message appended ({} in log)", log.len());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use livesockets::{DispatchOutcome, RouteTable};
    use parking_lot::RwLock;
    use std::sync::Arc;

    #[test]
    fn test_messages_appended_in_arrival_order() {
        let log: SharedChatLog = Arc::new(RwLock::new(Vec::new()));
        let mut table = RouteTable::<ChatRouter>::new();
        table.insert(ChatRoute::Message, ChatLogHandler::new(log.clone()));
        let router = ChatRouter::new();

        let frames = [
            r#"{"type":"connection_success"}"#,
            r#"{"message":"first","sender":"ana"}"#,
            r#"{"type":"heartbeat"}"#,
            "garbage",
            r#"{"type":"chat_message","message":"second","is_provider":true}"#,
        ];
        let outcomes: Vec<_> = frames
            .iter()
            .map(|f| table.dispatch(&router, &WsMessage::Text(f.to_string())))
            .collect();

        assert_eq!(
            outcomes,
            vec![
                DispatchOutcome::Discarded,
                DispatchOutcome::Delivered,
                DispatchOutcome::Discarded,
                DispatchOutcome::Malformed,
                DispatchOutcome::Delivered,
            ]
        );

        let messages: Vec<_> = log.read().iter().map(|m| m.message.clone()).collect();
        assert_eq!(messages, vec!["first", "second"]);
        assert!(log.read()[1].is_provider);
    }
}
