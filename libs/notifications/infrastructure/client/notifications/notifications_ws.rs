//! Notification channel router and handlers
//!
//! Parses frames from `/ws/notifications/` and feeds the shared
//! notification store.

use super::types::{
    NotificationFrame, NotificationMessage, NotificationRoute, ALL_READ_SUCCESS,
    CONNECTION_SUCCESS, HEARTBEAT,
};
use crate::application::store::{insert_and_notify, SharedNotificationStore};
use crate::domain::ReadStrategy;
use chrono::Utc;
use livesockets::{ChannelError, MessageHandler, MessageRouter, WsMessage};
use tracing::{debug, info};

// =============================================================================
// Router - Parses WebSocket messages
// =============================================================================

/// Router for notification channel frames
///
/// With the local read strategy an `ALL_READ_SUCCESS` frame is treated as
/// a control frame; only a server-confirmed center acts on it.
pub struct NotificationRouter {
    read_strategy: ReadStrategy,
}

impl NotificationRouter {
    pub fn new(read_strategy: ReadStrategy) -> Self {
        Self { read_strategy }
    }
}

impl Default for NotificationRouter {
    fn default() -> Self {
        Self::new(ReadStrategy::default())
    }
}

impl MessageRouter for NotificationRouter {
    type Message = NotificationMessage;
    type RouteKey = NotificationRoute;

    fn parse(&self, message: &WsMessage) -> livesockets::Result<Self::Message> {
        let text = message
            .as_text()
            .ok_or_else(|| ChannelError::Parse("binary frame on notification channel".into()))?;

        let frame: NotificationFrame = serde_json::from_str(text)?;

        match frame.kind.as_deref() {
            Some(HEARTBEAT) => Ok(NotificationMessage::Heartbeat),
            Some(CONNECTION_SUCCESS) => Ok(NotificationMessage::ConnectionAck),
            Some(ALL_READ_SUCCESS) => Ok(NotificationMessage::AllRead),
            _ => frame
                .into_record(Utc::now())
                .map(NotificationMessage::Notification),
        }
    }

    fn route_key(&self, message: &Self::Message) -> Option<Self::RouteKey> {
        match message {
            NotificationMessage::Heartbeat | NotificationMessage::ConnectionAck => None,
            NotificationMessage::AllRead => match self.read_strategy {
                ReadStrategy::ServerConfirmed => Some(NotificationRoute::ReadReceipt),
                ReadStrategy::Local => None,
            },
            NotificationMessage::Notification(_) => Some(NotificationRoute::Notification),
        }
    }
}

// =============================================================================
// Handlers - Update the notification store
// =============================================================================

/// Prepends new notifications to the store
pub struct NotificationHandler {
    store: SharedNotificationStore,
}

impl NotificationHandler {
    pub fn new(store: SharedNotificationStore) -> Self {
        Self { store }
    }
}

impl MessageHandler<NotificationMessage> for NotificationHandler {
    fn handle(&mut self, message: NotificationMessage) -> livesockets::Result<()> {
        if let NotificationMessage::Notification(record) = message {
            let id = record.id.clone();
            if insert_and_notify(&self.store, record) {
                debug!("[Notifications WS] Stored notification {}", id);
            }
        }
        Ok(())
    }
}

/// Applies the server's bulk read confirmation
pub struct ReadReceiptHandler {
    store: SharedNotificationStore,
}

impl ReadReceiptHandler {
    pub fn new(store: SharedNotificationStore) -> Self {
        Self { store }
    }
}

impl MessageHandler<NotificationMessage> for ReadReceiptHandler {
    fn handle(&mut self, message: NotificationMessage) -> livesockets::Result<()> {
        if let NotificationMessage::AllRead = message {
            let flipped = self.store.write().mark_all_read();
            info!("[Notifications WS] Server confirmed read-all ({} flipped)", flipped);
        }
        Ok(())
    }
}
