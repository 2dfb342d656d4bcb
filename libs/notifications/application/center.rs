//! Notification Center
//!
//! Client-facing facade over the notification channel: owns the channel
//! connection, the session token it authenticates with and the store its
//! handlers write into.

use super::store::{NotificationObserver, NotificationStore, SharedNotificationStore};
use crate::domain::{NotificationId, NotificationRecord, ReadStrategy};
use crate::error::Result;
use crate::infrastructure::client::{
    ControlFrame, NotificationHandler, NotificationRouter, NotificationRoute, ReadReceiptHandler,
};
use crate::infrastructure::config::RealtimeConfig;
use crossbeam_channel::Receiver;
use livesockets::{
    ChannelConnection, ChannelEvent, ChannelScope, Connector, SessionToken, WsMessage,
    NORMAL_CLOSURE,
};
use std::sync::Arc;
use tracing::{debug, info};

/// Live notification feed for one signed-in user
///
/// Every operation is infallible from the caller's point of view: transport
/// failures show up as `is_connected() == false` and are retried in the
/// background according to the configured reconnect policy.
pub struct NotificationCenter {
    channel: ChannelConnection<NotificationRouter>,
    store: SharedNotificationStore,
    session: SessionToken,
    read_strategy: ReadStrategy,
}

impl NotificationCenter {
    /// Center connecting over real WebSockets
    pub fn new(config: &RealtimeConfig) -> Result<Self> {
        Self::build(config, None)
    }

    /// Center using `connector` for the physical connection
    pub fn with_connector(config: &RealtimeConfig, connector: Arc<dyn Connector>) -> Result<Self> {
        Self::build(config, Some(connector))
    }

    fn build(config: &RealtimeConfig, connector: Option<Arc<dyn Connector>>) -> Result<Self> {
        config.validate()?;

        let store = NotificationStore::shared(config.max_notifications);
        let read_strategy = config.read_strategy;

        let mut builder = ChannelConnection::builder(NotificationRouter::new(read_strategy))
            .endpoint(config.endpoint())
            .route(
                NotificationRoute::Notification,
                NotificationHandler::new(Arc::clone(&store)),
            )
            .route(
                NotificationRoute::ReadReceipt,
                ReadReceiptHandler::new(Arc::clone(&store)),
            )
            .heartbeat(
                config.heartbeat_interval(),
                WsMessage::json(&ControlFrame::Heartbeat)?,
            )
            .reconnect_strategy(config.reconnect_strategy())
            .close_timeout(config.close_timeout());

        if let Some(connector) = connector {
            builder = builder.connector(connector);
        }

        Ok(Self {
            channel: builder.build()?,
            store,
            session: SessionToken::default(),
            read_strategy,
        })
    }

    /// Open the notification channel with `token`
    ///
    /// A blank token, or an already active channel, makes this a no-op
    /// returning `false`.
    pub fn connect(&mut self, token: &str) -> bool {
        if token.trim().is_empty() {
            debug!("[Notifications] connect skipped: no token");
            return false;
        }
        if self.channel.is_active() {
            debug!("[Notifications] connect skipped: channel already active");
            return false;
        }

        self.session.set(token);
        self.channel
            .open(Arc::new(self.session.clone()), ChannelScope::Notifications)
    }

    /// Close the channel deliberately; no reconnect follows
    pub async fn disconnect(&mut self) {
        self.channel.close(NORMAL_CLOSURE, "disconnect").await;
    }

    /// End the session: withdraw the token, close the channel and drop the
    /// session's notifications
    pub async fn logout(&mut self) {
        self.session.clear();
        self.channel.close(NORMAL_CLOSURE, "logout").await;
        let removed = self.store.write().clear_all();
        info!("[Notifications] Logged out ({} notifications discarded)", removed);
    }

    pub fn is_connected(&self) -> bool {
        self.channel.is_connected()
    }

    /// All notifications, newest first
    pub fn notifications(&self) -> Vec<NotificationRecord> {
        self.store.read().snapshot()
    }

    /// Unread notifications, newest first
    pub fn unread(&self) -> Vec<NotificationRecord> {
        self.store.read().unread()
    }

    pub fn unread_count(&self) -> usize {
        self.store.read().unread_count()
    }

    pub fn total_count(&self) -> usize {
        self.store.read().total_count()
    }

    /// Mark one notification read; unknown ids are ignored
    pub fn mark_as_read(&self, id: &NotificationId) -> bool {
        self.store.write().mark_one_read(id)
    }

    /// Mark everything read using the configured strategy
    ///
    /// Locally the flip is immediate. Server-confirmed, this only sends the
    /// request; the flip happens when the acknowledgement arrives. Returns
    /// `false` when the request could not be sent.
    pub fn mark_all_as_read(&self) -> bool {
        match self.read_strategy {
            ReadStrategy::Local => {
                let flipped = self.store.write().mark_all_read();
                debug!("[Notifications] Marked {} read locally", flipped);
                true
            }
            ReadStrategy::ServerConfirmed => self.channel.send_json(&ControlFrame::MarkAllAsRead),
        }
    }

    /// Remove every notification
    pub fn clear_notifications(&self) {
        let removed = self.store.write().clear_all();
        debug!("[Notifications] Cleared {} notifications", removed);
    }

    /// Register a hook fired for each newly stored notification
    pub fn subscribe(&self, observer: Arc<dyn NotificationObserver>) {
        self.store.write().subscribe(observer);
    }

    /// Token holder shared with the channel; clearing it stops reconnects
    pub fn session_token(&self) -> &SessionToken {
        &self.session
    }

    pub fn read_strategy(&self) -> ReadStrategy {
        self.read_strategy
    }

    pub fn store(&self) -> &SharedNotificationStore {
        &self.store
    }

    pub fn channel(&self) -> &ChannelConnection<NotificationRouter> {
        &self.channel
    }

    /// Next pending lifecycle event, if any
    pub fn try_recv_event(&self) -> Option<ChannelEvent> {
        self.channel.try_recv_event()
    }

    /// Lifecycle event feed for a consumer on another thread
    pub fn events(&self) -> Receiver<ChannelEvent> {
        self.channel.events()
    }
}
