//! Chat Channel
//!
//! One conversation at a time over `/ws/chat/<conversation>/`. Switching
//! conversations closes the old connection before the new one opens.

use crate::domain::ChatMessageRecord;
use crate::error::Result;
use crate::infrastructure::client::chat::ChatRoute;
use crate::infrastructure::client::{ChatLogHandler, ChatRouter, ChatSend, ControlFrame, SharedChatLog};
use crate::infrastructure::config::RealtimeConfig;
use crossbeam_channel::Receiver;
use livesockets::{
    is_path_segment, ChannelConnection, ChannelEvent, ChannelScope, Connector, SessionToken,
    WsMessage, NORMAL_CLOSURE,
};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct ChatChannel {
    channel: ChannelConnection<ChatRouter>,
    log: SharedChatLog,
    session: SessionToken,
    conversation_id: Option<String>,
}

impl ChatChannel {
    pub fn new(config: &RealtimeConfig) -> Result<Self> {
        Self::build(config, None)
    }

    pub fn with_connector(config: &RealtimeConfig, connector: Arc<dyn Connector>) -> Result<Self> {
        Self::build(config, Some(connector))
    }

    fn build(config: &RealtimeConfig, connector: Option<Arc<dyn Connector>>) -> Result<Self> {
        config.validate()?;

        let log: SharedChatLog = Arc::new(RwLock::new(Vec::new()));

        let mut builder = ChannelConnection::builder(ChatRouter::new())
            .endpoint(config.endpoint())
            .route(ChatRoute::Message, ChatLogHandler::new(Arc::clone(&log)))
            .reconnect_strategy(config.reconnect_strategy())
            .close_timeout(config.close_timeout());

        if config.chat_heartbeat {
            builder = builder.heartbeat(
                config.heartbeat_interval(),
                WsMessage::json(&ControlFrame::Heartbeat)?,
            );
        }
        if let Some(connector) = connector {
            builder = builder.connector(connector);
        }

        Ok(Self {
            channel: builder.build()?,
            log,
            session: SessionToken::default(),
            conversation_id: None,
        })
    }

    /// Join `conversation_id`
    ///
    /// Joining the conversation that is already active is a no-op, as is a
    /// blank token or an id that is not a single path segment. Joining
    /// another one closes the current connection and clears the log first.
    pub async fn connect(&mut self, conversation_id: &str, token: &str) -> bool {
        if token.trim().is_empty() || conversation_id.trim().is_empty() {
            debug!("[Chat] connect skipped: missing token or conversation");
            return false;
        }
        if !is_path_segment(conversation_id) {
            warn!("[Chat] connect skipped: invalid conversation id {:?}", conversation_id);
            return false;
        }

        if self.channel.is_active() {
            if self.conversation_id.as_deref() == Some(conversation_id) {
                debug!("[Chat] Already in conversation {}", conversation_id);
                return false;
            }
            self.channel.close(NORMAL_CLOSURE, "conversation switch").await;
        }

        if self.conversation_id.as_deref() != Some(conversation_id) {
            self.log.write().clear();
            info!("[Chat] Switching to conversation {}", conversation_id);
        }

        self.session.set(token);
        self.conversation_id = Some(conversation_id.to_string());
        self.channel
            .open(Arc::new(self.session.clone()), ChannelScope::chat(conversation_id))
    }

    /// Leave the conversation; no reconnect follows
    pub async fn disconnect(&mut self) {
        self.channel.close(NORMAL_CLOSURE, "disconnect").await;
    }

    /// Send `text` to the conversation
    ///
    /// Blank messages are rejected, and nothing is queued while the channel
    /// is not open. The server echoes accepted messages back, so the log is
    /// only ever written by inbound frames.
    pub fn send_message(&self, text: &str) -> bool {
        if text.trim().is_empty() {
            debug!("[Chat] Ignoring blank message");
            return false;
        }
        self.channel.send_json(&ChatSend::new(text))
    }

    /// Conversation log, oldest first
    pub fn messages(&self) -> Vec<ChatMessageRecord> {
        self.log.read().clone()
    }

    pub fn is_connected(&self) -> bool {
        self.channel.is_connected()
    }

    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }

    pub fn session_token(&self) -> &SessionToken {
        &self.session
    }

    pub fn channel(&self) -> &ChannelConnection<ChatRouter> {
        &self.channel
    }

    pub fn try_recv_event(&self) -> Option<ChannelEvent> {
        self.channel.try_recv_event()
    }

    /// Lifecycle event feed for a consumer on another thread
    pub fn events(&self) -> Receiver<ChannelEvent> {
        self.channel.events()
    }
}
