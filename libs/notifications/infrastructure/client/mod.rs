//! Realtime channel clients
//!
//! Routers and handlers plugged into `livesockets` channel connections.

pub mod chat;
pub mod notifications;

pub use chat::{ChatLogHandler, ChatRouter, ChatSend, SharedChatLog};
pub use notifications::{
    ControlFrame, NotificationHandler, NotificationRouter, NotificationRoute, ReadReceiptHandler,
};
