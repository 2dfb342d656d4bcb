//! Chat channel client

mod chat_ws;
mod types;

pub use chat_ws::{ChatLogHandler, ChatRouter};
pub use types::{ChatFrame, ChatMessage, ChatRoute, ChatSend, SharedChatLog};
