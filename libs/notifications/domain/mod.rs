//! Domain Layer
//!
//! Records the UI renders. No transport or storage concerns live here.

pub mod chat;
pub mod notification;
pub mod read_strategy;

pub use chat::ChatMessageRecord;
pub use notification::{parse_timestamp, Category, NotificationId, NotificationRecord, DEFAULT_TITLE};
pub use read_strategy::ReadStrategy;
