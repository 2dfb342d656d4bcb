//! Application Layer
//!
//! Client-facing facades and the state they expose.

pub mod center;
pub mod chat;
pub mod store;

pub use center::NotificationCenter;
pub use chat::ChatChannel;
pub use store::{insert_and_notify, NotificationObserver, NotificationStore, SharedNotificationStore};
