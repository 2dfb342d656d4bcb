//! Notification channel client
//!
//! Router and handlers for the `/ws/notifications/` feed: control frames
//! are consumed, domain frames land in the notification store.

mod notifications_ws;
mod types;

pub use notifications_ws::{NotificationHandler, NotificationRouter, ReadReceiptHandler};
pub use types::{
    ControlFrame, NotificationFrame, NotificationMessage, NotificationRoute, ALL_READ_SUCCESS,
    CONNECTION_SUCCESS, HEARTBEAT,
};
