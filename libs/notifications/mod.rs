//! Service desk realtime notifications
//!
//! Live notification feed and per-conversation chat built on `livesockets`:
//!
//! - **domain**: notification and chat records
//! - **application**: `NotificationCenter`, `ChatChannel` and the notification store
//! - **infrastructure**: channel routers/handlers, config, logging, shutdown

pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;

pub use application::{
    ChatChannel, NotificationCenter, NotificationObserver, NotificationStore,
    SharedNotificationStore,
};
pub use domain::{
    ChatMessageRecord, Category, NotificationId, NotificationRecord, ReadStrategy, DEFAULT_TITLE,
};
pub use error::{RealtimeError, Result};
pub use infrastructure::{
    init_tracing, init_tracing_with_level, ConfigError, RealtimeConfig, ShutdownManager,
};
