//! Infrastructure Layer
//!
//! Channel clients, configuration, logging and process lifecycle.

pub mod client;
pub mod config;
pub mod logging;
pub mod shutdown;

pub use client::{
    ChatLogHandler, ChatRouter, ChatSend, ControlFrame, NotificationHandler, NotificationRouter,
    NotificationRoute, ReadReceiptHandler, SharedChatLog,
};
pub use config::{
    require_env, ConfigError, DeploymentConfig, Environment, RealtimeConfig, ReconnectConfig,
    ReconnectPolicy,
};
pub use logging::{init_tracing, init_tracing_with_level};
pub use shutdown::ShutdownManager;
