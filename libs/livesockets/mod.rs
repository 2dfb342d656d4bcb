//! # LiveSockets
//!
//! Client-side manager for one persistent, bidirectional JSON channel.
//!
//! ## Features
//!
//! - **Single owner**: exactly one physical connection per [`ChannelConnection`]
//! - **Heartbeat**: fixed-interval liveness pings while the channel is open
//! - **Reconnection**: delayed retry after unexpected closes, never after deliberate ones
//! - **In-order dispatch**: frames are parsed and routed on the connection task
//!   in transport order; malformed frames are logged and skipped
//! - **Type-state builder**: endpoint and at least one handler are required at compile time

pub mod traits;
pub mod core;

#[cfg(feature = "testing")]
pub mod testing;

// Re-export all traits
pub use traits::*;

// Re-export core client functionality
pub use crate::core::{
    builder, client, config, connection_state, dispatcher, endpoint, heartbeat,
    builder::{states, ChannelBuilder, DEFAULT_CLOSE_TIMEOUT},
    client::{ChannelConnection, ChannelEvent, Metrics, EVENT_QUEUE_CAPACITY},
    config::ChannelConfig,
    connection_state::{AtomicConnectionState, AtomicMetrics, ConnectionState},
    dispatcher::{DispatchOutcome, RouteTable},
    endpoint::{is_path_segment, ChannelScope, DeploymentMode, Endpoint, DEFAULT_DEV_HOST},
    heartbeat::{HeartbeatMonitor, DEFAULT_HEARTBEAT_INTERVAL},
    transport::TungsteniteConnector,
};
