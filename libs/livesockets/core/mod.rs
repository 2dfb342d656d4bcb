//! Channel connection internals
//!
//! [`ChannelConnection`](client::ChannelConnection) owns the socket task;
//! everything else here is configuration and plumbing it drives.

pub mod builder;
pub mod client;
pub mod config;
pub mod connection_state;
pub mod dispatcher;
pub mod endpoint;
pub mod heartbeat;
pub mod transport;

pub use builder::{states, ChannelBuilder};
pub use client::{ChannelConnection, ChannelEvent, Metrics};
pub use config::ChannelConfig;
pub use connection_state::{AtomicConnectionState, AtomicMetrics, ConnectionState};
pub use dispatcher::{DispatchOutcome, RouteTable};
pub use endpoint::{ChannelScope, DeploymentMode, Endpoint};
pub use heartbeat::{HeartbeatMonitor, DEFAULT_HEARTBEAT_INTERVAL};
pub use transport::TungsteniteConnector;
