//! # LiveSockets Traits
//!
//! Core traits and types shared by the connection driver and its users:
//!
//! - **MessageRouter / MessageHandler**: classify inbound frames and route them
//! - **CredentialProvider**: supply the token for every connection attempt
//! - **ReconnectionStrategy**: control retry timing after unexpected closes
//! - **ChannelObserver**: receive lifecycle signals
//! - **Connector**: establish the physical connection

pub mod credentials;
pub mod error;
pub mod frame;
pub mod observer;
pub mod reconnect;
pub mod router;
pub mod transport;

// Re-export commonly used types
pub use credentials::{CredentialProvider, SessionToken, StaticToken};
pub use error::{ChannelError, Result};
pub use frame::{CloseInfo, Inbound, Outbound, WsMessage, ABNORMAL_CLOSURE, NORMAL_CLOSURE};
pub use observer::ChannelObserver;
pub use reconnect::{
    ExponentialBackoff, FixedDelay, NeverReconnect, ReconnectionStrategy, DEFAULT_RECONNECT_DELAY,
};
pub use router::{MessageHandler, MessageRouter};
pub use transport::{Connector, FrameSink, FrameStream, Transport};
