use crate::{Inbound, Outbound, Result};
use async_trait::async_trait;
use futures::{Sink, Stream};
use std::pin::Pin;

/// Write half of a physical connection
pub type FrameSink = Pin<Box<dyn Sink<Outbound, Error = crate::ChannelError> + Send>>;

/// Read half of a physical connection
///
/// The stream ending (`None`) without a [`Inbound::Closed`] frame is an
/// abnormal closure.
pub type FrameStream = Pin<Box<dyn Stream<Item = Result<Inbound>> + Send>>;

/// One established physical connection
pub struct Transport {
    pub sink: FrameSink,
    pub stream: FrameStream,
}

/// Trait for establishing physical connections
///
/// The production implementation dials a WebSocket; tests substitute an
/// in-memory connector to script the peer.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Open a connection to `url`
    async fn connect(&self, url: &str) -> Result<Transport>;
}
