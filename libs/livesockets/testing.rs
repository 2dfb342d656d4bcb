//! In-memory connector for deterministic channel tests
//!
//! Enabled with the `testing` feature. Each successful connect hands a
//! [`MockPeer`] to the test, which plays the server side of that one
//! physical connection.
//!
//! ```ignore
//! let (connector, mut peers) = MockConnector::new();
//! let mut channel = ChannelConnection::builder(MyRouter)
//!     .endpoint(Endpoint::new(DeploymentMode::development()))
//!     .route(Route::Feed, handler)
//!     .connector(connector.clone())
//!     .build()?;
//!
//! channel.open(Arc::new(StaticToken("abc".into())), ChannelScope::Notifications);
//! let mut peer = peers.next().await.unwrap();
//! peer.push_text(r#"{"type":"notification","message":"hi"}"#);
//! ```

use crate::traits::*;
use async_trait::async_trait;
use futures::channel::mpsc as fmpsc;
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Connector that creates in-memory transports
pub struct MockConnector {
    urls: Mutex<Vec<String>>,
    refuse: AtomicBool,
    peer_tx: mpsc::UnboundedSender<MockPeer>,
}

/// Server ends of the connections a [`MockConnector`] established, in order
pub struct MockPeers {
    rx: mpsc::UnboundedReceiver<MockPeer>,
}

impl MockConnector {
    pub fn new() -> (Arc<Self>, MockPeers) {
        let (peer_tx, rx) = mpsc::unbounded_channel();
        let connector = Arc::new(Self {
            urls: Mutex::new(Vec::new()),
            refuse: AtomicBool::new(false),
            peer_tx,
        });
        (connector, MockPeers { rx })
    }

    /// Make subsequent connect attempts fail
    pub fn refuse_connections(&self, refuse: bool) {
        self.refuse.store(refuse, Ordering::Release);
    }

    /// Number of connect attempts, successful or not
    pub fn connect_count(&self) -> usize {
        self.urls.lock().len()
    }

    /// URLs of all connect attempts, oldest first
    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().clone()
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(&self, url: &str) -> Result<Transport> {
        self.urls.lock().push(url.to_string());

        if self.refuse.load(Ordering::Acquire) {
            return Err(ChannelError::WebSocket("connection refused".into()));
        }

        let (inbound_tx, inbound_rx) = fmpsc::unbounded::<Result<Inbound>>();
        let (outbound_tx, outbound_rx) = fmpsc::unbounded::<Outbound>();

        let peer = MockPeer {
            url: url.to_string(),
            inbound: inbound_tx,
            outbound: outbound_rx,
        };
        let _ = self.peer_tx.send(peer);

        let sink = outbound_tx.sink_map_err(|e| ChannelError::ConnectionClosed(e.to_string()));

        Ok(Transport {
            sink: Box::pin(sink),
            stream: Box::pin(inbound_rx),
        })
    }
}

impl MockPeers {
    /// Wait for the next established connection
    pub async fn next(&mut self) -> Option<MockPeer> {
        self.rx.recv().await
    }

    pub fn try_next(&mut self) -> Option<MockPeer> {
        self.rx.try_recv().ok()
    }
}

/// Server side of one in-memory connection
pub struct MockPeer {
    url: String,
    inbound: fmpsc::UnboundedSender<Result<Inbound>>,
    outbound: fmpsc::UnboundedReceiver<Outbound>,
}

impl MockPeer {
    /// URL the client dialled, token included
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Deliver a text frame to the client
    pub fn push_text(&self, text: impl Into<String>) -> bool {
        self.inbound
            .unbounded_send(Ok(Inbound::Message(WsMessage::Text(text.into()))))
            .is_ok()
    }

    /// Deliver a JSON text frame to the client
    pub fn push_json(&self, payload: &serde_json::Value) -> bool {
        self.push_text(payload.to_string())
    }

    /// Deliver a transport error to the client
    pub fn push_error(&self, error: impl Into<String>) -> bool {
        self.inbound
            .unbounded_send(Err(ChannelError::WebSocket(error.into())))
            .is_ok()
    }

    /// Send a close frame and end the stream
    pub fn close(&self, code: u16, reason: &str) {
        let _ = self
            .inbound
            .unbounded_send(Ok(Inbound::Closed(CloseInfo::new(code, reason))));
        self.inbound.close_channel();
    }

    /// End the stream without a close frame (network loss)
    pub fn drop_abruptly(self) {
        self.inbound.close_channel();
    }

    /// Wait for the next frame the client wrote
    ///
    /// `None` once the client has released its end.
    pub async fn next_outbound(&mut self) -> Option<Outbound> {
        self.outbound.next().await
    }

    pub fn try_outbound(&mut self) -> Option<Outbound> {
        self.outbound.try_next().ok().flatten()
    }

    /// Everything the client has written so far
    pub fn drain_outbound(&mut self) -> Vec<Outbound> {
        let mut frames = Vec::new();
        while let Some(frame) = self.try_outbound() {
            frames.push(frame);
        }
        frames
    }
}
