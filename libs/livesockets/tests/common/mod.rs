//! Common test utilities for LiveSockets integration tests
//!
//! A small JSON router shared by the test files, plus a real WebSocket
//! server for the tests that go over TCP.

#![allow(dead_code)]

use livesockets::*;
use parking_lot::Mutex;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Notify;

/// Macro for verbose test output (controlled by TEST_VERBOSE env var)
#[macro_export]
macro_rules! verbose_println {
    ($($arg:tt)*) => {
        if std::env::var("TEST_VERBOSE").is_ok() {
            println!($($arg)*);
        }
    };
}

pub const HEARTBEAT_JSON: &str = r#"{"type":"heartbeat"}"#;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Text,
}

#[derive(Debug)]
pub enum TestMessage {
    Control(String),
    Text(String),
}

/// Routes `{"type": .., "text": ..}` frames; heartbeat and handshake acks
/// are control frames
pub struct JsonRouter;

impl MessageRouter for JsonRouter {
    type Message = TestMessage;
    type RouteKey = Route;

    fn parse(&self, message: &WsMessage) -> Result<TestMessage> {
        let text = message
            .as_text()
            .ok_or_else(|| ChannelError::Parse("binary frame".into()))?;
        let value: serde_json::Value = serde_json::from_str(text)?;
        let kind = value.get("type").and_then(|v| v.as_str()).unwrap_or_default();

        match kind {
            "heartbeat" | "connection_success" => Ok(TestMessage::Control(kind.to_string())),
            _ => value
                .get("text")
                .and_then(|t| t.as_str())
                .map(|t| TestMessage::Text(t.to_string()))
                .ok_or_else(|| ChannelError::Parse("missing text".into())),
        }
    }

    fn route_key(&self, message: &TestMessage) -> Option<Route> {
        match message {
            TestMessage::Control(_) => None,
            TestMessage::Text(_) => Some(Route::Text),
        }
    }
}

/// Records delivered texts in order
pub struct Collector(pub Arc<Mutex<Vec<String>>>);

impl MessageHandler<TestMessage> for Collector {
    fn handle(&mut self, message: TestMessage) -> Result<()> {
        if let TestMessage::Text(text) = message {
            self.0.lock().push(text);
        }
        Ok(())
    }
}

pub fn heartbeat_frame() -> WsMessage {
    WsMessage::Text(HEARTBEAT_JSON.to_string())
}

pub fn text_frame(text: &str) -> String {
    serde_json::json!({ "type": "chat", "text": text }).to_string()
}

pub fn token(value: &str) -> Arc<dyn CredentialProvider> {
    Arc::new(StaticToken(value.to_string()))
}

/// Channel with the production defaults (20s heartbeat, 5s fixed retry)
pub fn test_channel(
    connector: Arc<dyn Connector>,
) -> (ChannelConnection<JsonRouter>, Arc<Mutex<Vec<String>>>) {
    test_channel_with(connector, FixedDelay::default())
}

pub fn test_channel_with(
    connector: Arc<dyn Connector>,
    strategy: impl ReconnectionStrategy + 'static,
) -> (ChannelConnection<JsonRouter>, Arc<Mutex<Vec<String>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let channel = ChannelConnection::builder(JsonRouter)
        .endpoint(Endpoint::new(DeploymentMode::development()))
        .route(Route::Text, Collector(Arc::clone(&seen)))
        .heartbeat(DEFAULT_HEARTBEAT_INTERVAL, heartbeat_frame())
        .reconnect_strategy(strategy)
        .connector(connector)
        .build()
        .unwrap();
    (channel, seen)
}

/// Let every ready task run before continuing
///
/// Under paused time the clock only advances once the runtime is idle, so
/// a short sleep parks the test until the connection task has caught up.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

/// Drain all lifecycle events published so far
pub fn drain_events<R: MessageRouter>(channel: &ChannelConnection<R>) -> Vec<ChannelEvent> {
    let mut events = Vec::new();
    while let Some(event) = channel.try_recv_event() {
        events.push(event);
    }
    events
}

/// Poll `condition` until it holds or `timeout` passes (real time)
pub async fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}

/// A mock WebSocket server for tests that go over TCP
///
/// Sends `greeting` frames on every new connection, echoes text frames
/// and answers close frames.
pub struct MockWsServer {
    pub addr: SocketAddr,
    shutdown: Arc<Notify>,
    requests: Arc<Mutex<Vec<String>>>,
    received: Arc<Mutex<Vec<String>>>,
    close_codes: Arc<Mutex<Vec<u16>>>,
}

impl MockWsServer {
    /// Create and start a new mock WebSocket server
    pub async fn start(greeting: Vec<String>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = Arc::new(Notify::new());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let received = Arc::new(Mutex::new(Vec::new()));
        let close_codes = Arc::new(Mutex::new(Vec::new()));

        let server = ConnectionLog {
            greeting,
            shutdown: Arc::clone(&shutdown),
            requests: Arc::clone(&requests),
            received: Arc::clone(&received),
            close_codes: Arc::clone(&close_codes),
        };

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    result = listener.accept() => {
                        match result {
                            Ok((stream, _)) => {
                                let server = server.clone();
                                tokio::spawn(async move {
                                    server.handle_connection(stream).await;
                                });
                            }
                            Err(e) => {
                                eprintln!("Accept error: {}", e);
                                break;
                            }
                        }
                    }
                    _ = server.shutdown.notified() => {
                        break;
                    }
                }
            }
        });

        Self {
            addr,
            shutdown,
            requests,
            received,
            close_codes,
        }
    }

    /// Deployment mode pointing the client at this server
    pub fn mode(&self) -> DeploymentMode {
        DeploymentMode::Development {
            host: self.addr.to_string(),
        }
    }

    /// Request paths (with query) of every handshake, oldest first
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }

    /// Text frames received from clients
    pub fn received(&self) -> Vec<String> {
        self.received.lock().clone()
    }

    /// Close codes received from clients
    pub fn close_codes(&self) -> Vec<u16> {
        self.close_codes.lock().clone()
    }

    /// Shutdown the server
    pub fn shutdown(&self) {
        self.shutdown.notify_waiters();
    }
}

impl Drop for MockWsServer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[derive(Clone)]
struct ConnectionLog {
    greeting: Vec<String>,
    shutdown: Arc<Notify>,
    requests: Arc<Mutex<Vec<String>>>,
    received: Arc<Mutex<Vec<String>>>,
    close_codes: Arc<Mutex<Vec<u16>>>,
}

impl ConnectionLog {
    async fn handle_connection(&self, stream: tokio::net::TcpStream) {
        use futures::{SinkExt, StreamExt};
        use tokio_tungstenite::accept_hdr_async;
        use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
        use tokio_tungstenite::tungstenite::Message;

        let requests = Arc::clone(&self.requests);
        let callback = move |req: &Request, resp: Response| -> std::result::Result<Response, ErrorResponse> {
            requests.lock().push(req.uri().to_string());
            Ok(resp)
        };

        let ws_stream = match accept_hdr_async(stream, callback).await {
            Ok(ws) => ws,
            Err(e) => {
                eprintln!("WebSocket handshake failed: {}", e);
                return;
            }
        };

        let (mut write, mut read) = ws_stream.split();

        for frame in &self.greeting {
            if write.send(Message::Text(frame.clone())).await.is_err() {
                return;
            }
        }

        loop {
            tokio::select! {
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            self.received.lock().push(text.clone());
                            // Echo the message back
                            if write.send(Message::Text(text)).await.is_err() {
                                break;
                            }
                        }
                        Some(Ok(Message::Close(frame))) => {
                            let code = frame.as_ref().map(|f| u16::from(f.code)).unwrap_or(1005);
                            self.close_codes.lock().push(code);
                            let _ = write.send(Message::Close(frame)).await;
                            break;
                        }
                        Some(Ok(_)) => {}
                        Some(Err(_)) | None => break,
                    }
                }
                _ = self.shutdown.notified() => {
                    break;
                }
            }
        }
    }
}
