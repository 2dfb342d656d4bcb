use crate::core::builder::{states::*, ChannelBuilder};
use crate::core::config::ChannelConfig;
use crate::core::connection_state::{AtomicConnectionState, AtomicMetrics, ConnectionState};
use crate::core::dispatcher::DispatchOutcome;
use crate::core::endpoint::ChannelScope;
use crate::core::heartbeat::{self, HeartbeatMonitor};
use crate::traits::*;
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use futures::{SinkExt, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Lifecycle events kept for a consumer that is not draining the queue
///
/// Once full, the oldest event is evicted for each new one.
pub const EVENT_QUEUE_CAPACITY: usize = 64;

/// Internal command messages for the connection task
#[derive(Debug)]
enum ClientCommand {
    /// Write a message to the socket
    Send(WsMessage),
    /// Close the socket deliberately
    Close(CloseInfo),
}

/// Lifecycle events published by a channel
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    /// The physical connection is open
    Opened,
    /// The physical connection closed
    Closed { close: CloseInfo, intentional: bool },
    /// Transport or connection error
    Error(String),
    /// A reconnect attempt will run after `delay`
    ReconnectScheduled { attempt: usize, delay: Duration },
    /// No further reconnect attempts will be made
    ReconnectAbandoned(String),
}

/// Client metrics snapshot
#[derive(Debug, Clone)]
pub struct Metrics {
    pub messages_sent: u64,
    pub messages_received: u64,
    pub heartbeats_sent: u64,
    pub reconnect_count: u64,
    pub dropped_outbound: u64,
    pub malformed_inbound: u64,
    pub connection_state: ConnectionState,
}

/// One logical open of the channel: the task driving it plus its controls
struct Session {
    scope: ChannelScope,
    command_tx: mpsc::UnboundedSender<ClientCommand>,
    /// Set synchronously by `close()`, read by the task on every close path
    intentional_close: Arc<AtomicBool>,
    retry_pending: Arc<AtomicBool>,
    task_handle: JoinHandle<()>,
}

impl Session {
    fn is_active(&self) -> bool {
        !self.task_handle.is_finished()
    }
}

/// Manager for exactly one physical channel connection
///
/// `open` spawns a task that owns the socket, runs the heartbeat, parses
/// and routes inbound frames in arrival order and retries after unexpected
/// closes. `close` marks the close as deliberate before anything else
/// happens, so the retry path can never resurrect a channel the caller
/// let go of.
///
/// # Type Parameters
/// - `R`: MessageRouter implementation
pub struct ChannelConnection<R>
where
    R: MessageRouter,
{
    config: Arc<ChannelConfig<R>>,
    state: Arc<AtomicConnectionState>,
    metrics: Arc<AtomicMetrics>,
    event_tx: Sender<ChannelEvent>,
    event_rx: Receiver<ChannelEvent>,
    session: Option<Session>,
}

impl<R> ChannelConnection<R>
where
    R: MessageRouter,
{
    /// Start building a channel around `router`
    pub fn builder(router: R) -> ChannelBuilder<NoEndpoint, NoRoutes, R> {
        ChannelBuilder::new(router)
    }

    pub(crate) fn new(config: ChannelConfig<R>) -> Self {
        let (event_tx, event_rx) = bounded(EVENT_QUEUE_CAPACITY);
        Self {
            config: Arc::new(config),
            state: Arc::new(AtomicConnectionState::new(ConnectionState::Disconnected)),
            metrics: Arc::new(AtomicMetrics::new()),
            event_tx,
            event_rx,
            session: None,
        }
    }

    /// Open the channel for `scope`
    ///
    /// No-op (returns `false`) when the credential is missing or a previous
    /// open is still active, whether connected, connecting or waiting to
    /// retry.
    pub fn open(&mut self, credentials: Arc<dyn CredentialProvider>, scope: ChannelScope) -> bool {
        if credentials.token().is_none() {
            debug!("[{}] Open skipped: no credential", scope);
            return false;
        }

        if let Some(session) = &self.session {
            if session.is_active() {
                debug!(
                    "[{}] Open skipped: channel already active for {}",
                    scope, session.scope
                );
                return false;
            }
        }
        self.session = None;

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let intentional_close = Arc::new(AtomicBool::new(false));
        let retry_pending = Arc::new(AtomicBool::new(false));

        self.state.set(ConnectionState::Connecting);

        let driver = Driver {
            config: Arc::clone(&self.config),
            state: Arc::clone(&self.state),
            metrics: Arc::clone(&self.metrics),
            event_tx: self.event_tx.clone(),
            event_rx: self.event_rx.clone(),
            credentials,
            scope: scope.clone(),
            intentional_close: Arc::clone(&intentional_close),
            retry_pending: Arc::clone(&retry_pending),
            command_rx,
        };
        let task_handle = tokio::spawn(driver.run());

        self.session = Some(Session {
            scope,
            command_tx,
            intentional_close,
            retry_pending,
            task_handle,
        });
        true
    }

    /// Send a message if the channel is open
    ///
    /// Messages offered while the channel is not open are dropped, not
    /// queued. Returns whether the message was handed to the socket task.
    pub fn send(&self, message: WsMessage) -> bool {
        let session = match &self.session {
            Some(session) if self.state.is_open() => session,
            _ => {
                debug!("Dropping outbound frame: channel is {:?}", self.state.get());
                self.metrics.increment_dropped();
                return false;
            }
        };

        if session.command_tx.send(ClientCommand::Send(message)).is_err() {
            debug!("Dropping outbound frame: channel task has stopped");
            self.metrics.increment_dropped();
            return false;
        }
        true
    }

    /// Serialize `payload` to JSON and send it if the channel is open
    pub fn send_json<T: serde::Serialize + ?Sized>(&self, payload: &T) -> bool {
        match WsMessage::json(payload) {
            Ok(message) => self.send(message),
            Err(e) => {
                error!("Failed to serialize outbound payload: {}", e);
                false
            }
        }
    }

    /// Close the channel deliberately and release it
    ///
    /// The close is marked intentional before the close frame is written,
    /// cancelling any pending retry. Resolves once the socket task has
    /// stopped; afterwards `open` starts a fresh connection.
    pub async fn close(&mut self, code: u16, reason: &str) {
        let Some(session) = self.session.take() else {
            return;
        };

        session.intentional_close.store(true, Ordering::Release);
        if !self.state.is_disconnected() {
            self.state.set(ConnectionState::Closing);
        }
        let _ = session
            .command_tx
            .send(ClientCommand::Close(CloseInfo::new(code, reason)));

        let abort = session.task_handle.abort_handle();
        let grace = self.config.close_timeout + Duration::from_secs(1);
        match tokio::time::timeout(grace, session.task_handle).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("[{}] Channel task ended abnormally: {}", session.scope, e),
            Err(_) => {
                warn!(
                    "[{}] Channel task did not stop within {:?}, aborting",
                    session.scope, grace
                );
                abort.abort();
            }
        }

        self.state.set(ConnectionState::Disconnected);
    }

    /// Close with a normal-closure code and consume the handle
    pub async fn shutdown(mut self) {
        info!("Shutting down channel");
        self.close(NORMAL_CLOSURE, "shutdown").await;
    }

    /// Get current connection state
    #[inline]
    pub fn connection_state(&self) -> ConnectionState {
        self.state.get()
    }

    /// Check if the channel is open
    #[inline]
    pub fn is_connected(&self) -> bool {
        self.state.is_open()
    }

    /// Whether a reconnect attempt is scheduled but has not started yet
    pub fn pending_retry(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| s.is_active() && s.retry_pending.load(Ordering::Acquire))
    }

    /// Whether an open is in effect (connected, connecting or retrying)
    pub fn is_active(&self) -> bool {
        self.session.as_ref().is_some_and(Session::is_active)
    }

    /// Scope of the current open, if any
    pub fn scope(&self) -> Option<&ChannelScope> {
        self.session.as_ref().map(|s| &s.scope)
    }

    pub fn config(&self) -> &ChannelConfig<R> {
        &self.config
    }

    /// Get current metrics
    pub fn metrics(&self) -> Metrics {
        Metrics {
            messages_sent: self.metrics.messages_sent(),
            messages_received: self.metrics.messages_received(),
            heartbeats_sent: self.metrics.heartbeats_sent(),
            reconnect_count: self.metrics.reconnect_count(),
            dropped_outbound: self.metrics.dropped_outbound(),
            malformed_inbound: self.metrics.malformed_inbound(),
            connection_state: self.state.get(),
        }
    }

    /// Try to receive a lifecycle event (non-blocking)
    pub fn try_recv_event(&self) -> Option<ChannelEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Receiver for lifecycle events, for consumers on another thread
    pub fn events(&self) -> Receiver<ChannelEvent> {
        self.event_rx.clone()
    }
}

impl<R> Drop for ChannelConnection<R>
where
    R: MessageRouter,
{
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            session.intentional_close.store(true, Ordering::Release);
            let _ = session
                .command_tx
                .send(ClientCommand::Close(CloseInfo::normal("channel dropped")));
        }
    }
}

/// How one physical connection ended
struct ConnectionEnd {
    close: CloseInfo,
    intentional: bool,
}

/// State owned by the connection task
struct Driver<R>
where
    R: MessageRouter,
{
    config: Arc<ChannelConfig<R>>,
    state: Arc<AtomicConnectionState>,
    metrics: Arc<AtomicMetrics>,
    event_tx: Sender<ChannelEvent>,
    /// Used only to evict the oldest event when the queue is full
    event_rx: Receiver<ChannelEvent>,
    credentials: Arc<dyn CredentialProvider>,
    scope: ChannelScope,
    intentional_close: Arc<AtomicBool>,
    retry_pending: Arc<AtomicBool>,
    command_rx: mpsc::UnboundedReceiver<ClientCommand>,
}

impl<R> Driver<R>
where
    R: MessageRouter,
{
    fn is_cancelled(&self) -> bool {
        self.intentional_close.load(Ordering::Acquire)
    }

    fn emit(&self, mut event: ChannelEvent) {
        loop {
            match self.event_tx.try_send(event) {
                Ok(()) | Err(TrySendError::Disconnected(_)) => return,
                Err(TrySendError::Full(rejected)) => {
                    if let Ok(evicted) = self.event_rx.try_recv() {
                        debug!("[{}] Event queue full, dropping {:?}", self.scope, evicted);
                    }
                    event = rejected;
                }
            }
        }
    }

    /// Connect / serve / retry loop
    async fn run(mut self) {
        let mut attempt = 0usize;

        loop {
            if self.is_cancelled() {
                break;
            }

            // Re-read on every attempt so a logout stops the retry loop
            let Some(token) = self.credentials.token() else {
                warn!("[{}] Credential withdrawn, not reconnecting", self.scope);
                self.emit(ChannelEvent::ReconnectAbandoned("credential withdrawn".into()));
                break;
            };

            self.state.set(ConnectionState::Connecting);
            let url = self.config.endpoint.url(&self.scope, &token);
            info!(
                "[{}] Connecting to {}",
                self.scope,
                self.config.endpoint.redacted_url(&self.scope)
            );

            let Some(result) = self.connect(&url).await else {
                debug!("[{}] Close requested while connecting", self.scope);
                break;
            };

            match result {
                Ok(transport) => {
                    if self.is_cancelled() {
                        let mut sink = transport.sink;
                        let _ = sink
                            .send(Outbound::Close(CloseInfo::normal("cancelled")))
                            .await;
                        break;
                    }

                    attempt = 0;
                    self.state.set(ConnectionState::Open);
                    info!("[{}] Channel open", self.scope);
                    self.config.notify_open();
                    self.emit(ChannelEvent::Opened);

                    let end = self.serve(transport).await;

                    self.state.set(ConnectionState::Disconnected);
                    if end.intentional {
                        info!("[{}] Channel closed: {}", self.scope, end.close);
                    } else {
                        warn!("[{}] Channel lost: {}", self.scope, end.close);
                    }
                    self.config.notify_close(&end.close);
                    self.emit(ChannelEvent::Closed {
                        close: end.close,
                        intentional: end.intentional,
                    });

                    if end.intentional {
                        break;
                    }
                }
                Err(e) => {
                    error!("[{}] Failed to connect: {}", self.scope, e);
                    self.state.set(ConnectionState::Disconnected);
                    self.config.notify_error(&e.to_string());
                    self.emit(ChannelEvent::Error(e.to_string()));
                }
            }

            if self.is_cancelled() {
                break;
            }

            let Some(delay) = self.config.reconnect_strategy.next_delay(attempt) else {
                warn!("[{}] Reconnection strategy exhausted, stopping", self.scope);
                self.emit(ChannelEvent::ReconnectAbandoned("retry limit reached".into()));
                break;
            };
            attempt += 1;

            info!(
                "[{}] Reconnecting in {:?} (attempt {})",
                self.scope, delay, attempt
            );
            self.retry_pending.store(true, Ordering::Release);
            self.emit(ChannelEvent::ReconnectScheduled { attempt, delay });

            let proceed = self.wait_for_retry(delay).await;
            self.retry_pending.store(false, Ordering::Release);
            if !proceed {
                debug!("[{}] Pending reconnect cancelled", self.scope);
                break;
            }
            self.metrics.increment_reconnects();
        }

        self.retry_pending.store(false, Ordering::Release);
        self.state.set(ConnectionState::Disconnected);
        debug!("[{}] Channel task exiting", self.scope);
    }

    /// Dial `url`; `None` when a close request arrives first
    async fn connect(&mut self, url: &str) -> Option<Result<Transport>> {
        let connect = self.config.connector.connect(url);
        tokio::pin!(connect);

        loop {
            tokio::select! {
                result = &mut connect => return Some(result),
                cmd = self.command_rx.recv() => match cmd {
                    Some(ClientCommand::Send(_)) => {
                        debug!("[{}] Dropping outbound frame while connecting", self.scope);
                        self.metrics.increment_dropped();
                    }
                    Some(ClientCommand::Close(_)) | None => return None,
                },
            }
        }
    }

    /// Sleep out the retry delay; `false` when a close request cancels it
    async fn wait_for_retry(&mut self, delay: Duration) -> bool {
        let sleep = tokio::time::sleep(delay);
        tokio::pin!(sleep);

        loop {
            tokio::select! {
                _ = &mut sleep => return !self.is_cancelled(),
                cmd = self.command_rx.recv() => match cmd {
                    Some(ClientCommand::Send(_)) => {
                        debug!("[{}] Dropping outbound frame while reconnecting", self.scope);
                        self.metrics.increment_dropped();
                    }
                    Some(ClientCommand::Close(_)) | None => return false,
                },
            }
        }
    }

    /// Serve one open connection until it closes
    async fn serve(&mut self, transport: Transport) -> ConnectionEnd {
        let Transport {
            mut sink,
            mut stream,
        } = transport;

        let mut heartbeat = self
            .config
            .heartbeat
            .as_ref()
            .map(|(interval, payload)| HeartbeatMonitor::spawn(*interval, payload.clone()));

        let end = loop {
            tokio::select! {
                frame = stream.next() => match frame {
                    Some(Ok(Inbound::Message(message))) => self.on_frame(&message),
                    Some(Ok(Inbound::Closed(close))) => {
                        break ConnectionEnd { close, intentional: self.is_cancelled() };
                    }
                    Some(Err(e)) => {
                        error!("[{}] WebSocket error: {}", self.scope, e);
                        self.config.notify_error(&e.to_string());
                        self.emit(ChannelEvent::Error(e.to_string()));
                        break ConnectionEnd {
                            close: CloseInfo::abnormal(e.to_string()),
                            intentional: self.is_cancelled(),
                        };
                    }
                    None => {
                        break ConnectionEnd {
                            close: CloseInfo::abnormal("stream ended"),
                            intentional: self.is_cancelled(),
                        };
                    }
                },

                cmd = self.command_rx.recv() => match cmd {
                    Some(ClientCommand::Send(message)) => {
                        if let Err(e) = sink.send(Outbound::Message(message)).await {
                            error!("[{}] Send failed: {}", self.scope, e);
                            self.config.notify_error(&e.to_string());
                            self.emit(ChannelEvent::Error(e.to_string()));
                            break ConnectionEnd {
                                close: CloseInfo::abnormal(e.to_string()),
                                intentional: self.is_cancelled(),
                            };
                        }
                        self.metrics.increment_sent();
                    }
                    Some(ClientCommand::Close(close)) => {
                        break self.close_gracefully(&mut sink, &mut stream, &mut heartbeat, close).await;
                    }
                    None => {
                        let close = CloseInfo::normal("channel dropped");
                        break self.close_gracefully(&mut sink, &mut stream, &mut heartbeat, close).await;
                    }
                },

                tick = heartbeat::next_tick(&mut heartbeat) => {
                    let Some(payload) = tick else { continue };
                    if !self.state.is_open() {
                        debug!("[{}] Skipping heartbeat: channel is {:?}", self.scope, self.state.get());
                        continue;
                    }
                    if let Err(e) = sink.send(Outbound::Message(payload)).await {
                        error!("[{}] Failed to send heartbeat: {}", self.scope, e);
                        break ConnectionEnd {
                            close: CloseInfo::abnormal(e.to_string()),
                            intentional: self.is_cancelled(),
                        };
                    }
                    self.metrics.increment_sent();
                    self.metrics.increment_heartbeats();
                    debug!("[{}] Heartbeat sent", self.scope);
                }
            }
        };

        // Every close path, including peer-initiated ones, ends the timer here
        if let Some(mut monitor) = heartbeat.take() {
            monitor.stop();
        }

        end
    }

    /// Route one inbound frame; malformed frames are counted and skipped
    fn on_frame(&self, message: &WsMessage) {
        self.metrics.increment_received();
        self.config.notify_message(message);

        let outcome = self
            .config
            .routes
            .lock()
            .dispatch(&self.config.router, message);

        if outcome == DispatchOutcome::Malformed {
            self.metrics.increment_malformed();
        }
    }

    /// Deliberate close: stop heartbeat, send close frame, await the peer's ack
    async fn close_gracefully(
        &mut self,
        sink: &mut FrameSink,
        stream: &mut FrameStream,
        heartbeat: &mut Option<HeartbeatMonitor>,
        close: CloseInfo,
    ) -> ConnectionEnd {
        self.state.set(ConnectionState::Closing);

        if let Some(mut monitor) = heartbeat.take() {
            monitor.stop();
        }

        info!("[{}] Closing channel: {}", self.scope, close);
        if let Err(e) = sink.send(Outbound::Close(close.clone())).await {
            debug!("[{}] Close frame not delivered: {}", self.scope, e);
        }

        let acked = tokio::time::timeout(self.config.close_timeout, async {
            while let Some(frame) = stream.next().await {
                match frame {
                    Ok(Inbound::Closed(_)) | Err(_) => return,
                    Ok(Inbound::Message(_)) => {
                        debug!("Discarding frame received while closing");
                    }
                }
            }
        })
        .await;

        if acked.is_err() {
            debug!(
                "[{}] Peer did not acknowledge close within {:?}",
                self.scope, self.config.close_timeout
            );
        }
        let _ = sink.close().await;

        ConnectionEnd {
            close,
            intentional: true,
        }
    }
}
