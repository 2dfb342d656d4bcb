use crate::core::dispatcher::RouteTable;
use crate::core::endpoint::Endpoint;
use crate::traits::*;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// Configuration for a [`ChannelConnection`](crate::ChannelConnection)
///
/// Built with the type-state builder and shared between the owning handle
/// and its connection task. Handlers live here so they survive reconnects
/// and close/open cycles.
pub struct ChannelConfig<R>
where
    R: MessageRouter,
{
    /// Deployment-dependent server address
    pub(crate) endpoint: Endpoint,

    /// Message router for parsing and classifying frames
    pub(crate) router: Arc<R>,

    /// Handlers by route key
    pub(crate) routes: Mutex<RouteTable<R>>,

    /// Dials the physical connection
    pub(crate) connector: Arc<dyn Connector>,

    /// Optional heartbeat configuration (interval, payload)
    pub(crate) heartbeat: Option<(Duration, WsMessage)>,

    /// Retry policy after unexpected closes
    pub(crate) reconnect_strategy: Box<dyn ReconnectionStrategy>,

    /// How long a deliberate close waits for the peer's close frame
    pub(crate) close_timeout: Duration,

    /// Lifecycle observers
    pub(crate) observers: Vec<Arc<dyn ChannelObserver>>,
}

impl<R> ChannelConfig<R>
where
    R: MessageRouter,
{
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Check if heartbeat is configured
    pub fn has_heartbeat(&self) -> bool {
        self.heartbeat.is_some()
    }

    pub fn heartbeat_interval(&self) -> Option<Duration> {
        self.heartbeat.as_ref().map(|(interval, _)| *interval)
    }

    /// Get the number of configured handlers
    pub fn handler_count(&self) -> usize {
        self.routes.lock().len()
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    pub(crate) fn notify_open(&self) {
        for observer in &self.observers {
            observer.on_open();
        }
    }

    pub(crate) fn notify_message(&self, message: &WsMessage) {
        for observer in &self.observers {
            observer.on_message(message);
        }
    }

    pub(crate) fn notify_close(&self, close: &CloseInfo) {
        for observer in &self.observers {
            observer.on_close(close);
        }
    }

    pub(crate) fn notify_error(&self, error: &str) {
        for observer in &self.observers {
            observer.on_error(error);
        }
    }
}
