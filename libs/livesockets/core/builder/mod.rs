pub mod states;

use crate::core::client::ChannelConnection;
use crate::core::config::ChannelConfig;
use crate::core::dispatcher::RouteTable;
use crate::core::endpoint::Endpoint;
use crate::core::transport::TungsteniteConnector;
use crate::traits::*;
use parking_lot::Mutex;
use states::*;
use std::sync::Arc;
use std::time::Duration;

/// Time a deliberate close waits for the peer's close frame
pub const DEFAULT_CLOSE_TIMEOUT: Duration = Duration::from_secs(2);

/// Type-state builder for [`ChannelConnection`]
///
/// The endpoint and at least one route handler are required before
/// `build()` becomes available.
///
/// # Example
/// ```ignore
/// let channel = ChannelConnection::builder(NotificationRouter)
///     .endpoint(Endpoint::new(DeploymentMode::development()))
///     .route(NotificationRoute::Notification, NotificationHandler::new(store.clone()))
///     .heartbeat(Duration::from_secs(20), WsMessage::Text(r#"{"type":"heartbeat"}"#.into()))
///     .reconnect_strategy(FixedDelay::new(Duration::from_secs(5), None))
///     .build()?;
/// ```
pub struct ChannelBuilder<E, H, R>
where
    E: EndpointState,
    H: RouteState,
    R: MessageRouter,
{
    _state: TypeState<E, H>,
    endpoint: Option<Endpoint>,
    router: R,
    routes: RouteTable<R>,
    connector: Option<Arc<dyn Connector>>,
    heartbeat: Option<(Duration, WsMessage)>,
    reconnect_strategy: Option<Box<dyn ReconnectionStrategy>>,
    close_timeout: Duration,
    observers: Vec<Arc<dyn ChannelObserver>>,
}

impl<R> ChannelBuilder<NoEndpoint, NoRoutes, R>
where
    R: MessageRouter,
{
    /// Create a new builder around `router`
    pub fn new(router: R) -> Self {
        Self {
            _state: TypeState::new(),
            endpoint: None,
            router,
            routes: RouteTable::new(),
            connector: None,
            heartbeat: None,
            reconnect_strategy: None,
            close_timeout: DEFAULT_CLOSE_TIMEOUT,
            observers: Vec::new(),
        }
    }
}

impl<E, H, R> ChannelBuilder<E, H, R>
where
    E: EndpointState,
    H: RouteState,
    R: MessageRouter,
{
    fn transition<E2, H2>(self) -> ChannelBuilder<E2, H2, R>
    where
        E2: EndpointState,
        H2: RouteState,
    {
        ChannelBuilder {
            _state: TypeState::new(),
            endpoint: self.endpoint,
            router: self.router,
            routes: self.routes,
            connector: self.connector,
            heartbeat: self.heartbeat,
            reconnect_strategy: self.reconnect_strategy,
            close_timeout: self.close_timeout,
            observers: self.observers,
        }
    }

    /// Add a handler for a specific route key
    pub fn route<Hd>(mut self, route_key: R::RouteKey, handler: Hd) -> ChannelBuilder<E, HasRoutes, R>
    where
        Hd: MessageHandler<R::Message>,
    {
        self.routes.insert(route_key, handler);
        self.transition()
    }

    /// Replace the WebSocket connector (tests use an in-memory one)
    pub fn connector(mut self, connector: Arc<dyn Connector>) -> Self {
        self.connector = Some(connector);
        self
    }

    /// Send `payload` every `interval` while the channel is open
    pub fn heartbeat(mut self, interval: Duration, payload: WsMessage) -> Self {
        self.heartbeat = Some((interval, payload));
        self
    }

    pub fn reconnect_strategy(mut self, strategy: impl ReconnectionStrategy + 'static) -> Self {
        self.reconnect_strategy = Some(Box::new(strategy));
        self
    }

    /// Set how long a deliberate close waits for the peer's close frame
    pub fn close_timeout(mut self, timeout: Duration) -> Self {
        self.close_timeout = timeout;
        self
    }

    /// Register a lifecycle observer
    pub fn observer(mut self, observer: Arc<dyn ChannelObserver>) -> Self {
        self.observers.push(observer);
        self
    }
}

// Endpoint setting
impl<H, R> ChannelBuilder<NoEndpoint, H, R>
where
    H: RouteState,
    R: MessageRouter,
{
    pub fn endpoint(mut self, endpoint: Endpoint) -> ChannelBuilder<HasEndpoint, H, R> {
        self.endpoint = Some(endpoint);
        self.transition()
    }
}

// Build method - only available when all required fields are set
impl<R> ChannelBuilder<HasEndpoint, HasRoutes, R>
where
    R: MessageRouter,
{
    pub fn build(self) -> Result<ChannelConnection<R>> {
        let endpoint = self
            .endpoint
            .ok_or_else(|| ChannelError::Configuration("endpoint must be set".into()))?;

        if let Some((interval, _)) = &self.heartbeat {
            if interval.is_zero() {
                return Err(ChannelError::Configuration(
                    "heartbeat interval must be greater than 0".into(),
                ));
            }
        }

        let connector = self
            .connector
            .unwrap_or_else(|| Arc::new(TungsteniteConnector));

        let reconnect_strategy = self
            .reconnect_strategy
            .unwrap_or_else(|| Box::new(FixedDelay::default()));

        let config = ChannelConfig {
            endpoint,
            router: Arc::new(self.router),
            routes: Mutex::new(self.routes),
            connector,
            heartbeat: self.heartbeat,
            reconnect_strategy,
            close_timeout: self.close_timeout,
            observers: self.observers,
        };

        Ok(ChannelConnection::new(config))
    }
}
