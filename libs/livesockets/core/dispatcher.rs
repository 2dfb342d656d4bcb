//! Inline frame dispatch
//!
//! Every inbound frame goes through [`RouteTable::dispatch`] on the
//! connection task. A bad frame is logged and dropped; it never tears
//! down the connection or blocks the frames behind it.

use crate::traits::{MessageHandler, MessageRouter, WsMessage};
use std::collections::HashMap;
use tracing::{debug, error, warn};

/// What happened to one inbound frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Parsed and handled by the handler for its route
    Delivered,
    /// Control frame, consumed without reaching any handler
    Discarded,
    /// Parsed, but no handler is registered for its route
    Unrouted,
    /// Could not be parsed, or the handler rejected it
    Malformed,
}

/// Handlers keyed by route
pub struct RouteTable<R>
where
    R: MessageRouter,
{
    handlers: HashMap<R::RouteKey, Box<dyn MessageHandler<R::Message>>>,
}

impl<R> RouteTable<R>
where
    R: MessageRouter,
{
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register the handler for `route_key`, replacing any previous one
    pub fn insert<H>(&mut self, route_key: R::RouteKey, handler: H)
    where
        H: MessageHandler<R::Message>,
    {
        self.handlers.insert(route_key, Box::new(handler));
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Parse, classify and deliver one frame
    pub fn dispatch(&mut self, router: &R, frame: &WsMessage) -> DispatchOutcome {
        let message = match router.parse(frame) {
            Ok(message) => message,
            Err(e) => {
                error!("Dropping malformed frame: {}", e);
                return DispatchOutcome::Malformed;
            }
        };

        let Some(route_key) = router.route_key(&message) else {
            debug!("Control frame consumed: {:?}", message);
            return DispatchOutcome::Discarded;
        };

        match self.handlers.get_mut(&route_key) {
            Some(handler) => match handler.handle(message) {
                Ok(()) => DispatchOutcome::Delivered,
                Err(e) => {
                    error!("Handler error for route {:?}: {}", route_key, e);
                    DispatchOutcome::Malformed
                }
            },
            None => {
                warn!("No handler configured for route key: {:?}", route_key);
                DispatchOutcome::Unrouted
            }
        }
    }
}

impl<R> Default for RouteTable<R>
where
    R: MessageRouter,
{
    fn default() -> Self {
        Self::new()
    }
}
