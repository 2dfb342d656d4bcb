//! Message Routing System
//!
//! Core traits for classifying inbound frames and handing domain messages
//! to their handlers.
//!
//! # Architecture
//!
//! ```text
//! Transport → Router::parse → Router::route_key ─┬─ None      → consumed (control frame)
//!                                                └─ Some(key) → Handler[key]
//! ```
//!
//! # Ordering Guarantees
//!
//! Frames are parsed and handled inline on the connection task, one at a
//! time, in the order the transport delivered them. Nothing is batched or
//! reordered, across route keys or within one.

use crate::{Result, WsMessage};
use std::fmt::Debug;
use std::hash::Hash;

/// Message router that parses frames and determines routing
///
/// The router has two responsibilities:
/// 1. Parse the raw frame into a typed message
/// 2. Decide whether the message is a control frame (consumed here) or a
///    domain message and, if so, which handler receives it
///
/// # Example
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// enum Route { Feed }
///
/// #[derive(Debug)]
/// enum FeedMessage { Ping, Item(String) }
///
/// struct FeedRouter;
///
/// impl MessageRouter for FeedRouter {
///     type Message = FeedMessage;
///     type RouteKey = Route;
///
///     fn parse(&self, message: &WsMessage) -> Result<Self::Message> {
///         // Parse JSON and return typed message
///     }
///
///     fn route_key(&self, message: &Self::Message) -> Option<Self::RouteKey> {
///         match message {
///             FeedMessage::Ping => None,
///             FeedMessage::Item(_) => Some(Route::Feed),
///         }
///     }
/// }
/// ```
pub trait MessageRouter: Send + Sync + 'static {
    /// The parsed message type
    type Message: Send + Debug + 'static;

    /// The route key type (determines which handler processes the message)
    type RouteKey: Hash + Eq + Clone + Send + Sync + Debug + 'static;

    /// Parse a raw frame into a typed message
    ///
    /// Malformed frames return `Err`; the dispatcher logs and drops them
    /// and keeps the connection up.
    fn parse(&self, message: &WsMessage) -> Result<Self::Message>;

    /// Extract the route key from a parsed message
    ///
    /// `None` marks a control frame (heartbeat, handshake ack) that must
    /// never reach a handler.
    fn route_key(&self, message: &Self::Message) -> Option<Self::RouteKey>;
}

/// Message handler that processes typed messages sequentially
///
/// Handlers are owned by the channel connection and survive reconnects.
/// They are invoked on the connection task, so they must not block.
pub trait MessageHandler<M>: Send + 'static
where
    M: Send + Debug + 'static,
{
    /// Handle a parsed message
    ///
    /// # Errors
    /// Errors are logged; the connection keeps processing subsequent frames.
    fn handle(&mut self, message: M) -> Result<()>;
}
