/// Type-state markers for the builder pattern
///
/// These types track at compile time which required fields have been
/// set, so a channel without an endpoint or without any handler cannot
/// be built.

use std::marker::PhantomData;

/// Marker trait for endpoint state
pub trait EndpointState {}

/// Endpoint has not been set
pub struct NoEndpoint;
impl EndpointState for NoEndpoint {}

/// Endpoint has been set
pub struct HasEndpoint;
impl EndpointState for HasEndpoint {}

/// Marker trait for routing state
pub trait RouteState {}

/// No handler registered yet
pub struct NoRoutes;
impl RouteState for NoRoutes {}

/// At least one handler registered
pub struct HasRoutes;
impl RouteState for HasRoutes {}

/// Phantom marker to prevent direct construction
#[derive(Debug, Clone, Copy)]
pub struct TypeState<E, H> {
    _endpoint: PhantomData<E>,
    _routes: PhantomData<H>,
}

impl<E, H> TypeState<E, H> {
    pub(crate) fn new() -> Self {
        Self {
            _endpoint: PhantomData,
            _routes: PhantomData,
        }
    }
}

impl<E, H> Default for TypeState<E, H> {
    fn default() -> Self {
        Self::new()
    }
}
