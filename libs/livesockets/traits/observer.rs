use crate::{CloseInfo, WsMessage};

/// Observer for channel lifecycle signals
///
/// All methods have empty defaults so observers implement only what they
/// need. Callbacks run on the connection task and must return quickly.
///
/// # Example
/// ```ignore
/// struct StatusLight(Arc<AtomicBool>);
///
/// impl ChannelObserver for StatusLight {
///     fn on_open(&self) {
///         self.0.store(true, Ordering::Release);
///     }
///
///     fn on_close(&self, _close: &CloseInfo) {
///         self.0.store(false, Ordering::Release);
///     }
/// }
/// ```
pub trait ChannelObserver: Send + Sync {
    /// The physical connection is open
    fn on_open(&self) {}

    /// A raw frame arrived, before routing
    fn on_message(&self, _message: &WsMessage) {}

    /// The physical connection closed, for any reason
    fn on_close(&self, _close: &CloseInfo) {}

    /// A transport or connection error occurred
    fn on_error(&self, _error: &str) {}
}
