use thiserror::Error;

/// Main error type for livesockets
#[derive(Error, Debug)]
pub enum ChannelError {
    /// WebSocket transport error
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// Connection closed unexpectedly
    #[error("Connection closed: {0}")]
    ConnectionClosed(String),

    /// Inbound frame could not be interpreted
    #[error("Parse error: {0}")]
    Parse(String),

    /// Outbound payload could not be serialized
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Handler rejected a routed message
    #[error("Handler error: {0}")]
    Handler(String),
}

impl From<serde_json::Error> for ChannelError {
    fn from(err: serde_json::Error) -> Self {
        ChannelError::Parse(err.to_string())
    }
}

/// Result type for livesockets operations
pub type Result<T> = std::result::Result<T, ChannelError>;
