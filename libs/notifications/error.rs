use crate::infrastructure::config::ConfigError;
use livesockets::ChannelError;
use thiserror::Error;

/// Errors raised while setting up a realtime channel
///
/// Once a channel exists, failures are logged and surface only through
/// the connection status.
#[derive(Error, Debug)]
pub enum RealtimeError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),
}

pub type Result<T> = std::result::Result<T, RealtimeError>;
