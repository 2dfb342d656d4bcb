//! Service Desk Realtime - Main Library
//!
//! Live notification feed and conversation chat for the service desk
//! client.
//!
//! ## Architecture
//!
//! - **bin_common**: Common utilities for binary executables (CLI, runners)
//! - **notifications**: Notification center, chat channel, config (re-exported from workspace)
//! - **livesockets**: WebSocket channel library (re-exported from workspace)
//!
//! ## Usage in Binaries
//!
//! ```rust
//! use servicedesk_realtime::bin_common::{load_config_from_env, ConfigType};
//! use servicedesk_realtime::notifications::NotificationCenter;
//! ```

// Re-export workspace libraries for convenience
pub use livesockets;
pub use notifications;

// Binary common utilities
pub mod bin_common {
    //! Common utilities for binary executables

    pub mod cli;
    pub mod runner;

    pub use cli::{load_config_from_env, parse_args, ConfigType};
    pub use runner::{BinaryRunner, RunConfig};
}
