//! Endpoint address construction
//!
//! The address is a function of three inputs only: deployment mode, the
//! channel scope and the credential token.
//!
//! ```text
//! production:   wss://<host>/ws/notifications/?token=<token>
//! development:  ws://127.0.0.1:8000/ws/chat/<conversation>/?token=<token>
//! ```

use std::fmt;

/// Loopback address of the local development server
pub const DEFAULT_DEV_HOST: &str = "127.0.0.1:8000";

/// Where the server lives and which scheme reaches it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeploymentMode {
    /// Secure scheme against the public host
    Production { host: String },
    /// Plain scheme against a local server
    Development { host: String },
}

impl DeploymentMode {
    pub fn production(host: impl Into<String>) -> Self {
        DeploymentMode::Production { host: host.into() }
    }

    /// Development mode against the default loopback server
    pub fn development() -> Self {
        DeploymentMode::Development {
            host: DEFAULT_DEV_HOST.to_string(),
        }
    }

    pub fn scheme(&self) -> &'static str {
        match self {
            DeploymentMode::Production { .. } => "wss",
            DeploymentMode::Development { .. } => "ws",
        }
    }

    pub fn host(&self) -> &str {
        match self {
            DeploymentMode::Production { host } | DeploymentMode::Development { host } => host,
        }
    }
}

impl Default for DeploymentMode {
    fn default() -> Self {
        Self::development()
    }
}

/// Whether `segment` can stand as one URL path segment without encoding
///
/// Only unreserved characters are accepted, and the dot segments `.` and
/// `..` are refused.
pub fn is_path_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && segment
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~'))
}

/// What a channel is for
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChannelScope {
    /// The user's notification feed
    Notifications,
    /// One chat conversation
    Chat { conversation_id: String },
}

impl ChannelScope {
    pub fn chat(conversation_id: impl Into<String>) -> Self {
        ChannelScope::Chat {
            conversation_id: conversation_id.into(),
        }
    }

    /// Fixed path segment for this scope, with leading and trailing slash
    pub fn path(&self) -> String {
        match self {
            ChannelScope::Notifications => "/ws/notifications/".to_string(),
            ChannelScope::Chat { conversation_id } => format!("/ws/chat/{}/", conversation_id),
        }
    }
}

impl fmt::Display for ChannelScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelScope::Notifications => write!(f, "notifications"),
            ChannelScope::Chat { conversation_id } => write!(f, "chat/{}", conversation_id),
        }
    }
}

/// Server endpoint for a deployment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Endpoint {
    mode: DeploymentMode,
}

impl Endpoint {
    pub fn new(mode: DeploymentMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> &DeploymentMode {
        &self.mode
    }

    /// Full connection address for `scope`, authenticated with `token`
    ///
    /// Tokens are JWTs (URL-safe alphabet) and are passed through as-is.
    pub fn url(&self, scope: &ChannelScope, token: &str) -> String {
        format!(
            "{}://{}{}?token={}",
            self.mode.scheme(),
            self.mode.host(),
            scope.path(),
            token
        )
    }

    /// Address with the token masked, for logging
    pub fn redacted_url(&self, scope: &ChannelScope) -> String {
        self.url(scope, "***")
    }
}
