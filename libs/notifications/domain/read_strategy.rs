use serde::{Deserialize, Serialize};

/// How "mark all as read" reaches the store
///
/// Chosen once per center; the two are never combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadStrategy {
    /// Flip every record locally, immediately
    #[default]
    Local,
    /// Ask the server, flip on its `ALL_READ_SUCCESS` acknowledgement
    ServerConfirmed,
}
