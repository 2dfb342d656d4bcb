//! Notification records

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Title used when the server sends none
pub const DEFAULT_TITLE: &str = "Notification";

/// Notification identifier
///
/// Servers send either numeric or string ids; ids synthesized on the
/// client are always strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum NotificationId {
    Number(i64),
    Text(String),
}

impl NotificationId {
    /// Client-side id: receipt time in millis plus a random suffix
    pub fn synthesize(received_at: DateTime<Utc>) -> Self {
        NotificationId::Text(format!(
            "{}-{:016x}",
            received_at.timestamp_millis(),
            rand::random::<u64>()
        ))
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationId::Number(n) => write!(f, "{}", n),
            NotificationId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for NotificationId {
    fn from(value: i64) -> Self {
        NotificationId::Number(value)
    }
}

impl From<&str> for NotificationId {
    fn from(value: &str) -> Self {
        NotificationId::Text(value.to_string())
    }
}

impl From<String> for NotificationId {
    fn from(value: String) -> Self {
        NotificationId::Text(value)
    }
}

/// Display category of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl Category {
    /// Map a frame's `type` value to a category, case-insensitively
    pub fn from_kind(kind: &str) -> Option<Self> {
        match kind.trim().to_ascii_lowercase().as_str() {
            "info" => Some(Category::Info),
            "success" => Some(Category::Success),
            "warning" => Some(Category::Warning),
            "error" => Some(Category::Error),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Info => "info",
            Category::Success => "success",
            Category::Warning => "warning",
            Category::Error => "error",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One notification as shown to the user
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRecord {
    pub id: NotificationId,
    pub title: String,
    pub message: String,
    pub category: Category,
    /// Raw `type` value from the frame, kept when it is not a category
    pub kind: Option<String>,
    pub is_unread: bool,
    pub created_at: DateTime<Utc>,
}

impl NotificationRecord {
    /// Unread `info` record with the default title, created now
    pub fn new(id: impl Into<NotificationId>, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: DEFAULT_TITLE.to_string(),
            message: message.into(),
            category: Category::Info,
            kind: None,
            is_unread: true,
            created_at: Utc::now(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the raw `type`; known category names also set the category
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        let kind = kind.into();
        self.category = Category::from_kind(&kind).unwrap_or_default();
        self.kind = Some(kind);
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn mark_read(&mut self) {
        self.is_unread = false;
    }
}

/// Parse a server timestamp
///
/// Accepts RFC 3339 and naive ISO-8601 (taken as UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}
