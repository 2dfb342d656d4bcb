use std::fmt;

/// Normal closure, used for every deliberate teardown
pub const NORMAL_CLOSURE: u16 = 1000;

/// Connection lost without a close frame (transport error or stream end)
pub const ABNORMAL_CLOSURE: u16 = 1006;

/// Text or binary payload carried by the channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WsMessage {
    Text(String),
    Binary(Vec<u8>),
}

impl WsMessage {
    /// Get the message as text, if it is text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            WsMessage::Text(s) => Some(s),
            WsMessage::Binary(_) => None,
        }
    }

    /// Get the message as binary, if it is binary
    pub fn as_binary(&self) -> Option<&[u8]> {
        match self {
            WsMessage::Text(_) => None,
            WsMessage::Binary(b) => Some(b),
        }
    }

    /// Serialize a payload into a JSON text message
    pub fn json<T: serde::Serialize + ?Sized>(payload: &T) -> crate::Result<Self> {
        serde_json::to_string(payload)
            .map(WsMessage::Text)
            .map_err(|e| crate::ChannelError::Serialize(e.to_string()))
    }
}

/// Close code and reason, as sent or received in a close frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseInfo {
    pub code: u16,
    pub reason: String,
}

impl CloseInfo {
    pub fn new(code: u16, reason: impl Into<String>) -> Self {
        Self {
            code,
            reason: reason.into(),
        }
    }

    /// Close info for a deliberate teardown
    pub fn normal(reason: impl Into<String>) -> Self {
        Self::new(NORMAL_CLOSURE, reason)
    }

    /// Close info synthesized when the transport died without a close frame
    pub fn abnormal(reason: impl Into<String>) -> Self {
        Self::new(ABNORMAL_CLOSURE, reason)
    }
}

impl fmt::Display for CloseInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.reason.is_empty() {
            write!(f, "code {}", self.code)
        } else {
            write!(f, "{} (code {})", self.reason, self.code)
        }
    }
}

/// Frame delivered by a transport to the connection driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Message(WsMessage),
    Closed(CloseInfo),
}

/// Frame written by the connection driver to a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    Message(WsMessage),
    Close(CloseInfo),
}

impl Outbound {
    /// Text payload of an outbound message, if any
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Outbound::Message(msg) => msg.as_text(),
            Outbound::Close(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_message_is_text() {
        let msg = WsMessage::json(&serde_json::json!({"type": "heartbeat"})).unwrap();
        assert_eq!(msg.as_text(), Some(r#"{"type":"heartbeat"}"#));
        assert!(msg.as_binary().is_none());
    }

    #[test]
    fn test_close_info_display() {
        assert_eq!(CloseInfo::normal("bye").to_string(), "bye (code 1000)");
        assert_eq!(CloseInfo::new(ABNORMAL_CLOSURE, "").to_string(), "code 1006");
    }
}
