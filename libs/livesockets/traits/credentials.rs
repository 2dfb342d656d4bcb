use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// Trait for supplying the credential used to open a channel
///
/// The connection driver asks for the credential before every connection
/// attempt, including reconnects. Returning `None` (or an empty token)
/// means the session is gone: the attempt is skipped and the retry loop
/// ends instead of spinning against the server.
pub trait CredentialProvider: Send + Sync {
    /// Current token, `None` when no usable credential exists
    fn token(&self) -> Option<String>;
}

/// Shared, mutable session token
///
/// Cheap to clone; all clones observe the same value. The auth layer keeps
/// one clone and calls [`SessionToken::clear`] on logout, which stops any
/// pending reconnection of channels opened with another clone.
#[derive(Clone, Default)]
pub struct SessionToken {
    inner: Arc<RwLock<Option<String>>>,
}

impl SessionToken {
    /// Create a token holder, empty strings are stored as "no token"
    pub fn new(token: impl Into<String>) -> Self {
        let holder = Self::default();
        holder.set(token);
        holder
    }

    /// Replace the current token
    pub fn set(&self, token: impl Into<String>) {
        let token = token.into();
        *self.inner.write() = if token.trim().is_empty() {
            None
        } else {
            Some(token)
        };
    }

    /// Drop the current token (logout)
    pub fn clear(&self) {
        *self.inner.write() = None;
    }

    /// Current token, if any
    pub fn get(&self) -> Option<String> {
        self.inner.read().clone()
    }

    pub fn is_present(&self) -> bool {
        self.inner.read().is_some()
    }
}

impl CredentialProvider for SessionToken {
    fn token(&self) -> Option<String> {
        self.get()
    }
}

// Tokens never end up in logs
impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionToken")
            .field("present", &self.is_present())
            .finish()
    }
}

/// Fixed credential that never changes
pub struct StaticToken(pub String);

impl CredentialProvider for StaticToken {
    fn token(&self) -> Option<String> {
        if self.0.trim().is_empty() {
            None
        } else {
            Some(self.0.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_token_is_absent() {
        let token = SessionToken::new("");
        assert!(token.token().is_none());

        let token = SessionToken::new("   ");
        assert!(!token.is_present());
    }

    #[test]
    fn test_clones_share_value() {
        let token = SessionToken::new("abc");
        let auth_side = token.clone();

        assert_eq!(token.token().as_deref(), Some("abc"));
        auth_side.clear();
        assert!(token.token().is_none());

        auth_side.set("def");
        assert_eq!(token.get().as_deref(), Some("def"));
    }

    #[test]
    fn test_debug_hides_token() {
        let token = SessionToken::new("secret-jwt");
        let rendered = format!("{:?}", token);
        assert!(!rendered.contains("secret-jwt"));
    }

    #[test]
    fn test_static_token() {
        assert_eq!(StaticToken("abc".into()).token().as_deref(), Some("abc"));
        assert!(StaticToken(String::new()).token().is_none());
    }
}
