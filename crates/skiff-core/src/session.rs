//! Session state and token types.

use std::fmt;

use serde_json::Value;

/// A bearer token for authenticated requests.
///
/// # Security
///
/// - Never logged or displayed in Debug output
/// - Treat as opaque; do not parse or inspect
#[derive(Clone)]
pub struct AccessToken(String);

impl AccessToken {
    /// Create a token from a credential string.
    ///
    /// Returns `None` for an empty string: an empty credential is
    /// indistinguishable from no credential at all.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        if token.is_empty() { None } else { Some(Self(token)) }
    }

    /// Returns the token value for use in authorization headers.
    ///
    /// # Security
    ///
    /// Use only when constructing HTTP authorization headers.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Hide token value in Debug output
impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AccessToken").field(&"[REDACTED]").finish()
    }
}

/// The process-wide `{token, user}` cell.
///
/// There is no expiry tracking: the token is either absent or believed
/// valid until a failed request proves otherwise.
#[derive(Debug, Clone, Default)]
pub struct Session {
    /// The cached bearer token, if a login has succeeded.
    pub token: Option<AccessToken>,
    /// The opaque user object returned by the login exchange.
    pub user: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_hides_value_in_debug() {
        let token = AccessToken::new("eyJhbGciOiJIUzI1NiJ9.secret").unwrap();
        let debug = format!("{:?}", token);
        assert!(!debug.contains("eyJ"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn empty_token_is_rejected() {
        assert!(AccessToken::new("").is_none());
    }

    #[test]
    fn default_session_is_empty() {
        let session = Session::default();
        assert!(session.token.is_none());
        assert!(session.user.is_none());
    }
}
