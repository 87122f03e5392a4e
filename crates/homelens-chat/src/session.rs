//! Session context threaded into every dispatch

use std::fmt;

/// The (user identity, auth token) pair that authorizes chat requests.
///
/// Built once when the chat screen is entered and never mutated by the
/// engine.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    user_name: String,
    auth_token: Option<String>,
}

impl SessionContext {
    pub fn new(user_name: impl Into<String>, auth_token: Option<String>) -> Self {
        Self {
            user_name: user_name.into(),
            auth_token,
        }
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    /// The bearer token, if one is present and non-empty
    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth_token().is_some()
    }
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("user_name", &self.user_name)
            .field("auth_token", &self.auth_token().map(|_| "<redacted>"))
            .finish()
    }
}
