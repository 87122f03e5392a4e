//! Resolving who is chatting

use homelens_chat::SessionContext;

/// User name used when no source names one
pub const DEFAULT_USER_NAME: &str = "guest";

/// One place a session can come from: flags, environment, config or the
/// stored login
#[derive(Debug, Clone, Default)]
pub struct SessionLayer {
    pub user_name: Option<String>,
    pub auth_token: Option<String>,
}

impl SessionLayer {
    pub fn new(user_name: Option<String>, auth_token: Option<String>) -> Self {
        Self {
            user_name,
            auth_token,
        }
    }

    /// HOMELENS_USER_NAME and HOMELENS_AUTH_TOKEN
    pub fn from_env() -> Self {
        Self {
            user_name: std::env::var("HOMELENS_USER_NAME").ok(),
            auth_token: std::env::var("HOMELENS_AUTH_TOKEN").ok(),
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Merge layers, highest priority first. Each field is taken from the first
/// layer that has a non-blank value for it.
pub fn resolve(layers: &[SessionLayer]) -> SessionContext {
    let user_name = layers
        .iter()
        .find_map(|l| non_blank(&l.user_name))
        .unwrap_or(DEFAULT_USER_NAME);
    let auth_token = layers
        .iter()
        .find_map(|l| non_blank(&l.auth_token))
        .map(str::to_string);
    SessionContext::new(user_name, auth_token)
}
