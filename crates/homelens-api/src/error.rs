//! Error types for homelens-api

use thiserror::Error;

/// Result type alias using homelens-api Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when talking to the chat backend
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed (connection, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Backend answered with a non-success status
    #[error("Backend returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Client was configured with an unusable value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Create a status error from a code and response body
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }

    /// Whether this error came from the network round-trip.
    ///
    /// Timeouts, transport failures, bad statuses and undecodable bodies all
    /// count; only local misconfiguration does not.
    pub fn is_network(&self) -> bool {
        !matches!(self, Error::InvalidConfig(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_is_network() {
        assert!(Error::status(502, "bad gateway").is_network());
    }

    #[test]
    fn test_json_is_network() {
        let e: Error = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert!(e.is_network());
    }

    #[test]
    fn test_invalid_config_is_not_network() {
        assert!(!Error::InvalidConfig("empty base url".into()).is_network());
    }

    #[test]
    fn test_status_display() {
        let e = Error::status(401, "unauthorized");
        assert_eq!(e.to_string(), "Backend returned 401: unauthorized");
    }
}
