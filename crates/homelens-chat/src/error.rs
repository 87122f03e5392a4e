//! Error types for homelens-chat

use thiserror::Error;

/// Result type alias using homelens-chat Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while driving the chat screen
#[derive(Error, Debug)]
pub enum Error {
    /// The backend round-trip failed (transport, timeout or bad status)
    #[error("Network error: {0}")]
    Network(#[from] homelens_api::Error),

    /// No auth token in the session context
    #[error("No session token available")]
    MissingSession,

    /// Another send is still outstanding and sends are exclusive
    #[error("A message is already being sent")]
    Busy,

    /// The screen was torn down while work was pending
    #[error("Chat screen was torn down")]
    Cancelled,

    /// The screen already handed off to the report view
    #[error("Chat screen has moved on to the report")]
    ScreenClosed,

    /// Engine configuration is unusable
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Check if this error came from the network round-trip
    pub fn is_network(&self) -> bool {
        matches!(self, Error::Network(e) if e.is_network())
    }
}
