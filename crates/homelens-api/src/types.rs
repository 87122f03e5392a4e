//! Request and response bodies for `POST /api/chat`

use serde::{Deserialize, Serialize};

/// Body sent to the chat endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// User text; empty for the bootstrap greeting
    pub request_message: String,
    /// Name of the signed-in user
    pub user_name: String,
}

impl ChatRequest {
    pub fn new(request_message: impl Into<String>, user_name: impl Into<String>) -> Self {
        Self {
            request_message: request_message.into(),
            user_name: user_name.into(),
        }
    }

    /// The empty message used to fetch the greeting
    pub fn bootstrap(user_name: impl Into<String>) -> Self {
        Self::new("", user_name)
    }

    pub fn is_bootstrap(&self) -> bool {
        self.request_message.is_empty()
    }
}

/// Body returned by the chat endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Reply text
    #[serde(default)]
    pub response_message: Option<String>,
    /// Reply already split into display segments, when the backend does it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_segments: Option<Vec<String>>,
    /// Opaque report payload, present once analysis is complete
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_data: Option<serde_json::Value>,
}
