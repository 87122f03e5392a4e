//! Message dispatch to the chat backend

use std::sync::Arc;

use homelens_api::{ChatBackend, ChatRequest, ChatResponse};

use crate::{
    error::{Error, Result},
    session::SessionContext,
};

/// A backend reply before it is turned into conversation messages
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawReply {
    /// Full reply text; empty when the backend sent none
    pub text: String,
    /// Display segments, when the backend already split the reply
    pub segments: Option<Vec<String>>,
    /// Opaque report payload
    pub report_payload: Option<serde_json::Value>,
}

impl RawReply {
    /// Whether `needle` appears in the text or in any backend segment
    pub fn mentions(&self, needle: &str) -> bool {
        self.text.contains(needle)
            || self
                .segments
                .iter()
                .flatten()
                .any(|segment| segment.contains(needle))
    }
}

#[cfg(test)]
impl RawReply {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.report_payload = Some(payload);
        self
    }
}

impl From<ChatResponse> for RawReply {
    fn from(response: ChatResponse) -> Self {
        Self {
            text: response.response_message.unwrap_or_default(),
            segments: response.response_segments,
            report_payload: response.report_data,
        }
    }
}

/// Sends user text to the backend and hands back the raw reply.
///
/// Mapping the reply into messages is the caller's job.
#[derive(Clone)]
pub struct MessageDispatcher {
    backend: Arc<dyn ChatBackend>,
}

impl MessageDispatcher {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self { backend }
    }

    /// Send `user_text` (empty for the bootstrap greeting).
    ///
    /// Fails with [`Error::MissingSession`] without touching the network when
    /// the session has no token. No retries.
    pub async fn send(&self, user_text: &str, session: &SessionContext) -> Result<RawReply> {
        let token = session.auth_token().ok_or(Error::MissingSession)?;
        let request = ChatRequest::new(user_text, session.user_name());
        let response = self.backend.chat(&request, token).await?;
        Ok(response.into())
    }
}
