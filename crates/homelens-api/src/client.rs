//! Chat backend client

use std::time::Duration;

use async_trait::async_trait;

use crate::{
    error::{Error, Result},
    types::{ChatRequest, ChatResponse},
};

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Anything that can answer a chat request
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send one request, authorized with the given bearer token
    async fn chat(&self, request: &ChatRequest, auth_token: &str) -> Result<ChatResponse>;
}

/// reqwest-backed client for `POST {base_url}/api/chat`
pub struct HttpChatBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpChatBackend {
    /// Create a client for the given server root, e.g. `http://127.0.0.1:8001`
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom request timeout
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(Error::InvalidConfig("api url must not be empty".into()));
        }

        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    /// Full URL of the chat endpoint
    pub fn endpoint(&self) -> String {
        format!("{}/api/chat", self.base_url)
    }
}

#[async_trait]
impl ChatBackend for HttpChatBackend {
    async fn chat(&self, request: &ChatRequest, auth_token: &str) -> Result<ChatResponse> {
        let url = self.endpoint();
        tracing::debug!(
            url = %url,
            bootstrap = request.is_bootstrap(),
            "sending chat request"
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", auth_token))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::status(status.as_u16(), body));
        }

        let bytes = response.bytes().await?;
        let reply: ChatResponse = serde_json::from_slice(&bytes)?;
        Ok(reply)
    }
}
