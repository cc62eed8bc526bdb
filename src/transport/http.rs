//! HTTP webhook transport

use super::{ChatReply, ChatRequest, ChatTransport, TransportError};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, Url};
use std::time::Duration;

/// Posts chat messages as JSON to a webhook URL
pub struct HttpTransport {
    client: Client,
    endpoint: Url,
}

impl HttpTransport {
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::unknown(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn send(&self, request: &ChatRequest) -> Result<ChatReply, TransportError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(ACCEPT, "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!(status = status.as_u16(), headers = ?response.headers(), "Webhook responded");

        let body = response
            .text()
            .await
            .map_err(|e| TransportError::body(format!("Failed to read response: {e}")))?;
        tracing::debug!(body = %body, "Webhook response body");

        let reply = ChatReply::new(status.as_u16(), body);
        if !reply.is_success() {
            tracing::warn!(status = reply.status, "Webhook returned non-success status");
        }

        Ok(reply)
    }

    fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }
}
