//! Webhook transport abstraction
//!
//! The core only needs "send this message, give me status and body back".
//! `HttpTransport` does that over HTTP; tests swap in mocks.

mod error;
mod http;
mod types;

pub use error::{TransportError, TransportErrorKind};
pub use http::HttpTransport;
pub use types::{ChatReply, ChatRequest};

use async_trait::async_trait;
use std::sync::Arc;

/// A single request/response exchange with the remote responder
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Deliver one message. Any HTTP status is a reply; only failures to
    /// complete the exchange are errors.
    async fn send(&self, request: &ChatRequest) -> Result<ChatReply, TransportError>;

    /// Where requests go, for logs and display
    fn endpoint(&self) -> &str;
}

#[async_trait]
impl<T: ChatTransport + ?Sized> ChatTransport for Arc<T> {
    async fn send(&self, request: &ChatRequest) -> Result<ChatReply, TransportError> {
        (**self).send(request).await
    }

    fn endpoint(&self) -> &str {
        (**self).endpoint()
    }
}

/// Logging wrapper for transports
pub struct LoggingTransport<T> {
    inner: T,
}

impl<T: ChatTransport> LoggingTransport<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<T: ChatTransport> ChatTransport for LoggingTransport<T> {
    async fn send(&self, request: &ChatRequest) -> Result<ChatReply, TransportError> {
        let start = std::time::Instant::now();
        let result = self.inner.send(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(reply) => {
                tracing::info!(
                    endpoint = %self.inner.endpoint(),
                    session = %request.session_id,
                    duration_ms = %duration.as_millis(),
                    status = reply.status,
                    body_len = reply.body.len(),
                    "Webhook request completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    endpoint = %self.inner.endpoint(),
                    session = %request.session_id,
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    kind = ?e.kind,
                    "Webhook request failed"
                );
            }
        }

        result
    }

    fn endpoint(&self) -> &str {
        self.inner.endpoint()
    }
}
