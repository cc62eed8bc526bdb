//! Wire types for the chat webhook

use crate::session::SessionToken;
use serde::Serialize;

/// Payload posted to the webhook
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub chat_input: String,
    pub session_id: String,
}

impl ChatRequest {
    pub fn new(text: impl Into<String>, session: &SessionToken) -> Self {
        Self {
            chat_input: text.into(),
            session_id: session.as_str().to_string(),
        }
    }
}

/// What came back: status plus the raw, unparsed body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub status: u16,
    pub body: String,
}

impl ChatReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 200 reply, mostly for tests and stubs
    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
