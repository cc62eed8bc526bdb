//! Events that can occur in a chat session

use crate::transport::TransportErrorKind;

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // User events
    UserSubmit {
        text: String,
    },

    // Transport events
    /// The webhook answered; any HTTP status counts as an answer
    ReplyReceived {
        status: u16,
        body: String,
    },
    /// The request could not be completed
    TransportFailed {
        message: String,
        error_kind: TransportErrorKind,
    },
}

impl Event {
    pub fn user_submit(text: impl Into<String>) -> Self {
        Event::UserSubmit { text: text.into() }
    }

    /// Short name for logging
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Event::UserSubmit { .. } => "user_submit",
            Event::ReplyReceived { .. } => "reply_received",
            Event::TransportFailed { .. } => "transport_failed",
        }
    }
}
