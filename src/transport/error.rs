//! Transport error types

use thiserror::Error;

/// Transport failure with classification
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Network, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Timeout, message)
    }

    pub fn body(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Body, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Unknown, message)
    }
}

/// Error classification, for diagnostics only. Every kind ends the turn with
/// the same apology; nothing is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// Connection refused, DNS failure, reset
    Network,
    /// No answer within the transport's timeout
    Timeout,
    /// Status arrived but the body could not be read
    Body,
    /// Anything else, including a panicking transport
    Unknown,
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::timeout(format!("Request timeout: {e}"))
        } else if e.is_connect() {
            TransportError::network(format!("Connection failed: {e}"))
        } else if e.is_body() || e.is_decode() {
            TransportError::body(format!("Failed to read response: {e}"))
        } else {
            TransportError::unknown(format!("Request failed: {e}"))
        }
    }
}
