//! Chat session state types

use crate::session::SessionToken;

/// Lifecycle state of the session.
///
/// There is no error state: a failed turn is recorded in the transcript and
/// the session goes back to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChatState {
    /// Ready for user input
    #[default]
    Idle,

    /// A webhook request is in flight; new submissions are dropped
    Pending,
}

impl ChatState {
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, ChatState::Pending)
    }

    /// Name used in logs and state-change notifications
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            ChatState::Idle => "idle",
            ChatState::Pending => "pending",
        }
    }
}

/// Context for a session (immutable for its lifetime)
#[derive(Debug, Clone)]
pub struct ChatContext {
    pub session: SessionToken,
}

impl ChatContext {
    #[must_use]
    pub fn new(session: SessionToken) -> Self {
        Self { session }
    }

    /// Context with a freshly generated session token
    #[must_use]
    pub fn generate() -> Self {
        Self::new(SessionToken::generate())
    }
}
