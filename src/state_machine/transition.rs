//! Pure state transition function
//!
//! Given the same state, context and event it always produces the same new
//! state and effects. All I/O happens in the runtime.

use super::{ChatContext, ChatState, Effect, Event};
use crate::normalize::normalize_body;
use crate::transport::ChatRequest;
use thiserror::Error;

/// Bot turn shown when the webhook could not be reached
pub const APOLOGY_TEXT: &str = "Sorry, something went wrong. Please try again.";

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ChatState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    #[must_use]
    pub fn new(state: ChatState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    #[must_use]
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Reasons an event is rejected. Rejections never touch the transcript.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Message is empty")]
    EmptyInput,
    #[error("A reply is still pending, message dropped")]
    Busy,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function
pub fn transition(
    state: &ChatState,
    context: &ChatContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // Only one turn may be in flight; later submissions are dropped
        (ChatState::Pending, Event::UserSubmit { .. }) => Err(TransitionError::Busy),

        (ChatState::Idle, Event::UserSubmit { text }) => {
            let text = text.trim();
            if text.is_empty() {
                return Err(TransitionError::EmptyInput);
            }

            Ok(TransitionResult::new(ChatState::Pending)
                .with_effect(Effect::record_user_turn(text))
                .with_effect(Effect::ConsumeInput)
                .with_effect(Effect::SendMessage {
                    request: ChatRequest::new(text, &context.session),
                }))
        }

        // Any HTTP status with a body is an answer
        (ChatState::Pending, Event::ReplyReceived { body, .. }) => {
            Ok(TransitionResult::new(ChatState::Idle)
                .with_effect(Effect::record_bot_turn(normalize_body(&body))))
        }

        (ChatState::Pending, Event::TransportFailed { .. }) => {
            Ok(TransitionResult::new(ChatState::Idle)
                .with_effect(Effect::record_bot_turn(APOLOGY_TEXT)))
        }

        (state, event @ (Event::ReplyReceived { .. } | Event::TransportFailed { .. })) => {
            Err(TransitionError::InvalidTransition(format!(
                "No transition from {} with event {}",
                state.name(),
                event.kind()
            )))
        }
    }
}
