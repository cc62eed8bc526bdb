//! Effects produced by state transitions

use crate::transcript::Role;
use crate::transport::ChatRequest;

/// Effects to be executed after a state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Append a turn to the transcript (the runtime assigns id and timestamp)
    RecordTurn { role: Role, text: String },

    /// Tell the rendering side the input buffer was consumed
    ConsumeInput,

    /// Send the message to the webhook (spawns as background task)
    SendMessage { request: ChatRequest },
}

impl Effect {
    pub fn record_user_turn(text: impl Into<String>) -> Self {
        Effect::RecordTurn {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn record_bot_turn(text: impl Into<String>) -> Self {
        Effect::RecordTurn {
            role: Role::Bot,
            text: text.into(),
        }
    }
}
