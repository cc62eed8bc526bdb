//! webhook_chat - conversational client for chat webhooks
//!
//! A single session exchanges text turns with a remote responder and keeps
//! an ordered transcript. The session is a pure state machine driven by a
//! runtime task; rendering and transport are pluggable collaborators.

pub mod config;
pub mod input;
pub mod normalize;
pub mod render;
pub mod runtime;
pub mod session;
pub mod state_machine;
pub mod transcript;
pub mod transport;

pub use config::{ChatConfig, ChatSettings, ConfigError};
pub use runtime::{ChatEvent, ChatHandle, ChatSnapshot};
pub use session::SessionToken;
pub use state_machine::{ChatContext, ChatState};
pub use transcript::{Role, Transcript, Turn, TurnId};
pub use transport::{
    ChatReply, ChatRequest, ChatTransport, HttpTransport, LoggingTransport, TransportError,
    TransportErrorKind,
};
