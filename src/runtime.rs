//! Runtime for executing a chat session
//!
//! One task per session owns the transcript and state; `ChatHandle` is the
//! cloneable front door used by renderers.

mod executor;

#[cfg(test)]
pub mod testing;

pub use executor::ChatRuntime;

use crate::session::SessionToken;
use crate::state_machine::{ChatContext, ChatState, Event};
use crate::transcript::Turn;
use crate::transport::ChatTransport;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch};

/// Discrete notifications for rendering collaborators
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    TurnAppended { turn: Turn },
    /// The submitted text was accepted; the input field can be cleared
    InputConsumed,
    StateChange { state: ChatState },
}

/// Full view of the session, republished after every processed event
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatSnapshot {
    pub turns: Vec<Turn>,
    pub pending: bool,
    /// Submissions the runtime has handled so far, accepted or dropped
    pub submissions_seen: u64,
}

/// Handle to interact with a running session
#[derive(Clone)]
pub struct ChatHandle {
    session: SessionToken,
    event_tx: mpsc::UnboundedSender<Event>,
    snapshot_rx: watch::Receiver<ChatSnapshot>,
    broadcast_tx: broadcast::Sender<ChatEvent>,
    submitted: Arc<AtomicU64>,
}

impl ChatHandle {
    /// Start a session runtime in the background. Must be called from within
    /// a tokio runtime. The session ends when the last handle is dropped.
    pub fn spawn<T: ChatTransport + 'static>(context: ChatContext, transport: T) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(ChatSnapshot::default());
        let (broadcast_tx, _) = broadcast::channel(128);

        let session = context.session.clone();
        tracing::info!(
            session = %session,
            endpoint = %transport.endpoint(),
            "Chat session started"
        );

        let runtime = ChatRuntime::new(
            context,
            transport,
            event_rx,
            snapshot_tx,
            broadcast_tx.clone(),
        );
        tokio::spawn(runtime.run());

        Self {
            session,
            event_tx,
            snapshot_rx,
            broadcast_tx,
            submitted: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Submit user text. Blank text and submissions while a reply is pending
    /// are dropped by the runtime.
    pub fn submit(&self, text: impl Into<String>) {
        if self.event_tx.send(Event::user_submit(text)).is_err() {
            tracing::warn!(session = %self.session, "Session runtime stopped, submission ignored");
            return;
        }
        self.submitted.fetch_add(1, Ordering::SeqCst);
    }

    #[must_use]
    pub fn session_token(&self) -> &SessionToken {
        &self.session
    }

    /// Latest published snapshot
    #[must_use]
    pub fn snapshot(&self) -> ChatSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// All turns in order
    #[must_use]
    pub fn transcript(&self) -> Vec<Turn> {
        self.snapshot_rx.borrow().turns.clone()
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.snapshot_rx.borrow().pending
    }

    /// Receiver that wakes on every snapshot change
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<ChatSnapshot> {
        self.snapshot_rx.clone()
    }

    /// Subscribe to discrete session notifications
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.broadcast_tx.subscribe()
    }

    /// Wait until every submission made through this handle (and its clones)
    /// has been handled and no reply is pending. Returns early if the runtime
    /// has stopped.
    pub async fn wait_until_settled(&self) {
        let submitted = self.submitted.load(Ordering::SeqCst);
        let mut rx = self.snapshot_rx.clone();
        let _ = rx
            .wait_for(|s| s.submissions_seen >= submitted && !s.pending)
            .await
            .map(|_| ());
    }
}
