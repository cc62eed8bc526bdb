//! Chat session runtime executor

use super::{ChatEvent, ChatSnapshot};
use crate::state_machine::{transition, ChatContext, ChatState, Effect, Event, TransitionError};
use crate::transcript::{Transcript, Turn, TurnIdAllocator};
use crate::transport::{ChatRequest, ChatTransport, TransportErrorKind};
use chrono::Utc;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch};
use tokio_util::sync::CancellationToken;

/// Session runtime generic over the transport
pub struct ChatRuntime<T>
where
    T: ChatTransport + 'static,
{
    context: ChatContext,
    state: ChatState,
    transcript: Transcript,
    turn_ids: TurnIdAllocator,
    transport: Arc<T>,
    /// Events from handles
    event_rx: mpsc::UnboundedReceiver<Event>,
    /// Settlement events from request tasks
    settle_tx: mpsc::UnboundedSender<Event>,
    settle_rx: mpsc::UnboundedReceiver<Event>,
    snapshot_tx: watch::Sender<ChatSnapshot>,
    broadcast_tx: broadcast::Sender<ChatEvent>,
    /// Token for the in-flight webhook request, fired only on shutdown
    request_cancel_token: Option<CancellationToken>,
    submissions_seen: u64,
}

impl<T> ChatRuntime<T>
where
    T: ChatTransport + 'static,
{
    pub fn new(
        context: ChatContext,
        transport: T,
        event_rx: mpsc::UnboundedReceiver<Event>,
        snapshot_tx: watch::Sender<ChatSnapshot>,
        broadcast_tx: broadcast::Sender<ChatEvent>,
    ) -> Self {
        let (settle_tx, settle_rx) = mpsc::unbounded_channel();
        Self {
            context,
            state: ChatState::Idle,
            transcript: Transcript::new(),
            turn_ids: TurnIdAllocator::new(),
            transport: Arc::new(transport),
            event_rx,
            settle_tx,
            settle_rx,
            snapshot_tx,
            broadcast_tx,
            request_cancel_token: None,
            submissions_seen: 0,
        }
    }

    pub async fn run(mut self) {
        tracing::info!(session = %self.context.session, "Starting chat session runtime");

        loop {
            tokio::select! {
                event = self.event_rx.recv() => match event {
                    Some(event) => self.process_event(event),
                    // Every handle is gone
                    None => break,
                },
                Some(event) = self.settle_rx.recv() => self.process_event(event),
            }
        }

        if let Some(token) = self.request_cancel_token.take() {
            token.cancel();
        }

        tracing::info!(session = %self.context.session, "Chat session runtime stopped");
    }

    fn process_event(&mut self, event: Event) {
        if matches!(event, Event::UserSubmit { .. }) {
            self.submissions_seen += 1;
        }
        let kind = event.kind();

        match transition(&self.state, &self.context, event) {
            Ok(result) => {
                let old_state = std::mem::replace(&mut self.state, result.new_state);

                for effect in result.effects {
                    self.execute_effect(effect);
                }

                if !self.state.is_pending() {
                    self.request_cancel_token = None;
                }
                if old_state != self.state {
                    tracing::debug!(from = old_state.name(), to = self.state.name(), "State change");
                    let _ = self
                        .broadcast_tx
                        .send(ChatEvent::StateChange { state: self.state });
                }
            }
            Err(e @ (TransitionError::EmptyInput | TransitionError::Busy)) => {
                tracing::debug!(reason = %e, "Submission dropped");
            }
            Err(e) => {
                tracing::warn!(error = %e, event = kind, "Ignoring event");
            }
        }

        self.publish_snapshot();
    }

    fn execute_effect(&mut self, effect: Effect) {
        match effect {
            Effect::RecordTurn { role, text } => {
                let now = Utc::now();
                let turn = Turn::new(self.turn_ids.next_at(now), role, text, now);
                self.transcript.append(turn.clone());
                let _ = self.broadcast_tx.send(ChatEvent::TurnAppended { turn });
            }

            Effect::ConsumeInput => {
                let _ = self.broadcast_tx.send(ChatEvent::InputConsumed);
            }

            Effect::SendMessage { request } => self.spawn_request(request),
        }
    }

    /// Run the webhook call as a background task. The task always reports
    /// back exactly one settlement event unless the session is shutting down.
    fn spawn_request(&mut self, request: ChatRequest) {
        let cancel_token = CancellationToken::new();
        self.request_cancel_token = Some(cancel_token.clone());

        let transport = self.transport.clone();
        let settle_tx = self.settle_tx.clone();

        tokio::spawn(async move {
            tracing::info!(session = %request.session_id, "Sending message to webhook (background)");

            let outcome = tokio::select! {
                biased;

                () = cancel_token.cancelled() => {
                    tracing::info!("Webhook request abandoned, session shutting down");
                    return;
                }

                outcome = AssertUnwindSafe(transport.send(&request)).catch_unwind() => outcome,
            };

            let event = match outcome {
                Ok(Ok(reply)) => Event::ReplyReceived {
                    status: reply.status,
                    body: reply.body,
                },
                Ok(Err(e)) => {
                    tracing::warn!(error = %e, kind = ?e.kind, "Webhook request failed");
                    Event::TransportFailed {
                        message: e.message,
                        error_kind: e.kind,
                    }
                }
                Err(_) => {
                    tracing::error!("Transport panicked during webhook request");
                    Event::TransportFailed {
                        message: "transport panicked".to_string(),
                        error_kind: TransportErrorKind::Unknown,
                    }
                }
            };

            let _ = settle_tx.send(event);
        });
    }

    fn publish_snapshot(&self) {
        self.snapshot_tx.send_replace(ChatSnapshot {
            turns: self.transcript.all().to_vec(),
            pending: self.state.is_pending(),
            submissions_seen: self.submissions_seen,
        });
    }
}
