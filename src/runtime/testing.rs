//! Mock transports for testing
//!
//! These mocks drive the session runtime without real I/O.

use super::{ChatEvent, ChatHandle, ChatSnapshot};
use crate::state_machine::ChatContext;
use crate::session::SessionToken;
use crate::transport::{ChatReply, ChatRequest, ChatTransport, TransportError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, Notify, Semaphore};

const WAIT_TIMEOUT: Duration = Duration::from_secs(2);

// ============================================================================
// Mock Transport
// ============================================================================

/// Mock transport that returns queued replies
pub struct MockTransport {
    replies: Mutex<VecDeque<Result<ChatReply, TransportError>>>,
    /// Record of all requests made
    pub requests: Mutex<Vec<ChatRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a reply
    pub fn queue_reply(&self, reply: ChatReply) {
        self.replies.lock().unwrap().push_back(Ok(reply));
    }

    /// Queue a transport failure
    pub fn queue_error(&self, error: TransportError) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    pub fn recorded_requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn next_reply(&self) -> Result<ChatReply, TransportError> {
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::network("No mock reply queued")))
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatTransport for MockTransport {
    async fn send(&self, request: &ChatRequest) -> Result<ChatReply, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        self.next_reply()
    }

    fn endpoint(&self) -> &str {
        "mock://webhook"
    }
}

// ============================================================================
// Gated Mock Transport (holds the reply until released)
// ============================================================================

/// Mock transport whose replies are held back until the test releases them
pub struct GatedTransport {
    inner: MockTransport,
    gate: Semaphore,
    /// Notified when a request reaches the transport
    pub request_started: Notify,
}

impl GatedTransport {
    pub fn new() -> Self {
        Self {
            inner: MockTransport::new(),
            gate: Semaphore::new(0),
            request_started: Notify::new(),
        }
    }

    pub fn queue_reply(&self, reply: ChatReply) {
        self.inner.queue_reply(reply);
    }

    /// Let one held request complete
    pub fn release(&self) {
        self.gate.add_permits(1);
    }

    pub fn recorded_requests(&self) -> Vec<ChatRequest> {
        self.inner.recorded_requests()
    }
}

#[async_trait]
impl ChatTransport for GatedTransport {
    async fn send(&self, request: &ChatRequest) -> Result<ChatReply, TransportError> {
        self.inner.requests.lock().unwrap().push(request.clone());
        self.request_started.notify_one();
        let permit = self
            .gate
            .acquire()
            .await
            .map_err(|_| TransportError::unknown("gate closed"))?;
        permit.forget();
        self.inner.next_reply()
    }

    fn endpoint(&self) -> &str {
        "mock://gated"
    }
}

// ============================================================================
// Panicking Transport
// ============================================================================

/// Transport that panics mid-call
pub struct PanickingTransport;

#[async_trait]
impl ChatTransport for PanickingTransport {
    async fn send(&self, request: &ChatRequest) -> Result<ChatReply, TransportError> {
        panic!("transport exploded on {:?}", request.chat_input);
    }

    fn endpoint(&self) -> &str {
        "mock://panic"
    }
}

// ============================================================================
// Test Session
// ============================================================================

/// A running session plus its transport and a notification subscription
pub struct TestSession<T> {
    pub handle: ChatHandle,
    pub transport: Arc<T>,
    pub events: broadcast::Receiver<ChatEvent>,
}

impl<T: ChatTransport + 'static> TestSession<T> {
    pub fn start(transport: T) -> Self {
        let transport = Arc::new(transport);
        let context = ChatContext::new(SessionToken::from_existing("session-1700000000000-testtoken"));
        let handle = ChatHandle::spawn(context, transport.clone());
        let events = handle.subscribe();
        Self {
            handle,
            transport,
            events,
        }
    }

    /// Wait for a snapshot matching the predicate
    pub async fn wait_for(&self, predicate: impl FnMut(&ChatSnapshot) -> bool) -> ChatSnapshot {
        let mut rx = self.handle.watch();
        let snapshot = tokio::time::timeout(WAIT_TIMEOUT, rx.wait_for(predicate))
            .await
            .expect("timed out waiting for snapshot")
            .expect("session runtime stopped")
            .clone();
        snapshot
    }

    /// Wait until `count` submissions have been handled
    pub async fn wait_for_submissions(&self, count: u64) -> ChatSnapshot {
        self.wait_for(|s| s.submissions_seen >= count).await
    }

    /// Drain the notifications received so far
    pub fn drain_events(&mut self) -> Vec<ChatEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::NO_ANSWER_TEXT;
    use crate::state_machine::{ChatState, APOLOGY_TEXT};
    use crate::transcript::{Role, Turn};

    fn roles_and_texts(turns: &[Turn]) -> Vec<(Role, &str)> {
        turns.iter().map(|t| (t.role, t.text.as_str())).collect()
    }

    #[tokio::test]
    async fn test_mock_transport() {
        let mock = MockTransport::new();
        mock.queue_reply(ChatReply::ok("Hello"));

        let request = ChatRequest::new("hi", &SessionToken::from_existing("s"));
        let reply = mock.send(&request).await.unwrap();
        assert_eq!(reply.body, "Hello");

        // Second call should fail (no more replies)
        assert!(mock.send(&request).await.is_err());
        assert_eq!(mock.recorded_requests().len(), 2);
    }

    /// Session starts, "hello" is pending, then the reply lands
    #[tokio::test]
    async fn test_hello_round_trip() {
        let transport = GatedTransport::new();
        transport.queue_reply(ChatReply::ok(r#"{"output":"hi there"}"#));
        let session = TestSession::start(transport);

        assert!(session.handle.transcript().is_empty());
        session.handle.submit("hello");
        session.transport.request_started.notified().await;

        let snapshot = session.wait_for_submissions(1).await;
        assert_eq!(roles_and_texts(&snapshot.turns), vec![(Role::User, "hello")]);
        assert!(snapshot.pending);

        session.transport.release();
        let snapshot = session.wait_for(|s| !s.pending).await;

        assert_eq!(
            roles_and_texts(&snapshot.turns),
            vec![(Role::User, "hello"), (Role::Bot, "hi there")]
        );
        assert!(snapshot.turns[0].id < snapshot.turns[1].id);
        assert!(!session.handle.is_pending());
    }

    /// Network failure for "ping" ends in the apology turn
    #[tokio::test]
    async fn test_transport_failure_records_apology() {
        let transport = MockTransport::new();
        transport.queue_error(TransportError::network("connection refused"));
        let session = TestSession::start(transport);

        session.handle.submit("ping");
        let snapshot = session
            .wait_for(|s| s.turns.len() == 2 && !s.pending)
            .await;

        assert_eq!(
            roles_and_texts(&snapshot.turns),
            vec![(Role::User, "ping"), (Role::Bot, APOLOGY_TEXT)]
        );
    }

    #[tokio::test]
    async fn test_panicking_transport_still_settles() {
        let session = TestSession::start(PanickingTransport);

        session.handle.submit("boom?");
        let snapshot = session
            .wait_for(|s| s.turns.len() == 2 && !s.pending)
            .await;

        assert_eq!(snapshot.turns[1].text, APOLOGY_TEXT);

        // Session is usable again
        session.handle.submit("again");
        let snapshot = session.wait_for(|s| s.turns.len() == 4).await;
        assert!(!snapshot.pending);
    }

    #[tokio::test]
    async fn test_malformed_body_becomes_answer() {
        let transport = MockTransport::new();
        transport.queue_reply(ChatReply::ok("plain text"));
        transport.queue_reply(ChatReply::new(502, ""));
        let session = TestSession::start(transport);

        session.handle.submit("first");
        session.wait_for(|s| s.turns.len() == 2 && !s.pending).await;
        session.handle.submit("second");
        let snapshot = session.wait_for(|s| s.turns.len() == 4 && !s.pending).await;

        assert_eq!(snapshot.turns[1].text, "plain text");
        assert_eq!(snapshot.turns[3].text, NO_ANSWER_TEXT);
    }

    #[tokio::test]
    async fn test_blank_input_is_ignored() {
        let session = TestSession::start(MockTransport::new());

        session.handle.submit("");
        session.handle.submit("   \n\t");
        let snapshot = session.wait_for_submissions(2).await;

        assert!(snapshot.turns.is_empty());
        assert!(!snapshot.pending);
        assert!(session.transport.recorded_requests().is_empty());
    }

    #[tokio::test]
    async fn test_input_is_trimmed() {
        let transport = MockTransport::new();
        transport.queue_reply(ChatReply::ok(r#"{"response":"ok"}"#));
        let session = TestSession::start(transport);

        session.handle.submit("  spaced out  ");
        let snapshot = session.wait_for(|s| s.turns.len() == 2).await;

        assert_eq!(snapshot.turns[0].text, "spaced out");
        assert_eq!(session.transport.recorded_requests()[0].chat_input, "spaced out");
    }

    /// Submissions during a pending reply are dropped, not queued
    #[tokio::test]
    async fn test_submissions_while_pending_are_dropped() {
        let transport = GatedTransport::new();
        transport.queue_reply(ChatReply::ok(r#"{"output":"first answer"}"#));
        let session = TestSession::start(transport);

        session.handle.submit("first");
        session.transport.request_started.notified().await;
        session.handle.submit("second");
        session.handle.submit("third");

        let snapshot = session.wait_for_submissions(3).await;
        assert_eq!(snapshot.turns.len(), 1);
        assert!(snapshot.pending);

        session.transport.release();
        let snapshot = session.wait_for(|s| !s.pending).await;

        assert_eq!(
            roles_and_texts(&snapshot.turns),
            vec![(Role::User, "first"), (Role::Bot, "first answer")]
        );
        assert_eq!(session.transport.recorded_requests().len(), 1);
    }

    /// Notifications arrive in lifecycle order: user turn, input consumed,
    /// pending, bot turn, idle
    #[tokio::test]
    async fn test_notification_order() {
        let transport = MockTransport::new();
        transport.queue_reply(ChatReply::ok(r#"{"message":"yo"}"#));
        let mut session = TestSession::start(transport);

        session.handle.submit("hey");
        session.wait_for(|s| s.turns.len() == 2 && !s.pending).await;

        let events = session.drain_events();
        assert_eq!(events.len(), 5);
        assert!(matches!(&events[0], ChatEvent::TurnAppended { turn } if turn.role == Role::User));
        assert_eq!(events[1], ChatEvent::InputConsumed);
        assert_eq!(events[2], ChatEvent::StateChange { state: ChatState::Pending });
        assert!(matches!(&events[3], ChatEvent::TurnAppended { turn } if turn.text == "yo"));
        assert_eq!(events[4], ChatEvent::StateChange { state: ChatState::Idle });
    }

    /// Every snapshot holding an unanswered user turn is pending, and vice versa
    #[tokio::test]
    async fn test_pending_matches_unanswered_turn() {
        let transport = MockTransport::new();
        for i in 0..5 {
            transport.queue_reply(ChatReply::ok(format!(r#"{{"output":"answer {i}"}}"#)));
        }
        let session = TestSession::start(transport);
        let mut rx = session.handle.watch();

        let observer = tokio::spawn(async move {
            let mut seen = Vec::new();
            while rx.changed().await.is_ok() {
                let snapshot = rx.borrow_and_update().clone();
                let done = snapshot.turns.len() == 10 && !snapshot.pending;
                seen.push(snapshot);
                if done {
                    break;
                }
            }
            seen
        });

        for i in 0..5 {
            session.handle.submit(format!("question {i}"));
            session.handle.wait_until_settled().await;
        }

        let seen = tokio::time::timeout(WAIT_TIMEOUT, observer)
            .await
            .expect("observer timed out")
            .unwrap();
        for snapshot in seen {
            assert_eq!(snapshot.pending, snapshot.turns.len() % 2 == 1);
        }
    }

    #[tokio::test]
    async fn test_session_token_reused_across_turns() {
        let transport = MockTransport::new();
        transport.queue_reply(ChatReply::ok("one"));
        transport.queue_reply(ChatReply::ok("two"));
        let session = TestSession::start(transport);

        session.handle.submit("a");
        session.handle.wait_until_settled().await;
        session.handle.submit("b");
        session.handle.wait_until_settled().await;

        let requests = session.transport.recorded_requests();
        assert_eq!(requests.len(), 2);
        let token = session.handle.session_token().as_str();
        assert!(requests.iter().all(|r| r.session_id == token));
    }

    #[tokio::test]
    async fn test_turn_ids_are_unique_and_ordered() {
        let transport = MockTransport::new();
        for _ in 0..3 {
            transport.queue_reply(ChatReply::ok("fast"));
        }
        let session = TestSession::start(transport);

        for text in ["x", "y", "z"] {
            session.handle.submit(text);
            session.handle.wait_until_settled().await;
        }

        let turns = session.handle.transcript();
        assert_eq!(turns.len(), 6);
        assert!(turns.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[tokio::test]
    async fn test_wait_until_settled_with_nothing_submitted() {
        let session = TestSession::start(MockTransport::new());
        tokio::time::timeout(WAIT_TIMEOUT, session.handle.wait_until_settled())
            .await
            .expect("should return immediately");
    }
}
