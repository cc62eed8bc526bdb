//! Append-only conversation transcript

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Who authored a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Bot,
}

/// Turn identifier, derived from the creation time in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TurnId(i64);

impl TurnId {
    #[must_use]
    pub fn as_millis(self) -> i64 {
        self.0
    }
}

impl fmt::Display for TurnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hands out time-derived ids that are strictly increasing within a session.
///
/// Two turns created in the same millisecond (a fast reply right after the
/// user turn) still get distinct ids: the later one is bumped past the last
/// id handed out.
#[derive(Debug, Default)]
pub struct TurnIdAllocator {
    last: Option<i64>,
}

impl TurnIdAllocator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_at(&mut self, now: DateTime<Utc>) -> TurnId {
        let millis = now.timestamp_millis();
        let id = match self.last {
            Some(last) if millis <= last => last + 1,
            _ => millis,
        };
        self.last = Some(id);
        TurnId(id)
    }
}

/// One transcript entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub id: TurnId,
    pub role: Role,
    pub text: String,
    /// Display only; ordering comes from the transcript position
    pub created_at: DateTime<Utc>,
}

impl Turn {
    pub fn new(id: TurnId, role: Role, text: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            role,
            text: text.into(),
            created_at,
        }
    }
}

/// Ordered log of turns. Nothing is ever removed or rewritten.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, turn: Turn) {
        debug_assert!(!turn.text.is_empty(), "turn text must not be empty");
        self.turns.push(turn);
    }

    /// All turns in insertion order
    #[must_use]
    pub fn all(&self) -> &[Turn] {
        &self.turns
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
