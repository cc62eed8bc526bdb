//! Session identity
//!
//! One opaque token per chat session, reused by every webhook call so the
//! remote responder can correlate turns.

use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

const TOKEN_PREFIX: &str = "session";
const RANDOM_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Opaque session token: `session-<unix_millis>-<9 base-36 chars>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    /// Generate a fresh token from the current time and a random suffix.
    #[must_use]
    pub fn generate() -> Self {
        let millis = Utc::now().timestamp_millis();
        let mut rng = rand::thread_rng();
        let suffix: String = (0..RANDOM_LEN)
            .map(|_| char::from(BASE36[rng.gen_range(0..BASE36.len())]))
            .collect();
        Self(format!("{TOKEN_PREFIX}-{millis}-{suffix}"))
    }

    /// Wrap an existing token (e.g. one handed out by an embedding host)
    #[must_use]
    pub fn from_existing(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
