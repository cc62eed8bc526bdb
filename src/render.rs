//! Line-oriented transcript rendering for the terminal frontend

use crate::runtime::ChatSnapshot;
use crate::transcript::{Role, Turn};
use chrono::{DateTime, Local, TimeZone, Utc};

pub const TITLE: &str = "AI Chatbot";
pub const WELCOME: &str = "Welcome! Ask me a question and I'll gladly help.";
pub const TYPING_INDICATOR: &str = "bot is typing…";

/// `HH:MM` in the given timezone
pub fn format_time_in<Tz: TimeZone>(at: DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.with_timezone(tz).format("%H:%M").to_string()
}

/// `HH:MM` in local time
pub fn format_time(at: DateTime<Utc>) -> String {
    format_time_in(at, &Local)
}

fn speaker(role: Role) -> &'static str {
    match role {
        Role::User => "you",
        Role::Bot => "bot",
    }
}

/// One turn as printable text; continuation lines are indented under the
/// first.
pub fn render_turn_in<Tz: TimeZone>(turn: &Turn, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let prefix = format!("[{}] {}: ", format_time_in(turn.created_at, tz), speaker(turn.role));
    let indent = " ".repeat(prefix.chars().count());

    let mut out = String::new();
    for (i, line) in turn.text.lines().enumerate() {
        if i == 0 {
            out.push_str(&prefix);
        } else {
            out.push('\n');
            out.push_str(&indent);
        }
        out.push_str(line);
    }
    if out.is_empty() {
        out = prefix;
    }
    out
}

pub fn render_turn(turn: &Turn) -> String {
    render_turn_in(turn, &Local)
}

/// Tracks what has already been printed and turns each new snapshot into the
/// lines that still need printing.
#[derive(Debug, Default)]
pub struct TerminalRenderer {
    shown: usize,
    was_pending: bool,
}

impl TerminalRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines shown before anything else
    #[must_use]
    pub fn header(endpoint: &str) -> Vec<String> {
        vec![
            TITLE.to_string(),
            format!("Chat URL: {endpoint}"),
            String::new(),
            WELCOME.to_string(),
        ]
    }

    pub fn render(&mut self, snapshot: &ChatSnapshot) -> Vec<String> {
        self.render_in(snapshot, &Local)
    }

    pub fn render_in<Tz: TimeZone>(&mut self, snapshot: &ChatSnapshot, tz: &Tz) -> Vec<String>
    where
        Tz::Offset: std::fmt::Display,
    {
        let mut lines: Vec<String> = snapshot
            .turns
            .iter()
            .skip(self.shown)
            .map(|turn| render_turn_in(turn, tz))
            .collect();
        self.shown = snapshot.turns.len();

        if snapshot.pending && !self.was_pending {
            lines.push(TYPING_INDICATOR.to_string());
        }
        self.was_pending = snapshot.pending;

        lines
    }
}
