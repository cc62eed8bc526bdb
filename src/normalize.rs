//! Response normalization
//!
//! Webhook backends answer in different shapes. The display text is the first
//! non-empty string among a fixed list of fields, then the raw body, then a
//! fixed fallback.

use serde_json::Value;

/// Fields consulted in priority order
pub const ANSWER_FIELDS: [&str; 4] = ["output", "response", "message", "text"];

/// Shown when the response carries nothing displayable
pub const NO_ANSWER_TEXT: &str = "no answer received";

/// Try to parse a response body as JSON.
///
/// A body that isn't JSON is not an error: the caller falls back to the raw
/// text as the answer.
pub fn parse_body(raw: &str) -> Option<Value> {
    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!(error = %e, "Response body is not JSON, using raw text");
            None
        }
    }
}

/// Pick the display string for a response.
pub fn normalize(parsed: Option<&Value>, raw: &str) -> String {
    parsed
        .and_then(answer_field)
        .or_else(|| (!raw.is_empty()).then_some(raw))
        .unwrap_or(NO_ANSWER_TEXT)
        .to_string()
}

/// Parse and normalize in one step
pub fn normalize_body(raw: &str) -> String {
    let parsed = parse_body(raw);
    normalize(parsed.as_ref(), raw)
}

fn answer_field(value: &Value) -> Option<&str> {
    let object = value.as_object()?;
    ANSWER_FIELDS
        .iter()
        .filter_map(|field| object.get(*field).and_then(Value::as_str))
        .find(|text| !text.is_empty())
}
