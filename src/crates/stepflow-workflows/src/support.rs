//! Helpers shared by the workflow node bodies

use serde_json::{json, Value};

/// Whether an earlier node already recorded a failure
pub(crate) fn has_error(state: &Value) -> bool {
    match state.get("error") {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

/// String field, empty when absent or not a string
pub(crate) fn str_field<'a>(state: &'a Value, name: &str) -> &'a str {
    state.get(name).and_then(Value::as_str).unwrap_or_default()
}

/// Conversation entry appended to a `messages` field
pub(crate) fn message(role: &str, content: impl Into<String>) -> Value {
    json!({"role": role, "content": content.into()})
}

/// Delta that leaves the state unchanged
pub(crate) fn no_change() -> Value {
    json!({})
}

/// Cut the text to at most `limit` characters on a char boundary
pub(crate) fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Slice from the first `{` to the last `}`
///
/// Models often wrap JSON in prose or code fences.
pub(crate) fn json_object_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}
