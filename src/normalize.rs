use std::borrow::Cow;

use serde_json::Value;

/// Coerce a value of unknown shape into a candidate string.
///
/// This is the single entry guard: `None` means "no input" and nothing
/// downstream re-checks for emptiness. Null yields `None`; scalars are
/// stringified; objects and arrays are re-serialized so a double-encoded
/// payload still flows through the pipeline.
pub(crate) fn normalize_value(input: &Value) -> Option<Cow<'_, str>> {
    let text: Cow<'_, str> = match input {
        Value::Null => return None,
        Value::String(s) => Cow::Borrowed(s.as_str()),
        Value::Bool(b) => Cow::Owned(b.to_string()),
        Value::Number(n) => Cow::Owned(n.to_string()),
        Value::Object(_) | Value::Array(_) => match serde_json::to_string(input) {
            Ok(serialized) => Cow::Owned(serialized),
            Err(_) => return None,
        },
    };
    normalize_str(&text).is_some().then_some(text)
}

/// Trim-check a raw string; `None` when empty or all-whitespace.
pub(crate) fn normalize_str(input: &str) -> Option<&str> {
    let trimmed = input.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}
