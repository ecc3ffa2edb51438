//! Structured-data fragments embedded in free-form agent replies.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Locate and parse one JSON object embedded in `text`.
///
/// Tries a fence tagged `json` first, then the span from the first `{` to the
/// last `}`. Any parse failure falls through to the next strategy; `None` is
/// returned when nothing yields an object.
pub fn extract_structured(text: &str) -> Option<Map<String, Value>> {
    let candidates = [fenced_json(text), brace_span(text)];
    candidates
        .into_iter()
        .flatten()
        .find_map(|candidate| match serde_json::from_str::<Value>(candidate) {
            Ok(Value::Object(map)) => Some(map),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!(error = %e, "structured fragment did not parse");
                None
            }
        })
}

/// Extract and deserialise a structured fragment into `T`.
///
/// Returns `None` when no object is found or its shape does not match `T`.
pub fn extract_structured_as<T: DeserializeOwned>(text: &str) -> Option<T> {
    let map = extract_structured(text)?;
    match serde_json::from_value(Value::Object(map)) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!(error = %e, "structured fragment has unexpected shape");
            None
        }
    }
}

/// Body of the first fence tagged `json`.
fn fenced_json(text: &str) -> Option<&str> {
    for (idx, _) in text.match_indices("```") {
        let after = &text[idx + 3..];
        let Some(tag) = after.get(..4) else {
            continue;
        };
        if !tag.eq_ignore_ascii_case("json") {
            continue;
        }
        let body = &after[4..];
        if !body.chars().next().map_or(false, char::is_whitespace) {
            continue;
        }
        let end = body.find("```")?;
        return Some(body[..end].trim());
    }
    None
}

fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}
