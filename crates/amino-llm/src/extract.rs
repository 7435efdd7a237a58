//! Recovering structured JSON from free-form model output.
//!
//! Models wrap JSON in markdown fences, prefix it with prose, or trail it
//! with commentary. [`extract_json`] finds the first well-formed object or
//! array and ignores everything around it.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ExtractError;

/// Body of the first fenced code block, or the whole text when unfenced.
fn strip_fences(text: &str) -> &str {
    let Some(start) = text.find("```") else {
        return text;
    };
    let after = &text[start + 3..];
    // Skip the info string (`json`, `JSON`, ...).
    let body = after.find('\n').map_or(after, |nl| &after[nl + 1..]);
    body.find("```").map_or(body, |end| &body[..end])
}

fn first_value(text: &str) -> Option<Value> {
    let mut offset = 0;
    while let Some(pos) = text[offset..].find(['{', '[']) {
        let start = offset + pos;
        let mut stream = serde_json::Deserializer::from_str(&text[start..]).into_iter::<Value>();
        match stream.next() {
            Some(Ok(value)) if value.is_object() || value.is_array() => return Some(value),
            _ => {}
        }
        offset = start + 1;
    }
    None
}

/// Extract the first JSON object or array from generated text.
///
/// # Errors
///
/// Returns [`ExtractError::NoJson`] when no well-formed object or array is
/// present.
pub fn extract_json(text: &str) -> Result<Value, ExtractError> {
    first_value(strip_fences(text))
        .or_else(|| first_value(text))
        .ok_or(ExtractError::NoJson)
}

/// Extract and deserialize into `T`.
///
/// # Errors
///
/// Returns [`ExtractError`] when no JSON is present or it does not fit `T`.
pub fn extract_as<T: DeserializeOwned>(text: &str) -> Result<T, ExtractError> {
    Ok(serde_json::from_value(extract_json(text)?)?)
}
