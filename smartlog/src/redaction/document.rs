//! Recursive redaction of parsed JSON documents and raw JSON bodies.

use std::borrow::Cow;

use serde_json::{Map, Value};

use super::keys::{REDACTED_PLACEHOLDER, RedactKeys};
use crate::error::Result;

/// Redacts every matching key anywhere in `document`.
///
/// Only objects are walked. Object elements of arrays are redacted; scalars and
/// nested arrays inside arrays are carried over as they are. A top-level array
/// or scalar is returned unchanged.
///
/// With an empty key set the input itself is returned, borrowed.
///
/// ```rust
/// use serde_json::json;
/// use smartlog::{RedactKeys, redact_document};
///
/// let doc = json!({"user": {"name": "a", "details": {"token": "secret"}}});
/// let redacted = redact_document(&doc, &RedactKeys::new(["token"]));
/// assert_eq!(
///     *redacted,
///     json!({"user": {"name": "a", "details": {"token": "[REDACTED]"}}})
/// );
/// ```
pub fn redact_document<'a>(document: &'a Value, keys: &RedactKeys) -> Cow<'a, Value> {
    if keys.is_empty() {
        return Cow::Borrowed(document);
    }
    match document {
        Value::Object(object) => Cow::Owned(Value::Object(redact_object(object, keys))),
        _ => Cow::Borrowed(document),
    }
}

/// Builds a redacted copy of a JSON object.
pub fn redact_object(object: &Map<String, Value>, keys: &RedactKeys) -> Map<String, Value> {
    object
        .iter()
        .map(|(key, value)| {
            let value = if keys.matches(key) {
                Value::String(REDACTED_PLACEHOLDER.to_string())
            } else {
                redact_value(value, keys)
            };
            (key.clone(), value)
        })
        .collect()
}

fn redact_value(value: &Value, keys: &RedactKeys) -> Value {
    match value {
        Value::Object(object) => Value::Object(redact_object(object, keys)),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| match item {
                    Value::Object(object) => Value::Object(redact_object(object, keys)),
                    other => other.clone(),
                })
                .collect(),
        ),
        scalar => scalar.clone(),
    }
}

/// Redacts a raw JSON body.
///
/// Bodies that are empty, or that do not parse as a JSON object (plain text,
/// binary payloads, top-level arrays), come back borrowed and untouched. That
/// is an expected outcome, not an error.
///
/// The only failure is re-encoding the redacted object. Callers that log the
/// original bytes on failure keep the record but may leak the value.
pub fn redact_json_body<'a>(body: &'a [u8], keys: &RedactKeys) -> Result<Cow<'a, [u8]>> {
    if keys.is_empty() || body.is_empty() {
        return Ok(Cow::Borrowed(body));
    }
    let Ok(object) = serde_json::from_slice::<Map<String, Value>>(body) else {
        return Ok(Cow::Borrowed(body));
    };
    let redacted = serde_json::to_vec(&redact_object(&object, keys))?;
    Ok(Cow::Owned(redacted))
}
