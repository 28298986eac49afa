//! Adapters for emitting redacted exchange data through `slog`.
//!
//! `HeaderMap` and `LoggedBody` implement `slog::Value`, so the output of
//! [`redact_headers`](crate::redact_headers) and the exchange loggers can be
//! attached to `slog` records directly. Structured data goes through `slog`'s
//! nested-value support:
//!
//! - a header map serializes as a nested object of value lists;
//! - a JSON body serializes as nested JSON, any other body as a string, and an
//!   absent body as `None`.
//!
//! Redaction happens before these values exist; nothing here redacts.

use serde_json::Value as JsonValue;
use slog::{Key, Record, Result as SlogResult, Serializer, Value as SlogValue};

use crate::{http::LoggedBody, redaction::HeaderMap};

impl SlogValue for HeaderMap {
    fn serialize(
        &self,
        record: &Record<'_>,
        key: Key,
        serializer: &mut dyn Serializer,
    ) -> SlogResult {
        let nested = slog::Serde(self.clone());
        SlogValue::serialize(&nested, record, key, serializer)
    }
}

impl SlogValue for LoggedBody<'_> {
    fn serialize(
        &self,
        record: &Record<'_>,
        key: Key,
        serializer: &mut dyn Serializer,
    ) -> SlogResult {
        let Some(bytes) = self.as_bytes() else {
            return serializer.emit_none(key);
        };
        match serde_json::from_slice::<JsonValue>(bytes) {
            Ok(json) => {
                let nested = slog::Serde(json);
                SlogValue::serialize(&nested, record, key, serializer)
            }
            Err(_) => serializer.emit_str(key, &String::from_utf8_lossy(bytes)),
        }
    }
}
