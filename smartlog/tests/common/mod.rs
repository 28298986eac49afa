//! Record capture shared by the integration tests.
//!
//! `capture(|| ...)` runs the closure under a scoped subscriber and returns
//! every event it emitted, with field values rendered as strings.

#![allow(dead_code)]

use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, Mutex},
};

use tracing::{
    Event, Level, Subscriber,
    field::{Field, Visit},
};
use tracing_subscriber::{Layer, layer::Context, layer::SubscriberExt, registry::Registry};

#[derive(Clone, Debug)]
pub struct CapturedRecord {
    pub level: Level,
    pub fields: HashMap<String, String>,
}

impl CapturedRecord {
    pub fn message(&self) -> &str {
        self.field("message").unwrap_or_default()
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Parses a field holding JSON text.
    pub fn json(&self, name: &str) -> serde_json::Value {
        let raw = self
            .field(name)
            .unwrap_or_else(|| panic!("record has no field `{name}`"));
        serde_json::from_str(raw).unwrap_or_else(|e| panic!("field `{name}` is not JSON: {e}"))
    }
}

#[derive(Clone, Default)]
struct CaptureLayer {
    records: Arc<Mutex<Vec<CapturedRecord>>>,
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);
        self.records.lock().unwrap().push(CapturedRecord {
            level: *event.metadata().level(),
            fields: visitor.fields,
        });
    }
}

#[derive(Default)]
struct FieldVisitor {
    fields: HashMap<String, String>,
}

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.fields.insert(field.name().to_string(), value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields.insert(field.name().to_string(), value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.insert(field.name().to_string(), value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields.insert(field.name().to_string(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.fields
            .insert(field.name().to_string(), format!("{value:?}"));
    }
}

/// Runs `f` and returns the records it emitted, in order.
pub fn capture<F: FnOnce()>(f: F) -> Vec<CapturedRecord> {
    let layer = CaptureLayer::default();
    let records = Arc::clone(&layer.records);
    let subscriber = Registry::default().with(layer);
    tracing::subscriber::with_default(subscriber, f);
    let captured = records.lock().unwrap().clone();
    captured
}

/// The single record with `message`, failing when there is not exactly one.
pub fn only<'a>(records: &'a [CapturedRecord], message: &str) -> &'a CapturedRecord {
    let matching: Vec<_> = records.iter().filter(|r| r.message() == message).collect();
    assert_eq!(
        matching.len(),
        1,
        "expected one `{message}` record, got {records:#?}"
    );
    matching[0]
}
