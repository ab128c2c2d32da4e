//! Event loading.
//!
//! Event files come in three shapes: a bare array of events, a PostHog API
//! response (`{"results": [...]}`), or a custom export (`{"events": [...]}`).
//! All three normalize into an [`EventBatch`] in source order.

use crate::{Result, UpsellError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

/// A single recorded user-behaviour occurrence.
///
/// The payload is kept as-is; no schema is enforced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventRecord(Value);

impl EventRecord {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// The PostHog `event` name, if present and a string.
    pub fn event_name(&self) -> Option<&str> {
        self.0.get("event").and_then(Value::as_str)
    }

    /// The PostHog `distinct_id`, if present and a string.
    pub fn distinct_id(&self) -> Option<&str> {
        self.0.get("distinct_id").and_then(Value::as_str)
    }
}

impl From<Value> for EventRecord {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Ordered events from one source. Duplicates are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventBatch(Vec<EventRecord>);

impl EventBatch {
    pub fn new(events: Vec<EventRecord>) -> Self {
        Self(events)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EventRecord> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[EventRecord] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<EventRecord> {
        self.0
    }
}

impl From<Vec<Value>> for EventBatch {
    fn from(values: Vec<Value>) -> Self {
        Self(values.into_iter().map(EventRecord::from).collect())
    }
}

impl IntoIterator for EventBatch {
    type Item = EventRecord;
    type IntoIter = std::vec::IntoIter<EventRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a EventBatch {
    type Item = &'a EventRecord;
    type IntoIter = std::slice::Iter<'a, EventRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Parse an event document from raw JSON bytes.
pub fn parse_events(bytes: &[u8]) -> Result<EventBatch> {
    let document: Value = serde_json::from_slice(bytes).map_err(UpsellError::MalformedInput)?;
    normalize(document)
}

/// Read and parse an event file.
pub fn load_events(path: impl AsRef<Path>) -> Result<EventBatch> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => UpsellError::NotFound(path.display().to_string()),
        _ => UpsellError::Io(e),
    })?;

    let batch = parse_events(&bytes)?;
    tracing::debug!(path = %path.display(), total_events = batch.len(), "loaded events");
    Ok(batch)
}

/// Pick the event array out of one of the accepted document shapes.
pub(crate) fn normalize(document: Value) -> Result<EventBatch> {
    let events = match document {
        Value::Array(items) => items,
        Value::Object(mut map) => {
            let inner = match map.remove("results") {
                Some(results) => results,
                None => map.remove("events").ok_or(UpsellError::UnsupportedFormat)?,
            };
            match inner {
                Value::Array(items) => items,
                _ => return Err(UpsellError::UnsupportedFormat),
            }
        }
        _ => return Err(UpsellError::UnsupportedFormat),
    };

    Ok(EventBatch::from(events))
}
