//! Raw before/after snapshots and routing context supplied by the change source.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::event::Payload;

/// State of a document on one side of a mutation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DocumentSnapshot {
    /// Whether the document exists in this snapshot.
    pub exists: bool,
    /// Document fields, if the document exists.
    #[serde(default)]
    pub data: Option<Payload>,
}

impl DocumentSnapshot {
    /// Creates a snapshot of an existing document.
    pub fn present(data: Payload) -> Self {
        Self {
            exists: true,
            data: Some(data),
        }
    }

    /// Creates a snapshot of a document that does not exist.
    pub fn missing() -> Self {
        Self {
            exists: false,
            data: None,
        }
    }
}

/// A before/after pair for a single document write.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DocumentChange {
    /// State before the write.
    #[serde(default)]
    pub before: DocumentSnapshot,
    /// State after the write.
    #[serde(default)]
    pub after: DocumentSnapshot,
}

impl DocumentChange {
    /// Creates a new change.
    pub fn new(before: DocumentSnapshot, after: DocumentSnapshot) -> Self {
        Self { before, after }
    }
}

/// Routing parameters of one trigger invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TriggerContext {
    /// Named route parameters, e.g. `bookingId`.
    #[serde(default)]
    pub params: HashMap<String, String>,
    /// Producer-assigned event id, used only for log correlation.
    #[serde(default, rename = "eventId", skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
}

impl TriggerContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a route parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Sets the producer event id.
    pub fn with_event_id(mut self, id: impl Into<String>) -> Self {
        self.event_id = Some(id.into());
        self
    }

    /// Looks up a route parameter.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_snapshot_deserialize_defaults() {
        let change: DocumentChange = serde_json::from_value(json!({
            "after": {"exists": true, "data": {"name": "Alice"}}
        }))
        .unwrap();

        assert!(!change.before.exists);
        assert!(change.before.data.is_none());
        assert!(change.after.exists);
        assert_eq!(change.after.data.unwrap()["name"], json!("Alice"));
    }

    #[test]
    fn test_context_params() {
        let ctx = TriggerContext::new()
            .with_param("bookingId", "abc123")
            .with_event_id("evt-1");

        assert_eq!(ctx.param("bookingId"), Some("abc123"));
        assert_eq!(ctx.param("missing"), None);
        assert_eq!(ctx.event_id.as_deref(), Some("evt-1"));
    }
}
