//! Canonical change events.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::classify::{Classification, classify};
use crate::collection::CollectionSpec;
use crate::error::{EventError, EventResult};
use crate::snapshot::{DocumentChange, TriggerContext};

/// Field set of a document, ordered by key.
pub type Payload = Map<String, Value>;

/// Kind of mutation observed on a document.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operation {
    /// The document did not exist before and exists now.
    Create,
    /// The document existed before and still exists.
    Update,
    /// The document existed before and is gone now.
    Delete,
}

impl Operation {
    /// Returns the wire name (e.g., "CREATE").
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "CREATE",
            Operation::Update => "UPDATE",
            Operation::Delete => "DELETE",
        }
    }

    /// Returns the past-tense verb used in logs (e.g., "created").
    pub fn past_tense(&self) -> &'static str {
        match self {
            Operation::Create => "created",
            Operation::Update => "updated",
            Operation::Delete => "deleted",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized document change, built once per trigger invocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChangeEvent {
    /// The classified operation.
    pub operation: Operation,
    /// Collection the document belongs to.
    pub collection: String,
    /// Logical database the change originated from.
    pub source_id: String,
    /// Identifier of the affected document.
    pub document_id: String,
    /// Post-change fields for CREATE/UPDATE, pre-change fields for DELETE.
    pub payload: Payload,
}

impl ChangeEvent {
    /// Creates a new change event.
    pub fn new(
        operation: Operation,
        collection: impl Into<String>,
        source_id: impl Into<String>,
        document_id: impl Into<String>,
        payload: Payload,
    ) -> Self {
        Self {
            operation,
            collection: collection.into(),
            source_id: source_id.into(),
            document_id: document_id.into(),
            payload,
        }
    }

    /// Normalizes a raw before/after change for the given source and collection.
    ///
    /// Returns `Ok(None)` when neither snapshot exists, whether or not the
    /// route parameter is present. Otherwise the document id is read from the
    /// context under the collection's route parameter.
    pub fn from_change(
        source_id: &str,
        collection: &CollectionSpec,
        change: &DocumentChange,
        context: &TriggerContext,
    ) -> EventResult<Option<Self>> {
        let classification = classify(
            change.before.exists,
            change.after.exists,
            change.before.data.as_ref(),
            change.after.data.as_ref(),
        );

        let Classification::Change { operation, payload } = classification else {
            return Ok(None);
        };

        let param = collection.route_param();
        let document_id = context
            .param(param)
            .ok_or_else(|| EventError::MissingRouteParam {
                collection: collection.name().to_string(),
                param: param.to_string(),
            })?;

        Ok(Some(Self::new(
            operation,
            collection.name(),
            source_id,
            document_id,
            payload,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::DocumentSnapshot;
    use serde_json::json;

    fn fields(value: Value) -> Payload {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_operation_wire_names() {
        assert_eq!(serde_json::to_value(Operation::Create).unwrap(), json!("CREATE"));
        assert_eq!(serde_json::to_value(Operation::Update).unwrap(), json!("UPDATE"));
        assert_eq!(serde_json::to_value(Operation::Delete).unwrap(), json!("DELETE"));

        let parsed: Operation = serde_json::from_value(json!("DELETE")).unwrap();
        assert_eq!(parsed, Operation::Delete);
        assert_eq!(Operation::Update.to_string(), "UPDATE");
    }

    #[test]
    fn test_from_change_create() {
        let collection = CollectionSpec::new("bookings");
        let change = DocumentChange::new(
            DocumentSnapshot::missing(),
            DocumentSnapshot::present(fields(json!({"name": "Alice"}))),
        );
        let context = TriggerContext::new().with_param("bookingId", "abc123");

        let event = ChangeEvent::from_change("auburn", &collection, &change, &context)
            .unwrap()
            .unwrap();

        assert_eq!(event.operation, Operation::Create);
        assert_eq!(event.collection, "bookings");
        assert_eq!(event.source_id, "auburn");
        assert_eq!(event.document_id, "abc123");
        assert_eq!(event.payload, fields(json!({"name": "Alice"})));
    }

    #[test]
    fn test_from_change_delete_uses_before() {
        let collection = CollectionSpec::new("bookingDrafts");
        let change = DocumentChange::new(
            DocumentSnapshot::present(fields(json!({"status": "draft"}))),
            DocumentSnapshot::missing(),
        );
        let context = TriggerContext::new().with_param("bookingDraftId", "d-1");

        let event = ChangeEvent::from_change("oxford", &collection, &change, &context)
            .unwrap()
            .unwrap();

        assert_eq!(event.operation, Operation::Delete);
        assert_eq!(event.document_id, "d-1");
        assert_eq!(event.payload, fields(json!({"status": "draft"})));
    }

    #[test]
    fn test_from_change_noop() {
        let collection = CollectionSpec::new("bookings");
        let change = DocumentChange::new(DocumentSnapshot::missing(), DocumentSnapshot::missing());
        let context = TriggerContext::new().with_param("bookingId", "abc123");

        let event = ChangeEvent::from_change("auburn", &collection, &change, &context).unwrap();
        assert!(event.is_none());
    }

    #[test]
    fn test_from_change_noop_without_param() {
        let collection = CollectionSpec::new("bookings");
        let change = DocumentChange::new(DocumentSnapshot::missing(), DocumentSnapshot::missing());

        let event = ChangeEvent::from_change("auburn", &collection, &change, &TriggerContext::new()).unwrap();
        assert!(event.is_none());
    }

    #[test]
    fn test_from_change_missing_param() {
        let collection = CollectionSpec::new("bookings");
        let change = DocumentChange::new(
            DocumentSnapshot::missing(),
            DocumentSnapshot::present(Payload::new()),
        );
        // Route key is "bookingId", not "bookingsId".
        let context = TriggerContext::new().with_param("bookingsId", "abc123");

        let err = ChangeEvent::from_change("auburn", &collection, &change, &context).unwrap_err();
        match err {
            EventError::MissingRouteParam { collection, param } => {
                assert_eq!(collection, "bookings");
                assert_eq!(param, "bookingId");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
