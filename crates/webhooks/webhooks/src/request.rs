//! Wire body of a webhook delivery.

use serde::Serialize;

use docrelay_events::{ChangeEvent, Operation, Payload};

use crate::config::WebhookSecret;

/// JSON body posted to the webhook endpoint.
#[derive(Debug, Serialize)]
pub struct WebhookRequest<'a> {
    /// CREATE, UPDATE or DELETE.
    pub operation: Operation,
    /// Document fields.
    pub data: &'a Payload,
    /// Document id.
    pub id: &'a str,
    /// Collection name.
    pub collection: &'a str,
    /// Source database the change came from.
    pub campus: &'a str,
    /// Shared secret authenticating the sender.
    pub secret: &'a WebhookSecret,
}

impl<'a> WebhookRequest<'a> {
    /// Builds the request body for a change event.
    pub fn from_event(event: &'a ChangeEvent, secret: &'a WebhookSecret) -> Self {
        Self {
            operation: event.operation,
            data: &event.payload,
            id: &event.document_id,
            collection: &event.collection,
            campus: &event.source_id,
            secret,
        }
    }

    /// Serializes the body to JSON bytes.
    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[test]
    fn test_body_shape() {
        let payload = json!({"name": "Alice"}).as_object().cloned().unwrap();
        let event = ChangeEvent::new(Operation::Create, "bookings", "auburn", "abc123", payload);
        let secret = WebhookSecret::new("s3cr3t");

        let body = WebhookRequest::from_event(&event, &secret).to_json().unwrap();
        let decoded: Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(
            decoded,
            json!({
                "operation": "CREATE",
                "data": {"name": "Alice"},
                "id": "abc123",
                "collection": "bookings",
                "campus": "auburn",
                "secret": "s3cr3t"
            })
        );
    }

    #[test]
    fn test_debug_hides_secret() {
        let event = ChangeEvent::new(Operation::Delete, "bookings", "oxford", "x", Payload::new());
        let secret = WebhookSecret::new("s3cr3t");
        let request = WebhookRequest::from_event(&event, &secret);

        assert!(!format!("{:?}", request).contains("s3cr3t"));
    }
}
