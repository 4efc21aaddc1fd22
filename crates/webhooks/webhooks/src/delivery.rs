//! Outcome record of a single delivery attempt.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use docrelay_events::{ChangeEvent, Operation};

use crate::error::WebhookError;

/// Record of one webhook delivery attempt. Kept in memory only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryReport {
    /// Delivery ID.
    pub id: String,
    /// Relayed operation.
    pub operation: Operation,
    /// Collection name.
    pub collection: String,
    /// Document id.
    pub document_id: String,
    /// Source database.
    pub source_id: String,
    /// HTTP status code (if received).
    pub status_code: Option<u16>,
    /// Response body (if received).
    pub response_body: Option<String>,
    /// Error message (if failed).
    pub error: Option<String>,
    /// Duration in milliseconds.
    pub duration_ms: u64,
    /// When the delivery was attempted.
    pub attempted_at: DateTime<Utc>,
}

impl DeliveryReport {
    fn base(event: &ChangeEvent, duration_ms: u64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            operation: event.operation,
            collection: event.collection.clone(),
            document_id: event.document_id.clone(),
            source_id: event.source_id.clone(),
            status_code: None,
            response_body: None,
            error: None,
            duration_ms,
            attempted_at: Utc::now(),
        }
    }

    /// Creates a successful delivery record.
    pub fn success(event: &ChangeEvent, status_code: u16, response_body: String, duration_ms: u64) -> Self {
        Self {
            status_code: Some(status_code),
            response_body: Some(response_body),
            ..Self::base(event, duration_ms)
        }
    }

    /// Creates a failed delivery record.
    pub fn failure(event: &ChangeEvent, error: &WebhookError, duration_ms: u64) -> Self {
        Self {
            status_code: error.status_code(),
            response_body: error.response_body().map(str::to_string),
            error: Some(error.to_string()),
            ..Self::base(event, duration_ms)
        }
    }

    /// Whether the endpoint accepted the delivery.
    pub fn is_delivered(&self) -> bool {
        self.error.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docrelay_events::Payload;

    fn event() -> ChangeEvent {
        ChangeEvent::new(Operation::Update, "bookings", "auburn", "abc123", Payload::new())
    }

    #[test]
    fn test_success_record() {
        let report = DeliveryReport::success(&event(), 200, "ok".to_string(), 12);
        assert!(report.is_delivered());
        assert_eq!(report.status_code, Some(200));
        assert_eq!(report.response_body.as_deref(), Some("ok"));
        assert_eq!(report.operation, Operation::Update);
        assert!(!report.id.is_empty());
    }

    #[test]
    fn test_failure_record_keeps_response() {
        let err = WebhookError::HttpStatus {
            status: 503,
            body: "unavailable".to_string(),
        };
        let report = DeliveryReport::failure(&event(), &err, 40);
        assert!(!report.is_delivered());
        assert_eq!(report.status_code, Some(503));
        assert_eq!(report.response_body.as_deref(), Some("unavailable"));
        assert_eq!(report.document_id, "abc123");
        assert_eq!(report.source_id, "auburn");
    }

    #[test]
    fn test_failure_record_transport() {
        let report = DeliveryReport::failure(&event(), &WebhookError::Timeout, 10_000);
        assert!(!report.is_delivered());
        assert_eq!(report.status_code, None);
        assert_eq!(report.error.as_deref(), Some("Request timeout"));
    }
}
