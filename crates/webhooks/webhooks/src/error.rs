//! Webhook error types.

use thiserror::Error;

/// Result type for webhook operations.
pub type WebhookResult<T> = Result<T, WebhookError>;

/// Error type for webhook operations.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Request body could not be encoded.
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// The endpoint answered with a non-2xx status.
    #[error("Webhook failed: {status} - {body}")]
    HttpStatus {
        /// Response status code.
        status: u16,
        /// Response body text.
        body: String,
    },

    /// Transport-level failure (connect, TLS, body read).
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Timeout.
    #[error("Request timeout")]
    Timeout,

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl WebhookError {
    /// Status code returned by the endpoint, if it answered.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            WebhookError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Response body returned by the endpoint, if it answered.
    pub fn response_body(&self) -> Option<&str> {
        match self {
            WebhookError::HttpStatus { body, .. } => Some(body),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for WebhookError {
    fn from(err: serde_json::Error) -> Self {
        WebhookError::InvalidPayload(err.to_string())
    }
}

impl From<reqwest::Error> for WebhookError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            WebhookError::Timeout
        } else {
            WebhookError::HttpError(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_accessors() {
        let err = WebhookError::HttpStatus {
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(err.status_code(), Some(500));
        assert_eq!(err.response_body(), Some("boom"));
        assert_eq!(err.to_string(), "Webhook failed: 500 - boom");

        assert_eq!(WebhookError::Timeout.status_code(), None);
        assert_eq!(WebhookError::Timeout.response_body(), None);
    }
}
