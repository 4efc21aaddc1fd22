//! # docrelay Webhooks
//!
//! Webhook delivery for normalized document changes:
//! - Canonical JSON request body carrying the shared secret
//! - Single bounded-timeout POST per change
//! - Fire-and-forget failure handling: failures are logged, never raised
//! - Fail-closed configuration: no dispatcher without a real secret
//!
//! ## Example
//!
//! ```rust,ignore
//! use docrelay_webhooks::{WebhookConfig, WebhookDispatcher};
//!
//! let config = WebhookConfig::new("https://example.com/webhook").secret("secret123");
//! let dispatcher = WebhookDispatcher::new(config)?;
//!
//! let report = dispatcher.dispatch(&event).await;
//! ```

mod config;
mod delivery;
mod dispatcher;
mod error;
mod request;

pub use config::{
    DEFAULT_TIMEOUT_MS, DEFAULT_USER_AGENT, DEFAULT_WEBHOOK_URL, PLACEHOLDER_SECRET, WebhookConfig,
    WebhookSecret,
};
pub use delivery::DeliveryReport;
pub use dispatcher::WebhookDispatcher;
pub use error::{WebhookError, WebhookResult};
pub use request::WebhookRequest;
