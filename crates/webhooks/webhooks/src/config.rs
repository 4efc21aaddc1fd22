//! Webhook endpoint configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{WebhookError, WebhookResult};

/// Endpoint used when no URL is configured.
pub const DEFAULT_WEBHOOK_URL: &str = "https://your-api-server.com/api/MeilisearchWebhook";

/// Upper bound on a single delivery attempt.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// User agent sent with every delivery.
pub const DEFAULT_USER_AGENT: &str = concat!("docrelay/", env!("CARGO_PKG_VERSION"));

/// Legacy placeholder secret. Never accepted as a real credential.
pub const PLACEHOLDER_SECRET: &str = "fallback-secret";

/// Shared secret sent in the request body. Never printed.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct WebhookSecret(String);

impl WebhookSecret {
    /// Wraps a secret value.
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Returns the raw secret.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Whether the value can be used as a credential.
    pub fn is_usable(&self) -> bool {
        let value = self.0.trim();
        !value.is_empty() && value != PLACEHOLDER_SECRET
    }
}

impl std::fmt::Debug for WebhookSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("WebhookSecret(***)")
    }
}

impl Serialize for WebhookSecret {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Webhook endpoint configuration, read once at startup.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    /// Target URL.
    pub url: String,
    /// Shared secret; dispatch is refused without one.
    pub secret: Option<WebhookSecret>,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// User-Agent header value.
    pub user_agent: String,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_WEBHOOK_URL.to_string(),
            secret: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl WebhookConfig {
    /// Creates a configuration for the given endpoint.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Sets the shared secret.
    pub fn secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(WebhookSecret::new(secret));
        self
    }

    /// Sets the timeout in milliseconds.
    pub fn timeout_ms(mut self, timeout: u64) -> Self {
        self.timeout_ms = timeout;
        self
    }

    /// Sets the user agent.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Whether a usable secret is configured.
    pub fn has_secret(&self) -> bool {
        self.secret.as_ref().is_some_and(WebhookSecret::is_usable)
    }

    /// Whether the URL is still the built-in placeholder.
    pub fn is_placeholder_url(&self) -> bool {
        self.url == DEFAULT_WEBHOOK_URL
    }

    /// Checks the configuration and returns the parsed endpoint URL.
    pub fn validate(&self) -> WebhookResult<reqwest::Url> {
        if !self.has_secret() {
            return Err(WebhookError::ConfigError(
                "webhook secret is not configured".to_string(),
            ));
        }

        if self.timeout_ms == 0 {
            return Err(WebhookError::ConfigError(
                "webhook timeout must be greater than zero".to_string(),
            ));
        }

        let url = reqwest::Url::parse(&self.url)
            .map_err(|e| WebhookError::ConfigError(format!("invalid webhook url '{}': {}", self.url, e)))?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(WebhookError::ConfigError(format!(
                "unsupported webhook url scheme: {scheme}"
            ))),
        }
    }
}
