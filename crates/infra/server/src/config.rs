//! Relay configuration.

use serde::{Deserialize, Serialize};

use docrelay_events::CollectionSpec;
use docrelay_webhooks::{WebhookConfig, WebhookSecret};

/// Server-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Log level used when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_level: "info".to_string(),
        }
    }
}

impl ServerConfig {
    /// Socket address to bind.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// A tracked collection, either a bare name or a name with an explicit route parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CollectionConfig {
    /// Collection name; the route parameter is derived from it.
    Name(String),
    /// Collection with an explicit route parameter.
    Detailed(CollectionEntry),
}

/// Table form of a collection entry. Unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CollectionEntry {
    /// Collection name.
    pub name: String,
    /// Route parameter holding the document id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,
}

impl CollectionConfig {
    /// Collection name.
    pub fn name(&self) -> &str {
        match self {
            CollectionConfig::Name(name) => name,
            CollectionConfig::Detailed(entry) => &entry.name,
        }
    }

    /// Builds the routing spec for this collection.
    pub fn to_spec(&self) -> CollectionSpec {
        match self {
            CollectionConfig::Name(name) => CollectionSpec::new(name.as_str()),
            CollectionConfig::Detailed(entry) => {
                let spec = CollectionSpec::new(entry.name.as_str());
                match &entry.param {
                    Some(param) => spec.with_param(param.as_str()),
                    None => spec,
                }
            }
        }
    }
}

/// Which sources and collections to relay.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Logical databases (campuses).
    pub sources: Vec<String>,
    /// Tracked collections.
    pub collections: Vec<CollectionConfig>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            sources: vec!["auburn".to_string(), "oxford".to_string()],
            collections: [
                "bookings",
                "bookingDrafts",
                "archivedBookings",
                "bookingQuotes",
                "contactMessages",
            ]
            .into_iter()
            .map(|name| CollectionConfig::Name(name.to_string()))
            .collect(),
        }
    }
}

impl RelayConfig {
    /// Routing specs for all collections.
    pub fn collection_specs(&self) -> Vec<CollectionSpec> {
        self.collections.iter().map(CollectionConfig::to_spec).collect()
    }

    /// Collection names.
    pub fn collection_names(&self) -> Vec<String> {
        self.collections.iter().map(|c| c.name().to_string()).collect()
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Server settings.
    pub server: ServerConfig,
    /// Relay fan-out settings.
    pub relay: RelayConfig,
    /// Webhook endpoint settings.
    pub webhook: WebhookConfig,
}

impl AppConfig {
    /// Parses configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Applies environment overrides using the given lookup.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(url) = lookup("WEBHOOK_URL") {
            self.webhook.url = url;
        }
        if let Some(secret) = lookup("WEBHOOK_SECRET") {
            self.webhook.secret = Some(WebhookSecret::new(secret));
        }
        if let Some(host) = lookup("DOCRELAY_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("DOCRELAY_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| ConfigError::InvalidValue(format!("DOCRELAY_PORT: {port}")))?;
        }
        Ok(())
    }

    /// Checks the fan-out settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.relay.sources.iter().any(|s| s.trim().is_empty()) {
            return Err(ConfigError::InvalidValue("empty source id".to_string()));
        }
        if self.relay.collections.iter().any(|c| c.name().trim().is_empty()) {
            return Err(ConfigError::InvalidValue("empty collection name".to_string()));
        }
        Ok(())
    }
}

/// Loads configuration from an optional TOML file, then applies environment overrides.
pub fn load_config(path: Option<&str>) -> Result<AppConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
            AppConfig::from_toml(&content)?
        }
        None => AppConfig::default(),
    };

    config.apply_overrides(|key| std::env::var(key).ok())?;
    config.validate()?;
    Ok(config)
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Invalid value: {0}")]
    InvalidValue(String),
}
